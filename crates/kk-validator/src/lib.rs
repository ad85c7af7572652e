//! Host preflight checks.
//!
//! Every check is an independent predicate returning pass/fail plus a
//! classified error; [`preflight::run_preflight`] runs all of them and
//! reports an aggregate, so the operator fixes the host once.

pub mod compose_cfg;
pub mod disk;
pub mod engine;
pub mod env;
pub mod ports;
pub mod preflight;

pub use compose_cfg::{validate_caddyfile, validate_compose};
pub use disk::{check_disk_space, MIN_DISK_SPACE_GB};
pub use engine::EngineValidator;
pub use env::{parse_env_file, validate_env_file, REQUIRED_ENV_VARS};
pub use ports::{check_all_ports, check_port, PortStatus, PROJECT_PREFIX};
pub use preflight::{run_preflight, PreflightReport, PreflightResult};
