//! Health monitoring, status aggregation, and image-pull diffing.

pub mod error;
pub mod health;
pub mod status;
pub mod updates;

pub use error::{MonitorError, Result};
pub use health::{
    ContainerInfo, ContainerInspector, EngineInspector, HealthMonitor, HealthReport, HealthState,
    HealthStatus, InspectState, ProgressFn,
};
pub use status::{all_healthy, get_status_with_services, PsSource, ServiceStatus};
pub use updates::{parse_pull_output, ImageUpdate};
