//! Template and secret engine.
//!
//! Renders the embedded configuration bundle into a project directory with a
//! backup-then-write discipline, after validating every secret against its
//! minimum length. Secret generation draws from the OS RNG.

pub mod automation;
pub mod config;
pub mod error;
pub mod render;
pub mod secrets;

pub use automation::{automation_dir, render_automation, AutomationConfig};
pub use config::RenderConfig;
pub use error::{Result, TemplateError};
pub use render::{render_all, RenderReport};
pub use secrets::{generate_access_key, generate_secret, generate_with_retry};
