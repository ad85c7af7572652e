//! Operator CLI for the kkengine Docker Compose stack.

pub mod cli;
pub mod commands;
pub mod error;
pub mod messages;
pub mod ui;

pub use cli::{Cli, Commands};
pub use error::{CliError, Result};
