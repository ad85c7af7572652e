use kk_types::UserError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ComposeError>;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Compose command failed: {command} - {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{0}")]
    User(#[from] UserError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ComposeError {
    pub fn command_failed(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            stderr: stderr.into(),
        }
    }
}
