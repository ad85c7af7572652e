use thiserror::Error;

pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Docker connection failed: {0}")]
    Connection(String),

    #[error("Inspect failed for {container}: {message}")]
    Inspect { container: String, message: String },

    #[error("Docker API error: {0}")]
    Api(#[from] bollard::errors::Error),

    #[error("Status query failed: {0}")]
    Status(#[from] kk_compose::ComposeError),
}

impl MonitorError {
    pub fn inspect(container: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Inspect {
            container: container.into(),
            message: message.into(),
        }
    }
}
