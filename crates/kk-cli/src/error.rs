use kk_types::{ErrorClass, UserError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    User(#[from] UserError),

    #[error("{0}")]
    Compose(#[from] kk_compose::ComposeError),

    #[error("{0}")]
    Monitor(#[from] kk_monitor::MonitorError),

    #[error("{0}")]
    Template(#[from] kk_templates::TemplateError),

    #[error("Input error: {0}")]
    Dialog(#[from] dialoguer::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Collapse any failure into the classified operator-facing form used by
    /// the boxed report.
    pub fn to_user_error(&self) -> UserError {
        match self {
            CliError::User(user) => user.clone(),
            CliError::Compose(compose) => compose_user_error(compose),
            CliError::Monitor(kk_monitor::MonitorError::Status(compose)) => {
                compose_user_error(compose)
            }
            CliError::Monitor(other) => UserError::new(
                ErrorClass::Inspect,
                other.to_string(),
                "Check that the Docker daemon is running",
            )
            .with_command("sudo systemctl start docker"),
            CliError::Template(kk_templates::TemplateError::User(user)) => user.clone(),
            CliError::Template(other) => UserError::new(
                ErrorClass::ConfigSyntax,
                other.to_string(),
                "Re-run init to regenerate the configuration",
            )
            .with_command("kk init"),
            CliError::Dialog(e) => UserError::new(
                ErrorClass::Cancelled,
                e.to_string(),
                "Run the command again to retry the prompt",
            ),
            CliError::Io(e) => UserError::new(
                ErrorClass::ConfigMissing,
                e.to_string(),
                "Check filesystem permissions",
            ),
        }
    }
}

fn compose_user_error(error: &kk_compose::ComposeError) -> UserError {
    match error {
        kk_compose::ComposeError::User(user) => user.clone(),
        kk_compose::ComposeError::Cancelled => UserError::cancelled(),
        kk_compose::ComposeError::CommandFailed { command, stderr } => {
            let class = if command.starts_with("pull") {
                ErrorClass::PullFailed
            } else {
                ErrorClass::RecreateFailed
            };
            UserError::new(class, stderr.clone(), "Check the engine logs for details")
                .with_command("docker compose logs")
        }
        other => UserError::new(
            ErrorClass::EngineUnreachable,
            other.to_string(),
            "Check that the Docker daemon is running",
        )
        .with_command("sudo systemctl start docker"),
    }
}
