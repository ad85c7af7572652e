use thiserror::Error;

/// Classification keys for every error surfaced to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    EngineMissing,
    EngineUnreachable,
    EnginePermission,
    ComposeVersion,
    PortConflict,
    ConfigMissing,
    ConfigSyntax,
    EnvMissing,
    EnvInvalid,
    SecretTooShort,
    LowDisk,
    PullFailed,
    RecreateFailed,
    Inspect,
    Cancelled,
}

impl ErrorClass {
    pub fn as_key(&self) -> &'static str {
        match self {
            ErrorClass::EngineMissing => "engine_missing",
            ErrorClass::EngineUnreachable => "engine_unreachable",
            ErrorClass::EnginePermission => "engine_permission",
            ErrorClass::ComposeVersion => "compose_version",
            ErrorClass::PortConflict => "port_conflict",
            ErrorClass::ConfigMissing => "config_missing",
            ErrorClass::ConfigSyntax => "config_syntax",
            ErrorClass::EnvMissing => "env_missing",
            ErrorClass::EnvInvalid => "env_invalid",
            ErrorClass::SecretTooShort => "secret_too_short",
            ErrorClass::LowDisk => "low_disk",
            ErrorClass::PullFailed => "pull_failed",
            ErrorClass::RecreateFailed => "recreate_failed",
            ErrorClass::Inspect => "inspect_error",
            ErrorClass::Cancelled => "cancelled",
        }
    }
}

/// Operator-facing error: a classification key, a human message, a
/// remediation suggestion, and optionally an example command to run.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct UserError {
    pub class: ErrorClass,
    pub message: String,
    pub suggestion: String,
    pub command: Option<String>,
}

impl UserError {
    pub fn new(class: ErrorClass, message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
            suggestion: suggestion.into(),
            command: None,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn cancelled() -> Self {
        Self::new(
            ErrorClass::Cancelled,
            "Operation cancelled",
            "The command was interrupted before it finished",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_display_is_message_only() {
        let err = UserError::new(ErrorClass::EngineMissing, "Docker is not installed", "Install it")
            .with_command("curl -fsSL https://get.docker.com | sh");
        assert_eq!(err.to_string(), "Docker is not installed");
        assert_eq!(err.class.as_key(), "engine_missing");
        assert!(err.command.is_some());
    }
}
