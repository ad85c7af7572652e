//! Compose-file and reverse-proxy config syntax checks.

use kk_types::{ErrorClass, UserError};
use std::path::Path;

/// `docker-compose.yml` must parse as YAML and contain a `services` section.
pub fn validate_compose(dir: &Path) -> Result<(), UserError> {
    let path = dir.join("docker-compose.yml");

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(UserError::new(
                ErrorClass::ConfigMissing,
                "docker-compose.yml does not exist",
                "Initialize the stack first",
            )
            .with_command("kk init"));
        }
        Err(e) => {
            return Err(UserError::new(
                ErrorClass::ConfigMissing,
                format!("Cannot read docker-compose.yml: {}", e),
                "Check file permissions",
            ));
        }
    };

    let doc: serde_yaml::Value = serde_yaml::from_str(&content).map_err(|e| {
        UserError::new(
            ErrorClass::ConfigSyntax,
            format!("docker-compose.yml syntax error: {}", e),
            "Check YAML indentation, colons and quotes",
        )
    })?;

    if doc.get("services").is_none() {
        return Err(UserError::new(
            ErrorClass::ConfigSyntax,
            "docker-compose.yml has no 'services' section",
            "Re-run init or restore the file from its .bak",
        )
        .with_command("kk init"));
    }
    Ok(())
}

/// When the reverse proxy is enabled its Caddyfile must exist and be
/// non-empty.
pub fn validate_caddyfile(dir: &Path) -> Result<(), UserError> {
    let path = dir.join("Caddyfile");

    let content = match std::fs::read(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(UserError::new(
                ErrorClass::ConfigMissing,
                "Caddyfile does not exist but the reverse proxy is enabled",
                "Re-run init to generate it",
            )
            .with_command("kk init"));
        }
        Err(e) => {
            return Err(UserError::new(
                ErrorClass::ConfigMissing,
                format!("Cannot read Caddyfile: {}", e),
                "Check file permissions",
            ));
        }
    };

    if content.is_empty() {
        return Err(UserError::new(
            ErrorClass::ConfigSyntax,
            "Caddyfile is empty",
            "Add your domain configuration or re-run init",
        )
        .with_command("kk init"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_compose_without_services_fails() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("docker-compose.yml"), "version: '3'\n").unwrap();
        let err = validate_compose(dir.path()).unwrap_err();
        assert_eq!(err.class, ErrorClass::ConfigSyntax);
        assert!(err.message.contains("services"));
    }

    #[test]
    fn test_valid_compose_passes() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("docker-compose.yml"),
            "services:\n  db:\n    image: mariadb\n",
        )
        .unwrap();
        assert!(validate_compose(dir.path()).is_ok());
    }

    #[test]
    fn test_empty_caddyfile_fails() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Caddyfile"), "").unwrap();
        let err = validate_caddyfile(dir.path()).unwrap_err();
        assert_eq!(err.class, ErrorClass::ConfigSyntax);
    }

    #[test]
    fn test_missing_caddyfile_fails_when_enabled() {
        let dir = tempdir().unwrap();
        let err = validate_caddyfile(dir.path()).unwrap_err();
        assert_eq!(err.class, ErrorClass::ConfigMissing);
    }
}
