//! Workflow automation add-on bundle.
//!
//! Rendered into `<project>/automation/` with its own compose file and env;
//! the encryption key guards stored credentials and is validated before
//! anything reaches disk.

use crate::error::Result;
use crate::render::{render_file, restrict_permissions, RenderReport};
use kk_types::{ErrorClass, UserError};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const AUTOMATION_SUBDIR: &str = "automation";
pub const MIN_ENCRYPTION_KEY_LEN: usize = 32;
pub const MIN_AUTOMATION_DB_PASSWORD_LEN: usize = 16;

#[derive(Debug, Clone, Serialize)]
pub struct AutomationConfig {
    pub host: String,
    pub db_user: String,
    pub db_password: String,
    pub encryption_key: String,
    pub timezone: String,
    pub connect_core_network: bool,
}

impl AutomationConfig {
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.encryption_key.len() < MIN_ENCRYPTION_KEY_LEN {
            problems.push(format!(
                "encryption key must be at least {} bytes (got {})",
                MIN_ENCRYPTION_KEY_LEN,
                self.encryption_key.len()
            ));
        }
        if self.db_password.len() < MIN_AUTOMATION_DB_PASSWORD_LEN {
            problems.push(format!(
                "database password must be at least {} bytes (got {})",
                MIN_AUTOMATION_DB_PASSWORD_LEN,
                self.db_password.len()
            ));
        }
        if self.db_user.is_empty() {
            problems.push("database user is required".to_string());
        }
        if self.host.is_empty() {
            problems.push("host is required".to_string());
        }

        if problems.is_empty() {
            return Ok(());
        }
        Err(UserError::new(
            ErrorClass::SecretTooShort,
            format!("Automation config invalid: {}", problems.join("; ")),
            "Regenerate the add-on secrets",
        )
        .with_command("kk automation install")
        .into())
    }
}

pub fn automation_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(AUTOMATION_SUBDIR)
}

pub fn is_installed(project_dir: &Path) -> bool {
    automation_dir(project_dir).join("docker-compose.yml").exists()
}

/// Render the add-on bundle. Same discipline as the core bundle: validate,
/// create data directories, backup-then-write, 0600 env.
pub fn render_automation(cfg: &AutomationConfig, project_dir: &Path) -> Result<RenderReport> {
    cfg.validate()?;

    let dir = automation_dir(project_dir);
    for sub in ["", "data", "postgres"] {
        std::fs::create_dir_all(dir.join(sub))?;
    }

    let context = tera::Context::from_serialize(cfg)?;
    let mut report = RenderReport::default();
    render_file(
        "automation-compose.yml",
        &context,
        &dir.join("docker-compose.yml"),
        false,
        &mut report,
    )?;
    render_file("automation-env", &context, &dir.join(".env"), true, &mut report)?;

    restrict_permissions(&dir.join(".env"))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config() -> AutomationConfig {
        AutomationConfig {
            host: "automation.example.com".into(),
            db_user: "automation".into(),
            db_password: "db-password-16byte".into(),
            encryption_key: "encryption-key-encryption-key-32".into(),
            timezone: "Asia/Ho_Chi_Minh".into(),
            connect_core_network: true,
        }
    }

    #[test]
    fn test_short_encryption_key_rejected_before_disk() {
        let dir = tempdir().unwrap();
        let mut cfg = config();
        cfg.encryption_key = "short".into();
        assert!(render_automation(&cfg, dir.path()).is_err());
        assert!(!automation_dir(dir.path()).exists());
    }

    #[test]
    fn test_renders_bundle_and_data_dirs() {
        let dir = tempdir().unwrap();
        let report = render_automation(&config(), dir.path()).unwrap();
        let base = automation_dir(dir.path());
        assert!(base.join("docker-compose.yml").exists());
        assert!(base.join(".env").exists());
        assert!(base.join("data").is_dir());
        assert!(base.join("postgres").is_dir());
        assert_eq!(report.written.len(), 2);
        assert!(is_installed(dir.path()));

        let env = std::fs::read_to_string(base.join(".env")).unwrap();
        assert!(env.contains("N8N_ENCRYPTION_KEY=encryption-key-encryption-key-32"));
        assert!(env.contains("DB_POSTGRESDB_USER=automation"));
    }

    #[cfg(unix)]
    #[test]
    fn test_env_mode_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        render_automation(&config(), dir.path()).unwrap();
        let mode = std::fs::metadata(automation_dir(dir.path()).join(".env"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
