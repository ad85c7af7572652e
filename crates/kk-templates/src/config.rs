//! Typed render configuration with fail-closed secret validation.

use crate::error::Result;
use kk_types::{ErrorClass, UserError};
use serde::Serialize;

pub const MIN_JWT_SECRET_LEN: usize = 32;
pub const MIN_DB_PASSWORD_LEN: usize = 16;
pub const MIN_REDIS_PASSWORD_LEN: usize = 16;
pub const MIN_S3_ACCESS_KEY_LEN: usize = 16;
pub const MIN_S3_SECRET_KEY_LEN: usize = 32;

/// Everything the bundle templates consume.
#[derive(Debug, Clone, Serialize)]
pub struct RenderConfig {
    pub enable_seaweedfs: bool,
    pub enable_caddy: bool,
    pub domain: String,
    pub db_password: String,
    pub db_root_password: String,
    pub redis_password: String,
    pub jwt_secret: String,
    pub s3_access_key: String,
    pub s3_secret_key: String,
}

impl RenderConfig {
    /// Every secret backing an enabled feature must meet its minimum byte
    /// length. One aggregate error lists all offenders; nothing is rendered
    /// when this fails.
    pub fn validate(&self) -> Result<()> {
        let mut short: Vec<String> = Vec::new();

        let mut check = |name: &str, value: &str, min: usize| {
            if value.len() < min {
                short.push(format!("{} (need >= {} bytes, got {})", name, min, value.len()));
            }
        };

        check("DB_PASSWORD", &self.db_password, MIN_DB_PASSWORD_LEN);
        check("DB_ROOT_PASSWORD", &self.db_root_password, MIN_DB_PASSWORD_LEN);
        check("REDIS_PASSWORD", &self.redis_password, MIN_REDIS_PASSWORD_LEN);
        check("JWT_SECRET", &self.jwt_secret, MIN_JWT_SECRET_LEN);
        if self.enable_seaweedfs {
            check("S3_ACCESS_KEY", &self.s3_access_key, MIN_S3_ACCESS_KEY_LEN);
            check("S3_SECRET_KEY", &self.s3_secret_key, MIN_S3_SECRET_KEY_LEN);
        }

        if short.is_empty() {
            return Ok(());
        }
        Err(UserError::new(
            ErrorClass::SecretTooShort,
            format!("Secrets below minimum length: {}", short.join(", ")),
            "Regenerate the secrets and run init again",
        )
        .with_command("kk init")
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn valid_config() -> RenderConfig {
        RenderConfig {
            enable_seaweedfs: true,
            enable_caddy: true,
            domain: "localhost".into(),
            db_password: "db-password-16byte".into(),
            db_root_password: "root-password-16b".into(),
            redis_password: "redis-password-16".into(),
            jwt_secret: "jwt-secret-jwt-secret-jwt-secret".into(),
            s3_access_key: "ACCESSKEY0123456".into(),
            s3_secret_key: "s3-secret-key-s3-secret-key-32by".into(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_short_jwt_secret_is_rejected() {
        let mut cfg = valid_config();
        cfg.jwt_secret = "too-short".into();
        let err = cfg.validate().unwrap_err();
        match err {
            crate::TemplateError::User(user) => {
                assert_eq!(user.class, ErrorClass::SecretTooShort);
                assert!(user.message.contains("JWT_SECRET"));
            }
            other => panic!("expected classified error, got {:?}", other),
        }
    }

    #[test]
    fn test_all_offending_secrets_listed() {
        let mut cfg = valid_config();
        cfg.db_password = "short".into();
        cfg.redis_password = "short".into();
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("DB_PASSWORD"));
        assert!(err.contains("REDIS_PASSWORD"));
    }

    #[test]
    fn test_s3_secrets_ignored_when_storage_disabled() {
        let mut cfg = valid_config();
        cfg.enable_seaweedfs = false;
        cfg.s3_access_key = String::new();
        cfg.s3_secret_key = String::new();
        assert!(cfg.validate().is_ok());
    }
}
