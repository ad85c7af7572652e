//! `.env` file validation.

use kk_types::{ErrorClass, UserError};
use std::collections::HashMap;
use std::path::Path;

/// Keys that must be present and non-empty.
pub const REQUIRED_ENV_VARS: &[&str] = &[
    "DB_PASSWORD",
    "DB_ROOT_PASSWORD",
    "REDIS_PASSWORD",
    "JWT_SECRET",
];

const MIN_SECRET_LEN: usize = 16;

/// Validate `<dir>/.env`: it must exist, parse as KEY=VALUE, and contain
/// every required key. Loose permissions and weak secrets are warnings.
pub fn validate_env_file(dir: &Path) -> Result<Vec<String>, UserError> {
    let env_path = dir.join(".env");
    let mut warnings = Vec::new();

    let metadata = match std::fs::metadata(&env_path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(UserError::new(
                ErrorClass::EnvMissing,
                ".env file does not exist",
                "Initialize the stack first",
            )
            .with_command("kk init"));
        }
        Err(e) => {
            return Err(UserError::new(
                ErrorClass::EnvInvalid,
                format!("Cannot stat .env: {}", e),
                "Check file permissions",
            ));
        }
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = metadata.permissions().mode();
        if mode & 0o044 != 0 {
            warnings.push(format!(
                ".env is readable by group or others (mode {:o}); run: chmod 600 {}",
                mode & 0o777,
                env_path.display()
            ));
        }
    }

    let vars = parse_env_file(&env_path).map_err(|e| {
        UserError::new(
            ErrorClass::EnvInvalid,
            format!("Cannot read .env: {}", e),
            "Check the .env syntax",
        )
    })?;

    let missing: Vec<&str> = REQUIRED_ENV_VARS
        .iter()
        .copied()
        .filter(|key| vars.get(*key).map(|v| v.is_empty()).unwrap_or(true))
        .collect();
    if !missing.is_empty() {
        return Err(UserError::new(
            ErrorClass::EnvInvalid,
            format!("Missing required variables in .env: {}", missing.join(", ")),
            "Add the missing keys to .env or re-run init",
        )
        .with_command("kk init"));
    }

    let weak: Vec<&String> = vars
        .iter()
        .filter(|(key, value)| is_secret_key(key) && !value.is_empty() && value.len() < MIN_SECRET_LEN)
        .map(|(key, _)| key)
        .collect();
    if !weak.is_empty() {
        let mut names: Vec<&str> = weak.iter().map(|s| s.as_str()).collect();
        names.sort_unstable();
        warnings.push(format!(
            "Weak secrets (shorter than {} bytes): {}",
            MIN_SECRET_LEN,
            names.join(", ")
        ));
    }

    Ok(warnings)
}

fn is_secret_key(key: &str) -> bool {
    key.ends_with("_PASSWORD") || key.ends_with("_SECRET") || key.ends_with("_KEY")
}

/// Line-oriented KEY=VALUE parse with `#` comments and optional quoting.
pub fn parse_env_file(path: &Path) -> std::io::Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path)?;
    let mut vars = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().to_string();
        let value = value
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .to_string();
        vars.insert(key, value);
    }
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const GOOD_ENV: &str = r#"
# kkengine environment
DOMAIN=localhost
DB_PASSWORD="sixteen-byte-pw-x"
DB_ROOT_PASSWORD=another-sixteen-x
REDIS_PASSWORD='redis-password-16'
JWT_SECRET=0123456789abcdef0123456789abcdef
"#;

    #[test]
    fn test_parse_env_file_quoting_and_comments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, GOOD_ENV).unwrap();
        let vars = parse_env_file(&path).unwrap();
        assert_eq!(vars["DOMAIN"], "localhost");
        assert_eq!(vars["DB_PASSWORD"], "sixteen-byte-pw-x");
        assert_eq!(vars["REDIS_PASSWORD"], "redis-password-16");
        assert!(!vars.contains_key("# kkengine environment"));
    }

    #[test]
    fn test_missing_env_file_is_classified() {
        let dir = tempdir().unwrap();
        let err = validate_env_file(dir.path()).unwrap_err();
        assert_eq!(err.class, ErrorClass::EnvMissing);
        assert_eq!(err.command.as_deref(), Some("kk init"));
    }

    #[test]
    fn test_missing_required_key_blocks() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "DB_PASSWORD=x\n").unwrap();
        let err = validate_env_file(dir.path()).unwrap_err();
        assert_eq!(err.class, ErrorClass::EnvInvalid);
        assert!(err.message.contains("JWT_SECRET"));
    }

    #[test]
    fn test_weak_secret_warns_but_passes() {
        let dir = tempdir().unwrap();
        let env = "DB_PASSWORD=short\nDB_ROOT_PASSWORD=sixteen-bytes-pw\nREDIS_PASSWORD=sixteen-bytes-pw\nJWT_SECRET=0123456789abcdef0123456789abcdef\n";
        let path = dir.path().join(".env");
        std::fs::write(&path, env).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).unwrap();
        }
        let warnings = validate_env_file(dir.path()).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("DB_PASSWORD"));
    }

    #[cfg(unix)]
    #[test]
    fn test_world_readable_env_warns() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, GOOD_ENV).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        let warnings = validate_env_file(dir.path()).unwrap();
        assert!(warnings.iter().any(|w| w.contains("chmod 600")));
    }
}
