use crate::error::{ErrorClass, UserError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = ".kk";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Display language for operator-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Vi,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Vi => "vi",
        }
    }
}

impl From<&str> for Language {
    // Unknown values coerce to English.
    fn from(s: &str) -> Self {
        match s {
            "vi" => Language::Vi,
            _ => Language::En,
        }
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Language::from(raw.as_str()))
    }
}

/// Persistent CLI configuration stored at `~/.kk/config.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub project_dir: Option<PathBuf>,
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(CONFIG_DIR_NAME)
}

pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

impl CliConfig {
    /// Read config from disk; a missing file yields the defaults.
    pub fn load() -> Result<Self, UserError> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, UserError> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(UserError::new(
                    ErrorClass::ConfigMissing,
                    format!("Cannot read {}: {}", path.display(), e),
                    "Check file permissions",
                ))
            }
        };

        serde_yaml::from_str(&data).map_err(|e| {
            UserError::new(
                ErrorClass::ConfigSyntax,
                format!("Invalid config file {}: {}", path.display(), e),
                "Fix or delete the file and run kk config",
            )
        })
    }

    pub fn save(&self) -> Result<(), UserError> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), UserError> {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let data = serde_yaml::to_string(self)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            std::fs::write(path, data)
        };
        write().map_err(|e| {
            UserError::new(
                ErrorClass::ConfigMissing,
                format!("Cannot write {}: {}", path.display(), e),
                "Check that your home directory is writable",
            )
        })
    }

    /// Resolve the project directory for commands other than `init`:
    /// the configured directory, or the current directory when it holds a
    /// compose file. Anything else is the classified "project not configured"
    /// error.
    pub fn ensure_project_dir(&self) -> Result<PathBuf, UserError> {
        if let Some(dir) = &self.project_dir {
            if dir.join("docker-compose.yml").exists() {
                return Ok(dir.clone());
            }
        }

        if let Ok(cwd) = std::env::current_dir() {
            if cwd.join("docker-compose.yml").exists() {
                return Ok(cwd);
            }
        }

        Err(UserError::new(
            ErrorClass::ConfigMissing,
            "Project is not configured",
            "Initialize the stack first",
        )
        .with_command("kk init"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_returns_defaults() {
        let dir = tempdir().unwrap();
        let cfg = CliConfig::load_from(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(cfg.language, Language::En);
        assert!(cfg.project_dir.is_none());
    }

    #[test]
    fn test_invalid_language_coerced_to_english() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "language: xx\n").unwrap();
        let cfg = CliConfig::load_from(&path).unwrap();
        assert_eq!(cfg.language, Language::En);
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let cfg = CliConfig {
            language: Language::Vi,
            project_dir: Some(PathBuf::from("/srv/kkengine")),
        };
        cfg.save_to(&path).unwrap();
        let loaded = CliConfig::load_from(&path).unwrap();
        assert_eq!(loaded.language, Language::Vi);
        assert_eq!(loaded.project_dir, Some(PathBuf::from("/srv/kkengine")));
    }

    #[test]
    fn test_ensure_project_dir_unconfigured() {
        let dir = tempdir().unwrap();
        let cfg = CliConfig {
            language: Language::En,
            project_dir: Some(dir.path().join("nowhere")),
        };
        // A temp dir without docker-compose.yml is not a project. The cwd of
        // the test runner does not carry one either.
        let err = cfg.ensure_project_dir().unwrap_err();
        assert_eq!(err.class, ErrorClass::ConfigMissing);
        assert_eq!(err.command.as_deref(), Some("kk init"));
    }

    #[test]
    fn test_ensure_project_dir_configured() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("docker-compose.yml"), "services: {}\n").unwrap();
        let cfg = CliConfig {
            language: Language::En,
            project_dir: Some(dir.path().to_path_buf()),
        };
        assert_eq!(cfg.ensure_project_dir().unwrap(), dir.path());
    }
}
