//! Minimal compose-file model.
//!
//! Parses `docker-compose.yml` just far enough to enumerate services, answer
//! whether a service declares a health check, and hand back published port
//! entries verbatim. Unknown fields are ignored; the model is never written
//! back to disk.

use crate::error::Result;
use kk_types::{ErrorClass, UserError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposeFile {
    #[serde(default)]
    pub services: BTreeMap<String, Service>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Service {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ports: Vec<PortEntry>,
    #[serde(default)]
    pub healthcheck: Option<HealthCheck>,
}

/// Published port entry; compose allows both `"80:80"` and bare numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortEntry {
    Text(String),
    Number(u32),
}

impl PortEntry {
    pub fn as_text(&self) -> String {
        match self {
            PortEntry::Text(s) => s.clone(),
            PortEntry::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthCheck {
    #[serde(default)]
    pub test: Option<serde_yaml::Value>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub timeout: Option<String>,
    #[serde(default)]
    pub retries: Option<u32>,
}

impl ComposeFile {
    /// Parse `<dir>/docker-compose.yml`.
    pub fn parse(dir: &Path) -> Result<Self> {
        let path = dir.join("docker-compose.yml");
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(UserError::new(
                    ErrorClass::ConfigMissing,
                    "docker-compose.yml does not exist",
                    "Initialize the stack first",
                )
                .with_command("kk init")
                .into());
            }
            Err(e) => {
                return Err(UserError::new(
                    ErrorClass::ConfigMissing,
                    format!("Cannot read {}: {}", path.display(), e),
                    "Check file permissions",
                )
                .into());
            }
        };

        serde_yaml::from_str(&content).map_err(|e| {
            UserError::new(
                ErrorClass::ConfigSyntax,
                format!("docker-compose.yml syntax error: {}", e),
                "Check YAML indentation, colons and quotes",
            )
            .into()
        })
    }

    pub fn service_names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    pub fn has_service(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Absence of a health check is valid and common for stateless services.
    pub fn has_health_check(&self, name: &str) -> bool {
        self.services
            .get(name)
            .map(|s| s.healthcheck.is_some())
            .unwrap_or(false)
    }

    pub fn service_ports(&self, name: &str) -> Vec<String> {
        self.services
            .get(name)
            .map(|s| s.ports.iter().map(PortEntry::as_text).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
services:
  db:
    image: mariadb:10.6
    ports:
      - "3307:3306"
    healthcheck:
      test: ["CMD", "healthcheck.sh", "--connect"]
      interval: 10s
      timeout: 5s
      retries: 3
  kkengine:
    image: kkauto/kkengine:latest
    ports:
      - "8019:80"
  redis:
    image: redis:7-alpine
"#;

    fn write_sample(dir: &Path, content: &str) {
        std::fs::write(dir.join("docker-compose.yml"), content).unwrap();
    }

    #[test]
    fn test_service_names() {
        let dir = tempdir().unwrap();
        write_sample(dir.path(), SAMPLE);
        let model = ComposeFile::parse(dir.path()).unwrap();
        let mut names = model.service_names();
        names.sort();
        assert_eq!(names, vec!["db", "kkengine", "redis"]);
    }

    #[test]
    fn test_has_health_check() {
        let dir = tempdir().unwrap();
        write_sample(dir.path(), SAMPLE);
        let model = ComposeFile::parse(dir.path()).unwrap();
        assert!(model.has_health_check("db"));
        assert!(!model.has_health_check("redis"));
        assert!(!model.has_health_check("no-such-service"));
    }

    #[test]
    fn test_service_ports_verbatim() {
        let dir = tempdir().unwrap();
        write_sample(dir.path(), SAMPLE);
        let model = ComposeFile::parse(dir.path()).unwrap();
        assert_eq!(model.service_ports("db"), vec!["3307:3306"]);
        assert!(model.service_ports("redis").is_empty());
    }

    #[test]
    fn test_missing_file_is_classified() {
        let dir = tempdir().unwrap();
        let err = ComposeFile::parse(dir.path()).unwrap_err();
        match err {
            crate::ComposeError::User(user) => {
                assert_eq!(user.class, ErrorClass::ConfigMissing);
                assert_eq!(user.command.as_deref(), Some("kk init"));
            }
            other => panic!("expected classified error, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_yaml_is_classified() {
        let dir = tempdir().unwrap();
        write_sample(dir.path(), "services:\n  db: [unbalanced");
        let err = ComposeFile::parse(dir.path()).unwrap_err();
        match err {
            crate::ComposeError::User(user) => assert_eq!(user.class, ErrorClass::ConfigSyntax),
            other => panic!("expected classified error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let dir = tempdir().unwrap();
        write_sample(
            dir.path(),
            "services:\n  app:\n    image: x\n    deploy:\n      replicas: 2\nvolumes:\n  data: {}\n",
        );
        let model = ComposeFile::parse(dir.path()).unwrap();
        assert!(model.has_service("app"));
    }
}
