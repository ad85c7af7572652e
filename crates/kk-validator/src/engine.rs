//! Engine binary, daemon, and Compose version checks.

use kk_types::{Ctx, ErrorClass, UserError};
use regex::Regex;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

const DAEMON_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct EngineValidator;

impl EngineValidator {
    /// The engine executable must resolve on PATH.
    pub fn check_installed() -> Result<(), UserError> {
        if find_in_path("docker").is_some() {
            return Ok(());
        }
        Err(UserError::new(
            ErrorClass::EngineMissing,
            "Docker is not installed",
            "Install Docker: https://docs.docker.com/get-docker/",
        ))
    }

    /// Probe the daemon with `docker info` under a short deadline and
    /// classify the failure from the combined output.
    pub async fn check_daemon(ctx: &Ctx) -> Result<(), UserError> {
        let mut probe = Command::new("docker");
        probe.arg("info").stdout(Stdio::piped()).stderr(Stdio::piped());

        let output = tokio::select! {
            result = tokio::time::timeout(DAEMON_PROBE_TIMEOUT, probe.output()) => match result {
                Ok(Ok(output)) => output,
                Ok(Err(e)) => {
                    return Err(UserError::new(
                        ErrorClass::EngineUnreachable,
                        format!("Cannot run docker info: {}", e),
                        "Start the Docker daemon",
                    )
                    .with_command("sudo systemctl start docker"));
                }
                Err(_) => {
                    return Err(UserError::new(
                        ErrorClass::EngineUnreachable,
                        "Docker daemon did not answer within 5 seconds",
                        "Start the Docker daemon",
                    )
                    .with_command("sudo systemctl start docker"));
                }
            },
            _ = ctx.cancelled() => return Err(UserError::cancelled()),
        };

        if output.status.success() {
            return Ok(());
        }

        let combined = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
        .to_lowercase();

        if combined.contains("permission denied") {
            return Err(UserError::new(
                ErrorClass::EnginePermission,
                "Permission denied talking to the Docker daemon",
                "Add your user to the docker group",
            )
            .with_command("sudo usermod -aG docker $USER && newgrp docker"));
        }
        if combined.contains("cannot connect") || combined.contains("is the docker daemon running") {
            return Err(UserError::new(
                ErrorClass::EngineUnreachable,
                "Docker daemon is not running",
                "Start the Docker daemon",
            )
            .with_command("sudo systemctl start docker"));
        }
        Err(UserError::new(
            ErrorClass::EngineUnreachable,
            "Docker daemon is unreachable",
            "Check the daemon logs",
        )
        .with_command("sudo journalctl -u docker"))
    }

    /// Compose major version must be >= 2. An unparseable version string is a
    /// warning, not a block.
    pub async fn check_compose_version(ctx: &Ctx) -> Result<Option<String>, UserError> {
        let raw = match probe_version(ctx, "docker", &["compose", "version", "--short"]).await {
            Some(raw) => raw,
            None => match probe_version(ctx, "docker-compose", &["version", "--short"]).await {
                Some(raw) => raw,
                None => {
                    return Err(UserError::new(
                        ErrorClass::ComposeVersion,
                        "Docker Compose is not available",
                        "Install the Compose v2 plugin",
                    )
                    .with_command("sudo apt-get install docker-compose-plugin"));
                }
            },
        };

        match parse_major_version(&raw) {
            Some(major) if major >= 2 => Ok(None),
            Some(major) => Err(UserError::new(
                ErrorClass::ComposeVersion,
                format!("Docker Compose v{} is too old (need >= 2)", major),
                "Upgrade to Compose v2",
            )
            .with_command("sudo apt-get install docker-compose-plugin")),
            None => Ok(Some(format!("Cannot parse Compose version {:?}", raw.trim()))),
        }
    }
}

async fn probe_version(ctx: &Ctx, program: &str, args: &[&str]) -> Option<String> {
    let mut probe = Command::new(program);
    probe.args(args).stdout(Stdio::piped()).stderr(Stdio::null());

    let output = tokio::select! {
        result = tokio::time::timeout(DAEMON_PROBE_TIMEOUT, probe.output()) => result.ok()?.ok()?,
        _ = ctx.cancelled() => return None,
    };

    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn parse_major_version(raw: &str) -> Option<u32> {
    let re = Regex::new(r"^(\d+)\.(\d+)\.(\d+)").ok()?;
    let trimmed = raw.trim().trim_start_matches('v');
    let caps = re.captures(trimmed)?;
    caps.get(1)?.as_str().parse().ok()
}

fn find_in_path(binary: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        let candidate = dir.join(binary);
        if is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

#[cfg(unix)]
fn is_executable(path: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_major_version() {
        assert_eq!(parse_major_version("2.24.6\n"), Some(2));
        assert_eq!(parse_major_version("v2.0.1"), Some(2));
        assert_eq!(parse_major_version("1.29.2"), Some(1));
        assert_eq!(parse_major_version("dev-build"), None);
        assert_eq!(parse_major_version(""), None);
    }

    #[test]
    fn test_find_in_path_misses_unknown_binary() {
        assert!(find_in_path("definitely-not-a-real-binary-kk").is_none());
    }
}
