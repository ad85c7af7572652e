//! Preflight: run every host check, accumulate results, report once.

use crate::compose_cfg::{validate_caddyfile, validate_compose};
use crate::disk::low_disk_warning;
use crate::engine::EngineValidator;
use crate::env::validate_env_file;
use crate::ports::check_all_ports;
use kk_types::{Ctx, ErrorClass, UserError};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PreflightResult {
    pub check_name: String,
    pub passed: bool,
    pub error: Option<UserError>,
    pub warnings: Vec<String>,
}

impl PreflightResult {
    fn pass(name: &str) -> Self {
        Self {
            check_name: name.to_string(),
            passed: true,
            error: None,
            warnings: Vec::new(),
        }
    }

    fn pass_with_warnings(name: &str, warnings: Vec<String>) -> Self {
        Self {
            check_name: name.to_string(),
            passed: true,
            error: None,
            warnings,
        }
    }

    fn fail(name: &str, error: UserError) -> Self {
        Self {
            check_name: name.to_string(),
            passed: false,
            error: Some(error),
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PreflightReport {
    pub results: Vec<PreflightResult>,
}

impl PreflightReport {
    pub fn has_blocking_error(&self) -> bool {
        self.results.iter().any(|r| !r.passed)
    }

    /// The single aggregated error preflight surfaces: carries the class of
    /// the first failed check and names every failed one.
    pub fn aggregate_error(&self) -> Option<UserError> {
        let failed: Vec<&PreflightResult> = self.results.iter().filter(|r| !r.passed).collect();
        let first = failed.first()?;
        let class = first
            .error
            .as_ref()
            .map(|e| e.class)
            .unwrap_or(ErrorClass::ConfigMissing);
        let names: Vec<&str> = failed.iter().map(|r| r.check_name.as_str()).collect();
        let mut error = UserError::new(
            class,
            format!("Preflight checks failed: {}", names.join(", ")),
            "Fix the issues listed above and try again",
        );
        if let Some(command) = failed
            .iter()
            .find_map(|r| r.error.as_ref().and_then(|e| e.command.clone()))
        {
            error = error.with_command(command);
        }
        Some(error)
    }
}

/// Run every check; never stop at the first failure. Low disk only ever
/// warns.
pub async fn run_preflight(dir: &Path, include_caddy: bool, ctx: &Ctx) -> PreflightReport {
    let mut report = PreflightReport::default();

    let engine_installed = match EngineValidator::check_installed() {
        Ok(()) => {
            report.results.push(PreflightResult::pass("Docker installed"));
            true
        }
        Err(e) => {
            report.results.push(PreflightResult::fail("Docker installed", e));
            false
        }
    };

    // The daemon probe is meaningless without the binary.
    if engine_installed {
        match EngineValidator::check_daemon(ctx).await {
            Ok(()) => report.results.push(PreflightResult::pass("Docker daemon")),
            Err(e) => report.results.push(PreflightResult::fail("Docker daemon", e)),
        }

        match EngineValidator::check_compose_version(ctx).await {
            Ok(None) => report.results.push(PreflightResult::pass("Compose version")),
            Ok(Some(warning)) => report
                .results
                .push(PreflightResult::pass_with_warnings("Compose version", vec![warning])),
            Err(e) => report.results.push(PreflightResult::fail("Compose version", e)),
        }
    }

    let (_, port_error) = check_all_ports(include_caddy, ctx).await;
    match port_error {
        None => report.results.push(PreflightResult::pass("Network ports")),
        Some(e) => report.results.push(PreflightResult::fail("Network ports", e)),
    }

    match validate_env_file(dir) {
        Ok(warnings) if warnings.is_empty() => {
            report.results.push(PreflightResult::pass(".env file"))
        }
        Ok(warnings) => report
            .results
            .push(PreflightResult::pass_with_warnings(".env file", warnings)),
        Err(e) => report.results.push(PreflightResult::fail(".env file", e)),
    }

    match validate_compose(dir) {
        Ok(()) => report.results.push(PreflightResult::pass("docker-compose.yml")),
        Err(e) => report.results.push(PreflightResult::fail("docker-compose.yml", e)),
    }

    if include_caddy {
        match validate_caddyfile(dir) {
            Ok(()) => report.results.push(PreflightResult::pass("Caddyfile")),
            Err(e) => report.results.push(PreflightResult::fail("Caddyfile", e)),
        }
    }

    match low_disk_warning(dir) {
        Some(warning) => report
            .results
            .push(PreflightResult::pass_with_warnings("Disk space", vec![warning])),
        None => report.results.push(PreflightResult::pass("Disk space")),
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(name: &str, class: ErrorClass) -> PreflightResult {
        PreflightResult::fail(name, UserError::new(class, "boom", "fix it"))
    }

    #[test]
    fn test_aggregate_error_collects_all_failures() {
        let report = PreflightReport {
            results: vec![
                PreflightResult::pass("Docker installed"),
                failed("Network ports", ErrorClass::PortConflict),
                failed(".env file", ErrorClass::EnvMissing),
            ],
        };
        assert!(report.has_blocking_error());
        let error = report.aggregate_error().unwrap();
        assert_eq!(error.class, ErrorClass::PortConflict);
        assert!(error.message.contains("Network ports"));
        assert!(error.message.contains(".env file"));
    }

    #[test]
    fn test_warnings_never_block() {
        let report = PreflightReport {
            results: vec![PreflightResult::pass_with_warnings(
                "Disk space",
                vec!["Low disk space: 2.1GB free".into()],
            )],
        };
        assert!(!report.has_blocking_error());
        assert!(report.aggregate_error().is_none());
    }

    #[tokio::test]
    async fn test_preflight_runs_every_check_in_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Ctx::new();
        let report = run_preflight(dir.path(), false, &ctx).await;
        // Missing .env and compose file must both be reported; accumulation
        // never stops at the first failure.
        let names: Vec<&str> = report
            .results
            .iter()
            .map(|r| r.check_name.as_str())
            .collect();
        assert!(names.contains(&".env file"));
        assert!(names.contains(&"docker-compose.yml"));
        assert!(names.contains(&"Disk space"));
        let env = report
            .results
            .iter()
            .find(|r| r.check_name == ".env file")
            .unwrap();
        assert!(!env.passed);
        let compose = report
            .results
            .iter()
            .find(|r| r.check_name == "docker-compose.yml")
            .unwrap();
        assert!(!compose.passed);
    }
}
