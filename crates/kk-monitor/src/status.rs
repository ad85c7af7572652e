//! Status aggregation: merge defined services with what the engine runs.

use crate::error::Result;
use async_trait::async_trait;
use kk_types::Ctx;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Source of `ps --format json` output; the compose driver in production.
#[async_trait]
pub trait PsSource: Send + Sync {
    async fn ps(&self, ctx: &Ctx) -> Result<String>;
}

#[async_trait]
impl PsSource for kk_compose::Executor {
    async fn ps(&self, ctx: &Ctx) -> Result<String> {
        Ok(kk_compose::Executor::ps(self, ctx).await?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub name: String,
    pub state: String,
    pub health: String,
    pub ports: String,
    pub running: bool,
}

/// One line of `ps --format json` output.
#[derive(Debug, Default, Deserialize)]
struct PsLine {
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Service", default)]
    service: String,
    #[serde(rename = "State", default)]
    state: String,
    #[serde(rename = "Health", default)]
    health: String,
    #[serde(rename = "Ports", default)]
    ports: String,
}

/// Merge the engine's view with the set of defined services.
///
/// Every defined service appears exactly once; those the engine does not
/// report come back as `exited` / not running. The result is sorted by name,
/// so equal state renders byte-equal output.
pub async fn get_status_with_services(
    ctx: &Ctx,
    source: &dyn PsSource,
    defined_services: &[String],
) -> Result<Vec<ServiceStatus>> {
    let output = source.ps(ctx).await?;
    let mut reported = parse_compose_ps(&output);

    let mut merged: Vec<ServiceStatus> = defined_services
        .iter()
        .map(|name| {
            reported.remove(name).unwrap_or_else(|| ServiceStatus {
                name: name.clone(),
                state: "exited".to_string(),
                health: String::new(),
                ports: String::new(),
                running: false,
            })
        })
        .collect();

    merged.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(merged)
}

/// Tolerant per-line parse: malformed lines are skipped, never fatal.
fn parse_compose_ps(output: &str) -> BTreeMap<String, ServiceStatus> {
    let mut statuses = BTreeMap::new();

    for line in output.trim().lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(ps) = serde_json::from_str::<PsLine>(line) else {
            continue;
        };
        let name = if ps.service.is_empty() { ps.name } else { ps.service };
        if name.is_empty() {
            continue;
        }
        let running = ps.state.eq_ignore_ascii_case("running");
        statuses.insert(
            name.clone(),
            ServiceStatus {
                name,
                state: ps.state,
                health: ps.health,
                ports: ps.ports,
                running,
            },
        );
    }
    statuses
}

/// All services running, and healthy wherever a health check reports.
pub fn all_healthy(statuses: &[ServiceStatus]) -> bool {
    statuses.iter().all(|s| {
        s.running && (s.health.is_empty() || s.health == "healthy")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPs(String);

    #[async_trait]
    impl PsSource for FixedPs {
        async fn ps(&self, _ctx: &Ctx) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    const TWO_RUNNING: &str = r#"{"Name":"kkengine_db","Service":"db","State":"running","Health":"healthy","Ports":"3307->3306/tcp"}
{"Name":"kkengine_redis","Service":"redis","State":"running","Health":"","Ports":""}"#;

    #[tokio::test]
    async fn test_absent_defined_service_is_filled_in() {
        let source = FixedPs(TWO_RUNNING.to_string());
        let defined = vec!["db".to_string(), "kkengine".to_string(), "redis".to_string()];
        let statuses = get_status_with_services(&Ctx::new(), &source, &defined)
            .await
            .unwrap();

        assert_eq!(statuses.len(), 3);
        assert_eq!(statuses[0].name, "db");
        assert!(statuses[0].running);
        assert_eq!(statuses[1].name, "kkengine");
        assert!(!statuses[1].running);
        assert_eq!(statuses[1].state, "exited");
        assert_eq!(statuses[2].name, "redis");
        assert!(statuses[2].running);
    }

    #[tokio::test]
    async fn test_sorted_by_name_for_stable_output() {
        let source = FixedPs(TWO_RUNNING.to_string());
        let defined = vec!["redis".to_string(), "db".to_string()];
        let first = get_status_with_services(&Ctx::new(), &source, &defined)
            .await
            .unwrap();
        let second = get_status_with_services(&Ctx::new(), &source, &defined)
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].name, "db");
        assert_eq!(first[1].name, "redis");
    }

    #[tokio::test]
    async fn test_malformed_lines_are_skipped() {
        let mixed = format!("not-json at all\n{}\n{{\"truncated\":", TWO_RUNNING);
        let source = FixedPs(mixed);
        let defined = vec!["db".to_string(), "redis".to_string()];
        let statuses = get_status_with_services(&Ctx::new(), &source, &defined)
            .await
            .unwrap();
        assert_eq!(statuses.len(), 2);
        assert!(statuses.iter().all(|s| s.running));
    }

    #[test]
    fn test_all_healthy_requires_health_when_reported() {
        let healthy = vec![
            ServiceStatus {
                name: "db".into(),
                state: "running".into(),
                health: "healthy".into(),
                ports: String::new(),
                running: true,
            },
            ServiceStatus {
                name: "redis".into(),
                state: "running".into(),
                health: String::new(),
                ports: String::new(),
                running: true,
            },
        ];
        assert!(all_healthy(&healthy));

        let mut degraded = healthy.clone();
        degraded[0].health = "unhealthy".into();
        assert!(!all_healthy(&degraded));
    }
}
