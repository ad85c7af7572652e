//! Per-container health state machine with bounded retries.

use crate::error::{MonitorError, Result};
use async_trait::async_trait;
use bollard::models::HealthStatusEnum;
use bollard::Docker;
use kk_types::Ctx;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::debug;

pub const MAX_RETRIES: u32 = 3;
pub const INITIAL_DELAY: Duration = Duration::from_secs(2);
pub const MAX_DELAY: Duration = Duration::from_secs(30);

/// Terminal and intermediate states a monitored container can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Starting,
    Healthy,
    Unhealthy,
    Running,
    Stopped,
    Timeout,
    Error,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Starting => "starting",
            HealthState::Healthy => "healthy",
            HealthState::Unhealthy => "unhealthy",
            HealthState::Running => "running",
            HealthState::Stopped => "stopped",
            HealthState::Timeout => "timeout",
            HealthState::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub service_name: String,
    pub container_name: String,
    pub state: HealthState,
    pub healthy: bool,
    pub message: Option<String>,
}

impl HealthStatus {
    fn new(container_name: &str, state: HealthState) -> Self {
        Self {
            service_name: service_name_from_container(container_name),
            container_name: container_name.to_string(),
            state,
            healthy: matches!(state, HealthState::Healthy | HealthState::Running),
            message: None,
        }
    }

    fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// One entry of the monitoring work list.
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    pub service_name: String,
    pub container_name: String,
    pub has_health_check: bool,
}

/// Service name from the engine's default project-prefix convention:
/// `kkengine_db` -> `db`.
pub fn service_name_from_container(container_name: &str) -> String {
    container_name
        .rsplit('_')
        .next()
        .unwrap_or(container_name)
        .to_string()
}

/// What one inspect call yields.
#[derive(Debug, Clone, Default)]
pub struct InspectState {
    pub running: bool,
    pub exit_code: i64,
    pub health: Option<HealthReport>,
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    pub status: String,
    pub last_output: Option<String>,
}

/// Inspection port over the engine's native client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContainerInspector: Send + Sync {
    async fn inspect(&self, container_name: &str) -> Result<InspectState>;
}

/// Bollard-backed inspector.
pub struct EngineInspector {
    docker: Docker,
}

impl EngineInspector {
    pub fn new() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| MonitorError::Connection(e.to_string()))?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerInspector for EngineInspector {
    async fn inspect(&self, container_name: &str) -> Result<InspectState> {
        let info = self.docker.inspect_container(container_name, None).await?;
        let state = info.state.unwrap_or_default();

        let health = state.health.and_then(|h| {
            let status = match h.status {
                Some(HealthStatusEnum::HEALTHY) => "healthy",
                Some(HealthStatusEnum::UNHEALTHY) => "unhealthy",
                Some(HealthStatusEnum::STARTING) => "starting",
                _ => return None,
            };
            let last_output = h
                .log
                .as_deref()
                .unwrap_or_default()
                .last()
                .and_then(|entry| entry.output.clone());
            Some(HealthReport {
                status: status.to_string(),
                last_output,
            })
        });

        Ok(InspectState {
            running: state.running.unwrap_or(false),
            exit_code: state.exit_code.unwrap_or(0),
            health,
        })
    }
}

/// Progress callback; invoked from concurrent monitoring tasks.
pub type ProgressFn = Arc<dyn Fn(HealthStatus) + Send + Sync>;

/// Drives the per-container state machine.
pub struct HealthMonitor<I: ContainerInspector> {
    inspector: Arc<I>,
}

impl<I: ContainerInspector> Clone for HealthMonitor<I> {
    fn clone(&self) -> Self {
        Self {
            inspector: self.inspector.clone(),
        }
    }
}

impl<I: ContainerInspector + 'static> HealthMonitor<I> {
    pub fn new(inspector: I) -> Self {
        Self {
            inspector: Arc::new(inspector),
        }
    }

    /// Wait for one container to settle, with exponential retry.
    ///
    /// Up to [`MAX_RETRIES`] checks, then one final check whose result is
    /// reported whether or not it is healthy. A still-starting container is
    /// reported unhealthy once the budget is spent; a cancelled scope yields
    /// `Timeout`.
    pub async fn wait_for_healthy(
        &self,
        ctx: &Ctx,
        container_name: &str,
        has_health_check: bool,
    ) -> HealthStatus {
        let mut delay = INITIAL_DELAY;
        for attempt in 0..MAX_RETRIES {
            let status = self.check_once(ctx, container_name, has_health_check).await;
            if status.healthy || status.state == HealthState::Timeout {
                return status;
            }
            debug!(container_name, attempt, state = status.state.as_str(), "not healthy yet");

            tokio::select! {
                _ = ctx.cancelled() => {
                    return HealthStatus::new(container_name, HealthState::Timeout)
                        .with_message("Timed out waiting for the container");
                }
                _ = tokio::time::sleep(delay) => {
                    delay = (delay * 2).min(MAX_DELAY);
                }
            }
        }

        // Final check after all retries.
        let mut status = self.check_once(ctx, container_name, has_health_check).await;
        if status.state == HealthState::Starting {
            status.state = HealthState::Unhealthy;
            status.message = Some("Health check did not pass within the retry budget".to_string());
        }
        status
    }

    async fn check_once(&self, ctx: &Ctx, container_name: &str, has_health_check: bool) -> HealthStatus {
        let inspected = tokio::select! {
            result = self.inspector.inspect(container_name) => result,
            _ = ctx.cancelled() => {
                return HealthStatus::new(container_name, HealthState::Timeout)
                    .with_message("Timed out waiting for the container");
            }
        };
        let state = match inspected {
            Ok(state) => state,
            Err(e) => {
                return HealthStatus::new(container_name, HealthState::Error)
                    .with_message(format!("Inspect failed: {}", e));
            }
        };

        match state.health {
            None if !has_health_check => {
                // No declared health check: Running is as healthy as it gets.
                if state.running {
                    HealthStatus::new(container_name, HealthState::Running)
                } else {
                    HealthStatus::new(container_name, HealthState::Stopped)
                        .with_message(format!("Exit code: {}", state.exit_code))
                }
            }
            None => {
                // A declared health check without an engine report yet never
                // promotes to healthy.
                if state.running {
                    HealthStatus::new(container_name, HealthState::Starting)
                        .with_message("Waiting for the first health report...")
                } else {
                    HealthStatus::new(container_name, HealthState::Stopped)
                        .with_message(format!("Exit code: {}", state.exit_code))
                }
            }
            Some(report) => match report.status.as_str() {
                "healthy" => HealthStatus::new(container_name, HealthState::Healthy),
                "unhealthy" => {
                    let mut status = HealthStatus::new(container_name, HealthState::Unhealthy);
                    status.message = report.last_output;
                    status
                }
                _ => HealthStatus::new(container_name, HealthState::Starting)
                    .with_message("Still starting..."),
            },
        }
    }

    /// Monitor every container concurrently.
    ///
    /// Emits a `starting` event before each wait and the terminal status
    /// after it; events from different containers may interleave, but the
    /// returned list is in input order.
    pub async fn monitor_all(
        &self,
        ctx: &Ctx,
        containers: &[ContainerInfo],
        on_progress: ProgressFn,
    ) -> Vec<HealthStatus> {
        let mut tasks = JoinSet::new();

        for (index, info) in containers.iter().cloned().enumerate() {
            let monitor = self.clone();
            let ctx = ctx.clone();
            let on_progress = on_progress.clone();

            tasks.spawn(async move {
                let mut starting = HealthStatus::new(&info.container_name, HealthState::Starting)
                    .with_message("Checking...");
                starting.service_name = info.service_name.clone();
                on_progress(starting);

                let mut status = monitor
                    .wait_for_healthy(&ctx, &info.container_name, info.has_health_check)
                    .await;
                status.service_name = info.service_name.clone();
                on_progress(status.clone());
                (index, status)
            });
        }

        let mut slots: Vec<Option<HealthStatus>> = vec![None; containers.len()];
        while let Some(joined) = tasks.join_next().await {
            if let Ok((index, status)) = joined {
                slots[index] = Some(status);
            }
        }

        containers
            .iter()
            .enumerate()
            .map(|(index, info)| {
                slots[index].take().unwrap_or_else(|| {
                    HealthStatus::new(&info.container_name, HealthState::Error)
                        .with_message("Monitoring task failed")
                })
            })
            .collect()
    }
}
