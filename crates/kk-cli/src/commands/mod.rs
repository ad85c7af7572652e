//! Command orchestrators: each user-facing command is a fixed, labeled step
//! sequence over the library crates, run under one cancellable scope.

mod automation;
mod config;
mod init;
mod remove;
mod restart;
mod start;
mod status;
mod stop;
mod update;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use crate::messages::msg;
use crate::ui;
use kk_compose::{ComposeFile, Executor};
use kk_monitor::{ContainerInfo, EngineInspector, HealthMonitor, ProgressFn, ServiceStatus};
use kk_types::{CliConfig, Ctx};
use std::sync::Arc;

pub async fn dispatch(cli: Cli, config: CliConfig) -> Result<()> {
    match cli.command {
        Commands::Init { force } => init::run(config, force).await,
        Commands::Start => start::run(config).await,
        Commands::Stop => stop::run(config).await,
        Commands::Restart => restart::run(config).await,
        Commands::Remove { volumes, yes } => remove::run(config, volumes, yes).await,
        Commands::Update { force } => update::run(config, force).await,
        Commands::Status => status::run(config).await,
        Commands::Config(cmd) => config::run(config, cmd.command).await,
        Commands::Automation(cmd) => automation::run(config, cmd.command).await,
    }
}

/// Root cancellation scope for a command: one interrupt cancels it, which
/// kills any child process and unwinds the health monitor.
pub(crate) fn interrupt_scope() -> Ctx {
    let ctx = Ctx::new();
    let signal_ctx = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n\n{}", msg("stopping"));
            signal_ctx.cancel();
        }
    });
    ctx
}

pub(crate) fn container_name(prefix: &str, service: &str) -> String {
    format!("{}_{}", prefix, service)
}

/// Monitor every service declared in the model, narrating progress. An
/// unreachable inspection API degrades to a warning; it never fails the
/// command.
pub(crate) async fn monitor_stack_health(ctx: &Ctx, model: &ComposeFile, prefix: &str) -> bool {
    ui::show_info(msg("health_checking"));

    let inspector = match EngineInspector::new() {
        Ok(inspector) => inspector,
        Err(e) => {
            ui::show_warning(&format!("{}: {}", msg("get_status_failed"), e));
            return false;
        }
    };

    let containers: Vec<ContainerInfo> = model
        .service_names()
        .into_iter()
        .map(|service| ContainerInfo {
            container_name: container_name(prefix, &service),
            has_health_check: model.has_health_check(&service),
            service_name: service,
        })
        .collect();

    let on_progress: ProgressFn = Arc::new(|status| {
        ui::show_service_progress(&status.service_name, status.state, status.message.as_deref());
    });

    let monitor = HealthMonitor::new(inspector);
    let results = monitor.monitor_all(ctx, &containers, on_progress).await;
    let all_healthy = results.iter().all(|r| r.healthy);
    if !all_healthy {
        println!();
        ui::show_warning(msg("health_degraded"));
    }
    all_healthy
}

/// Final snapshot for the result table.
pub(crate) async fn final_status(
    ctx: &Ctx,
    executor: &Executor,
    model: &ComposeFile,
) -> Result<Vec<ServiceStatus>> {
    let defined = model.service_names();
    Ok(kk_monitor::get_status_with_services(ctx, executor, &defined).await?)
}
