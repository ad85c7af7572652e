//! `kk start`: preflight, bring the stack up, wait for health, show status.

use super::{final_status, interrupt_scope, monitor_stack_health};
use crate::error::Result;
use crate::messages::msg;
use crate::ui;
use kk_compose::{ComposeFile, Executor, DEFAULT_TIMEOUT};
use kk_types::CliConfig;
use kk_validator::PROJECT_PREFIX;

pub async fn run(config: CliConfig) -> Result<()> {
    let project_dir = config.ensure_project_dir()?;
    let ctx = interrupt_scope();

    ui::show_step_header(1, 4, msg("preflight_checking"));
    let model = ComposeFile::parse(&project_dir)?;
    let include_caddy = model.has_service("caddy");

    let report = kk_validator::run_preflight(&project_dir, include_caddy, &ctx).await;
    ui::print_preflight_results(&report);
    if let Some(error) = report.aggregate_error() {
        return Err(error.into());
    }

    ui::show_step_header(2, 4, msg("starting_services"));
    let executor = Executor::new(&project_dir);
    let scoped = ctx.with_timeout(DEFAULT_TIMEOUT);
    executor.up(&scoped).await?;

    ui::show_step_header(3, 4, msg("health_checking"));
    monitor_stack_health(&scoped, &model, PROJECT_PREFIX).await;

    ui::show_step_header(4, 4, msg("service_status"));
    let statuses = final_status(&scoped, &executor, &model).await?;
    ui::print_status_table(&statuses);
    ui::print_access_info(&statuses);

    println!();
    if kk_monitor::all_healthy(&statuses) {
        ui::show_success(msg("start_complete"));
    } else {
        ui::show_warning(msg("health_degraded"));
    }
    Ok(())
}
