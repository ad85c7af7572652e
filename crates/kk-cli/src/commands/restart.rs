//! `kk restart`: restart all services, re-check health, show status.

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

    ui::show_step_header(1, 3, msg("restarting"));
    let executor = Executor::new(&project_dir);
    let scoped = ctx.with_timeout(DEFAULT_TIMEOUT);
    executor.restart(&scoped).await?;
    ui::show_success(msg("restart_complete"));

    ui::show_step_header(2, 3, msg("health_checking"));
    let model = ComposeFile::parse(&project_dir)?;
    monitor_stack_health(&scoped, &model, PROJECT_PREFIX).await;

    ui::show_step_header(3, 3, msg("service_status"));
    let statuses = final_status(&scoped, &executor, &model).await?;
    ui::print_status_table(&statuses);
    Ok(())
}
