//! `kk update`: pull images, diff, recreate when something moved.

use super::{final_status, interrupt_scope, monitor_stack_health};
use crate::error::Result;
use crate::messages::msg;
use crate::ui;
use dialoguer::Confirm;
use kk_compose::{ComposeFile, Executor, DEFAULT_TIMEOUT};
use kk_monitor::parse_pull_output;
use kk_types::CliConfig;
use kk_validator::PROJECT_PREFIX;

pub async fn run(config: CliConfig, force: bool) -> Result<()> {
    let project_dir = config.ensure_project_dir()?;
    let ctx = interrupt_scope();
    let executor = Executor::new(&project_dir);

    ui::show_step_header(1, 4, msg("checking_updates"));
    let spinner = ui::Spinner::start(msg("pulling_images"));
    let pull_scope = ctx.with_timeout(DEFAULT_TIMEOUT);
    let output = match executor.pull(&pull_scope).await {
        Ok(output) => {
            spinner.finish_success(msg("checking_updates"));
            output
        }
        Err(e) => {
            spinner.finish_fail(msg("pull_failed"));
            return Err(e.into());
        }
    };

    let updates = parse_pull_output(&output);
    if updates.is_empty() {
        println!();
        ui::show_success(msg("all_up_to_date"));
        return Ok(());
    }
    ui::print_updates_table(&updates);

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(msg("confirm_recreate"))
            .default(true)
            .interact()?;
        if !confirmed {
            ui::show_info(msg("update_cancelled"));
            return Ok(());
        }
    }

    ui::show_step_header(2, 4, msg("recreating"));
    let recreate_scope = ctx.with_timeout(DEFAULT_TIMEOUT);
    executor.force_recreate(&recreate_scope).await?;

    ui::show_step_header(3, 4, msg("health_checking"));
    let model = ComposeFile::parse(&project_dir)?;
    monitor_stack_health(&recreate_scope, &model, PROJECT_PREFIX).await;

    ui::show_step_header(4, 4, msg("service_status"));
    let statuses = final_status(&recreate_scope, &executor, &model).await?;
    ui::print_status_table(&statuses);

    println!();
    ui::show_success(msg("update_complete"));
    Ok(())
}
