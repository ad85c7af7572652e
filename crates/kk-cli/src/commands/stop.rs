//! `kk stop`: bring the stack down.

use super::interrupt_scope;
use crate::error::Result;
use crate::messages::msg;
use crate::ui;
use kk_compose::{Executor, DEFAULT_TIMEOUT};
use kk_types::CliConfig;

pub async fn run(config: CliConfig) -> Result<()> {
    let project_dir = config.ensure_project_dir()?;
    let ctx = interrupt_scope();

    ui::show_step_header(1, 1, msg("stopping_services"));
    let executor = Executor::new(&project_dir);
    let scoped = ctx.with_timeout(DEFAULT_TIMEOUT);

    let spinner = ui::Spinner::start(msg("stopping_services"));
    match executor.down(&scoped).await {
        Ok(()) => spinner.finish_success(msg("stop_complete")),
        Err(e) => {
            spinner.finish_fail(msg("stop_failed"));
            return Err(e.into());
        }
    }
    Ok(())
}
