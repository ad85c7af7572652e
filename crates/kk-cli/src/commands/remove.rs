//! `kk remove`: tear down containers and networks, optionally with volumes.

use super::interrupt_scope;
use crate::error::Result;
use crate::messages::msg;
use crate::ui;
use dialoguer::Confirm;
use kk_compose::{Executor, DEFAULT_TIMEOUT};
use kk_types::{CliConfig, UserError};

pub async fn run(config: CliConfig, volumes: bool, yes: bool) -> Result<()> {
    let project_dir = config.ensure_project_dir()?;

    // The destructive variant is gated here, not in the driver.
    if volumes && !yes {
        let confirmed = Confirm::new()
            .with_prompt(msg("confirm_remove_volumes"))
            .default(false)
            .interact()?;
        if !confirmed {
            ui::show_info(msg("init_cancelled"));
            return Ok(());
        }
    }

    let ctx = interrupt_scope();

    ui::show_step_header(1, 1, msg("removing_services"));
    let executor = Executor::new(&project_dir);
    let scoped = ctx.with_timeout(DEFAULT_TIMEOUT);

    let spinner = ui::Spinner::start(msg("removing_services"));
    let result = if volumes {
        executor.down_with_volumes(&scoped).await
    } else {
        executor.down(&scoped).await
    };

    match result {
        Ok(()) => {
            spinner.finish_success(if volumes {
                msg("remove_with_volumes")
            } else {
                msg("remove_complete")
            });
            Ok(())
        }
        Err(e) => {
            spinner.finish_fail(msg("remove_failed"));
            if scoped.is_cancelled() {
                return Err(UserError::cancelled().into());
            }
            Err(e.into())
        }
    }
}
