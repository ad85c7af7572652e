//! `kk status`: the aggregated result table.

use super::{final_status, interrupt_scope};
use crate::error::Result;
use crate::messages::msg;
use crate::ui;
use colored::Colorize;
use kk_compose::{ComposeFile, Executor};
use kk_types::CliConfig;
use std::time::Duration;

pub async fn run(config: CliConfig) -> Result<()> {
    let project_dir = config.ensure_project_dir()?;
    let ctx = interrupt_scope().with_timeout(Duration::from_secs(30));

    let model = ComposeFile::parse(&project_dir)?;
    if model.service_names().is_empty() {
        ui::show_info(msg("no_services_defined"));
        ui::show_info(msg("run_init_to_configure"));
        return Ok(());
    }

    let executor = Executor::new(&project_dir);
    let statuses = final_status(&ctx, &executor, &model).await?;
    ui::print_status_table(&statuses);

    let unhealthy: Vec<&str> = statuses
        .iter()
        .filter(|s| s.running && s.health == "unhealthy")
        .map(|s| s.name.as_str())
        .collect();
    if !unhealthy.is_empty() {
        println!();
        ui::show_warning(&format!(
            "{} {}: {}",
            unhealthy.len(),
            msg("unhealthy_hint"),
            unhealthy.join(", ")
        ));
        println!(
            "      {}",
            format!("{} {}", msg("view_logs_hint"), unhealthy[0]).dimmed()
        );
    }

    if statuses.iter().any(|s| s.running) {
        ui::print_access_info(&statuses);
    }
    Ok(())
}
