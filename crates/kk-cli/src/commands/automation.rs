//! `kk automation`: the optional workflow automation add-on, driven by a
//! second compose driver rooted at `<project>/automation`.

use super::{container_name, final_status, interrupt_scope};
use crate::cli::AutomationSubcommand;
use crate::error::Result;
use crate::messages::msg;
use crate::ui;
use dialoguer::{Confirm, Input};
use kk_compose::{ComposeFile, Executor, DEFAULT_TIMEOUT};
use kk_monitor::{ContainerInfo, EngineInspector, HealthMonitor, ProgressFn};
use kk_templates::{
    automation_dir, generate_secret, generate_with_retry, render_automation, AutomationConfig,
};
use kk_types::{CliConfig, ErrorClass, UserError};
use kk_validator::PROJECT_PREFIX;
use std::path::Path;
use std::sync::Arc;

const ENCRYPTION_KEY_LEN: usize = 48;
const DB_PASSWORD_LEN: usize = 24;

pub async fn run(config: CliConfig, command: AutomationSubcommand) -> Result<()> {
    match command {
        AutomationSubcommand::Install { force } => install(config, force).await,
        AutomationSubcommand::Start => start(config).await,
        AutomationSubcommand::Stop => stop(config).await,
        AutomationSubcommand::Status => status(config).await,
        AutomationSubcommand::Remove { volumes, yes } => remove(config, volumes, yes).await,
    }
}

async fn install(config: CliConfig, force: bool) -> Result<()> {
    let project_dir = config.ensure_project_dir()?;
    let ctx = interrupt_scope();

    ui::show_step_header(1, 3, msg("checking_docker"));
    super::init::check_engine(&ctx).await?;
    ui::show_success(msg("docker_ok"));

    if kk_templates::automation::is_installed(&project_dir) && !force {
        let overwrite = Confirm::new()
            .with_prompt(msg("automation_exists"))
            .default(false)
            .interact()?;
        if !overwrite {
            ui::show_info(msg("init_cancelled"));
            return Ok(());
        }
    }

    ui::show_step_header(2, 3, msg("generating_secrets"));
    let host: String = if force {
        "localhost".to_string()
    } else {
        Input::new()
            .with_prompt("Automation host (e.g. automation.example.com)")
            .default("localhost".to_string())
            .interact_text()?
    };

    let automation_config = AutomationConfig {
        host,
        db_user: "automation".to_string(),
        db_password: generate_with_retry(|| generate_secret(DB_PASSWORD_LEN))?,
        encryption_key: generate_with_retry(|| generate_secret(ENCRYPTION_KEY_LEN))?,
        timezone: "UTC".to_string(),
        connect_core_network: true,
    };

    ui::show_step_header(3, 3, msg("generating_files"));
    let report = render_automation(&automation_config, &project_dir)?;
    for path in &report.written {
        if let Some(name) = path.file_name() {
            ui::show_success(&name.to_string_lossy());
        }
    }
    if !report.backed_up.is_empty() {
        ui::show_warning(msg("files_backed_up"));
        for path in &report.backed_up {
            ui::show_info(&format!("  {}", path.display()));
        }
    }

    ui::show_success(msg("automation_installed"));
    Ok(())
}

async fn start(config: CliConfig) -> Result<()> {
    let dir = installed_dir(&config)?;
    let ctx = interrupt_scope();

    ui::show_step_header(1, 2, msg("starting_services"));
    let executor = Executor::new(&dir);
    let scoped = ctx.with_timeout(DEFAULT_TIMEOUT);
    executor.up(&scoped).await?;

    ui::show_step_header(2, 2, msg("health_checking"));
    let model = ComposeFile::parse(&dir)?;
    match EngineInspector::new() {
        Ok(inspector) => {
            let containers: Vec<ContainerInfo> = model
                .service_names()
                .into_iter()
                .map(|service| ContainerInfo {
                    container_name: container_name(PROJECT_PREFIX, &service),
                    has_health_check: model.has_health_check(&service),
                    service_name: service,
                })
                .collect();
            let on_progress: ProgressFn = Arc::new(|status| {
                ui::show_service_progress(
                    &status.service_name,
                    status.state,
                    status.message.as_deref(),
                );
            });
            HealthMonitor::new(inspector)
                .monitor_all(&scoped, &containers, on_progress)
                .await;
        }
        Err(e) => ui::show_warning(&format!("{}: {}", msg("get_status_failed"), e)),
    }

    ui::show_success(msg("start_complete"));
    Ok(())
}

async fn stop(config: CliConfig) -> Result<()> {
    let dir = installed_dir(&config)?;
    let ctx = interrupt_scope();

    ui::show_step_header(1, 1, msg("stopping_services"));
    let executor = Executor::new(&dir);
    executor.down(&ctx.with_timeout(DEFAULT_TIMEOUT)).await?;
    ui::show_success(msg("stop_complete"));
    Ok(())
}

async fn status(config: CliConfig) -> Result<()> {
    let dir = installed_dir(&config)?;
    let ctx = interrupt_scope().with_timeout(std::time::Duration::from_secs(30));

    let model = ComposeFile::parse(&dir)?;
    let executor = Executor::new(&dir);
    let statuses = final_status(&ctx, &executor, &model).await?;
    ui::print_status_table(&statuses);
    Ok(())
}

async fn remove(config: CliConfig, volumes: bool, yes: bool) -> Result<()> {
    let dir = installed_dir(&config)?;

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
    let executor = Executor::new(&dir);
    let scoped = ctx.with_timeout(DEFAULT_TIMEOUT);
    if volumes {
        executor.down_with_volumes(&scoped).await?;
    } else {
        executor.down(&scoped).await?;
    }
    ui::show_success(msg("automation_removed"));
    Ok(())
}

fn installed_dir(config: &CliConfig) -> Result<std::path::PathBuf> {
    let project_dir = config.ensure_project_dir()?;
    let dir = automation_dir(&project_dir);
    if !is_bundle_present(&dir) {
        return Err(UserError::new(
            ErrorClass::ConfigMissing,
            msg("automation_not_installed"),
            "Install the add-on first",
        )
        .with_command("kk automation install")
        .into());
    }
    Ok(dir)
}

fn is_bundle_present(dir: &Path) -> bool {
    dir.join("docker-compose.yml").exists()
}
