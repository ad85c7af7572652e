//! `kk init`: generate credentials and render the configuration bundle.

use super::interrupt_scope;
use crate::error::Result;
use crate::messages::msg;
use crate::ui;
use dialoguer::{Confirm, Input, Select};
use kk_templates::{generate_access_key, generate_secret, generate_with_retry, RenderConfig};
use kk_types::{CliConfig, Ctx, Language, UserError};
use kk_validator::EngineValidator;

const DB_PASSWORD_LEN: usize = 24;
const REDIS_PASSWORD_LEN: usize = 24;
const JWT_SECRET_LEN: usize = 48;
const S3_ACCESS_KEY_LEN: usize = 20;
const S3_SECRET_KEY_LEN: usize = 40;

pub async fn run(mut config: CliConfig, force: bool) -> Result<()> {
    let ctx = interrupt_scope();

    // Step 1: the engine must exist before anything is generated.
    ui::show_step_header(1, 6, msg("checking_docker"));
    EngineValidator::check_installed()?;
    EngineValidator::check_daemon(&ctx).await?;
    ui::show_success(msg("docker_ok"));

    // Step 2: language choice, persisted for every later command.
    if !force {
        let choices = ["English", "Tiếng Việt"];
        let picked = Select::new()
            .with_prompt("Select language / Chọn ngôn ngữ")
            .items(&choices)
            .default(if config.language == Language::Vi { 1 } else { 0 })
            .interact()?;
        config.language = if picked == 1 { Language::Vi } else { Language::En };
    }

    let cwd = std::env::current_dir()?;
    println!();
    ui::show_info(&cwd.display().to_string());

    // Step 3: an existing compose file needs explicit consent (render makes
    // .bak copies either way).
    ui::show_step_header(2, 6, "docker-compose.yml");
    if cwd.join("docker-compose.yml").exists() && !force {
        let overwrite = Confirm::new()
            .with_prompt(msg("compose_exists"))
            .default(false)
            .interact()?;
        if !overwrite {
            return Err(UserError::new(
                kk_types::ErrorClass::Cancelled,
                msg("init_cancelled"),
                "Run init in an empty directory or confirm the overwrite",
            )
            .into());
        }
    }

    // Step 4: feature toggles and domain.
    ui::show_step_header(3, 6, "Features");
    let (enable_seaweedfs, enable_caddy, domain) = if force {
        (true, true, "localhost".to_string())
    } else {
        let enable_seaweedfs = Confirm::new()
            .with_prompt(msg("enable_seaweedfs"))
            .default(true)
            .interact()?;
        let enable_caddy = Confirm::new()
            .with_prompt(msg("enable_caddy"))
            .default(true)
            .interact()?;
        let domain: String = if enable_caddy {
            Input::new()
                .with_prompt(msg("enter_domain"))
                .default("localhost".to_string())
                .interact_text()?
        } else {
            "localhost".to_string()
        };
        (enable_seaweedfs, enable_caddy, domain)
    };

    // Step 5: secrets from the OS RNG, three attempts each.
    ui::show_step_header(4, 6, msg("generating_secrets"));
    let mut render_config = RenderConfig {
        enable_seaweedfs,
        enable_caddy,
        domain,
        db_password: generate_with_retry(|| generate_secret(DB_PASSWORD_LEN))?,
        db_root_password: generate_with_retry(|| generate_secret(DB_PASSWORD_LEN))?,
        redis_password: generate_with_retry(|| generate_secret(REDIS_PASSWORD_LEN))?,
        jwt_secret: generate_with_retry(|| generate_secret(JWT_SECRET_LEN))?,
        s3_access_key: generate_with_retry(|| generate_access_key(S3_ACCESS_KEY_LEN))?,
        s3_secret_key: generate_with_retry(|| generate_secret(S3_SECRET_KEY_LEN))?,
    };

    if !force {
        let edit = Confirm::new()
            .with_prompt(msg("edit_secrets"))
            .default(false)
            .interact()?;
        if edit {
            edit_secrets(&mut render_config)?;
        }
    }

    // Step 6: render. Validation is fail-closed inside render_all.
    ui::show_step_header(5, 6, msg("generating_files"));
    let report = kk_templates::render_all(&render_config, &cwd)?;
    for path in &report.written {
        if let Some(name) = path.file_name() {
            ui::show_success(&name.to_string_lossy());
        }
    }
    if !report.backed_up.is_empty() {
        println!();
        ui::show_warning(msg("files_backed_up"));
        for path in &report.backed_up {
            ui::show_info(&format!("  {}", path.display()));
        }
    }

    config.project_dir = Some(cwd);
    config.save()?;

    ui::show_step_header(6, 6, msg("init_complete"));
    println!("{}", msg("next_steps"));
    Ok(())
}

fn edit_secrets(config: &mut RenderConfig) -> Result<()> {
    config.db_password = prompt_secret("DB_PASSWORD", &config.db_password)?;
    config.db_root_password = prompt_secret("DB_ROOT_PASSWORD", &config.db_root_password)?;
    config.redis_password = prompt_secret("REDIS_PASSWORD", &config.redis_password)?;
    config.jwt_secret = prompt_secret("JWT_SECRET", &config.jwt_secret)?;
    if config.enable_seaweedfs {
        config.s3_access_key = prompt_secret("S3_ACCESS_KEY", &config.s3_access_key)?;
        config.s3_secret_key = prompt_secret("S3_SECRET_KEY", &config.s3_secret_key)?;
    }
    Ok(())
}

fn prompt_secret(name: &str, current: &str) -> Result<String> {
    Ok(Input::new()
        .with_prompt(name)
        .default(current.to_string())
        .interact_text()?)
}

/// Engine availability probe reused by the automation installer.
pub(crate) async fn check_engine(ctx: &Ctx) -> Result<()> {
    EngineValidator::check_installed()?;
    EngineValidator::check_daemon(ctx).await?;
    Ok(())
}
