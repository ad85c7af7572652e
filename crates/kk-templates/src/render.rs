//! Bundle rendering with crash-safe backups.
//!
//! Protocol: validate secrets first (nothing touches disk on failure), then
//! per file rename any existing destination to `<path>.bak` before creating
//! the new one. There is no rollback; the backups are the recovery path.

use crate::config::RenderConfig;
use crate::error::{Result, TemplateError};
use once_cell::sync::OnceCell;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tera::Tera;
use tracing::debug;

const COMPOSE_TEMPLATE: &str = include_str!("../templates/docker-compose.yml.tmpl");
const ENV_TEMPLATE: &str = include_str!("../templates/env.tmpl");
const PHP_CONF_TEMPLATE: &str = include_str!("../templates/kkphp.conf.tmpl");
const CADDYFILE_TEMPLATE: &str = include_str!("../templates/Caddyfile.tmpl");
const FILER_TEMPLATE: &str = include_str!("../templates/kkfiler.toml.tmpl");
const AUTOMATION_COMPOSE_TEMPLATE: &str = include_str!("../templates/automation-compose.yml.tmpl");
const AUTOMATION_ENV_TEMPLATE: &str = include_str!("../templates/automation-env.tmpl");

static ENGINE: OnceCell<Tera> = OnceCell::new();

pub(crate) fn engine() -> Result<&'static Tera> {
    ENGINE.get_or_try_init(|| {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("docker-compose.yml", COMPOSE_TEMPLATE),
            ("env", ENV_TEMPLATE),
            ("kkphp.conf", PHP_CONF_TEMPLATE),
            ("Caddyfile", CADDYFILE_TEMPLATE),
            ("kkfiler.toml", FILER_TEMPLATE),
            ("automation-compose.yml", AUTOMATION_COMPOSE_TEMPLATE),
            ("automation-env", AUTOMATION_ENV_TEMPLATE),
        ])?;
        Ok(tera)
    })
}

/// What a render did to the filesystem.
#[derive(Debug, Clone, Default)]
pub struct RenderReport {
    pub written: Vec<PathBuf>,
    pub backed_up: Vec<PathBuf>,
}

/// Render the whole bundle into `target_dir`.
///
/// Core members are always written; the Caddyfile and the storage config
/// follow their feature toggles. The `.env` file is created owner-only and
/// chmod'd 0600 again once the bundle is complete.
pub fn render_all(cfg: &RenderConfig, target_dir: &Path) -> Result<RenderReport> {
    cfg.validate()?;

    std::fs::create_dir_all(target_dir)?;
    std::fs::create_dir_all(target_dir.join("data"))?;

    let mut members: Vec<(&str, &str, bool)> = vec![
        ("docker-compose.yml", "docker-compose.yml", false),
        ("env", ".env", true),
        ("kkphp.conf", "kkphp.conf", false),
    ];
    if cfg.enable_caddy {
        members.push(("Caddyfile", "Caddyfile", false));
    }
    if cfg.enable_seaweedfs {
        members.push(("kkfiler.toml", "kkfiler.toml", false));
    }

    let context = tera::Context::from_serialize(cfg)?;
    let mut report = RenderReport::default();
    for (template, output, restrict) in members {
        let path = target_dir.join(output);
        render_file(template, &context, &path, restrict, &mut report)?;
    }

    restrict_permissions(&target_dir.join(".env"))?;
    Ok(report)
}

/// Render one template to `output_path`, moving any existing file aside
/// first.
pub(crate) fn render_file(
    template: &str,
    context: &tera::Context,
    output_path: &Path,
    restrict: bool,
    report: &mut RenderReport,
) -> Result<()> {
    let rendered = engine()?.render(template, context)?;

    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if output_path.exists() {
        let backup_path = backup_path_for(output_path);
        std::fs::rename(output_path, &backup_path)?;
        report.backed_up.push(backup_path);
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    if restrict {
        use std::os::unix::fs::OpenOptionsExt;
        // Owner-only from the first byte: no window with readable secrets.
        options.mode(0o600);
    }

    let mut file = options.open(output_path)?;
    file.write_all(rendered.as_bytes())?;
    debug!(path = %output_path.display(), "rendered");
    report.written.push(output_path.to_path_buf());
    Ok(())
}

pub(crate) fn restrict_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .map_err(TemplateError::Io)?;
    }
    Ok(())
}

fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}
