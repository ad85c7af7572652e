//! `kk config`: view and change the persistent CLI configuration.

use crate::cli::ConfigSubcommand;
use crate::error::Result;
use crate::messages::msg;
use crate::ui;
use kk_types::{config_path, CliConfig, ErrorClass, Language, UserError};

pub async fn run(mut config: CliConfig, command: ConfigSubcommand) -> Result<()> {
    match command {
        ConfigSubcommand::Show => {
            println!();
            println!("{}", msg("config_title"));
            println!();
            let language = match config.language {
                Language::En => "English",
                Language::Vi => "Tiếng Việt",
            };
            println!("  {}: {}", msg("config_language"), language);

            let project_dir = config
                .project_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| msg("config_not_set").to_string());
            println!("  {}: {}", msg("config_project_dir"), project_dir);
            println!("  {}: {}", msg("config_file_path"), config_path().display());
            println!();
            Ok(())
        }
        ConfigSubcommand::SetLanguage { language } => {
            match language.as_str() {
                "en" => config.language = Language::En,
                "vi" => config.language = Language::Vi,
                other => {
                    return Err(UserError::new(
                        ErrorClass::ConfigSyntax,
                        format!("Unsupported language {:?}", other),
                        "Use one of: en, vi",
                    )
                    .with_command("kk config set-language en")
                    .into());
                }
            }
            config.save()?;
            ui::show_success(msg("config_saved"));
            Ok(())
        }
        ConfigSubcommand::SetDir { path } => {
            if !path.join("docker-compose.yml").exists() {
                return Err(UserError::new(
                    ErrorClass::ConfigMissing,
                    format!("{} has no docker-compose.yml", path.display()),
                    "Initialize the stack there first",
                )
                .with_command("kk init")
                .into());
            }
            config.project_dir = Some(path);
            config.save()?;
            ui::show_success(msg("config_saved"));
            Ok(())
        }
    }
}
