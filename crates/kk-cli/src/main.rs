use clap::Parser;
use std::process;

use kk_cli::{commands, messages, ui, Cli};
use kk_types::CliConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let config = match CliConfig::load() {
        Ok(config) => config,
        Err(e) => {
            ui::show_boxed_error(ui::error_title(e.class), &e);
            process::exit(1);
        }
    };
    messages::set_language(config.language);

    if let Err(e) = commands::dispatch(cli, config).await {
        // Only the boxed report reaches the operator; no stack traces.
        let user = e.to_user_error();
        ui::show_boxed_error(ui::error_title(user.class), &user);
        process::exit(1);
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    if quiet {
        return;
    }

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
