use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kk",
    about = "Install, run, and maintain the kkengine Docker stack",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Generate the configuration bundle in the current directory
    Init {
        /// Accept defaults and skip all prompts
        #[arg(short, long)]
        force: bool,
    },

    /// Preflight the host and start all services
    Start,

    /// Stop all services
    Stop,

    /// Restart all services
    Restart,

    /// Remove containers and networks
    Remove {
        /// Also remove volumes (deletes all stack data)
        #[arg(short = 'V', long)]
        volumes: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Pull new images and recreate services when anything changed
    Update {
        /// Recreate without asking for confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Show status of all defined services
    Status,

    /// View and change CLI configuration
    Config(ConfigCommand),

    /// Manage the workflow automation add-on
    Automation(AutomationCommand),
}

#[derive(Args, Clone)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Clone)]
pub enum ConfigSubcommand {
    /// Show current configuration
    Show,
    /// Set the display language (en or vi)
    SetLanguage { language: String },
    /// Set the project directory
    SetDir { path: PathBuf },
}

#[derive(Args, Clone)]
pub struct AutomationCommand {
    #[command(subcommand)]
    pub command: AutomationSubcommand,
}

#[derive(Subcommand, Clone)]
pub enum AutomationSubcommand {
    /// Render the add-on bundle into <project>/automation
    Install {
        /// Overwrite an existing installation without asking
        #[arg(short, long)]
        force: bool,
    },
    /// Start the add-on services
    Start,
    /// Stop the add-on services
    Stop,
    /// Show add-on service status
    Status,
    /// Remove the add-on containers
    Remove {
        /// Also remove volumes (deletes workflow data)
        #[arg(short = 'V', long)]
        volumes: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}
