//! CLI entry and dispatch.

use anyhow::{Context, Result};
use beacon_core::config;
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "beacon")]
#[command(version = "0.1")]
#[command(about = "Transient status line for long-running terminal operations")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Skip toasts (used by integration tests)
    #[arg(long, env = "BEACON_INTEGRATION_TEST")]
    integration_test: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the interactive status demo (default)
    Demo,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Write the default config file
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Demo) {
        Commands::Demo => {
            let config = config::Config::load().context("load config")?;
            commands::demo::run(&config, cli.integration_test)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
