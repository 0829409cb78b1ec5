pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use concierge_core::config::{AppConfig, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "concierge",
    about = "Procurement concierge CLI",
    long_about = "Run the schema-driven purchase-request conversation, the morning \
                  procurement briefing, or inspect the effective configuration.",
    after_help = "Examples:\n  concierge chat\n  concierge briefing --instant\n  concierge config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a concierge.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Skip simulated typing delays")]
    instant: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start the interactive purchase-request conversation")]
    Chat,
    #[command(about = "Run the morning briefing over the seeded procurement data")]
    Briefing,
    #[command(about = "Print the effective configuration as JSON")]
    Config,
}

fn init_logging(config: &AppConfig) {
    use concierge_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(LoadOptions {
        config_path: cli.config.clone(),
        ..LoadOptions::default()
    }) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("configuration error: {error}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    let typing = if cli.instant {
        concierge_core::config::TypingConfig::instant()
    } else {
        config.typing
    };

    let result = match cli.command {
        Command::Chat => commands::chat::run(typing),
        Command::Briefing => commands::briefing::run(&config, typing),
        Command::Config => commands::config::run(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}
