pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::smoke::SmokeTarget;

#[derive(Debug, Parser)]
#[command(
    name = "agenda",
    about = "Agenda operator CLI",
    long_about = "Check readiness, inspect configuration, check providers, and talk to the scheduling agent locally.",
    after_help = "Examples:\n  agenda doctor --json\n  agenda config\n  agenda smoke llm\n  agenda chat"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to agenda.toml (defaults to AGENDA_CONFIG or ./agenda.toml)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Validate config, timezone resolution, and credential readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run a live connectivity check against one provider")]
    Smoke {
        #[arg(value_enum)]
        target: SmokeTarget,
        #[arg(long, help = "Emit machine-readable JSON output only")]
        json: bool,
    },
    #[command(about = "Hold a scheduling conversation over stdin/stdout")]
    Chat {
        #[arg(long, help = "Write each reply as a JSON line")]
        json: bool,
    },
}

/// Diagnostics go to stderr so stdout stays parseable.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(filter)
        .compact()
        .try_init();
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Command::Doctor { json } => commands::doctor::run(json, config_path),
        Command::Config { json } => commands::config::run(json, config_path),
        Command::Smoke { target, json } => commands::smoke::run(target, json, config_path),
        Command::Chat { json } => commands::chat::run(json, config_path),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
