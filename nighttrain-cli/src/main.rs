//! NightTrain CLI - Command-line interface
//!
//! Inspects recorded path files, runs headless simulations of a train
//! session, and manages `config.ini`.

mod commands;
mod error;
mod sim;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use nighttrain::logging::{init_logging, LogOptions};

use commands::check::CheckArgs;
use commands::common::ConfigLocation;
use commands::config::ConfigCommands;
use commands::simulate::SimulateArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "nighttrain")]
#[command(version = nighttrain::VERSION)]
#[command(about = "Drive a scripted train along a recorded path", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to nighttrain.log in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load a path file and report on its waypoints
    Check(CheckArgs),

    /// Drive a scripted vehicle along a path and stream content around it
    Simulate(SimulateArgs),

    /// View or modify configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut options = LogOptions::default().verbose(cli.verbose);
    if let Some(dir) = cli.log_dir {
        options = options.with_log_dir(dir);
    }
    let _guard = init_logging(&options)?;

    let location = ConfigLocation::new(cli.config);
    tracing::debug!(config = %location.file.display(), "Using configuration file");

    match cli.command {
        Commands::Check(args) => commands::check::run(args, &location),
        Commands::Simulate(args) => commands::simulate::run(args, &location),
        Commands::Config { command } => commands::config::run(command, &location),
    }
}
