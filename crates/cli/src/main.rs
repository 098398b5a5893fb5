//! plansweep: watch a query plan change across a parameter grid.
//!
//! # Commands
//!
//! - `run`: Execute a sweep file against the query proxy and report the
//!   distinct plans and where each one was chosen.
//! - `ping`: Check that the query proxy and its database are reachable.
//! - `init`: Write one of the demo sweeps as a starting point.

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use owo_colors::OwoColorize;
use std::path::PathBuf;

mod commands;
mod config;
mod exit_codes;
mod output;
mod report;
mod sweep_file;

use output::OutputFormat;
use plansweep_common::config::AppConfig;

#[derive(Parser)]
#[command(name = "plansweep", version)]
#[command(about = "Sweep a SQL template across a parameter grid and map its execution plans", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (human, json, yaml)
    #[arg(long, global = true, value_enum, default_value = "human")]
    output: OutputFormat,

    /// Application configuration file
    #[arg(long, global = true, env = "PLANSWEEP_CONFIG")]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a sweep file
    Run {
        /// Path to the sweep definition
        #[arg(default_value = "sweep.yaml")]
        file: PathBuf,
        /// Execute the statements (EXPLAIN ANALYZE) instead of estimating
        #[arg(long, default_value_t = false)]
        execute: bool,
        /// Proxy URL, overriding the sweep file and configuration
        #[arg(long)]
        url: Option<String>,
    },
    /// Test the connection to the query proxy
    Ping {
        /// Proxy URL, overriding the configuration
        #[arg(long)]
        url: Option<String>,
    },
    /// Write a demo sweep file
    Init {
        /// Demo number
        #[arg(long, default_value_t = 1)]
        demo: u8,
        /// Where to write the sweep file
        #[arg(long, default_value = "sweep.yaml")]
        file: PathBuf,
        /// Overwrite an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();

    let cli = Cli::parse();

    let config = match config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(&cli, &e),
    };

    if let Err(e) = plansweep_common::telemetry::init_tracing(&config.telemetry) {
        eprintln!("{} {:#}", "Warning:".yellow().bold(), e);
    }

    match run_cli(&cli, &config).await {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(exit_codes::PARTIAL_FAILURE),
        Err(e) => exit_with(&cli, &e),
    }
}

fn exit_with(cli: &Cli, e: &anyhow::Error) -> ! {
    let exit_code = exit_codes::for_error(e);
    if cli.output.is_machine_readable() {
        output::print_error(cli.output, e, exit_code).ok();
    } else {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
    }
    std::process::exit(exit_code);
}

/// Returns `Ok(false)` when the command completed with partial failures.
async fn run_cli(cli: &Cli, config: &AppConfig) -> Result<bool, anyhow::Error> {
    match &cli.command {
        Commands::Run { file, execute, url } => {
            commands::run(file, *execute, url.as_deref(), cli.output, config).await
        }
        Commands::Ping { url } => {
            commands::ping(url.as_deref(), cli.output, config).await?;
            Ok(true)
        }
        Commands::Init { demo, file, force } => {
            commands::init(*demo, file, *force, cli.output).await?;
            Ok(true)
        }
    }
}
