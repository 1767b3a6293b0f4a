//! # offert
//!
//! Command line front end for quote pricing, spreadsheet import and payroll
//! export.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CLI Startup Sequence                             │
//! │                                                                         │
//! │  1. Parse arguments (clap)                                             │
//! │     └── --config, -v, subcommand                                       │
//! │                                                                         │
//! │  2. Initialize tracing                                                 │
//! │     └── RUST_LOG wins, otherwise -v picks the level                    │
//! │                                                                         │
//! │  3. Load config                                                        │
//! │     └── defaults → offert.toml → OFFERT_* → validate                   │
//! │                                                                         │
//! │  4. Dispatch                                                           │
//! │     └── totals | import | payroll | config                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logs go to stderr so stdout can be piped.

mod commands;
mod config;
mod error;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::config::ConfigCommand;
use crate::commands::import::ImportArgs;
use crate::commands::payroll::PayrollArgs;
use crate::commands::totals::TotalsArgs;
use crate::config::OffertConfig;

#[derive(Parser, Debug)]
#[command(name = "offert")]
#[command(version, about = "Pricing, ROT/RUT and payroll tools for construction quotes")]
struct Cli {
    /// Config file (default: platform config dir, offert.toml).
    #[arg(long, global = true, env = "OFFERT_CONFIG")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute and print the totals of an estimate file.
    Totals(TotalsArgs),
    /// Import a CSV article list as an estimate.
    Import(ImportArgs),
    /// Export a time report for Fortnox or Visma.
    Payroll(PayrollArgs),
    /// Show or create the config file.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=offert_transfer=trace` - Trace one crate only
/// - Default: INFO, raised by `-v`
fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = OffertConfig::load(cli.config.as_deref())?;
    debug!(?config, "Configuration loaded");

    match cli.command {
        Command::Totals(args) => commands::totals::run(args, &config),
        Command::Import(args) => commands::import::run(args, &config),
        Command::Payroll(args) => commands::payroll::run(args, &config),
        Command::Config { command } => {
            commands::config::run(command, cli.config.as_deref(), &config)
        }
    }
}
