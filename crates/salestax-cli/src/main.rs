//! # salestax CLI entry point
//!
//! Parses command-line arguments, initializes tracing, loads settings and
//! the reference table, and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use salestax_cli::calc::{run_calc, CalcArgs};
use salestax_cli::regions::{run_regions, RegionsArgs};
use salestax_cli::watch::{run_watch, WatchArgs};
use salestax_cli::AppContext;

/// Sales tax calculator.
///
/// Resolves an amount and a jurisdiction from free text (`100 in Quebec`)
/// or flags, looks up the jurisdiction's stacked tax components, and
/// prints the breakdown and total.
#[derive(Parser, Debug)]
#[command(name = "salestax", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to settings file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to a tax table file (YAML or JSON) replacing the built-in one.
    #[arg(long, global = true)]
    table: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Calculate tax for one request.
    Calc(CalcArgs),

    /// Recalculate for every line read from stdin.
    Watch(WatchArgs),

    /// List the regions and rates in the tax table.
    Regions(RegionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("salestax CLI starting");

    let result = AppContext::load(cli.config.as_deref(), cli.table.as_deref()).and_then(|ctx| {
        let mut stdout = std::io::stdout().lock();
        match &cli.command {
            Commands::Calc(args) => run_calc(args, &ctx, &mut stdout),
            Commands::Watch(args) => run_watch(args, &ctx, std::io::stdin().lock(), &mut stdout),
            Commands::Regions(args) => run_regions(args, &ctx, &mut stdout),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
