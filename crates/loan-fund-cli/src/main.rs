mod commands;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::analytics::{CarryRankingArgs, CohortsArgs, FeeBridgeArgs, HealthArgs, ZonesArgs};
use commands::canonical::{CanonicalArgs, SeriesArgs};
use commands::report::AnalyzeArgs;

/// Loan-fund simulation result normalization and analytics
#[derive(Parser)]
#[command(
    name = "lfa",
    version,
    about = "Loan-fund simulation result normalization and analytics",
    long_about = "A CLI that turns raw loan-fund simulation results into a canonical \
                  shape and derives cash-flow series, cohort splits, fee bridges, \
                  health scores and carry rankings with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter used when RUST_LOG is not set (e.g. "warn", "debug")
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a raw result payload into the canonical result
    Canonical(CanonicalArgs),
    /// Reconstruct the cash-flow time series
    Series(SeriesArgs),
    /// Split active loans into original and reinvested cohorts
    Cohorts(CohortsArgs),
    /// Gross to fund to LP return bridge
    FeeBridge(FeeBridgeArgs),
    /// Composite fund health score with recommendations
    Health(HealthArgs),
    /// Per-zone allocation variance against targets
    Zones(ZonesArgs),
    /// Rank loans by carried-interest contribution
    CarryRanking(CarryRankingArgs),
    /// Run every component and return one report
    Analyze(AnalyzeArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = telemetry::init(&cli.log_level) {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(1);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Canonical(args) => commands::canonical::run_canonical(args),
        Commands::Series(args) => commands::canonical::run_series(args),
        Commands::Cohorts(args) => commands::analytics::run_cohorts(args),
        Commands::FeeBridge(args) => commands::analytics::run_fee_bridge(args),
        Commands::Health(args) => commands::analytics::run_health(args),
        Commands::Zones(args) => commands::analytics::run_zones(args),
        Commands::CarryRanking(args) => commands::analytics::run_carry_ranking(args),
        Commands::Analyze(args) => commands::report::run_analyze(args),
        Commands::Version => {
            println!("lfa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
