use std::time::Instant;

use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use loan_fund_core::canonical::fields::INITIAL_LOAN_COUNT;
use loan_fund_core::canonical::{build_canonical_with, CanonicalResult};
use loan_fund_core::carry::{rank_carry_contribution, MissingIrrPolicy, RankingParams};
use loan_fund_core::cohorts::reconstruct_cohorts;
use loan_fund_core::fees::fee_impact_bridge;
use loan_fund_core::health::{score_health, zone_variance};
use loan_fund_core::resolver::resolve_count;
use loan_fund_core::series::{to_series, SeriesOptions};
use loan_fund_core::with_metadata;

use super::{build_options, finish, load_targets, log_warnings};
use crate::input;

/// Read the payload and build the canonical result every analytic runs on.
fn canonical_from(
    path: Option<&str>,
    config: Option<&str>,
) -> Result<CanonicalResult, Box<dyn std::error::Error>> {
    let raw = input::read_payload(path)?;
    let options = build_options(config)?;
    let output = build_canonical_with(&raw, &options)?;
    log_warnings("canonical", &output.warnings);
    Ok(output.result)
}

// ---------------------------------------------------------------------------
// Cohorts
// ---------------------------------------------------------------------------

/// Arguments for cohort reconstruction
#[derive(Args)]
pub struct CohortsArgs {
    /// Path to the raw result JSON (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Original-vintage loan count at the first period
    #[arg(long)]
    pub initial_loans: Option<u32>,

    /// Fund term in years; periods beyond it are dropped
    #[arg(long)]
    pub fund_term: Option<u32>,
}

pub fn run_cohorts(args: CohortsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = input::read_payload(args.input.as_deref())?;
    let series = to_series(
        &raw,
        &SeriesOptions {
            drop_inactive: false,
            fund_term_years: args.fund_term,
            ..SeriesOptions::default()
        },
    );
    let initial = args
        .initial_loans
        .or_else(|| resolve_count(&raw, &INITIAL_LOAN_COUNT));
    debug!(command = "cohorts", periods = series.len(), ?initial, "splitting cohorts");

    let output = reconstruct_cohorts(&series, initial)?;
    finish("cohorts", output)
}

// ---------------------------------------------------------------------------
// Fee bridge
// ---------------------------------------------------------------------------

/// Arguments for the fee-impact bridge
#[derive(Args)]
pub struct FeeBridgeArgs {
    /// Path to the raw result JSON (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_fee_bridge(args: FeeBridgeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let canonical = canonical_from(args.input.as_deref(), None)?;
    debug!(command = "fee-bridge", "building return bridge");
    let output = fee_impact_bridge(&canonical)?;
    finish("fee-bridge", output)
}

// ---------------------------------------------------------------------------
// Health and zones
// ---------------------------------------------------------------------------

/// Arguments for the health score
#[derive(Args)]
pub struct HealthArgs {
    /// Path to the raw result JSON (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// JSON or YAML targets file; unset fields take their defaults
    #[arg(long)]
    pub targets: Option<String>,

    /// JSON or YAML simulation config used for facts the payload does not echo
    #[arg(long)]
    pub config: Option<String>,
}

pub fn run_health(args: HealthArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let canonical = canonical_from(args.input.as_deref(), args.config.as_deref())?;
    let targets = load_targets(args.targets.as_deref(), &canonical.config)?;
    debug!(command = "health", ?targets, "scoring fund health");
    let output = score_health(&canonical, &targets)?;
    finish("health", output)
}

/// Arguments for the zone variance table
#[derive(Args)]
pub struct ZonesArgs {
    /// Path to the raw result JSON (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// JSON or YAML targets file; unset fields take their defaults
    #[arg(long)]
    pub targets: Option<String>,
}

pub fn run_zones(args: ZonesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let canonical = canonical_from(args.input.as_deref(), None)?;
    let targets = load_targets(args.targets.as_deref(), &canonical.config)?;
    debug!(command = "zones", "computing zone variance");

    let rows = zone_variance(&canonical, &targets);
    let mut warnings = Vec::new();
    if canonical.portfolio_snapshot.zone_distribution.is_none() {
        warnings.push("zone distribution not reported; variance left null".to_string());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let output = with_metadata(
        "Actual vs target zone allocation with per-zone loan totals",
        &targets.zone_targets,
        warnings,
        elapsed,
        rows,
    );
    finish("zones", output)
}

// ---------------------------------------------------------------------------
// Carry ranking
// ---------------------------------------------------------------------------

/// Arguments for the carry-contribution ranking
#[derive(Args)]
pub struct CarryRankingArgs {
    /// Path to the raw result JSON (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Number of loans to return
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Hurdle rate (overrides the config echo)
    #[arg(long)]
    pub hurdle_rate: Option<Decimal>,

    /// Carry rate (overrides the config echo)
    #[arg(long)]
    pub carry_rate: Option<Decimal>,

    /// Drop loans without an IRR instead of using the zone default
    #[arg(long)]
    pub exclude_missing_irr: bool,
}

pub fn run_carry_ranking(args: CarryRankingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let canonical = canonical_from(args.input.as_deref(), None)?;

    let mut params = RankingParams::from_config(&canonical.config);
    if let Some(top_n) = args.top_n {
        params.top_n = top_n;
    }
    if let Some(hurdle) = args.hurdle_rate {
        params.hurdle_rate = hurdle;
    }
    if let Some(carry) = args.carry_rate {
        params.carry_rate = carry;
    }
    if args.exclude_missing_irr {
        params.missing_irr = MissingIrrPolicy::Exclude;
    }
    debug!(command = "carry-ranking", ?params, "ranking loans");

    let output = rank_carry_contribution(
        &canonical.portfolio_snapshot.loans,
        &canonical.portfolio_snapshot.zone_irr,
        &params,
    )?;
    finish("carry-ranking", output)
}
