use std::time::Instant;

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use loan_fund_core::canonical::build_canonical_with;
use loan_fund_core::series::{cumulative, summarize, to_series, Granularity, Period, SeriesOptions, SeriesSummary};
use loan_fund_core::with_metadata;

use super::{build_options, finish};
use crate::input;

/// Arguments for canonical result construction
#[derive(Args)]
pub struct CanonicalArgs {
    /// Path to the raw result JSON (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// JSON or YAML simulation config used for facts the payload does not echo
    #[arg(long)]
    pub config: Option<String>,
}

pub fn run_canonical(args: CanonicalArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = input::read_payload(args.input.as_deref())?;
    let options = build_options(args.config.as_deref())?;
    debug!(command = "canonical", "building canonical result");
    let output = build_canonical_with(&raw, &options)?;
    finish("canonical", output)
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GranularityArg {
    Yearly,
    Monthly,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Yearly => Granularity::Yearly,
            GranularityArg::Monthly => Granularity::Monthly,
        }
    }
}

/// Arguments for time-series reconstruction
#[derive(Args)]
pub struct SeriesArgs {
    /// Path to the raw result JSON (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Period bucket
    #[arg(long, value_enum, default_value = "yearly")]
    pub granularity: GranularityArg,

    /// Report running totals instead of per-period flows
    #[arg(long)]
    pub cumulative: bool,

    /// Keep periods with no capital call, distribution or net flow
    #[arg(long)]
    pub keep_inactive: bool,

    /// Fund term in years; periods beyond it are dropped
    #[arg(long)]
    pub fund_term: Option<u32>,
}

#[derive(Debug, Serialize)]
struct SeriesView {
    summary: SeriesSummary,
    periods: Vec<Period>,
}

pub fn run_series(args: SeriesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let raw = input::read_payload(args.input.as_deref())?;

    let options = SeriesOptions {
        granularity: args.granularity.into(),
        cumulative: false,
        drop_inactive: !args.keep_inactive,
        fund_term_years: args.fund_term,
    };
    debug!(command = "series", ?options, "reconstructing series");

    let flows = to_series(&raw, &options);
    let summary = summarize(&flows);
    let periods = if args.cumulative { cumulative(&flows) } else { flows };

    let mut warnings = Vec::new();
    if periods.is_empty() {
        warnings.push("no cash-flow or portfolio-evolution periods found".to_string());
    } else if summary.implied_periodic_irr.is_none() && summary.total_capital_called > Decimal::ZERO {
        warnings.push("series-implied IRR unavailable".to_string());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let output = with_metadata(
        "Period series reconstructed from array, keyed-map or granularity-split payloads",
        &serde_json::json!({
            "granularity": options.granularity,
            "cumulative": args.cumulative,
            "drop_inactive": options.drop_inactive,
            "fund_term_years": options.fund_term_years,
        }),
        warnings,
        elapsed,
        SeriesView { summary, periods },
    );
    finish("series", output)
}
