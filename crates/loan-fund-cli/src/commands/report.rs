use clap::Args;
use serde_json::Value;
use tracing::debug;

use loan_fund_core::report::{analyze, AnalysisOptions};

use super::{build_options, finish};
use crate::input;

/// Arguments for the full analysis report
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to the raw result JSON (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// JSON or YAML simulation config used for facts the payload does not echo
    #[arg(long)]
    pub config: Option<String>,

    /// JSON or YAML targets file; unset fields take their defaults
    #[arg(long)]
    pub targets: Option<String>,

    /// Original-vintage loan count for cohort reconstruction
    #[arg(long)]
    pub initial_loans: Option<u32>,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = input::read_payload(args.input.as_deref())?;
    let targets = match args.targets.as_deref() {
        Some(path) => Some(input::file::read_settings(path)?),
        None => None,
    };
    let options = AnalysisOptions {
        build: build_options(args.config.as_deref())?,
        targets,
        ranking: None,
        initial_loan_count: args.initial_loans,
    };
    debug!(command = "analyze", "running full analysis");

    let output = analyze(&raw, &options)?;
    finish("analyze", output)
}
