pub mod analytics;
pub mod canonical;
pub mod report;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use loan_fund_core::canonical::{BuildOptions, SimulationConfig};
use loan_fund_core::health::AnalyticsTargets;
use loan_fund_core::ComputationOutput;

use crate::input;

/// Log each envelope warning and hand the envelope to the formatter.
pub(crate) fn finish<T: Serialize>(
    command: &str,
    output: ComputationOutput<T>,
) -> Result<Value, Box<dyn std::error::Error>> {
    log_warnings(command, &output.warnings);
    Ok(serde_json::to_value(output)?)
}

pub(crate) fn log_warnings(command: &str, warnings: &[String]) {
    for w in warnings {
        warn!(command, "{w}");
    }
}

/// Builder options with the config fallback read from `--config`, if given.
pub(crate) fn build_options(config: Option<&str>) -> Result<BuildOptions, Box<dyn std::error::Error>> {
    let config_fallback = match config {
        Some(path) => input::file::read_settings(path)?,
        None => SimulationConfig::default(),
    };
    Ok(BuildOptions { config_fallback })
}

/// Targets from `--targets` when given, otherwise from the echoed config.
pub(crate) fn load_targets(
    path: Option<&str>,
    config: &SimulationConfig,
) -> Result<AnalyticsTargets, Box<dyn std::error::Error>> {
    match path {
        Some(path) => input::file::read_settings(path),
        None => Ok(AnalyticsTargets::from_config(config)),
    }
}
