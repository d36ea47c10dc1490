use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde_json::Value;

use loan_fund_core::canonical::{build_canonical_with, BuildOptions, CanonicalResult};
use loan_fund_core::carry::RankingParams;
use loan_fund_core::health::AnalyticsTargets;
use loan_fund_core::series::SeriesOptions;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_payload(payload_json: &str) -> NapiResult<Value> {
    serde_json::from_str(payload_json).map_err(to_napi_error)
}

/// Optional settings object; absent means defaults.
fn parse_settings<T: DeserializeOwned + Default>(json: Option<String>) -> NapiResult<T> {
    match json {
        Some(s) => serde_json::from_str(&s).map_err(to_napi_error),
        None => Ok(T::default()),
    }
}

fn canonical(payload_json: &str) -> NapiResult<CanonicalResult> {
    let raw = parse_payload(payload_json)?;
    let output = build_canonical_with(&raw, &BuildOptions::default()).map_err(to_napi_error)?;
    Ok(output.result)
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

#[napi]
pub fn build_canonical(payload_json: String, options_json: Option<String>) -> NapiResult<String> {
    let raw = parse_payload(&payload_json)?;
    let options: BuildOptions = parse_settings(options_json)?;
    let output = build_canonical_with(&raw, &options).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn to_series(payload_json: String, options_json: Option<String>) -> NapiResult<String> {
    let raw = parse_payload(&payload_json)?;
    let options: SeriesOptions = parse_settings(options_json)?;
    let periods = loan_fund_core::series::to_series(&raw, &options);
    serde_json::to_string(&periods).map_err(to_napi_error)
}

#[napi]
pub fn summarize_series(payload_json: String) -> NapiResult<String> {
    let raw = parse_payload(&payload_json)?;
    let periods = loan_fund_core::series::to_series(&raw, &SeriesOptions::default());
    let summary = loan_fund_core::series::summarize(&periods);
    serde_json::to_string(&summary).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[napi]
pub fn reconstruct_cohorts(payload_json: String, initial_loan_count: Option<u32>) -> NapiResult<String> {
    let raw = parse_payload(&payload_json)?;
    let series = loan_fund_core::series::to_series(
        &raw,
        &SeriesOptions {
            drop_inactive: false,
            ..SeriesOptions::default()
        },
    );
    let initial = initial_loan_count.or_else(|| {
        loan_fund_core::resolver::resolve_count(
            &raw,
            &loan_fund_core::canonical::fields::INITIAL_LOAN_COUNT,
        )
    });
    let output =
        loan_fund_core::cohorts::reconstruct_cohorts(&series, initial).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn fee_impact_bridge(payload_json: String) -> NapiResult<String> {
    let result = canonical(&payload_json)?;
    let output = loan_fund_core::fees::fee_impact_bridge(&result).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

fn targets_for(result: &CanonicalResult, targets_json: Option<String>) -> NapiResult<AnalyticsTargets> {
    match targets_json {
        Some(s) => serde_json::from_str(&s).map_err(to_napi_error),
        None => Ok(AnalyticsTargets::from_config(&result.config)),
    }
}

#[napi]
pub fn score_health(payload_json: String, targets_json: Option<String>) -> NapiResult<String> {
    let result = canonical(&payload_json)?;
    let targets = targets_for(&result, targets_json)?;
    let output = loan_fund_core::health::score_health(&result, &targets).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn zone_variance(payload_json: String, targets_json: Option<String>) -> NapiResult<String> {
    let result = canonical(&payload_json)?;
    let targets = targets_for(&result, targets_json)?;
    let rows = loan_fund_core::health::zone_variance(&result, &targets);
    serde_json::to_string(&rows).map_err(to_napi_error)
}

#[napi]
pub fn rank_carry_contribution(payload_json: String, params_json: Option<String>) -> NapiResult<String> {
    let result = canonical(&payload_json)?;
    let params = match params_json {
        Some(s) => serde_json::from_str(&s).map_err(to_napi_error)?,
        None => RankingParams::from_config(&result.config),
    };
    let output = loan_fund_core::carry::rank_carry_contribution(
        &result.portfolio_snapshot.loans,
        &result.portfolio_snapshot.zone_irr,
        &params,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze(payload_json: String, options_json: Option<String>) -> NapiResult<String> {
    let raw = parse_payload(&payload_json)?;
    let options: loan_fund_core::report::AnalysisOptions = parse_settings(options_json)?;
    let output = loan_fund_core::report::analyze(&raw, &options).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
