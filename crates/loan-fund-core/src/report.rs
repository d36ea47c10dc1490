//! One-shot analysis: canonical result plus every derived view.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canonical::{build_canonical_with, BuildOptions, CanonicalResult};
use crate::carry::{rank_carry_contribution, CarryRankingEntry, RankingParams};
use crate::cohorts::{reconstruct_cohorts, CohortReport};
use crate::fees::{fee_impact_bridge, FeeImpactBridge};
use crate::health::{score_health, zone_variance, AnalyticsTargets, HealthScoreResult, ZoneVariance};
use crate::series::{summarize, to_series, SeriesOptions, SeriesSummary};
use crate::types::{with_metadata, ComputationOutput};
use crate::LoanFundResult;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisOptions {
    #[serde(default)]
    pub build: BuildOptions,
    /// Overrides targets derived from the config echo
    pub targets: Option<AnalyticsTargets>,
    /// Overrides ranking parameters derived from the config echo
    pub ranking: Option<RankingParams>,
    /// Initial original-vintage loan count for cohort reconstruction
    pub initial_loan_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub canonical: CanonicalResult,
    pub series_summary: SeriesSummary,
    pub cohorts: Option<CohortReport>,
    pub fee_bridge: FeeImpactBridge,
    pub health: HealthScoreResult,
    pub zone_variance: Vec<ZoneVariance>,
    pub carry_ranking: Vec<CarryRankingEntry>,
}

fn tag(section: &str, warnings: Vec<String>) -> impl Iterator<Item = String> + '_ {
    warnings.into_iter().map(move |w| format!("{section}: {w}"))
}

/// Build the canonical result and run every derived component once.
pub fn analyze(raw: &Value, options: &AnalysisOptions) -> LoanFundResult<ComputationOutput<AnalysisReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let canonical = build_canonical_with(raw, &options.build)?;
    warnings.extend(tag("canonical", canonical.warnings));
    let canonical = canonical.result;

    let targets = options
        .targets
        .clone()
        .unwrap_or_else(|| AnalyticsTargets::from_config(&canonical.config));
    let ranking = options
        .ranking
        .clone()
        .unwrap_or_else(|| RankingParams::from_config(&canonical.config));

    let series_summary = summarize(&canonical.cash_flow_series);

    let full_series = to_series(
        raw,
        &SeriesOptions {
            drop_inactive: false,
            fund_term_years: canonical.config.fund_term_years,
            ..SeriesOptions::default()
        },
    );
    let initial = options
        .initial_loan_count
        .or(canonical.config.initial_loan_count);
    let cohorts = match reconstruct_cohorts(&full_series, initial) {
        Ok(out) => {
            warnings.extend(tag("cohorts", out.warnings));
            Some(out.result)
        }
        Err(e) => {
            warnings.push(format!("cohorts: skipped ({e})"));
            None
        }
    };

    let bridge = fee_impact_bridge(&canonical)?;
    warnings.extend(tag("fee_bridge", bridge.warnings));

    let health = score_health(&canonical, &targets)?;
    warnings.extend(tag("health", health.warnings));

    let zones = zone_variance(&canonical, &targets);

    let carry = rank_carry_contribution(
        &canonical.portfolio_snapshot.loans,
        &canonical.portfolio_snapshot.zone_irr,
        &ranking,
    )?;
    warnings.extend(tag("carry", carry.warnings));

    let report = AnalysisReport {
        canonical,
        series_summary,
        cohorts,
        fee_bridge: bridge.result,
        health: health.result,
        zone_variance: zones,
        carry_ranking: carry.result,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Canonical normalization with series, cohort, fee bridge, health, zone and carry analytics",
        &serde_json::json!({
            "targets": targets,
            "ranking": ranking,
        }),
        warnings,
        elapsed,
        report,
    ))
}
