//! Composite fund health score.
//!
//! Four sub-scores (diversification, performance, risk, liquidity) in
//! `[0, 100]` are blended into an overall score. Terms whose inputs are
//! absent are dropped and the remaining weights renormalized; a sub-score
//! with nothing to score is a neutral 50.

use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::targets::AnalyticsTargets;
use crate::canonical::CanonicalResult;
use crate::series::{summarize, SeriesSummary};
use crate::types::{with_metadata, ComputationOutput, Multiple, Rate, Years, Zone};
use crate::LoanFundResult;

// ---------------------------------------------------------------------------
// Weights and tolerance bands
// ---------------------------------------------------------------------------

const DIVERSIFICATION_WEIGHT: Decimal = dec!(0.25);
const PERFORMANCE_WEIGHT: Decimal = dec!(0.35);
const RISK_WEIGHT: Decimal = dec!(0.25);
const LIQUIDITY_WEIGHT: Decimal = dec!(0.15);

const NEUTRAL_SCORE: Decimal = dec!(50);
const MAX_SCORE: Decimal = dec!(100);
/// Bound on actual/target ratios; anything past it already saturates every score.
const RATIO_CAP: Decimal = dec!(1000000);

/// Per-zone deviation from target that triggers a rebalancing recommendation.
pub const ZONE_TOLERANCE: Decimal = dec!(0.10);
const RETURN_RATIO_FLOOR: Decimal = dec!(0.90);
const DEFAULT_RATIO_CEILING: Decimal = dec!(1.20);
const LTV_RATIO_CEILING: Decimal = dec!(1.10);
const RED_ZONE_RATIO_CEILING: Decimal = dec!(1.20);
const LOAN_SIZE_CV_CEILING: Decimal = dec!(1.0);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    NeedsAttention,
}

impl HealthStatus {
    pub fn from_score(score: Decimal) -> Self {
        if score >= dec!(80) {
            HealthStatus::Excellent
        } else if score >= dec!(60) {
            HealthStatus::Good
        } else if score >= dec!(40) {
            HealthStatus::Fair
        } else {
            HealthStatus::NeedsAttention
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "Excellent",
            HealthStatus::Good => "Good",
            HealthStatus::Fair => "Fair",
            HealthStatus::NeedsAttention => "Needs Attention",
        }
    }
}

/// Constituent ratios behind each sub-score. `None` = input absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthBreakdown {
    /// Mean absolute deviation of zone allocation from target
    pub zone_deviation: Option<Rate>,
    /// Coefficient of variation of loan amounts
    pub loan_size_cv: Option<Decimal>,
    pub irr: Option<Rate>,
    pub irr_ratio: Option<Decimal>,
    pub multiple: Option<Multiple>,
    pub multiple_ratio: Option<Decimal>,
    pub dpi: Option<Multiple>,
    pub rvpi: Option<Multiple>,
    /// Weight on the DPI term (elapsed share of fund term)
    pub dpi_weight: Option<Decimal>,
    pub default_rate: Option<Rate>,
    pub default_rate_ratio: Option<Decimal>,
    pub ltv: Option<Rate>,
    pub ltv_ratio: Option<Decimal>,
    pub red_zone_share: Option<Rate>,
    pub red_zone_ratio: Option<Decimal>,
    pub weighted_avg_distribution_year: Option<Years>,
    pub breakeven_index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScoreResult {
    pub diversification: Decimal,
    pub performance: Decimal,
    pub risk: Decimal,
    pub liquidity: Decimal,
    pub overall: Decimal,
    pub status: HealthStatus,
    pub breakdown: HealthBreakdown,
    pub recommendations: Vec<String>,
    pub insights: Vec<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn clamp_score(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(MAX_SCORE)
}

fn pct(value: Decimal) -> String {
    match value.checked_mul(dec!(100)) {
        Some(p) => format!("{:.1}%", p),
        None => format!("{:.2}x", value),
    }
}

/// `numerator / denominator` held to `[-RATIO_CAP, RATIO_CAP]`; overflow
/// saturates toward the sign of the quotient.
fn bounded_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    let quotient = numerator.checked_div(denominator).unwrap_or_else(|| {
        if numerator.is_sign_negative() == denominator.is_sign_negative() {
            RATIO_CAP
        } else {
            -RATIO_CAP
        }
    });
    quotient.max(-RATIO_CAP).min(RATIO_CAP)
}

/// Weighted blend of the terms that are present, renormalized over their weights.
fn blend(terms: &[(Option<Decimal>, Decimal)]) -> Option<Decimal> {
    let (sum, weight) = terms
        .iter()
        .filter_map(|(score, w)| score.map(|s| (s * w, *w)))
        .fold((Decimal::ZERO, Decimal::ZERO), |(s, tw), (x, w)| (s + x, tw + w));
    if weight.is_zero() {
        None
    } else {
        Some(sum / weight)
    }
}

/// Ratio of actual to target for a target that is positive.
fn ratio(actual: Option<Decimal>, target: Decimal) -> Option<Decimal> {
    let actual = actual?;
    if target > Decimal::ZERO {
        Some(bounded_div(actual, target))
    } else {
        None
    }
}

/// Points for a higher-is-better term worth `max_points` at target.
fn reward_points(actual: Decimal, target: Decimal, max_points: Decimal) -> Decimal {
    if target > Decimal::ZERO {
        bounded_div(actual, target).saturating_mul(max_points)
    } else if actual >= target {
        max_points
    } else {
        Decimal::ZERO
    }
}

/// `100 - (ratio - 1) * 100` for a lower-is-better term, clamped.
fn penalty_score(actual: Decimal, target: Decimal) -> Decimal {
    if target > Decimal::ZERO {
        let excess = bounded_div(actual, target) - Decimal::ONE;
        clamp_score(MAX_SCORE.saturating_sub(excess.saturating_mul(MAX_SCORE)))
    } else if actual <= target {
        MAX_SCORE
    } else {
        Decimal::ZERO
    }
}

/// Population coefficient of variation; needs two values and a positive mean.
///
/// The CV is scale-free, so values are first divided by the largest magnitude
/// to keep the squared deviations inside the Decimal range.
fn coefficient_of_variation(values: &[Decimal]) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }
    let scale = values.iter().map(|v| v.abs()).max()?;
    if scale.is_zero() {
        return None;
    }
    let scaled: Vec<Decimal> = values.iter().map(|v| *v / scale).collect();
    let n = Decimal::from(scaled.len());
    let mean = scaled.iter().copied().sum::<Decimal>() / n;
    if mean <= Decimal::ZERO {
        return None;
    }
    let variance = scaled
        .iter()
        .map(|v| (*v - mean) * (*v - mean))
        .sum::<Decimal>()
        / n;
    Some(bounded_div(variance.sqrt()?, mean))
}

fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let n = Decimal::from(values.len());
    let sum = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v));
    Some(match sum {
        Some(sum) => sum / n,
        None => values.iter().map(|v| *v / n).sum::<Decimal>(),
    })
}

// ---------------------------------------------------------------------------
// Sub-scores
// ---------------------------------------------------------------------------

fn diversification(
    result: &CanonicalResult,
    targets: &AnalyticsTargets,
    breakdown: &mut HealthBreakdown,
) -> Decimal {
    let portfolio = &result.portfolio_snapshot;

    breakdown.zone_deviation = portfolio.zone_distribution.map(|actual| {
        Zone::ALL
            .iter()
            .map(|z| actual.get(*z).saturating_sub(targets.zone_targets.get(*z)).abs())
            .fold(Decimal::ZERO, Decimal::saturating_add)
            / dec!(3)
    });
    let deviation_term = breakdown
        .zone_deviation
        .map(|d| clamp_score(MAX_SCORE.saturating_sub(d.saturating_mul(dec!(200)))));

    let amounts: Vec<Decimal> = portfolio.loans.iter().filter_map(|l| l.loan_amount).collect();
    breakdown.loan_size_cv = coefficient_of_variation(&amounts);
    let concentration_term = breakdown
        .loan_size_cv
        .map(|cv| MAX_SCORE - cv.saturating_mul(MAX_SCORE).min(MAX_SCORE));

    blend(&[(deviation_term, dec!(0.7)), (concentration_term, dec!(0.3))])
        .map(clamp_score)
        .unwrap_or(NEUTRAL_SCORE)
}

fn performance(
    result: &CanonicalResult,
    targets: &AnalyticsTargets,
    breakdown: &mut HealthBreakdown,
) -> Decimal {
    let m = &result.metrics;
    let irr = m.fund_irr.or(m.lp_irr).or(m.gross_irr);
    let multiple = m.fund_multiple.or(m.tvpi).or(m.lp_multiple);

    breakdown.irr = irr;
    breakdown.irr_ratio = ratio(irr, targets.target_irr);
    breakdown.multiple = multiple;
    breakdown.multiple_ratio = ratio(multiple, targets.target_multiple);
    breakdown.dpi = m.dpi;
    breakdown.rvpi = m.rvpi;

    let elapsed = m.years_elapsed.or_else(|| {
        result
            .cash_flow_series
            .last()
            .map(|p| Decimal::from(p.index) + Decimal::ONE)
    });
    breakdown.dpi_weight = elapsed.map(|e| {
        if targets.fund_term_years == 0 {
            Decimal::ONE
        } else {
            (e / Decimal::from(targets.fund_term_years))
                .max(Decimal::ZERO)
                .min(Decimal::ONE)
        }
    });

    // (points, max points) per present term
    let mut terms: Vec<(Decimal, Decimal)> = Vec::new();
    if let Some(irr) = irr {
        terms.push((reward_points(irr, targets.target_irr, dec!(40)), dec!(40)));
    }
    if let Some(multiple) = multiple {
        terms.push((reward_points(multiple, targets.target_multiple, dec!(30)), dec!(30)));
    }
    let dpi_term = m.dpi.map(|d| d.min(Decimal::ONE).saturating_mul(dec!(30)));
    let rvpi_term = m.rvpi.map(|r| r.min(Decimal::ONE).saturating_mul(dec!(30)));
    match (dpi_term, rvpi_term, breakdown.dpi_weight) {
        (Some(d), Some(r), Some(w)) => terms.push((
            d.saturating_mul(w)
                .saturating_add(r.saturating_mul(Decimal::ONE - w)),
            dec!(30),
        )),
        (Some(d), None, _) | (Some(d), Some(_), None) => terms.push((d, dec!(30))),
        (None, Some(r), _) => terms.push((r, dec!(30))),
        (None, None, _) => {}
    }

    let max_points: Decimal = terms.iter().map(|(_, max)| *max).sum();
    if max_points.is_zero() {
        return NEUTRAL_SCORE;
    }
    let points = terms
        .iter()
        .fold(Decimal::ZERO, |acc, (p, _)| acc.saturating_add(*p));
    clamp_score(bounded_div(points, max_points).saturating_mul(MAX_SCORE))
}

fn risk(result: &CanonicalResult, targets: &AnalyticsTargets, breakdown: &mut HealthBreakdown) -> Decimal {
    let portfolio = &result.portfolio_snapshot;

    let default_rate = portfolio.default_rate.or_else(|| {
        match (portfolio.defaulted_loans, portfolio.total_loans) {
            (Some(defaulted), Some(total)) if total > 0 => {
                Some(Decimal::from(defaulted) / Decimal::from(total))
            }
            _ => None,
        }
    });
    let ltvs: Vec<Decimal> = portfolio.loans.iter().filter_map(|l| l.ltv).collect();
    let ltv = portfolio.average_ltv.or_else(|| mean(&ltvs));
    let red_share = portfolio.zone_distribution.map(|z| z.red);

    breakdown.default_rate = default_rate;
    breakdown.default_rate_ratio = ratio(default_rate, targets.base_default_rate);
    breakdown.ltv = ltv;
    breakdown.ltv_ratio = ratio(ltv, targets.avg_loan_ltv);
    breakdown.red_zone_share = red_share;
    breakdown.red_zone_ratio = ratio(red_share, targets.zone_targets.red);

    let scores: Vec<Decimal> = [
        default_rate.map(|d| penalty_score(d, targets.base_default_rate)),
        ltv.map(|l| penalty_score(l, targets.avg_loan_ltv)),
        red_share.map(|r| penalty_score(r, targets.zone_targets.red)),
    ]
    .into_iter()
    .flatten()
    .collect();

    mean(&scores).map(clamp_score).unwrap_or(NEUTRAL_SCORE)
}

fn liquidity(summary: &SeriesSummary, breakdown: &mut HealthBreakdown) -> Decimal {
    breakdown.weighted_avg_distribution_year = summary.weighted_avg_distribution_year;
    breakdown.breakeven_index = summary.breakeven_index;

    let timing = summary
        .weighted_avg_distribution_year
        .map(|y| clamp_score(MAX_SCORE.saturating_sub(y.saturating_mul(dec!(10)))));
    let breakeven = if summary.total_capital_called > Decimal::ZERO {
        Some(match summary.breakeven_index {
            Some(i) => clamp_score(MAX_SCORE - Decimal::from(i) * dec!(10)),
            None => Decimal::ZERO,
        })
    } else {
        None
    };

    blend(&[(timing, dec!(0.6)), (breakeven, dec!(0.4))])
        .map(clamp_score)
        .unwrap_or(NEUTRAL_SCORE)
}

// ---------------------------------------------------------------------------
// Recommendations and insights
// ---------------------------------------------------------------------------

fn recommendations(
    result: &CanonicalResult,
    targets: &AnalyticsTargets,
    b: &HealthBreakdown,
    summary: &SeriesSummary,
) -> Vec<String> {
    let mut recs: Vec<String> = Vec::new();

    if let Some(actual) = result.portfolio_snapshot.zone_distribution {
        for zone in Zone::ALL {
            let deviation = actual.get(zone).saturating_sub(targets.zone_targets.get(zone));
            if deviation.abs() > ZONE_TOLERANCE {
                let (state, action) = if deviation > Decimal::ZERO {
                    ("over-allocated", "reduce")
                } else {
                    ("under-allocated", "increase")
                };
                recs.push(format!(
                    "Rebalance: {zone} zone is {state} at {} vs {} target; {action} exposure by {}.",
                    pct(actual.get(zone)),
                    pct(targets.zone_targets.get(zone)),
                    pct(deviation.abs()),
                ));
            }
        }
    }

    if let (Some(r), Some(irr)) = (b.irr_ratio, b.irr) {
        if r < RETURN_RATIO_FLOOR {
            recs.push(format!(
                "IRR of {} is below 90% of the {} target. Review pricing on new originations \
                 and the drag from idle capital.",
                pct(irr),
                pct(targets.target_irr),
            ));
        }
    }
    if let (Some(r), Some(multiple)) = (b.multiple_ratio, b.multiple) {
        if r < RETURN_RATIO_FLOOR {
            recs.push(format!(
                "Multiple of {:.2}x is below 90% of the {:.2}x target. Consider extending \
                 the reinvestment period or raising loan yields.",
                multiple, targets.target_multiple,
            ));
        }
    }
    if let (Some(r), Some(rate)) = (b.default_rate_ratio, b.default_rate) {
        if r > DEFAULT_RATIO_CEILING {
            recs.push(format!(
                "Default rate of {} exceeds the {} base assumption by more than 20%. \
                 Tighten underwriting and review red-zone originations.",
                pct(rate),
                pct(targets.base_default_rate),
            ));
        }
    }
    if let (Some(r), Some(ltv)) = (b.ltv_ratio, b.ltv) {
        if r > LTV_RATIO_CEILING {
            recs.push(format!(
                "Average LTV of {} is more than 10% above the {} target. Lower advance \
                 rates to rebuild collateral cushion.",
                pct(ltv),
                pct(targets.avg_loan_ltv),
            ));
        }
    }
    if let (Some(r), Some(share)) = (b.red_zone_ratio, b.red_zone_share) {
        if r > RED_ZONE_RATIO_CEILING {
            recs.push(format!(
                "Red-zone share of {} is more than 20% above the {} target. Cap new red-zone \
                 lending until concentration normalizes.",
                pct(share),
                pct(targets.zone_targets.red),
            ));
        }
    }
    if let Some(cv) = b.loan_size_cv {
        if cv > LOAN_SIZE_CV_CEILING {
            recs.push(format!(
                "Loan sizes are highly dispersed (CV {:.2}). Set a single-loan size limit \
                 to reduce concentration.",
                cv
            ));
        }
    }

    let half_term = Decimal::from(targets.fund_term_years) / dec!(2);
    match summary.breakeven_index {
        Some(i) if Decimal::from(i) > half_term => recs.push(format!(
            "Cash-flow breakeven at period {i} is beyond half the {}-year fund term. \
             Accelerate distributions or slow capital deployment.",
            targets.fund_term_years
        )),
        None if summary.total_capital_called > Decimal::ZERO
            && result
                .cash_flow_series
                .last()
                .map_or(false, |p| Decimal::from(p.index) > half_term) =>
        {
            recs.push(format!(
                "Fund has not reached cash-flow breakeven past half the {}-year term.",
                targets.fund_term_years
            ))
        }
        _ => {}
    }

    recs
}

fn insights(
    scores: [(&str, Decimal); 4],
    overall: Decimal,
    status: HealthStatus,
    b: &HealthBreakdown,
    summary: &SeriesSummary,
) -> Vec<String> {
    let mut out = vec![format!("Overall health {:.0}/100 ({}).", overall, status.label())];

    let strongest = scores.iter().max_by(|x, y| x.1.cmp(&y.1));
    let weakest = scores.iter().min_by(|x, y| x.1.cmp(&y.1));
    if let (Some(s), Some(w)) = (strongest, weakest) {
        if s.1 != w.1 {
            out.push(format!(
                "Strongest dimension: {} ({:.0}); weakest: {} ({:.0}).",
                s.0, s.1, w.0, w.1
            ));
        }
    }

    if let Some(dev) = b.zone_deviation {
        if dev <= ZONE_TOLERANCE / dec!(2) {
            out.push("Zone allocation is tracking targets closely.".to_string());
        }
    }
    if let Some(dpi) = b.dpi {
        if dpi >= Decimal::ONE {
            out.push(format!(
                "DPI of {:.2}x: all paid-in capital has been returned.",
                dpi
            ));
        } else if let Some(rvpi) = b.rvpi {
            out.push(format!(
                "{:.2}x realized (DPI) and {:.2}x unrealized (RVPI).",
                dpi, rvpi
            ));
        }
    }
    if let (Some(idx), Some(value)) = (summary.trough_index, summary.trough_value) {
        out.push(format!("J-curve trough of {:.0} at period {idx}.", value));
    }
    if let Some(year) = summary.weighted_avg_distribution_year {
        out.push(format!("Distributions are weighted toward year {:.1}.", year));
    }
    if summary.total_capital_called.is_zero() && summary.period_count == 0 {
        out.push("No cash-flow series available; liquidity scored neutral.".to_string());
    }

    out
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score a canonical result against targets.
pub fn score_health(
    result: &CanonicalResult,
    targets: &AnalyticsTargets,
) -> LoanFundResult<ComputationOutput<HealthScoreResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let mut breakdown = HealthBreakdown::default();

    let summary = summarize(&result.cash_flow_series);

    let diversification = diversification(result, targets, &mut breakdown);
    let performance = performance(result, targets, &mut breakdown);
    let risk = risk(result, targets, &mut breakdown);
    let liquidity = liquidity(&summary, &mut breakdown);

    if breakdown.zone_deviation.is_none() && breakdown.loan_size_cv.is_none() {
        warnings.push("diversification scored neutral: no zone distribution or loan amounts".into());
    }
    if breakdown.irr.is_none() && breakdown.multiple.is_none() && breakdown.dpi.is_none() && breakdown.rvpi.is_none() {
        warnings.push("performance scored neutral: no return metrics".into());
    }
    if breakdown.default_rate.is_none() && breakdown.ltv.is_none() && breakdown.red_zone_share.is_none() {
        warnings.push("risk scored neutral: no default, LTV or zone data".into());
    }
    if result.cash_flow_series.is_empty() {
        warnings.push("liquidity scored neutral: empty cash-flow series".into());
    }
    for (name, target) in [
        ("target_irr", targets.target_irr),
        ("target_multiple", targets.target_multiple),
        ("base_default_rate", targets.base_default_rate),
        ("avg_loan_ltv", targets.avg_loan_ltv),
    ] {
        if target <= Decimal::ZERO {
            warnings.push(format!("{name} is not positive; ratio terms scored all-or-nothing"));
        }
    }

    let overall = clamp_score(
        diversification * DIVERSIFICATION_WEIGHT
            + performance * PERFORMANCE_WEIGHT
            + risk * RISK_WEIGHT
            + liquidity * LIQUIDITY_WEIGHT,
    );
    let status = HealthStatus::from_score(overall);

    let recommendations = recommendations(result, targets, &breakdown, &summary);
    let insights = insights(
        [
            ("diversification", diversification),
            ("performance", performance),
            ("risk", risk),
            ("liquidity", liquidity),
        ],
        overall,
        status,
        &breakdown,
        &summary,
    );

    let output = HealthScoreResult {
        diversification: diversification.round_dp(2),
        performance: performance.round_dp(2),
        risk: risk.round_dp(2),
        liquidity: liquidity.round_dp(2),
        overall: overall.round_dp(2),
        status,
        breakdown,
        recommendations,
        insights,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Weighted composite health score (diversification 25%, performance 35%, risk 25%, liquidity 15%)",
        targets,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{build_canonical, LoanRecord};
    use crate::types::ZoneAllocation;
    use serde_json::json;

    fn empty() -> CanonicalResult {
        build_canonical(&json!({})).unwrap().result
    }

    fn in_range(x: Decimal) -> bool {
        x >= Decimal::ZERO && x <= MAX_SCORE
    }

    #[test]
    fn test_zero_zone_deviation_scores_100() {
        let mut r = empty();
        r.portfolio_snapshot.zone_distribution = Some(ZoneAllocation {
            green: dec!(0.6),
            orange: dec!(0.3),
            red: dec!(0.1),
        });
        let mut b = HealthBreakdown::default();
        let score = diversification(&r, &AnalyticsTargets::default(), &mut b);
        assert_eq!(b.zone_deviation, Some(Decimal::ZERO));
        assert_eq!(score, dec!(100));
    }

    #[test]
    fn test_empty_result_is_neutral() {
        let out = score_health(&empty(), &AnalyticsTargets::default()).unwrap();
        let h = out.result;
        assert_eq!(h.diversification, dec!(50));
        assert_eq!(h.performance, dec!(50));
        assert_eq!(h.risk, dec!(50));
        assert_eq!(h.liquidity, dec!(50));
        assert_eq!(h.overall, dec!(50));
        assert_eq!(h.status, HealthStatus::Fair);
        assert_eq!(out.warnings.len(), 4);
    }

    #[test]
    fn test_performance_formula_at_target() {
        let mut r = empty();
        r.metrics.fund_irr = Some(dec!(0.15));
        r.metrics.fund_multiple = Some(dec!(1.8));
        r.metrics.dpi = Some(dec!(0.5));
        r.metrics.rvpi = Some(dec!(1.2));
        r.metrics.years_elapsed = Some(dec!(5));
        let mut b = HealthBreakdown::default();
        let score = performance(&r, &AnalyticsTargets::default(), &mut b);
        // 40 + 30 + 15*0.5 + 30*0.5 = 92.5
        assert_eq!(b.dpi_weight, Some(dec!(0.5)));
        assert_eq!(score, dec!(92.5));
    }

    #[test]
    fn test_performance_renormalizes_missing_terms() {
        let mut r = empty();
        r.metrics.fund_irr = Some(dec!(0.075));
        let mut b = HealthBreakdown::default();
        // 20 of 40 points
        assert_eq!(performance(&r, &AnalyticsTargets::default(), &mut b), dec!(50));
    }

    #[test]
    fn test_risk_penalizes_excess_over_target() {
        let mut r = empty();
        r.portfolio_snapshot.default_rate = Some(dec!(0.03));
        let mut b = HealthBreakdown::default();
        // ratio 1.5 -> 50
        assert_eq!(risk(&r, &AnalyticsTargets::default(), &mut b), dec!(50));
        assert_eq!(b.default_rate_ratio, Some(dec!(1.5)));
    }

    #[test]
    fn test_liquidity_never_breaking_even() {
        let raw = json!({
            "cash_flows": [{ "year": 0, "capital_calls": 100 }, { "year": 1, "distributions": 20 }]
        });
        let r = build_canonical(&raw).unwrap().result;
        let summary = summarize(&r.cash_flow_series);
        let mut b = HealthBreakdown::default();
        // timing 100 - 10 = 90 at 0.6, breakeven 0 at 0.4
        assert_eq!(liquidity(&summary, &mut b), dec!(54));
    }

    #[test]
    fn test_pathological_targets_stay_clamped() {
        let mut r = empty();
        r.metrics.fund_irr = Some(dec!(5));
        r.metrics.fund_multiple = Some(dec!(-3));
        r.metrics.dpi = Some(dec!(40));
        r.metrics.rvpi = Some(dec!(-2));
        r.portfolio_snapshot.default_rate = Some(dec!(0.9));
        r.portfolio_snapshot.average_ltv = Some(dec!(0));
        r.portfolio_snapshot.zone_distribution = Some(ZoneAllocation {
            green: dec!(0),
            orange: dec!(0),
            red: dec!(1),
        });
        r.portfolio_snapshot.loans = vec![
            LoanRecord {
                loan_amount: Some(dec!(1)),
                ..LoanRecord::default()
            },
            LoanRecord {
                loan_amount: Some(dec!(1000000)),
                ..LoanRecord::default()
            },
        ];
        let zero_targets = AnalyticsTargets {
            target_irr: dec!(0),
            target_multiple: dec!(0),
            zone_targets: ZoneAllocation {
                green: dec!(0),
                orange: dec!(0),
                red: dec!(0),
            },
            avg_loan_ltv: dec!(0),
            base_default_rate: dec!(0),
            fund_term_years: 0,
            ..AnalyticsTargets::default()
        };
        for targets in [AnalyticsTargets::default(), zero_targets] {
            let h = score_health(&r, &targets).unwrap().result;
            for s in [h.diversification, h.performance, h.risk, h.liquidity, h.overall] {
                assert!(in_range(s), "score out of range: {s}");
            }
        }
    }

    #[test]
    fn test_widely_spread_loan_amounts_do_not_overflow() {
        let mut r = empty();
        r.portfolio_snapshot.loans = [dec!(1), dec!(1000000000000000), Decimal::MAX]
            .into_iter()
            .map(|amount| LoanRecord {
                loan_amount: Some(amount),
                ..LoanRecord::default()
            })
            .collect();
        let h = score_health(&r, &AnalyticsTargets::default()).unwrap().result;
        let cv = h.breakdown.loan_size_cv.unwrap();
        assert!(cv > LOAN_SIZE_CV_CEILING / dec!(2), "cv {cv}");
        for s in [h.diversification, h.performance, h.risk, h.liquidity, h.overall] {
            assert!(in_range(s), "score out of range: {s}");
        }
    }

    #[test]
    fn test_tiny_positive_target_saturates_ratio() {
        let mut r = empty();
        r.metrics.fund_irr = Some(dec!(1000000000));
        r.portfolio_snapshot.default_rate = Some(dec!(1000000000));
        let targets = AnalyticsTargets {
            target_irr: dec!(0.0000000000000000001),
            base_default_rate: dec!(0.0000000000000000001),
            ..AnalyticsTargets::default()
        };
        let h = score_health(&r, &targets).unwrap().result;
        assert_eq!(h.performance, dec!(100));
        assert_eq!(h.risk, Decimal::ZERO);
        assert_eq!(h.breakdown.irr_ratio, Some(RATIO_CAP));
        assert_eq!(h.breakdown.default_rate_ratio, Some(RATIO_CAP));
    }

    #[test]
    fn test_bounded_div_saturates_by_sign() {
        assert_eq!(bounded_div(Decimal::MAX, dec!(0.5)), RATIO_CAP);
        assert_eq!(bounded_div(Decimal::MIN, dec!(0.5)), -RATIO_CAP);
        assert_eq!(bounded_div(dec!(3), dec!(2)), dec!(1.5));
    }

    #[test]
    fn test_rebalancing_recommendation_names_zone() {
        let mut r = empty();
        r.portfolio_snapshot.zone_distribution = Some(ZoneAllocation {
            green: dec!(0.40),
            orange: dec!(0.35),
            red: dec!(0.25),
        });
        let h = score_health(&r, &AnalyticsTargets::default()).unwrap().result;
        assert!(h
            .recommendations
            .iter()
            .any(|s| s.contains("green zone is under-allocated") && s.contains("20.0%")));
        assert!(h
            .recommendations
            .iter()
            .any(|s| s.contains("red zone is over-allocated")));
        assert!(!h.recommendations.iter().any(|s| s.contains("orange zone")));
    }

    #[test]
    fn test_status_buckets() {
        assert_eq!(HealthStatus::from_score(dec!(80)), HealthStatus::Excellent);
        assert_eq!(HealthStatus::from_score(dec!(79.99)), HealthStatus::Good);
        assert_eq!(HealthStatus::from_score(dec!(40)), HealthStatus::Fair);
        assert_eq!(HealthStatus::from_score(dec!(39.9)), HealthStatus::NeedsAttention);
    }
}
