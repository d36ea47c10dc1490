use loan_fund_core::canonical::build_canonical;
use loan_fund_core::carry::{rank_carry_contribution, IrrSource, RankingParams};
use loan_fund_core::cohorts::reconstruct_cohorts;
use loan_fund_core::fees::{fee_impact_bridge, StepKind};
use loan_fund_core::health::{score_health, AnalyticsTargets, HealthStatus};
use loan_fund_core::report::{analyze, AnalysisOptions};
use loan_fund_core::series::{to_series, SeriesOptions};
use loan_fund_core::LoanFundError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn unfiltered() -> SeriesOptions {
    SeriesOptions {
        drop_inactive: false,
        ..SeriesOptions::default()
    }
}

// ===========================================================================
// Cohort reconstruction
// ===========================================================================

#[test]
fn test_cohorts_reconcile_to_reported_active_loans() {
    let raw = json!({
        "portfolio_evolution": [
            { "year": 0, "active_loans": 400 },
            { "year": 1, "active_loans": 390, "exited_loans": 20, "reinvestments": 5 },
            { "year": 2, "active_loans": 380, "exited_original": 10, "exited_reinvested": 0, "reinvestments": 0 }
        ]
    });
    let series = to_series(&raw, &unfiltered());
    let out = reconstruct_cohorts(&series, Some(400)).unwrap();
    let rows = &out.result.rows;

    let base = rows[0].split.unwrap();
    assert_eq!((base.active_original, base.active_reinvested), (400, 0));

    // computed 380 + 5 = 385, rescaled to 390
    let year1 = rows[1].split.unwrap();
    assert_eq!((year1.active_original, year1.active_reinvested), (385, 5));
    assert!(year1.reconciled);

    // computed 370 + 5 = 375, rescaled to 380
    let year2 = rows[2].split.unwrap();
    assert_eq!(year2.total(), 380);
    assert_eq!(out.result.reconciled_periods, 2);
}

#[test]
fn test_cohort_gap_poisons_later_periods() {
    let raw = json!({
        "portfolio_evolution": [
            { "year": 0, "active_loans": 10 },
            { "year": 1, "active_loans": 10 },
            { "year": 2, "active_loans": 9, "exited_loans": 1, "reinvestments": 0 }
        ]
    });
    let series = to_series(&raw, &unfiltered());
    let out = reconstruct_cohorts(&series, None).unwrap();
    let resolved: Vec<bool> = out.result.rows.iter().map(|r| r.split.is_some()).collect();
    assert_eq!(resolved, vec![true, false, false]);
    assert_eq!(out.result.initial_original_count, 10);
    assert!(out.warnings.iter().any(|w| w.contains("first at index 1")));
}

#[test]
fn test_cohorts_need_a_series() {
    assert!(matches!(
        reconstruct_cohorts(&[], Some(100)),
        Err(LoanFundError::InsufficientData(_))
    ));
}

// ===========================================================================
// Fee-impact bridge
// ===========================================================================

#[test]
fn test_bridge_reconciles_gross_to_lp() {
    let r = build_canonical(&json!({
        "metrics": {
            "gross_irr": 0.18, "fund_irr": 0.15, "lp_irr": 0.12,
            "gross_multiple": 2.0, "fund_multiple": 1.8, "lp_multiple": 1.6,
            "management_fees": 2000000, "carried_interest": 6000000
        }
    }))
    .unwrap()
    .result;
    let out = fee_impact_bridge(&r).unwrap();
    let irr = &out.result.irr;
    assert_eq!(irr.management_fee_impact, Some(dec!(0.03)));
    assert_eq!(irr.carry_impact, Some(dec!(0.03)));
    assert_eq!(irr.gross.unwrap() - irr.total_drag.unwrap(), irr.lp.unwrap());
    assert_eq!(out.result.multiple.total_drag, Some(dec!(0.4)));
    assert_eq!(out.result.allocation.carry_share, Some(dec!(0.75)));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_bridge_missing_level_propagates_null() {
    let r = build_canonical(&json!({ "metrics": { "gross_irr": 0.18, "lp_irr": 0.12 } }))
        .unwrap()
        .result;
    let out = fee_impact_bridge(&r).unwrap();
    let irr = &out.result.irr;
    assert_eq!(irr.management_fee_impact, None);
    assert_eq!(irr.carry_impact, None);
    assert_eq!(irr.total_drag, None);
    assert_eq!(irr.steps.len(), 5);
    assert_eq!(irr.steps[1].kind, StepKind::Delta);
    assert_eq!(irr.steps[1].value, None);
    assert!(out.warnings.iter().any(|w| w.starts_with("IRR bridge incomplete")));
}

// ===========================================================================
// Health score
// ===========================================================================

#[test]
fn test_on_target_allocation_scores_full_diversification() {
    let r = build_canonical(&json!({
        "portfolio": { "zone_distribution": { "green": 0.6, "orange": 0.3, "red": 0.1 } }
    }))
    .unwrap()
    .result;
    let out = score_health(&r, &AnalyticsTargets::default()).unwrap();
    assert_eq!(out.result.diversification, dec!(100));
    assert_eq!(out.result.breakdown.zone_deviation, Some(Decimal::ZERO));
}

#[test]
fn test_extreme_inputs_stay_in_bounds() {
    let r = build_canonical(&json!({
        "metrics": { "fund_irr": 5.0, "fund_multiple": 40, "dpi": 3 },
        "portfolio": {
            "default_rate": 10,
            "avg_ltv": 3,
            "zone_distribution": { "green": 0, "orange": 0, "red": 1 }
        }
    }))
    .unwrap()
    .result;
    let h = score_health(&r, &AnalyticsTargets::default()).unwrap().result;
    for score in [h.diversification, h.performance, h.risk, h.liquidity, h.overall] {
        assert!(score >= Decimal::ZERO && score <= dec!(100), "score out of range: {score}");
    }
    assert_eq!(h.performance, dec!(100));
    assert_eq!(h.risk, Decimal::ZERO);
}

#[test]
fn test_huge_loan_amounts_and_tiny_target_stay_in_bounds() {
    let r = build_canonical(&json!({
        "metrics": { "fund_irr": 1000000000 },
        "portfolio": {
            "loans": [
                { "id": "small", "amount": 1 },
                { "id": "large", "amount": 1000000000000000u64 }
            ]
        }
    }))
    .unwrap()
    .result;
    let targets = AnalyticsTargets {
        target_irr: dec!(0.0000000000000000001),
        ..AnalyticsTargets::default()
    };
    let h = score_health(&r, &targets).unwrap().result;
    for score in [h.diversification, h.performance, h.risk, h.liquidity, h.overall] {
        assert!(score >= Decimal::ZERO && score <= dec!(100), "score out of range: {score}");
    }
    assert_eq!(h.performance, dec!(100));
    assert!(h.breakdown.loan_size_cv.is_some());
}

#[test]
fn test_strong_fund_is_excellent() {
    let r = build_canonical(&json!({
        "metrics": { "fund_irr": 0.18, "fund_multiple": 2.1, "dpi": 1.2, "years_elapsed": 10 },
        "portfolio": {
            "default_rate": 0.01,
            "avg_ltv": 0.55,
            "zone_distribution": { "green": 0.62, "orange": 0.30, "red": 0.08 }
        },
        "cash_flows": [
            { "year": 0, "capital_calls": 100 },
            { "year": 1, "distributions": 60 },
            { "year": 2, "distributions": 80 }
        ]
    }))
    .unwrap()
    .result;
    let h = score_health(&r, &AnalyticsTargets::default()).unwrap().result;
    assert!(h.overall >= dec!(80), "overall {}", h.overall);
    assert_eq!(h.status, HealthStatus::Excellent);
    assert!(h.recommendations.is_empty(), "{:?}", h.recommendations);
}

// ===========================================================================
// Carry ranking
// ===========================================================================

#[test]
fn test_carry_ranking_from_canonical_loans() {
    let r = build_canonical(&json!({
        "portfolio": {
            "zone_irr": { "orange": 0.16 },
            "loans": [
                { "id": "A", "zone": "green", "amount": 200000, "irr": 0.11 },
                { "id": "B", "zone": "orange", "amount": 300000 },
                { "id": "C", "zone": "red", "amount": 100000, "irr": 0.06 }
            ]
        }
    }))
    .unwrap()
    .result;
    let out = rank_carry_contribution(
        &r.portfolio_snapshot.loans,
        &r.portfolio_snapshot.zone_irr,
        &RankingParams::default(),
    )
    .unwrap();
    let ranked = &out.result;
    assert_eq!(ranked[0].loan_id.as_deref(), Some("B"));
    assert_eq!(ranked[0].irr_source, IrrSource::ZoneAverage);
    // (0.16 - 0.08) * 300000 * 0.2
    assert_eq!(ranked[0].carry_contribution, dec!(4800));
    // below hurdle contributes nothing
    assert_eq!(ranked[2].carry_contribution, Decimal::ZERO);
}

// ===========================================================================
// Full analysis
// ===========================================================================

#[test]
fn test_analyze_runs_every_component() {
    let raw = json!({
        "status": "completed",
        "metrics": { "gross_irr": 0.17, "fund_irr": 0.15, "lp_irr": 0.13, "dpi": 0.8, "rvpi": 0.6 },
        "portfolio": {
            "zone_distribution": { "green": 0.45, "orange": 0.3, "red": 0.25 },
            "loans": [{ "id": "L1", "zone": "green", "amount": 1000, "irr": 0.12 }]
        },
        "config": { "fund_term": 5, "num_loans": 20 },
        "portfolio_evolution": [
            { "year": 0, "active_loans": 20 },
            { "year": 1, "active_loans": 21, "exited_loans": 2, "reinvestments": 3 }
        ],
        "cash_flows": [
            { "year": 0, "capital_calls": 100 },
            { "year": 1, "distributions": 30 }
        ]
    });
    let out = analyze(&raw, &AnalysisOptions::default()).unwrap();
    let report = &out.result;

    let cohorts = report.cohorts.as_ref().unwrap();
    assert_eq!(cohorts.initial_original_count, 20);
    let year1 = cohorts.rows[1].split.unwrap();
    assert_eq!((year1.active_original, year1.active_reinvested), (18, 3));

    assert_eq!(report.fee_bridge.irr.total_drag, Some(dec!(0.04)));
    assert_eq!(report.zone_variance.len(), 3);
    assert_eq!(report.carry_ranking.len(), 1);
    assert_eq!(report.series_summary.period_count, 2);
    assert!(report
        .health
        .recommendations
        .iter()
        .any(|r| r.contains("red zone is over-allocated")));
}
