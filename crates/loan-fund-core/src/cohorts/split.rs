use std::time::Instant;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::LoanFundError;
use crate::series::Period;
use crate::types::{with_metadata, ComputationOutput};
use crate::LoanFundResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Active loans by origination pathway for one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortSplit {
    /// Loans from the initial deployment still outstanding
    pub active_original: u32,
    /// Loans funded from recycled proceeds still outstanding
    pub active_reinvested: u32,
    /// True when the raw reconstruction disagreed with the reported total and was rescaled
    pub reconciled: bool,
}

impl CohortSplit {
    pub fn total(&self) -> u32 {
        self.active_original.saturating_add(self.active_reinvested)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortRow {
    pub index: u32,
    /// `None` when a required counter could not be resolved
    pub split: Option<CohortSplit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortReport {
    pub initial_original_count: u32,
    pub rows: Vec<CohortRow>,
    pub reconciled_periods: usize,
    pub unresolved_periods: usize,
}

// ---------------------------------------------------------------------------
// Reconstruction
// ---------------------------------------------------------------------------

/// Exits of original and reinvested loans in one period.
///
/// Either split counter may be derived from `exited_loans` minus the other.
/// When neither is reported, exits are attributed to the original vintage
/// only while no reinvested loans are outstanding.
fn period_exits(period: &Period, reinvested_outstanding: i64) -> Option<(u32, u32)> {
    match (
        period.exited_original,
        period.exited_reinvested,
        period.exited_loans,
    ) {
        (Some(original), Some(reinvested), _) => Some((original, reinvested)),
        (Some(original), None, Some(total)) => Some((original, total.saturating_sub(original))),
        (None, Some(reinvested), Some(total)) => {
            Some((total.saturating_sub(reinvested), reinvested))
        }
        (Some(original), None, None) if reinvested_outstanding == 0 => Some((original, 0)),
        (None, None, Some(total)) if reinvested_outstanding == 0 => Some((total, 0)),
        _ => None,
    }
}

/// Force `original + reinvested` to equal the reported total.
///
/// Proportional rescaling is an approximation: it cannot recover the true
/// vintage split when the producer's counters are inconsistent.
fn reconcile(original: u32, reinvested: u32, authoritative: u32) -> CohortSplit {
    let computed = u64::from(original) + u64::from(reinvested);
    if computed == u64::from(authoritative) {
        return CohortSplit {
            active_original: original,
            active_reinvested: reinvested,
            reconciled: false,
        };
    }
    if computed == 0 {
        return CohortSplit {
            active_original: authoritative,
            active_reinvested: 0,
            reconciled: true,
        };
    }

    let scaled = Decimal::from(original) * Decimal::from(authoritative) / Decimal::from(computed);
    let active_original = scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(authoritative)
        .min(authoritative);

    CohortSplit {
        active_original,
        active_reinvested: authoritative - active_original,
        reconciled: true,
    }
}

/// Split each period's active loans into original and reinvested cohorts.
///
/// Position 0 of `series` is the base case (all loans original). Later
/// positions accumulate exits and reinvestments over positions `1..=i`, so the
/// series should not have inactive periods filtered out. Every resolved split
/// satisfies `active_original + active_reinvested == active_loans`.
///
/// A missing flow counter makes its period and every later one `None`, since
/// the running sums are unknown from that point. A missing `active_loans`
/// only affects its own period.
pub fn split_cohorts(series: &[Period], initial_original_count: u32) -> Vec<CohortRow> {
    let initial = i64::from(initial_original_count);
    let mut cum_exited_original: i64 = 0;
    let mut cum_reinvestments: i64 = 0;
    let mut cum_exited_reinvested: i64 = 0;
    let mut flows_known = true;

    series
        .iter()
        .enumerate()
        .map(|(position, period)| {
            if position > 0 && flows_known {
                let outstanding = cum_reinvestments - cum_exited_reinvested;
                match (period.reinvestments, period_exits(period, outstanding)) {
                    (Some(reinvested), Some((exited_original, exited_reinvested))) => {
                        cum_reinvestments += i64::from(reinvested);
                        cum_exited_original += i64::from(exited_original);
                        cum_exited_reinvested += i64::from(exited_reinvested);
                    }
                    _ => flows_known = false,
                }
            }

            let split = if flows_known {
                let original = (initial - cum_exited_original).max(0);
                let reinvested = (cum_reinvestments - cum_exited_reinvested).max(0);
                match (
                    period.active_loans,
                    u32::try_from(original),
                    u32::try_from(reinvested),
                ) {
                    (Some(authoritative), Ok(original), Ok(reinvested)) => {
                        Some(reconcile(original, reinvested, authoritative))
                    }
                    _ => None,
                }
            } else {
                None
            };

            CohortRow {
                index: period.index,
                split,
            }
        })
        .collect()
}

/// Cohort reconstruction wrapped in the standard envelope.
///
/// Without an explicit initial count the first period's `active_loans` is used.
pub fn reconstruct_cohorts(
    series: &[Period],
    initial_original_count: Option<u32>,
) -> LoanFundResult<ComputationOutput<CohortReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if series.is_empty() {
        return Err(LoanFundError::InsufficientData(
            "cohort reconstruction requires at least one period".into(),
        ));
    }

    let initial = match initial_original_count {
        Some(n) => n,
        None => {
            let first = series[0].active_loans.ok_or_else(|| {
                LoanFundError::InsufficientData(
                    "initial loan count not given and first period has no active_loans".into(),
                )
            })?;
            warnings.push(format!(
                "initial original count taken from period {} active_loans ({first})",
                series[0].index
            ));
            first
        }
    };

    let rows = split_cohorts(series, initial);
    let reconciled_periods = rows
        .iter()
        .filter(|r| r.split.map_or(false, |s| s.reconciled))
        .count();
    let unresolved_periods = rows.iter().filter(|r| r.split.is_none()).count();

    if let Some(first_unresolved) = rows.iter().find(|r| r.split.is_none()) {
        warnings.push(format!(
            "{unresolved_periods} period(s) without a cohort split, first at index {}",
            first_unresolved.index
        ));
    }
    if reconciled_periods > 0 {
        warnings.push(format!(
            "{reconciled_periods} period(s) rescaled to match reported active_loans"
        ));
    }

    let report = CohortReport {
        initial_original_count: initial,
        rows,
        reconciled_periods,
        unresolved_periods,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Original vs reinvested cohort reconstruction with proportional reconciliation",
        &serde_json::json!({
            "initial_original_count": initial,
            "base_case": "first period: all active loans original",
            "reconciliation": "proportional rescale, original rounded half away from zero",
            "unexplained_active_loans": "attributed to original vintage",
        }),
        warnings,
        elapsed,
        report,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn period(index: u32, active: Option<u32>) -> Period {
        Period {
            index,
            capital_called: Decimal::ZERO,
            distributed: Decimal::ZERO,
            net: Decimal::ZERO,
            active_loans: active,
            exited_loans: None,
            new_loans: None,
            defaulted_loans: None,
            reinvestments: Some(0),
            exited_original: Some(0),
            exited_reinvested: Some(0),
        }
    }

    fn flows(mut p: Period, exited_original: u32, reinvestments: u32, exited_reinvested: u32) -> Period {
        p.exited_original = Some(exited_original);
        p.reinvestments = Some(reinvestments);
        p.exited_reinvested = Some(exited_reinvested);
        p
    }

    #[test]
    fn test_base_case_all_original() {
        let rows = split_cohorts(&[period(0, Some(400))], 400);
        assert_eq!(
            rows[0].split,
            Some(CohortSplit {
                active_original: 400,
                active_reinvested: 0,
                reconciled: false
            })
        );
    }

    #[test]
    fn test_reconciles_385_to_390() {
        // 400 - 20 exited + 5 reinvested = 385 computed, 390 reported
        let series = vec![
            period(0, Some(400)),
            flows(period(1, Some(390)), 20, 5, 0),
        ];
        let split = split_cohorts(&series, 400)[1].split.unwrap();
        assert_eq!(split.total(), 390);
        assert!(split.reconciled);
        // 380 * 390 / 385 = 384.94 -> 385
        assert_eq!(split.active_original, 385);
        assert_eq!(split.active_reinvested, 5);
    }

    #[test]
    fn test_running_sums_without_reconciliation() {
        let series = vec![
            period(0, Some(100)),
            flows(period(1, Some(95)), 10, 5, 0),
            flows(period(2, Some(93)), 4, 3, 1),
        ];
        let rows = split_cohorts(&series, 100);
        let s2 = rows[2].split.unwrap();
        assert_eq!(s2.active_original, 86);
        assert_eq!(s2.active_reinvested, 7);
        assert!(!s2.reconciled);
    }

    #[test]
    fn test_zero_computed_assigns_all_to_original() {
        let series = vec![period(0, Some(10)), flows(period(1, Some(4)), 10, 0, 0)];
        let split = split_cohorts(&series, 10)[1].split.unwrap();
        assert_eq!(split.active_original, 4);
        assert_eq!(split.active_reinvested, 0);
        assert!(split.reconciled);
    }

    #[test]
    fn test_counts_near_u32_max_reconcile_without_overflow() {
        let series = vec![
            period(0, Some(100)),
            flows(period(1, Some(100)), 0, 5, 0),
        ];
        let split = split_cohorts(&series, u32::MAX)[1].split.unwrap();
        assert_eq!(split.total(), 100);
        assert!(split.reconciled);
        assert_eq!(reconcile(u32::MAX, u32::MAX, 10).total(), 10);
    }

    #[test]
    fn test_over_exit_clamped_to_zero() {
        let series = vec![period(0, Some(5)), flows(period(1, Some(2)), 9, 2, 0)];
        let split = split_cohorts(&series, 5)[1].split.unwrap();
        assert_eq!(split.active_original, 0);
        assert_eq!(split.active_reinvested, 2);
    }

    #[test]
    fn test_missing_flow_counter_poisons_later_rows() {
        let mut broken = period(2, Some(90));
        broken.reinvestments = None;
        let series = vec![
            period(0, Some(100)),
            flows(period(1, Some(95)), 5, 0, 0),
            broken,
            period(3, Some(90)),
        ];
        let rows = split_cohorts(&series, 100);
        assert!(rows[1].split.is_some());
        assert!(rows[2].split.is_none());
        assert!(rows[3].split.is_none());
    }

    #[test]
    fn test_missing_active_loans_nulls_only_that_row() {
        let series = vec![
            period(0, Some(100)),
            flows(period(1, None), 5, 0, 0),
            flows(period(2, Some(92)), 3, 0, 0),
        ];
        let rows = split_cohorts(&series, 100);
        assert!(rows[1].split.is_none());
        assert_eq!(rows[2].split.map(|s| s.active_original), Some(92));
    }

    #[test]
    fn test_exit_split_derived_from_total() {
        let mut p1 = flows(period(1, Some(97)), 0, 2, 0);
        p1.exited_original = None;
        p1.exited_reinvested = None;
        p1.exited_loans = Some(5);
        let mut p2 = period(2, Some(96));
        p2.exited_original = None;
        p2.exited_reinvested = Some(1);
        p2.exited_loans = Some(1);
        let rows = split_cohorts(&[period(0, Some(100)), p1, p2], 100);
        let s1 = rows[1].split.unwrap();
        assert_eq!((s1.active_original, s1.active_reinvested), (95, 2));
        let s2 = rows[2].split.unwrap();
        assert_eq!((s2.active_original, s2.active_reinvested), (95, 1));
    }

    #[test]
    fn test_ambiguous_exits_with_reinvested_outstanding_are_unresolved() {
        let p1 = flows(period(1, Some(102)), 0, 2, 0);
        let mut p2 = period(2, Some(101));
        p2.exited_original = None;
        p2.exited_reinvested = None;
        p2.exited_loans = Some(1);
        let rows = split_cohorts(&[period(0, Some(100)), p1, p2], 100);
        assert!(rows[1].split.is_some());
        assert!(rows[2].split.is_none());
    }

    #[test]
    fn test_invariant_holds_for_every_resolved_row() {
        let series: Vec<Period> = (0..12)
            .map(|i| flows(period(i, Some(200 - i * 3)), i % 4, i % 3, i % 2))
            .collect();
        for (row, p) in split_cohorts(&series, 200).iter().zip(&series) {
            if let Some(split) = row.split {
                assert_eq!(Some(split.total()), p.active_loans);
            }
        }
    }

    #[test]
    fn test_envelope_falls_back_to_first_active_count() {
        let series = vec![period(0, Some(50)), flows(period(1, Some(48)), 2, 0, 0)];
        let out = reconstruct_cohorts(&series, None).unwrap();
        assert_eq!(out.result.initial_original_count, 50);
        assert_eq!(out.result.unresolved_periods, 0);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_envelope_requires_some_initial_count() {
        assert!(matches!(
            reconstruct_cohorts(&[period(0, None)], None),
            Err(LoanFundError::InsufficientData(_))
        ));
        assert!(reconstruct_cohorts(&[], Some(10)).is_err());
    }
}
