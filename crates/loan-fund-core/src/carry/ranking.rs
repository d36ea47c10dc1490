use std::cmp::Ordering;
use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::canonical::{LoanRecord, SimulationConfig, ZoneIrr};
use crate::error::LoanFundError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Zone};
use crate::LoanFundResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What to do with a loan whose IRR is neither reported nor covered by a
/// zone average.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingIrrPolicy {
    /// Substitute the per-zone default IRR
    #[default]
    ZoneDefault,
    /// Leave the loan out of the ranking
    Exclude,
}

/// Where a ranked loan's IRR came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrSource {
    Loan,
    ZoneAverage,
    ZoneDefault,
}

fn default_zone_irr() -> ZoneIrr {
    ZoneIrr {
        green: Some(dec!(0.10)),
        orange: Some(dec!(0.14)),
        red: Some(dec!(0.18)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingParams {
    pub hurdle_rate: Rate,
    pub carry_rate: Rate,
    pub top_n: usize,
    pub missing_irr: MissingIrrPolicy,
    /// Business-policy stand-ins, not derived data
    pub zone_default_irr: ZoneIrr,
}

impl Default for RankingParams {
    fn default() -> Self {
        RankingParams {
            hurdle_rate: dec!(0.08),
            carry_rate: dec!(0.20),
            top_n: 10,
            missing_irr: MissingIrrPolicy::ZoneDefault,
            zone_default_irr: default_zone_irr(),
        }
    }
}

impl RankingParams {
    /// Hurdle and carry from the echoed config, everything else default.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let defaults = RankingParams::default();
        RankingParams {
            hurdle_rate: config.hurdle_rate.unwrap_or(defaults.hurdle_rate),
            carry_rate: config.carry_rate.unwrap_or(defaults.carry_rate),
            ..defaults
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarryRankingEntry {
    pub loan_id: Option<String>,
    pub zone: Option<Zone>,
    pub irr: Rate,
    pub irr_source: IrrSource,
    pub loan_amount: Money,
    pub exit_year: Option<u32>,
    /// max(0, irr - hurdle) * loan_amount * carry_rate
    pub carry_contribution: Money,
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

fn resolve_irr(loan: &LoanRecord, zone_irr: &ZoneIrr, params: &RankingParams) -> Option<(Rate, IrrSource)> {
    if let Some(irr) = loan.irr {
        return Some((irr, IrrSource::Loan));
    }
    let zone = loan.zone?;
    if let Some(avg) = zone_irr.get(zone) {
        return Some((avg, IrrSource::ZoneAverage));
    }
    match params.missing_irr {
        MissingIrrPolicy::ZoneDefault => params
            .zone_default_irr
            .get(zone)
            .map(|d| (d, IrrSource::ZoneDefault)),
        MissingIrrPolicy::Exclude => None,
    }
}

fn by_contribution(a: &CarryRankingEntry, b: &CarryRankingEntry) -> Ordering {
    b.carry_contribution
        .cmp(&a.carry_contribution)
        .then_with(|| match (&a.loan_id, &b.loan_id) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Rank loans by estimated contribution to carried interest.
///
/// IRR per loan: reported value, then the zone average from results, then
/// (policy permitting) the zone default. Loans without an amount or any
/// usable IRR are excluded, never defaulted to zero.
pub fn rank_carry_contribution(
    loans: &[LoanRecord],
    zone_irr: &ZoneIrr,
    params: &RankingParams,
) -> LoanFundResult<ComputationOutput<Vec<CarryRankingEntry>>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if params.top_n == 0 {
        return Err(LoanFundError::InvalidInput {
            field: "top_n".into(),
            reason: "must be at least 1".into(),
        });
    }
    if params.carry_rate < Decimal::ZERO || params.carry_rate > Decimal::ONE {
        return Err(LoanFundError::InvalidInput {
            field: "carry_rate".into(),
            reason: "must be between 0 and 1".into(),
        });
    }

    let mut missing_amount = 0usize;
    let mut missing_irr = 0usize;
    let mut substituted = 0usize;
    let mut out_of_range = 0usize;

    let mut entries: Vec<CarryRankingEntry> = loans
        .iter()
        .filter_map(|loan| {
            let Some(amount) = loan.loan_amount else {
                missing_amount += 1;
                return None;
            };
            let Some((irr, irr_source)) = resolve_irr(loan, zone_irr, params) else {
                missing_irr += 1;
                return None;
            };
            let excess = irr.saturating_sub(params.hurdle_rate).max(Decimal::ZERO);
            let Some(carry_contribution) = excess
                .checked_mul(amount)
                .and_then(|gross| gross.checked_mul(params.carry_rate))
            else {
                out_of_range += 1;
                return None;
            };
            if irr_source != IrrSource::Loan {
                substituted += 1;
            }
            Some(CarryRankingEntry {
                loan_id: loan.loan_id.clone(),
                zone: loan.zone,
                irr,
                irr_source,
                loan_amount: amount,
                exit_year: loan.exit_year,
                carry_contribution,
            })
        })
        .collect();

    if missing_amount > 0 {
        warnings.push(format!("{missing_amount} loan(s) excluded: missing loan_amount"));
    }
    if missing_irr > 0 {
        warnings.push(format!("{missing_irr} loan(s) excluded: no resolvable IRR"));
    }
    if out_of_range > 0 {
        warnings.push(format!(
            "{out_of_range} loan(s) excluded: carry contribution exceeds the decimal range"
        ));
    }
    if substituted > 0 {
        warnings.push(format!(
            "{substituted} loan(s) ranked on a zone-level IRR instead of their own"
        ));
    }

    entries.sort_by(by_contribution);
    entries.truncate(params.top_n);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan-level carry contribution: max(0, IRR - hurdle) x amount x carry rate",
        params,
        warnings,
        elapsed,
        entries,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(id: &str, zone: Option<Zone>, amount: Option<Decimal>, irr: Option<Decimal>) -> LoanRecord {
        LoanRecord {
            loan_id: Some(id.to_string()),
            zone,
            loan_amount: amount,
            irr,
            exit_year: Some(5),
            ..LoanRecord::default()
        }
    }

    #[test]
    fn test_contribution_formula_and_order() {
        let loans = vec![
            loan("a", Some(Zone::Green), Some(dec!(1000)), Some(dec!(0.10))),
            loan("b", Some(Zone::Red), Some(dec!(1000)), Some(dec!(0.20))),
            loan("c", Some(Zone::Green), Some(dec!(5000)), Some(dec!(0.05))),
        ];
        let out = rank_carry_contribution(&loans, &ZoneIrr::default(), &RankingParams::default()).unwrap();
        let ids: Vec<_> = out.result.iter().map(|e| e.loan_id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        // (0.20 - 0.08) * 1000 * 0.2
        assert_eq!(out.result[0].carry_contribution, dec!(24));
        assert_eq!(out.result[2].carry_contribution, Decimal::ZERO);
    }

    #[test]
    fn test_irr_fallback_chain() {
        let zone_irr = ZoneIrr {
            orange: Some(dec!(0.13)),
            ..ZoneIrr::default()
        };
        let loans = vec![
            loan("own", Some(Zone::Orange), Some(dec!(100)), Some(dec!(0.3))),
            loan("avg", Some(Zone::Orange), Some(dec!(100)), None),
            loan("dflt", Some(Zone::Red), Some(dec!(100)), None),
            loan("none", None, Some(dec!(100)), None),
        ];
        let out = rank_carry_contribution(&loans, &zone_irr, &RankingParams::default()).unwrap();
        let source = |id: &str| {
            out.result
                .iter()
                .find(|e| e.loan_id.as_deref() == Some(id))
                .map(|e| (e.irr, e.irr_source))
        };
        assert_eq!(source("own"), Some((dec!(0.3), IrrSource::Loan)));
        assert_eq!(source("avg"), Some((dec!(0.13), IrrSource::ZoneAverage)));
        assert_eq!(source("dflt"), Some((dec!(0.18), IrrSource::ZoneDefault)));
        assert_eq!(source("none"), None);
        assert!(out.warnings.iter().any(|w| w.contains("no resolvable IRR")));
    }

    #[test]
    fn test_exclude_policy_drops_defaults() {
        let params = RankingParams {
            missing_irr: MissingIrrPolicy::Exclude,
            ..RankingParams::default()
        };
        let loans = vec![loan("x", Some(Zone::Green), Some(dec!(100)), None)];
        let out = rank_carry_contribution(&loans, &ZoneIrr::default(), &params).unwrap();
        assert!(out.result.is_empty());
    }

    #[test]
    fn test_missing_amount_excluded_not_zeroed() {
        let loans = vec![
            loan("x", Some(Zone::Green), None, Some(dec!(0.2))),
            loan("y", Some(Zone::Green), Some(dec!(10)), Some(dec!(0.2))),
        ];
        let out = rank_carry_contribution(&loans, &ZoneIrr::default(), &RankingParams::default()).unwrap();
        assert_eq!(out.result.len(), 1);
        assert!(out.warnings.iter().any(|w| w.contains("missing loan_amount")));
    }

    #[test]
    fn test_contribution_beyond_decimal_range_excluded() {
        let loans = vec![
            loan("huge", Some(Zone::Red), Some(Decimal::MAX), Some(dec!(10))),
            loan("ok", Some(Zone::Green), Some(dec!(1000)), Some(dec!(0.2))),
        ];
        let out = rank_carry_contribution(&loans, &ZoneIrr::default(), &RankingParams::default()).unwrap();
        let ids: Vec<_> = out.result.iter().map(|e| e.loan_id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["ok"]);
        assert!(out
            .warnings
            .iter()
            .any(|w| w.starts_with("1 loan(s) excluded: carry contribution")));
    }

    #[test]
    fn test_top_n_truncates_and_ties_break_by_id() {
        let loans: Vec<LoanRecord> = ["d", "b", "c", "a"]
            .iter()
            .map(|id| loan(id, Some(Zone::Green), Some(dec!(100)), Some(dec!(0.1))))
            .collect();
        let params = RankingParams {
            top_n: 2,
            ..RankingParams::default()
        };
        let out = rank_carry_contribution(&loans, &ZoneIrr::default(), &params).unwrap();
        let ids: Vec<_> = out.result.iter().map(|e| e.loan_id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_invalid_params() {
        let zero = RankingParams {
            top_n: 0,
            ..RankingParams::default()
        };
        assert!(matches!(
            rank_carry_contribution(&[], &ZoneIrr::default(), &zero),
            Err(LoanFundError::InvalidInput { .. })
        ));
        let over = RankingParams {
            carry_rate: dec!(1.5),
            ..RankingParams::default()
        };
        assert!(rank_carry_contribution(&[], &ZoneIrr::default(), &over).is_err());
    }
}
