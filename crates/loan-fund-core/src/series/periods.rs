use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fields::*;
use super::shape::index_records;
use crate::resolver::{resolve, resolve_count, resolve_decimal, FieldPath};
use crate::types::Money;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Time bucket of the reconstructed series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Yearly,
    Monthly,
}

impl Granularity {
    /// Sub-collection key used by producers that split by granularity.
    pub fn key(&self) -> &'static str {
        match self {
            Granularity::Yearly => "yearly",
            Granularity::Monthly => "monthly",
        }
    }

    fn periods_per_year(&self) -> u32 {
        match self {
            Granularity::Yearly => 1,
            Granularity::Monthly => 12,
        }
    }
}

/// Options for [`to_series`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesOptions {
    pub granularity: Granularity,
    /// Replace cash fields with running sums
    pub cumulative: bool,
    /// Drop periods with no capital call, distribution or net flow
    pub drop_inactive: bool,
    /// Fund-term bound in years; falls back to the payload's config echo
    pub fund_term_years: Option<u32>,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        SeriesOptions {
            granularity: Granularity::Yearly,
            cumulative: false,
            drop_inactive: true,
            fund_term_years: None,
        }
    }
}

/// One time bucket of cash-flow and portfolio activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    /// 0-based period number (year or month)
    pub index: u32,
    /// Capital called, as a non-negative magnitude
    pub capital_called: Money,
    /// Distributions paid
    pub distributed: Money,
    /// Net cash flow; producer value when reported, else distributed - capital_called
    pub net: Money,
    pub active_loans: Option<u32>,
    pub exited_loans: Option<u32>,
    pub new_loans: Option<u32>,
    pub defaulted_loans: Option<u32>,
    pub reinvestments: Option<u32>,
    pub exited_original: Option<u32>,
    pub exited_reinvested: Option<u32>,
}

// ---------------------------------------------------------------------------
// Reconstruction
// ---------------------------------------------------------------------------

fn first_decimal(records: &[&Value], path: &FieldPath) -> Option<Decimal> {
    records.iter().find_map(|r| resolve_decimal(r, path))
}

fn first_count(records: &[&Value], path: &FieldPath) -> Option<u32> {
    records.iter().find_map(|r| resolve_count(r, path))
}

fn is_nil(value: Option<Decimal>) -> bool {
    value.map_or(true, |v| v.is_zero())
}

fn build_period(index: u32, records: &[&Value], drop_inactive: bool) -> Option<Period> {
    // Producers disagree on the sign of capital calls; hold them negative.
    let calls = first_decimal(records, &CAPITAL_CALLED).map(|c| -c.abs());
    let distributed = first_decimal(records, &DISTRIBUTED);
    let reported_net = first_decimal(records, &NET);

    if drop_inactive && is_nil(calls) && is_nil(distributed) && is_nil(reported_net) {
        return None;
    }

    let calls = calls.unwrap_or(Decimal::ZERO);
    let distributed = distributed.unwrap_or(Decimal::ZERO);
    let net = reported_net.unwrap_or_else(|| distributed.saturating_add(calls));

    Some(Period {
        index,
        capital_called: -calls,
        distributed,
        net,
        active_loans: first_count(records, &ACTIVE_LOANS),
        exited_loans: first_count(records, &EXITED_LOANS),
        new_loans: first_count(records, &NEW_LOANS),
        defaulted_loans: first_count(records, &DEFAULTED_LOANS),
        reinvestments: first_count(records, &REINVESTMENTS),
        exited_original: first_count(records, &EXITED_ORIGINAL),
        exited_reinvested: first_count(records, &EXITED_REINVESTED),
    })
}

/// Reconstruct an ordered period series from a raw result payload.
///
/// Cash-flow records are merged by index with portfolio-evolution records;
/// the cash-flow record wins when both carry a fact. Deterministic and free
/// of hidden state, so repeated calls yield identical output.
pub fn to_series(raw: &Value, options: &SeriesOptions) -> Vec<Period> {
    let granularity = options.granularity;
    let cash = resolve(raw, &CASH_FLOWS)
        .map(|c| index_records(c, granularity))
        .unwrap_or_default();
    let evolution = resolve(raw, &PORTFOLIO_EVOLUTION)
        .map(|c| index_records(c, granularity))
        .unwrap_or_default();

    let mut merged: BTreeMap<u32, Vec<&Value>> = BTreeMap::new();
    for (index, record) in cash.into_iter().chain(evolution) {
        merged.entry(index).or_default().push(record);
    }

    let term = options
        .fund_term_years
        .or_else(|| resolve_count(raw, &FUND_TERM));
    let bound = term.map(|years| years.saturating_mul(granularity.periods_per_year()));

    let periods: Vec<Period> = merged
        .into_iter()
        .filter(|(index, _)| bound.map_or(true, |b| *index <= b))
        .filter_map(|(index, records)| build_period(index, &records, options.drop_inactive))
        .collect();

    if options.cumulative {
        cumulative(&periods)
    } else {
        periods
    }
}

/// Running sums of the cash fields, starting from zero and saturating at the
/// Decimal range. Loan counters are
/// stocks or per-period flows and are carried through unchanged.
pub fn cumulative(periods: &[Period]) -> Vec<Period> {
    let mut called = Decimal::ZERO;
    let mut distributed = Decimal::ZERO;
    let mut net = Decimal::ZERO;

    periods
        .iter()
        .map(|p| {
            called = called.saturating_add(p.capital_called);
            distributed = distributed.saturating_add(p.distributed);
            net = net.saturating_add(p.net);
            Period {
                capital_called: called,
                distributed,
                net,
                ..p.clone()
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
