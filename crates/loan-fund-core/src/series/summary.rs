//! Shape statistics of a reconstructed series: J-curve trough, cash-flow
//! breakeven, distribution timing and the series-implied IRR.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::periods::Period;
use crate::time_value;
use crate::types::{Money, Rate, Years};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub period_count: usize,
    pub total_capital_called: Money,
    pub total_distributed: Money,
    pub total_net: Money,
    /// Period with the most negative cumulative net cash flow
    pub trough_index: Option<u32>,
    pub trough_value: Option<Money>,
    /// First period at which cumulative net turns non-negative after capital was called
    pub breakeven_index: Option<u32>,
    /// Distribution-weighted average period index
    pub weighted_avg_distribution_year: Option<Years>,
    /// Per-period IRR implied by the net flows (gaps filled with zero)
    pub implied_periodic_irr: Option<Rate>,
}

/// Summarize a non-cumulative series.
pub fn summarize(periods: &[Period]) -> SeriesSummary {
    let mut cumulative_net = Decimal::ZERO;
    let mut cumulative_called = Decimal::ZERO;
    let mut trough: Option<(u32, Money)> = None;
    let mut breakeven_index = None;

    for p in periods {
        cumulative_net = cumulative_net.saturating_add(p.net);
        cumulative_called = cumulative_called.saturating_add(p.capital_called);

        if cumulative_net < Decimal::ZERO
            && trough.map_or(true, |(_, value)| cumulative_net < value)
        {
            trough = Some((p.index, cumulative_net));
        }
        if breakeven_index.is_none()
            && cumulative_called > Decimal::ZERO
            && cumulative_net >= Decimal::ZERO
        {
            breakeven_index = Some(p.index);
        }
    }

    let total_distributed: Money = periods
        .iter()
        .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.distributed));
    let weighted_avg_distribution_year = if total_distributed > Decimal::ZERO {
        let weighted: Decimal = periods
            .iter()
            .filter(|p| p.distributed > Decimal::ZERO)
            .fold(Decimal::ZERO, |acc, p| {
                acc.saturating_add(Decimal::from(p.index).saturating_mul(p.distributed))
            });
        weighted.checked_div(total_distributed)
    } else {
        None
    };

    SeriesSummary {
        period_count: periods.len(),
        total_capital_called: cumulative_called,
        total_distributed,
        total_net: cumulative_net,
        trough_index: trough.map(|(index, _)| index),
        trough_value: trough.map(|(_, value)| value),
        breakeven_index,
        weighted_avg_distribution_year,
        implied_periodic_irr: implied_irr(periods),
    }
}

const MAX_IRR_SPAN: usize = 1200;

fn implied_irr(periods: &[Period]) -> Option<Rate> {
    let first = periods.iter().map(|p| p.index).min()? as usize;
    let last = periods.iter().map(|p| p.index).max()? as usize;
    if last - first >= MAX_IRR_SPAN {
        return None;
    }
    let mut flows = vec![Decimal::ZERO; last - first + 1];
    for p in periods {
        let slot = &mut flows[p.index as usize - first];
        *slot = slot.saturating_add(p.net);
    }
    time_value::irr(&flows, dec!(0.10)).ok()
}
