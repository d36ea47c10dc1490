use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::score::ZONE_TOLERANCE;
use super::targets::AnalyticsTargets;
use crate::canonical::CanonicalResult;
use crate::types::{Money, Rate, Zone};

/// Actual vs target allocation for one risk zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneVariance {
    pub zone: Zone,
    pub actual: Option<Rate>,
    pub target: Rate,
    /// actual - target
    pub variance: Option<Rate>,
    pub within_tolerance: Option<bool>,
    pub loan_count: usize,
    pub loan_amount: Money,
    pub zone_irr: Option<Rate>,
}

/// Per-zone allocation variance against targets, green to red.
pub fn zone_variance(result: &CanonicalResult, targets: &AnalyticsTargets) -> Vec<ZoneVariance> {
    let portfolio = &result.portfolio_snapshot;

    Zone::ALL
        .iter()
        .map(|&zone| {
            let actual = portfolio.zone_distribution.map(|d| d.get(zone));
            let target = targets.zone_targets.get(zone);
            let variance = actual.map(|a| a.saturating_sub(target));
            let in_zone = portfolio.loans.iter().filter(|l| l.zone == Some(zone));

            ZoneVariance {
                zone,
                actual,
                target,
                variance,
                within_tolerance: variance.map(|v| v.abs() <= ZONE_TOLERANCE),
                loan_count: in_zone.clone().count(),
                loan_amount: in_zone
                    .filter_map(|l| l.loan_amount)
                    .fold(Decimal::ZERO, Decimal::saturating_add),
                zone_irr: portfolio.zone_irr.get(zone),
            }
        })
        .collect()
}
