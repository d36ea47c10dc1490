use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalResult;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::LoanFundResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// A return level (gross, fund, LP)
    Level,
    /// Signed change between two adjacent levels
    Delta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeStep {
    pub name: String,
    pub kind: StepKind,
    /// Level value, or the signed move from the previous level (negative = drag)
    pub value: Option<Decimal>,
}

/// Gross -> fund -> LP walk for one return measure.
///
/// Impacts are positive when they reduce returns. A `None` impact means an
/// operand was absent, never that the impact was zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnBridge {
    pub gross: Option<Decimal>,
    /// gross - fund
    pub management_fee_impact: Option<Decimal>,
    pub fund: Option<Decimal>,
    /// fund - lp
    pub carry_impact: Option<Decimal>,
    pub lp: Option<Decimal>,
    /// management_fee_impact + carry_impact
    pub total_drag: Option<Decimal>,
    pub steps: Vec<BridgeStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeAllocation {
    pub management_fees: Option<Money>,
    pub carried_interest: Option<Money>,
    pub total_fees: Option<Money>,
    /// |management| / (|management| + |carry|)
    pub management_fee_share: Option<Rate>,
    pub carry_share: Option<Rate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeImpactBridge {
    pub irr: ReturnBridge,
    pub multiple: ReturnBridge,
    pub allocation: FeeAllocation,
}

// ---------------------------------------------------------------------------
// Bridge construction
// ---------------------------------------------------------------------------

fn diff(a: Option<Decimal>, b: Option<Decimal>) -> Option<Decimal> {
    a?.checked_sub(b?)
}

/// Build the bridge for one measure from its three levels.
pub fn return_bridge(
    gross: Option<Decimal>,
    fund: Option<Decimal>,
    lp: Option<Decimal>,
    measure: &str,
) -> ReturnBridge {
    let management_fee_impact = diff(gross, fund);
    let carry_impact = diff(fund, lp);
    let total_drag = match (management_fee_impact, carry_impact) {
        (Some(mgmt), Some(carry)) => mgmt.checked_add(carry),
        _ => None,
    };

    let level = |name: &str, value| BridgeStep {
        name: format!("{name}_{measure}"),
        kind: StepKind::Level,
        value,
    };
    let delta = |name: &str, impact: Option<Decimal>| BridgeStep {
        name: name.to_string(),
        kind: StepKind::Delta,
        value: impact.map(|d| -d),
    };

    ReturnBridge {
        gross,
        management_fee_impact,
        fund,
        carry_impact,
        lp,
        total_drag,
        steps: vec![
            level("gross", gross),
            delta("management_fee_impact", management_fee_impact),
            level("fund", fund),
            delta("carry_impact", carry_impact),
            level("lp", lp),
        ],
    }
}

pub fn fee_allocation(management_fees: Option<Money>, carried_interest: Option<Money>) -> FeeAllocation {
    let total_fees = match (management_fees, carried_interest) {
        (Some(m), Some(c)) => m.abs().checked_add(c.abs()),
        _ => None,
    };
    let share = |amount: Option<Money>| match (amount, total_fees) {
        (Some(a), Some(t)) if t > Decimal::ZERO => Some(a.abs() / t),
        _ => None,
    };
    FeeAllocation {
        management_fees,
        carried_interest,
        total_fees,
        management_fee_share: share(management_fees),
        carry_share: share(carried_interest),
    }
}

/// Decompose the IRR and multiple waterfalls into fee and carry drag.
pub fn fee_impact_bridge(result: &CanonicalResult) -> LoanFundResult<ComputationOutput<FeeImpactBridge>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let m = &result.metrics;

    let irr = return_bridge(m.gross_irr, m.fund_irr, m.lp_irr, "irr");
    let multiple = return_bridge(m.gross_multiple, m.fund_multiple, m.lp_multiple, "multiple");

    let waterfall = result.waterfall_result.as_ref();
    let management_fees = m
        .total_management_fees
        .or_else(|| waterfall.and_then(|w| w.management_fees));
    let carried_interest = m
        .total_carried_interest
        .or_else(|| waterfall.and_then(|w| w.gp_carried_interest));
    let allocation = fee_allocation(management_fees, carried_interest);

    for (bridge, measure) in [(&irr, "IRR"), (&multiple, "multiple")] {
        if bridge.total_drag.is_none() {
            warnings.push(format!(
                "{measure} bridge incomplete: gross, fund and LP levels are not all present"
            ));
        }
    }
    if allocation.total_fees.is_none() {
        warnings.push("fee allocation unavailable: management fees or carry not reported".into());
    }
    if let Some(carry) = irr.carry_impact {
        if carry.is_sign_negative() && !carry.is_zero() {
            warnings.push("LP IRR exceeds fund IRR; carry impact is negative".into());
        }
    }

    let output = FeeImpactBridge {
        irr,
        multiple,
        allocation,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Gross to fund to LP return bridge (management fee and carry drag)",
        &serde_json::json!({
            "management_fee_impact": "gross - fund",
            "carry_impact": "fund - lp",
            "total_drag": "management_fee_impact + carry_impact",
            "allocation": "absolute amounts, management fees and carried interest",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
