use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::series::Period;
use crate::types::*;

// ---------------------------------------------------------------------------
// Canonical result
// ---------------------------------------------------------------------------

/// Stable, fully-resolved view of one simulation run.
///
/// Every fact the producer did not supply is `None` (serialized as `null`),
/// so consumers can tell "resolved to empty" apart from "not computed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalResult {
    pub run_id: Option<String>,
    pub status: Option<String>,
    /// Completion fraction for in-flight runs (0..1)
    pub progress: Option<Rate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub metrics: FundMetrics,
    /// Yearly, non-cumulative, activity-filtered
    pub cash_flow_series: Vec<Period>,
    pub portfolio_snapshot: PortfolioSnapshot,
    pub waterfall_result: Option<WaterfallResult>,
    pub monte_carlo_result: Option<MonteCarloResult>,
    pub config: SimulationConfig,
}

/// Fund-level return and cash metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundMetrics {
    /// Asset-level IRR before fees and carry
    pub gross_irr: Option<Rate>,
    /// Fund IRR after management fees, before carry
    pub fund_irr: Option<Rate>,
    /// Net IRR to limited partners
    pub lp_irr: Option<Rate>,
    pub gross_multiple: Option<Multiple>,
    pub fund_multiple: Option<Multiple>,
    pub lp_multiple: Option<Multiple>,
    pub dpi: Option<Multiple>,
    pub rvpi: Option<Multiple>,
    pub tvpi: Option<Multiple>,
    pub total_capital_called: Option<Money>,
    pub total_distributions: Option<Money>,
    pub net_cash_flow: Option<Money>,
    pub total_management_fees: Option<Money>,
    pub total_carried_interest: Option<Money>,
    pub years_elapsed: Option<Years>,
}

/// Point-in-time view of the loan book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub total_loans: Option<u32>,
    pub active_loans: Option<u32>,
    pub exited_loans: Option<u32>,
    pub defaulted_loans: Option<u32>,
    pub reinvested_loans: Option<u32>,
    pub total_loan_amount: Option<Money>,
    pub average_loan_size: Option<Money>,
    pub average_ltv: Option<Rate>,
    pub default_rate: Option<Rate>,
    /// Fractions per zone, summing to 1
    pub zone_distribution: Option<ZoneAllocation>,
    pub zone_irr: ZoneIrr,
    pub loans: Vec<LoanRecord>,
}

/// Average IRR per zone as reported by the producer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneIrr {
    pub green: Option<Rate>,
    pub orange: Option<Rate>,
    pub red: Option<Rate>,
}

impl ZoneIrr {
    pub fn get(&self, zone: Zone) -> Option<Rate> {
        match zone {
            Zone::Green => self.green,
            Zone::Orange => self.orange,
            Zone::Red => self.red,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub loan_id: Option<String>,
    pub zone: Option<Zone>,
    pub loan_amount: Option<Money>,
    pub irr: Option<Rate>,
    pub ltv: Option<Rate>,
    pub origination_year: Option<u32>,
    pub exit_year: Option<u32>,
    pub is_reinvestment: Option<bool>,
    pub defaulted: Option<bool>,
    pub status: Option<String>,
}

/// GP/LP distribution components of the fund waterfall.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterfallResult {
    pub total_distributions: Option<Money>,
    pub lp_distributions: Option<Money>,
    pub gp_distributions: Option<Money>,
    pub return_of_capital: Option<Money>,
    pub preferred_return: Option<Money>,
    pub gp_catch_up: Option<Money>,
    pub gp_carried_interest: Option<Money>,
    pub management_fees: Option<Money>,
}

// ---------------------------------------------------------------------------
// Monte Carlo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub iterations: Option<u32>,
    pub irr_distribution: Option<DistributionSummary>,
    pub multiple_distribution: Option<DistributionSummary>,
    pub sensitivity: Vec<SensitivityEntry>,
    pub confidence_intervals: Vec<ConfidenceInterval>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub mean: Option<Decimal>,
    pub median: Option<Decimal>,
    pub std_dev: Option<Decimal>,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub p5: Option<Decimal>,
    pub p25: Option<Decimal>,
    pub p75: Option<Decimal>,
    pub p95: Option<Decimal>,
    /// Number of raw samples the statistics were computed from, if any
    pub sample_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityEntry {
    pub variable: String,
    pub base: Option<Decimal>,
    pub low: Option<Decimal>,
    pub high: Option<Decimal>,
    /// high - low
    pub swing: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub level: String,
    pub lower: Option<Decimal>,
    pub upper: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Config echo
// ---------------------------------------------------------------------------

/// Simulation inputs echoed back by the producer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub fund_size: Option<Money>,
    pub fund_term_years: Option<u32>,
    pub target_irr: Option<Rate>,
    pub target_multiple: Option<Multiple>,
    pub zone_targets: Option<ZoneAllocation>,
    pub avg_loan_ltv: Option<Rate>,
    pub base_default_rate: Option<Rate>,
    pub hurdle_rate: Option<Rate>,
    pub carry_rate: Option<Rate>,
    pub management_fee_rate: Option<Rate>,
    pub reinvestment_period_years: Option<u32>,
    pub initial_loan_count: Option<u32>,
    pub avg_loan_size: Option<Money>,
}

impl SimulationConfig {
    /// Fill every absent field from `fallback`. Echoed values always win.
    pub fn overlay(&self, fallback: &SimulationConfig) -> SimulationConfig {
        SimulationConfig {
            fund_size: self.fund_size.or(fallback.fund_size),
            fund_term_years: self.fund_term_years.or(fallback.fund_term_years),
            target_irr: self.target_irr.or(fallback.target_irr),
            target_multiple: self.target_multiple.or(fallback.target_multiple),
            zone_targets: self.zone_targets.or(fallback.zone_targets),
            avg_loan_ltv: self.avg_loan_ltv.or(fallback.avg_loan_ltv),
            base_default_rate: self.base_default_rate.or(fallback.base_default_rate),
            hurdle_rate: self.hurdle_rate.or(fallback.hurdle_rate),
            carry_rate: self.carry_rate.or(fallback.carry_rate),
            management_fee_rate: self.management_fee_rate.or(fallback.management_fee_rate),
            reinvestment_period_years: self
                .reinvestment_period_years
                .or(fallback.reinvestment_period_years),
            initial_loan_count: self.initial_loan_count.or(fallback.initial_loan_count),
            avg_loan_size: self.avg_loan_size.or(fallback.avg_loan_size),
        }
    }
}

/// Explicit inputs to the builder. Replaces any ambient "active preset".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Values used for config facts the payload does not echo
    pub config_fallback: SimulationConfig,
}
