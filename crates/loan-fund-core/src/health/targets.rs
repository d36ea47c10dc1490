use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::canonical::SimulationConfig;
use crate::types::{Multiple, Rate, ZoneAllocation};

fn default_target_irr() -> Rate {
    dec!(0.15)
}

fn default_target_multiple() -> Multiple {
    dec!(1.8)
}

fn default_zone_targets() -> ZoneAllocation {
    ZoneAllocation {
        green: dec!(0.60),
        orange: dec!(0.30),
        red: dec!(0.10),
    }
}

fn default_avg_loan_ltv() -> Rate {
    dec!(0.65)
}

fn default_base_default_rate() -> Rate {
    dec!(0.02)
}

fn default_hurdle_rate() -> Rate {
    dec!(0.08)
}

fn default_carry_rate() -> Rate {
    dec!(0.20)
}

fn default_fund_term_years() -> u32 {
    10
}

/// Targets the analytics compare actual results against.
///
/// Each field defaults independently, so a partial targets file only
/// overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsTargets {
    #[serde(default = "default_target_irr")]
    pub target_irr: Rate,
    #[serde(default = "default_target_multiple")]
    pub target_multiple: Multiple,
    #[serde(default = "default_zone_targets")]
    pub zone_targets: ZoneAllocation,
    #[serde(default = "default_avg_loan_ltv")]
    pub avg_loan_ltv: Rate,
    #[serde(default = "default_base_default_rate")]
    pub base_default_rate: Rate,
    #[serde(default = "default_hurdle_rate")]
    pub hurdle_rate: Rate,
    #[serde(default = "default_carry_rate")]
    pub carry_rate: Rate,
    #[serde(default = "default_fund_term_years")]
    pub fund_term_years: u32,
}

impl Default for AnalyticsTargets {
    fn default() -> Self {
        AnalyticsTargets {
            target_irr: default_target_irr(),
            target_multiple: default_target_multiple(),
            zone_targets: default_zone_targets(),
            avg_loan_ltv: default_avg_loan_ltv(),
            base_default_rate: default_base_default_rate(),
            hurdle_rate: default_hurdle_rate(),
            carry_rate: default_carry_rate(),
            fund_term_years: default_fund_term_years(),
        }
    }
}

impl AnalyticsTargets {
    /// Targets from the echoed simulation config, defaulting per field.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let defaults = AnalyticsTargets::default();
        AnalyticsTargets {
            target_irr: config.target_irr.unwrap_or(defaults.target_irr),
            target_multiple: config.target_multiple.unwrap_or(defaults.target_multiple),
            zone_targets: config
                .zone_targets
                .filter(|z| z.total() > Decimal::ZERO)
                .unwrap_or(defaults.zone_targets),
            avg_loan_ltv: config.avg_loan_ltv.unwrap_or(defaults.avg_loan_ltv),
            base_default_rate: config.base_default_rate.unwrap_or(defaults.base_default_rate),
            hurdle_rate: config.hurdle_rate.unwrap_or(defaults.hurdle_rate),
            carry_rate: config.carry_rate.unwrap_or(defaults.carry_rate),
            fund_term_years: config
                .fund_term_years
                .filter(|t| *t > 0)
                .unwrap_or(defaults.fund_term_years),
        }
    }
}
