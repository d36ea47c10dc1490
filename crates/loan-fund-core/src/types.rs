use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Multiples (e.g., 1.8x TVPI)
pub type Multiple = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Risk bucket a loan is assigned to by the simulation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Green,
    Orange,
    Red,
}

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::Green, Zone::Orange, Zone::Red];

    /// Case-insensitive parse of a producer zone label.
    pub fn parse(label: &str) -> Option<Zone> {
        match label.trim().to_ascii_lowercase().as_str() {
            "green" => Some(Zone::Green),
            "orange" => Some(Zone::Orange),
            "red" => Some(Zone::Red),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Green => "green",
            Zone::Orange => "orange",
            Zone::Red => "red",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fractional allocation across the three zones (each 0..1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneAllocation {
    pub green: Rate,
    pub orange: Rate,
    pub red: Rate,
}

impl ZoneAllocation {
    pub fn get(&self, zone: Zone) -> Rate {
        match zone {
            Zone::Green => self.green,
            Zone::Orange => self.orange,
            Zone::Red => self.red,
        }
    }

    pub fn total(&self) -> Rate {
        self.green + self.orange + self.red
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zone_parse_is_case_insensitive() {
        assert_eq!(Zone::parse("GREEN"), Some(Zone::Green));
        assert_eq!(Zone::parse(" Orange "), Some(Zone::Orange));
        assert_eq!(Zone::parse("red"), Some(Zone::Red));
        assert_eq!(Zone::parse("amber"), None);
    }

    #[test]
    fn test_zone_allocation_total() {
        let alloc = ZoneAllocation {
            green: dec!(0.6),
            orange: dec!(0.3),
            red: dec!(0.1),
        };
        assert_eq!(alloc.total(), Decimal::ONE);
        assert_eq!(alloc.get(Zone::Red), dec!(0.1));
    }
}
