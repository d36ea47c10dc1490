//! Monte Carlo block normalization.
//!
//! Distribution blocks arrive either as summary statistics, as raw samples,
//! or as both. Reported statistics always win; with the `monte_carlo`
//! feature enabled any statistic the producer left out is computed from the
//! samples.

use rust_decimal::Decimal;
use serde_json::Value;

use super::fields::*;
use super::model::{ConfidenceInterval, DistributionSummary, MonteCarloResult, SensitivityEntry};
use crate::resolver::{as_decimal, resolve, resolve_count, resolve_decimal, resolve_string};

pub(crate) fn read_monte_carlo(block: &Value, warnings: &mut Vec<String>) -> MonteCarloResult {
    let irr_distribution = resolve(block, &MC_IRR_DISTRIBUTION).and_then(read_distribution);
    let multiple_distribution =
        resolve(block, &MC_MULTIPLE_DISTRIBUTION).and_then(read_distribution);

    if irr_distribution.is_none() {
        warnings.push(format!("missing field: {}", MC_IRR_DISTRIBUTION.fact));
    }

    MonteCarloResult {
        iterations: resolve_count(block, &MC_ITERATIONS).or_else(|| {
            irr_distribution
                .as_ref()
                .and_then(|d| d.sample_count)
                .and_then(|n| u32::try_from(n).ok())
        }),
        irr_distribution,
        multiple_distribution,
        sensitivity: resolve(block, &MC_SENSITIVITY)
            .map(read_sensitivity)
            .unwrap_or_default(),
        confidence_intervals: resolve(block, &MC_CONFIDENCE)
            .map(read_confidence)
            .unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

fn samples_of(value: &Value) -> Option<Vec<Decimal>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(_) => match resolve(value, &DIST_SAMPLES)? {
            Value::Array(items) => items,
            _ => return None,
        },
        _ => return None,
    };
    let samples: Vec<Decimal> = items.iter().filter_map(as_decimal).collect();
    if samples.is_empty() {
        None
    } else {
        Some(samples)
    }
}

fn read_distribution(value: &Value) -> Option<DistributionSummary> {
    let samples = samples_of(value);
    let reported = if value.is_object() {
        DistributionSummary {
            mean: resolve_decimal(value, &DIST_MEAN),
            median: resolve_decimal(value, &DIST_MEDIAN),
            std_dev: resolve_decimal(value, &DIST_STD_DEV),
            min: resolve_decimal(value, &DIST_MIN),
            max: resolve_decimal(value, &DIST_MAX),
            p5: resolve_decimal(value, &DIST_P5),
            p25: resolve_decimal(value, &DIST_P25),
            p75: resolve_decimal(value, &DIST_P75),
            p95: resolve_decimal(value, &DIST_P95),
            sample_count: None,
        }
    } else {
        DistributionSummary::default()
    };

    let summary = match samples {
        Some(samples) => fill_from_samples(reported, &samples),
        None => reported,
    };

    if summary == DistributionSummary::default() {
        None
    } else {
        Some(summary)
    }
}

#[cfg(feature = "monte_carlo")]
fn fill_from_samples(reported: DistributionSummary, samples: &[Decimal]) -> DistributionSummary {
    use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
    use statrs::statistics::{Data, Distribution, Max, Median, Min, OrderStatistics};

    let values: Vec<f64> = samples.iter().filter_map(|d| d.to_f64()).collect();
    let mut data = Data::new(values);
    let to_dec = |x: f64| {
        if x.is_finite() {
            Decimal::from_f64(x).map(|d| d.round_dp(10))
        } else {
            None
        }
    };

    let computed = DistributionSummary {
        mean: data.mean().and_then(to_dec),
        median: to_dec(data.median()),
        std_dev: data.std_dev().and_then(to_dec),
        min: to_dec(data.min()),
        max: to_dec(data.max()),
        p5: to_dec(data.percentile(5)),
        p25: to_dec(data.percentile(25)),
        p75: to_dec(data.percentile(75)),
        p95: to_dec(data.percentile(95)),
        sample_count: Some(samples.len()),
    };

    DistributionSummary {
        mean: reported.mean.or(computed.mean),
        median: reported.median.or(computed.median),
        std_dev: reported.std_dev.or(computed.std_dev),
        min: reported.min.or(computed.min),
        max: reported.max.or(computed.max),
        p5: reported.p5.or(computed.p5),
        p25: reported.p25.or(computed.p25),
        p75: reported.p75.or(computed.p75),
        p95: reported.p95.or(computed.p95),
        sample_count: computed.sample_count,
    }
}

#[cfg(not(feature = "monte_carlo"))]
fn fill_from_samples(reported: DistributionSummary, samples: &[Decimal]) -> DistributionSummary {
    DistributionSummary {
        sample_count: Some(samples.len()),
        ..reported
    }
}

// ---------------------------------------------------------------------------
// Sensitivity and confidence
// ---------------------------------------------------------------------------

fn sensitivity_entry(variable: String, record: &Value) -> SensitivityEntry {
    let low = resolve_decimal(record, &SENS_LOW);
    let high = resolve_decimal(record, &SENS_HIGH);
    SensitivityEntry {
        variable,
        base: resolve_decimal(record, &SENS_BASE),
        low,
        high,
        swing: match (low, high) {
            (Some(l), Some(h)) => h.checked_sub(l),
            _ => None,
        },
    }
}

/// Array of `{variable, low, high}` records, or a map keyed by variable name.
fn read_sensitivity(value: &Value) -> Vec<SensitivityEntry> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let variable = resolve_string(item, &SENS_VARIABLE)?;
                Some(sensitivity_entry(variable, item))
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter(|(_, record)| record.is_object())
            .map(|(name, record)| sensitivity_entry(name.clone(), record))
            .collect(),
        _ => Vec::new(),
    }
}

/// Map of level to `{lower, upper}` or `[lower, upper]`, or an array of
/// `{level, lower, upper}` records.
fn read_confidence(value: &Value) -> Vec<ConfidenceInterval> {
    let interval = |level: String, bounds: &Value| ConfidenceInterval {
        level,
        lower: resolve_decimal(bounds, &CI_LOWER),
        upper: resolve_decimal(bounds, &CI_UPPER),
    };
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(level, bounds)| interval(level.clone(), bounds))
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let level = resolve_string(item, &CI_LEVEL)?;
                Some(interval(level, item))
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_reported_statistics_are_kept() {
        let block = json!({
            "iterations": 1000,
            "irr_distribution": { "mean": 0.12, "percentiles": { "p5": 0.04, "p95": 0.19 } }
        });
        let mut warnings = Vec::new();
        let mc = read_monte_carlo(&block, &mut warnings);
        let irr = mc.irr_distribution.unwrap();
        assert_eq!(mc.iterations, Some(1000));
        assert_eq!(irr.mean, Some(dec!(0.12)));
        assert_eq!(irr.p5, Some(dec!(0.04)));
        assert_eq!(irr.p95, Some(dec!(0.19)));
        assert_eq!(irr.sample_count, None);
        assert!(mc.multiple_distribution.is_none());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_irr_distribution_warns() {
        let mut warnings = Vec::new();
        let mc = read_monte_carlo(&json!({ "iterations": 10 }), &mut warnings);
        assert!(mc.irr_distribution.is_none());
        assert_eq!(warnings, vec!["missing field: monte_carlo.irr_distribution"]);
    }

    #[cfg(feature = "monte_carlo")]
    #[test]
    fn test_statistics_computed_from_samples() {
        let block = json!({ "irr": [0.10, 0.12, 0.14, 0.16, 0.18] });
        let mc = read_monte_carlo(&block, &mut Vec::new());
        let irr = mc.irr_distribution.unwrap();
        assert_eq!(irr.sample_count, Some(5));
        assert_eq!(mc.iterations, Some(5));
        assert!((irr.mean.unwrap() - dec!(0.14)).abs() < dec!(0.000001));
        assert!((irr.median.unwrap() - dec!(0.14)).abs() < dec!(0.000001));
        assert!((irr.min.unwrap() - dec!(0.10)).abs() < dec!(0.000001));
        assert!((irr.max.unwrap() - dec!(0.18)).abs() < dec!(0.000001));
        assert!(irr.std_dev.unwrap() > Decimal::ZERO);
    }

    #[cfg(feature = "monte_carlo")]
    #[test]
    fn test_reported_mean_beats_sample_mean() {
        let block = json!({ "irr_distribution": { "mean": 0.5, "samples": [0.1, 0.2, 0.3] } });
        let irr = read_monte_carlo(&block, &mut Vec::new()).irr_distribution.unwrap();
        assert_eq!(irr.mean, Some(dec!(0.5)));
        assert!(irr.min.is_some());
    }

    #[test]
    fn test_sensitivity_map_and_array() {
        let as_map = json!({ "default_rate": { "base": 0.14, "low": 0.10, "high": 0.17 } });
        let entries = read_sensitivity(&as_map);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].variable, "default_rate");
        assert_eq!(entries[0].swing, Some(dec!(0.07)));

        let as_array = json!([{ "name": "ltv", "low": 0.12 }]);
        let entries = read_sensitivity(&as_array);
        assert_eq!(entries[0].variable, "ltv");
        assert_eq!(entries[0].swing, None);
    }

    #[test]
    fn test_confidence_interval_shapes() {
        let tuples = read_confidence(&json!({ "95": [0.05, 0.2] }));
        assert_eq!(tuples[0].level, "95");
        assert_eq!(tuples[0].lower, Some(dec!(0.05)));
        assert_eq!(tuples[0].upper, Some(dec!(0.2)));

        let records = read_confidence(&json!([{ "level": 0.9, "lower_bound": 0.07, "upper_bound": 0.18 }]));
        assert_eq!(records[0].level, "0.9");
        assert_eq!(records[0].upper, Some(dec!(0.18)));
    }
}
