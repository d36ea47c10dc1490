use std::time::Instant;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use super::fields::*;
use super::model::*;
use super::monte_carlo::read_monte_carlo;
use crate::error::LoanFundError;
use crate::resolver::{
    as_decimal, resolve, resolve_bool, resolve_count, resolve_decimal, resolve_string,
    FactReader, FieldPath,
};
use crate::series::fields::FUND_TERM;
use crate::series::{to_series, SeriesOptions};
use crate::types::{with_metadata, ComputationOutput, Zone, ZoneAllocation};
use crate::LoanFundResult;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build a canonical result with no configuration fallback.
pub fn build_canonical(raw: &Value) -> LoanFundResult<ComputationOutput<CanonicalResult>> {
    build_canonical_with(raw, &BuildOptions::default())
}

/// Build a canonical result from a raw simulation payload.
///
/// Never fails on missing data: unresolved facts become `None` and are listed
/// in the envelope warnings. Fails only when `raw` is not a JSON object.
pub fn build_canonical_with(
    raw: &Value,
    options: &BuildOptions,
) -> LoanFundResult<ComputationOutput<CanonicalResult>> {
    let start = Instant::now();

    if !raw.is_object() {
        return Err(LoanFundError::MalformedInput(format!(
            "expected a JSON object at the top level, found {}",
            json_kind(raw)
        )));
    }

    let mut reader = FactReader::new(raw);
    let mut warnings: Vec<String> = Vec::new();

    let run_id = reader.string(&RUN_ID);
    let status = reader.string(&STATUS);
    let progress = reader.decimal(&PROGRESS);
    let completed_at = match reader.value(&COMPLETED_AT) {
        Some(value) => {
            let parsed = parse_timestamp(value);
            if parsed.is_none() {
                warnings.push(format!("unusable field: {}", COMPLETED_AT.fact));
            }
            parsed
        }
        None => None,
    };

    let metrics = read_metrics(&mut reader);
    let portfolio_snapshot = read_portfolio(&mut reader, &mut warnings);

    let waterfall_result = reader.peek(&WATERFALL).and_then(|block| {
        if block.is_object() {
            Some(read_waterfall(block))
        } else {
            warnings.push(format!("unusable field: {}", WATERFALL.fact));
            None
        }
    });
    let monte_carlo_result = reader.peek(&MONTE_CARLO).and_then(|block| {
        if block.is_object() {
            Some(read_monte_carlo(block, &mut warnings))
        } else {
            warnings.push(format!("unusable field: {}", MONTE_CARLO.fact));
            None
        }
    });

    let config = read_config(raw).overlay(&options.config_fallback);

    let cash_flow_series = to_series(
        raw,
        &SeriesOptions {
            fund_term_years: config.fund_term_years,
            ..SeriesOptions::default()
        },
    );

    let mut all_warnings = reader.into_warnings();
    all_warnings.append(&mut warnings);

    let result = CanonicalResult {
        run_id,
        status,
        progress,
        completed_at,
        metrics,
        cash_flow_series,
        portfolio_snapshot,
        waterfall_result,
        monte_carlo_result,
        config,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Canonical result normalization (ordered-candidate field resolution)",
        &serde_json::json!({
            "config_fallback": options.config_fallback,
            "series": "yearly, non-cumulative, inactive periods dropped",
        }),
        all_warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn read_metrics(reader: &mut FactReader<'_>) -> FundMetrics {
    FundMetrics {
        gross_irr: reader.decimal(&GROSS_IRR),
        fund_irr: reader.decimal(&FUND_IRR),
        lp_irr: reader.decimal(&LP_IRR),
        gross_multiple: reader.decimal(&GROSS_MULTIPLE),
        fund_multiple: reader.decimal(&FUND_MULTIPLE),
        lp_multiple: reader.decimal(&LP_MULTIPLE),
        dpi: reader.decimal(&DPI),
        rvpi: reader.decimal(&RVPI),
        tvpi: reader.decimal(&TVPI),
        total_capital_called: reader.decimal(&TOTAL_CAPITAL_CALLED).map(|c| c.abs()),
        total_distributions: reader.decimal(&TOTAL_DISTRIBUTIONS),
        net_cash_flow: reader.decimal(&NET_CASH_FLOW),
        total_management_fees: reader.decimal(&MANAGEMENT_FEES),
        total_carried_interest: reader.decimal(&CARRIED_INTEREST),
        years_elapsed: reader.decimal(&YEARS_ELAPSED),
    }
}

fn read_portfolio(reader: &mut FactReader<'_>, warnings: &mut Vec<String>) -> PortfolioSnapshot {
    let loans = reader
        .peek(&LOANS)
        .map(|value| read_loans(value, warnings))
        .unwrap_or_default();

    let zone_distribution = match reader.peek(&ZONE_DISTRIBUTION) {
        Some(value) => {
            let parsed = read_zone_values(value, &ZONE_SHARE).and_then(normalize_allocation);
            if parsed.is_none() {
                warnings.push(format!("unusable field: {}", ZONE_DISTRIBUTION.fact));
            }
            parsed
        }
        None => {
            let derived = allocation_from_loans(&loans);
            if derived.is_some() {
                warnings.push("zone distribution derived from loan list by count".into());
            } else {
                warnings.push(format!("missing field: {}", ZONE_DISTRIBUTION.fact));
            }
            derived
        }
    };

    let zone_irr = reader
        .peek(&ZONE_IRR)
        .and_then(|value| read_zone_values(value, &ZONE_IRR_VALUE))
        .map(|[green, orange, red]| ZoneIrr { green, orange, red })
        .unwrap_or_default();

    PortfolioSnapshot {
        total_loans: reader.count(&TOTAL_LOANS),
        active_loans: reader.count(&ACTIVE_LOANS),
        exited_loans: reader.count(&EXITED_LOANS),
        defaulted_loans: reader.count(&DEFAULTED_LOANS),
        reinvested_loans: reader.count(&REINVESTED_LOANS),
        total_loan_amount: reader.decimal(&TOTAL_LOAN_AMOUNT),
        average_loan_size: reader.decimal(&AVERAGE_LOAN_SIZE),
        average_ltv: reader.decimal(&AVERAGE_LTV),
        default_rate: reader.decimal(&DEFAULT_RATE),
        zone_distribution,
        zone_irr,
        loans,
    }
}

fn read_waterfall(block: &Value) -> WaterfallResult {
    WaterfallResult {
        total_distributions: resolve_decimal(block, &WF_TOTAL_DISTRIBUTIONS),
        lp_distributions: resolve_decimal(block, &WF_LP_DISTRIBUTIONS),
        gp_distributions: resolve_decimal(block, &WF_GP_DISTRIBUTIONS),
        return_of_capital: resolve_decimal(block, &WF_RETURN_OF_CAPITAL),
        preferred_return: resolve_decimal(block, &WF_PREFERRED_RETURN),
        gp_catch_up: resolve_decimal(block, &WF_GP_CATCH_UP),
        gp_carried_interest: resolve_decimal(block, &WF_GP_CARRIED_INTEREST),
        management_fees: resolve_decimal(block, &WF_MANAGEMENT_FEES),
    }
}

/// Config echo. Absence here is normal and is not reported as a warning.
fn read_config(raw: &Value) -> SimulationConfig {
    SimulationConfig {
        fund_size: resolve_decimal(raw, &FUND_SIZE),
        fund_term_years: resolve_count(raw, &FUND_TERM),
        target_irr: resolve_decimal(raw, &TARGET_IRR),
        target_multiple: resolve_decimal(raw, &TARGET_MULTIPLE),
        zone_targets: resolve(raw, &ZONE_TARGETS)
            .and_then(|value| read_zone_values(value, &ZONE_SHARE))
            .and_then(normalize_allocation),
        avg_loan_ltv: resolve_decimal(raw, &AVG_LOAN_LTV),
        base_default_rate: resolve_decimal(raw, &BASE_DEFAULT_RATE),
        hurdle_rate: resolve_decimal(raw, &HURDLE_RATE),
        carry_rate: resolve_decimal(raw, &CARRY_RATE),
        management_fee_rate: resolve_decimal(raw, &MANAGEMENT_FEE_RATE),
        reinvestment_period_years: resolve_count(raw, &REINVESTMENT_PERIOD),
        initial_loan_count: resolve_count(raw, &INITIAL_LOAN_COUNT),
        avg_loan_size: resolve_decimal(raw, &AVG_LOAN_SIZE),
    }
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

fn read_loan(record: &Value, fallback_id: Option<&str>) -> LoanRecord {
    LoanRecord {
        loan_id: resolve_string(record, &LOAN_ID).or_else(|| fallback_id.map(str::to_string)),
        zone: resolve_string(record, &LOAN_ZONE).and_then(|z| Zone::parse(&z)),
        loan_amount: resolve_decimal(record, &LOAN_AMOUNT),
        irr: resolve_decimal(record, &LOAN_IRR),
        ltv: resolve_decimal(record, &LOAN_LTV),
        origination_year: resolve_count(record, &LOAN_ORIGINATION_YEAR),
        exit_year: resolve_count(record, &LOAN_EXIT_YEAR),
        is_reinvestment: resolve_bool(record, &LOAN_REINVESTMENT),
        defaulted: resolve_bool(record, &LOAN_DEFAULTED),
        status: resolve_string(record, &LOAN_STATUS),
    }
}

/// Loans arrive as an array of records or as a map keyed by loan id.
fn read_loans(value: &Value, warnings: &mut Vec<String>) -> Vec<LoanRecord> {
    let mut skipped = 0usize;
    let loans = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                if item.is_object() {
                    Some(read_loan(item, None))
                } else {
                    skipped += 1;
                    None
                }
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(id, item)| {
                if item.is_object() {
                    Some(read_loan(item, Some(id)))
                } else {
                    skipped += 1;
                    None
                }
            })
            .collect(),
        _ => {
            warnings.push(format!("unusable field: {}", LOANS.fact));
            Vec::new()
        }
    };
    if skipped > 0 {
        warnings.push(format!("skipped {skipped} loan entries that are not records"));
    }
    loans
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

fn zone_value(value: &Value, inner: &FieldPath) -> Option<Decimal> {
    match value {
        Value::Object(_) => resolve_decimal(value, inner),
        other => as_decimal(other),
    }
}

/// Per-zone values from `{green: .., orange: .., red: ..}` (any key casing,
/// values either numbers or `{share|count|..}` records) or from an array of
/// `{zone, share|count}` records. `inner` names the value inside a record.
/// Absent zones stay `None`.
fn read_zone_values(value: &Value, inner: &FieldPath) -> Option<[Option<Decimal>; 3]> {
    let mut values: [Option<Decimal>; 3] = [None; 3];
    let mut assign = |zone: Zone, v: Option<Decimal>| {
        let slot = &mut values[zone_slot(zone)];
        if slot.is_none() {
            *slot = v;
        }
    };

    match value {
        Value::Object(map) => {
            for (key, v) in map {
                if let Some(zone) = Zone::parse(key) {
                    assign(zone, zone_value(v, inner));
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                let zone = resolve_string(item, &LOAN_ZONE).and_then(|z| Zone::parse(&z));
                if let Some(zone) = zone {
                    assign(zone, zone_value(item, inner));
                }
            }
        }
        _ => return None,
    }

    if values.iter().all(Option::is_none) {
        None
    } else {
        Some(values)
    }
}

fn zone_slot(zone: Zone) -> usize {
    match zone {
        Zone::Green => 0,
        Zone::Orange => 1,
        Zone::Red => 2,
    }
}

/// Turn per-zone values into fractions. Totals above 1 are counts or
/// percentages and are divided through; missing zones count as zero.
fn normalize_allocation(values: [Option<Decimal>; 3]) -> Option<ZoneAllocation> {
    let [green, orange, red] = values.map(|v| v.unwrap_or(Decimal::ZERO).max(Decimal::ZERO));
    let total = green.saturating_add(orange).saturating_add(red);
    if total.is_zero() {
        return None;
    }
    if total > Decimal::ONE {
        Some(ZoneAllocation {
            green: green / total,
            orange: orange / total,
            red: red / total,
        })
    } else {
        Some(ZoneAllocation { green, orange, red })
    }
}

fn allocation_from_loans(loans: &[LoanRecord]) -> Option<ZoneAllocation> {
    let mut counts = [0u32; 3];
    for zone in loans.iter().filter_map(|l| l.zone) {
        counts[zone_slot(zone)] += 1;
    }
    let total: u32 = counts.iter().sum();
    if total == 0 {
        return None;
    }
    let share = |n: u32| Decimal::from(n) / Decimal::from(total);
    Some(ZoneAllocation {
        green: share(counts[0]),
        orange: share(counts[1]),
        red: share(counts[2]),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// RFC 3339, naive ISO date-times (taken as UTC), plain dates, or epoch seconds.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => DateTime::from_timestamp(n.as_i64()?, 0),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                    return Some(naive.and_utc());
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_rejects_non_object() {
        for raw in [json!([1, 2]), json!("done"), json!(null), json!(3)] {
            assert!(matches!(
                build_canonical(&raw),
                Err(LoanFundError::MalformedInput(_))
            ));
        }
    }

    #[test]
    fn test_progress_snapshot_builds_with_nulls() {
        let raw = json!({ "status": "running", "progress": 0.4 });
        let out = build_canonical(&raw).unwrap();
        let r = &out.result;
        assert_eq!(r.status.as_deref(), Some("running"));
        assert_eq!(r.progress, Some(dec!(0.4)));
        assert_eq!(r.metrics, FundMetrics::default());
        assert!(r.cash_flow_series.is_empty());
        assert!(r.portfolio_snapshot.loans.is_empty());
        assert!(r.waterfall_result.is_none());
        assert!(r.monte_carlo_result.is_none());
        assert!(out.warnings.contains(&"missing field: metrics.fund_irr".to_string()));
    }

    #[test]
    fn test_absent_facts_serialize_as_null() {
        let out = build_canonical(&json!({})).unwrap();
        let value = serde_json::to_value(&out.result).unwrap();
        assert_eq!(value["metrics"]["gross_irr"], Value::Null);
        assert_eq!(value["waterfall_result"], Value::Null);
        assert_eq!(value["cash_flow_series"], json!([]));
    }

    #[test]
    fn test_metric_variants_resolve_to_stable_names() {
        let snake = json!({ "metrics": { "gross_irr": 0.18, "fund_irr": 0.15, "lp_irr": 0.13 } });
        let camel = json!({ "grossIrr": 0.18, "fundIrr": 0.15, "lpIrr": 0.13 });
        let a = build_canonical(&snake).unwrap().result.metrics;
        let b = build_canonical(&camel).unwrap().result.metrics;
        assert_eq!(a, b);
        assert_eq!(a.gross_irr, Some(dec!(0.18)));
    }

    #[test]
    fn test_nested_metric_wins_over_flat() {
        let raw = json!({ "metrics": { "tvpi": 1.6 }, "tvpi": 2.0 });
        assert_eq!(build_canonical(&raw).unwrap().result.metrics.tvpi, Some(dec!(1.6)));
    }

    #[test]
    fn test_zone_distribution_counts_normalized() {
        let raw = json!({ "portfolio": { "zone_distribution": { "Green": 30, "ORANGE": 15, "red": 5 } } });
        let dist = build_canonical(&raw)
            .unwrap()
            .result
            .portfolio_snapshot
            .zone_distribution
            .unwrap();
        assert_eq!(dist.green, dec!(0.6));
        assert_eq!(dist.orange, dec!(0.3));
        assert_eq!(dist.red, dec!(0.1));
    }

    #[test]
    fn test_zone_distribution_derived_from_loans() {
        let raw = json!({
            "loans": [
                { "loan_id": "a", "zone": "green", "loan_amount": 100 },
                { "loan_id": "b", "zone": "green", "loan_amount": 100 },
                { "loan_id": "c", "zone": "red", "loan_amount": 100 },
                { "loan_id": "d", "zone": "orange", "loan_amount": 100 }
            ]
        });
        let out = build_canonical(&raw).unwrap();
        let dist = out.result.portfolio_snapshot.zone_distribution.unwrap();
        assert_eq!(dist.green, dec!(0.5));
        assert_eq!(dist.red, dec!(0.25));
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("derived from loan list")));
    }

    #[test]
    fn test_loans_as_map_use_key_as_id() {
        let raw = json!({ "portfolio": { "loans": { "L-7": { "amount": 250000, "riskZone": "Orange" } } } });
        let loans = build_canonical(&raw).unwrap().result.portfolio_snapshot.loans;
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].loan_id.as_deref(), Some("L-7"));
        assert_eq!(loans[0].zone, Some(Zone::Orange));
        assert_eq!(loans[0].loan_amount, Some(dec!(250000)));
    }

    #[test]
    fn test_zone_irr_from_records() {
        let raw = json!({ "zone_irr": { "green": { "irr": 0.09 }, "red": 0.2 } });
        let zone_irr = build_canonical(&raw).unwrap().result.portfolio_snapshot.zone_irr;
        assert_eq!(zone_irr.red, Some(dec!(0.2)));
        assert_eq!(zone_irr.orange, None);
    }

    #[test]
    fn test_waterfall_block_aliases() {
        let raw = json!({
            "waterfall_results": { "total_lp": 900, "total_gp": 100, "catch_up": 20, "carried_interest": 80 }
        });
        let wf = build_canonical(&raw).unwrap().result.waterfall_result.unwrap();
        assert_eq!(wf.lp_distributions, Some(dec!(900)));
        assert_eq!(wf.gp_distributions, Some(dec!(100)));
        assert_eq!(wf.gp_catch_up, Some(dec!(20)));
        assert_eq!(wf.gp_carried_interest, Some(dec!(80)));
        assert_eq!(wf.preferred_return, None);
    }

    #[test]
    fn test_config_fallback_fills_gaps_only() {
        let raw = json!({ "config": { "hurdle_rate": 0.06 } });
        let options = BuildOptions {
            config_fallback: SimulationConfig {
                hurdle_rate: Some(dec!(0.08)),
                carry_rate: Some(dec!(0.2)),
                ..SimulationConfig::default()
            },
        };
        let config = build_canonical_with(&raw, &options).unwrap().result.config;
        assert_eq!(config.hurdle_rate, Some(dec!(0.06)));
        assert_eq!(config.carry_rate, Some(dec!(0.2)));
        assert_eq!(config.target_irr, None);
    }

    #[test]
    fn test_fund_term_bounds_series() {
        let raw = json!({
            "config": { "fundTerm": 1 },
            "cash_flows": [{ "year": 0, "capital_calls": 10 }, { "year": 2, "distributions": 30 }]
        });
        let series = build_canonical(&raw).unwrap().result.cash_flow_series;
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = "2024-03-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(parse_timestamp(&json!("2024-03-01T12:00:00Z")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2024-03-01T14:00:00+02:00")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2024-03-01 12:00:00")), Some(expected));
        assert_eq!(parse_timestamp(&json!(1709294400)), Some(expected));
        assert!(parse_timestamp(&json!("2024-03-01")).is_some());
        assert_eq!(parse_timestamp(&json!("yesterday")), None);
    }

    #[test]
    fn test_unparseable_timestamp_warns() {
        let out = build_canonical(&json!({ "completed_at": "soon" })).unwrap();
        assert!(out.result.completed_at.is_none());
        assert!(out.warnings.contains(&"unusable field: completed_at".to_string()));
    }

    #[test]
    fn test_build_is_deterministic() {
        let raw = json!({
            "metrics": { "irr": 0.14, "dpi": 0.8 },
            "cash_flows": { "0": { "capital_calls": 100 }, "3": { "distributions": 140 } },
            "portfolio": { "loans": [{ "id": 1, "zone": "green", "amount": 5 }] }
        });
        let a = build_canonical(&raw).unwrap();
        let b = build_canonical(&raw).unwrap();
        assert_eq!(a.result, b.result);
        assert_eq!(a.warnings, b.warnings);
    }
}
