use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use super::path::{resolve, FieldPath};

fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(trimmed).ok())
}

/// Coerce a JSON number or numeric string into a Decimal.
pub fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                parse_decimal(&n.to_string())
            }
        }
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// Coerce a non-negative numeric value into a whole count.
///
/// Fractional counts (averaged producer output) round half away from zero.
pub fn as_count(value: &Value) -> Option<u32> {
    let d = as_decimal(value)?;
    if d.is_sign_negative() && !d.is_zero() {
        return None;
    }
    d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
}

pub fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Resolve `path` and coerce the winning value. A present but non-numeric
/// winner yields `None`; lower-priority candidates are not consulted.
pub fn resolve_decimal(record: &Value, path: &FieldPath) -> Option<Decimal> {
    resolve(record, path).and_then(as_decimal)
}

pub fn resolve_count(record: &Value, path: &FieldPath) -> Option<u32> {
    resolve(record, path).and_then(as_count)
}

pub fn resolve_string(record: &Value, path: &FieldPath) -> Option<String> {
    resolve(record, path).and_then(as_string)
}

pub fn resolve_bool(record: &Value, path: &FieldPath) -> Option<bool> {
    resolve(record, path).and_then(as_bool)
}
