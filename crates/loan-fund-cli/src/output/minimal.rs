use serde_json::Value;

use super::{result_of, scalar_text};

/// Headline fields, checked in order, for each command's result.
const PRIORITY_KEYS: [&str; 8] = [
    "overall",
    "total_drag",
    "fund_irr",
    "carry_contribution",
    "variance",
    "reconciled_periods",
    "period_count",
    "status",
];

/// Print just the headline value of the output.
///
/// Looks for well-known result fields (also one level down, so the report's
/// `health.overall` is found), then falls back to the first field.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);
    let result = match result {
        Value::Array(items) => items.first().unwrap_or(result),
        _ => result,
    };

    if let Value::Object(map) = result {
        for key in &PRIORITY_KEYS {
            if let Some(val) = find_key(result, key) {
                println!("{}", scalar_text(val, "null"));
                return;
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, scalar_text(val, "null"));
            return;
        }
    }

    println!("{}", scalar_text(result, "null"));
}

fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let map = value.as_object()?;
    if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
        return Some(val);
    }
    map.values()
        .filter(|v| v.is_object())
        .find_map(|v| v.as_object()?.get(key).filter(|v| !v.is_null()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_headline_is_found() {
        let report = json!({ "canonical": { "run_id": "x" }, "health": { "overall": "81.2" } });
        assert_eq!(find_key(&report, "overall"), Some(&json!("81.2")));
        assert_eq!(find_key(&report, "fund_irr"), None);
    }
}
