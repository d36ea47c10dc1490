pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The envelope's `result` if there is one, otherwise the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// First field of an object that holds a non-empty array of records, e.g.
/// `rows` of a cohort report or `periods` of a series.
pub(crate) fn record_list(map: &Map<String, Value>) -> Option<(&str, &[Value])> {
    map.iter().find_map(|(key, val)| match val {
        Value::Array(items) if items.first().map_or(false, Value::is_object) => {
            Some((key.as_str(), items.as_slice()))
        }
        _ => None,
    })
}

/// Flatten one level of nested objects into dotted column names so that
/// records like `{ index, split: { active_original, .. } }` tabulate.
pub(crate) fn flatten_record(record: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    for (key, val) in record {
        match val {
            Value::Object(inner) if !inner.is_empty() => {
                for (k, v) in inner {
                    out.push((format!("{key}.{k}"), v.clone()));
                }
            }
            _ => out.push((key.clone(), val.clone())),
        }
    }
    out
}

/// Union of flattened column names across all records, first-seen order.
pub(crate) fn record_headers(records: &[Value]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for record in records {
        if let Value::Object(map) = record {
            for (key, _) in flatten_record(map) {
                if !headers.contains(&key) {
                    headers.push(key);
                }
            }
        }
    }
    headers
}

pub(crate) fn scalar_text(value: &Value, null: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => null.to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
