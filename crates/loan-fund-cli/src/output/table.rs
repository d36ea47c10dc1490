use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten_record, record_headers, record_list, scalar_text};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result(result);
                print_envelope_notes(map);
            } else {
                print_flat_object(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Value) {
    match result {
        Value::Array(arr) => print_array_table(arr),
        Value::Object(map) => {
            print_flat_object(map);
            // Record lists get their own table below the scalar fields
            for (key, val) in map {
                if let Value::Array(items) = val {
                    if items.first().map_or(false, Value::is_object) {
                        println!("\n{}:", key);
                        print_array_table(items);
                    }
                }
            }
        }
        _ => println!("{}", result),
    }
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        let is_record_list = matches!(
            val,
            Value::Array(items) if items.first().map_or(false, Value::is_object)
        );
        if !is_record_list {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if !arr.iter().any(Value::is_object) {
        for item in arr {
            println!("{}", format_value(item));
        }
        return;
    }

    let headers = record_headers(arr);
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for item in arr {
        if let Value::Object(map) = item {
            let flat = flatten_record(map);
            let row: Vec<String> = headers
                .iter()
                .map(|h| {
                    flat.iter()
                        .find(|(k, _)| k == h)
                        .map(|(_, v)| format_value(v))
                        .unwrap_or_default()
                })
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Array(arr) if !arr.iter().any(Value::is_object) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(map) => match record_list(map) {
            Some((key, items)) => format!("({} {})", items.len(), key),
            None => serde_json::to_string(value).unwrap_or_default(),
        },
        _ => scalar_text(value, "null"),
    }
}
