use serde_json::Value;
use std::io;

use super::{flatten_record, record_headers, record_list, result_of, scalar_text};

/// Write output as CSV to stdout.
///
/// Record lists (rankings, series periods, cohort rows) become one row per
/// record; anything else becomes two-column `field,value`.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match result_of(value) {
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        Value::Object(map) => match record_list(map) {
            Some((_, records)) => write_array_csv(&mut wtr, records),
            None => {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &scalar_text(val, "")]);
                }
            }
        },
        other => {
            let _ = wtr.write_record([&scalar_text(other, "")]);
        }
    }

    let _ = wtr.flush();
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if !arr.iter().any(Value::is_object) {
        for item in arr {
            let _ = wtr.write_record([&scalar_text(item, "")]);
        }
        return;
    }

    let headers = record_headers(arr);
    let _ = wtr.write_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let flat = flatten_record(map);
            let row: Vec<String> = headers
                .iter()
                .map(|h| {
                    flat.iter()
                        .find(|(k, _)| k == h)
                        .map(|(_, v)| scalar_text(v, ""))
                        .unwrap_or_default()
                })
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
