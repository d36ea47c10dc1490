use serde_json::Value;

/// Ordered alternative locations for one logical fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath {
    /// Canonical name used in warnings
    pub fact: &'static str,
    /// Dotted paths, highest priority first
    pub candidates: &'static [&'static str],
}

impl FieldPath {
    pub const fn new(fact: &'static str, candidates: &'static [&'static str]) -> Self {
        FieldPath { fact, candidates }
    }
}

/// Dereference one dotted path. Numeric segments index into arrays.
///
/// Returns `None` when any segment is missing or the final value is `null`.
pub fn lookup<'a>(record: &'a Value, dotted: &str) -> Option<&'a Value> {
    let mut current = record;
    for segment in dotted.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Return the value at the first candidate of `path` that is present.
pub fn resolve<'a>(record: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.candidates
        .iter()
        .find_map(|candidate| lookup(record, candidate))
}
