use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::path::{resolve, FieldPath};
use super::value::{as_bool, as_count, as_decimal, as_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No candidate location held a value
    Missing,
    /// The winning candidate held a value of the wrong type
    Unusable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedFact {
    pub fact: &'static str,
    pub reason: UnresolvedReason,
}

impl UnresolvedFact {
    pub fn warning(&self) -> String {
        match self.reason {
            UnresolvedReason::Missing => format!("missing field: {}", self.fact),
            UnresolvedReason::Unusable => format!("unusable field: {}", self.fact),
        }
    }
}

/// Resolves facts against one record and remembers which ones it could not.
pub struct FactReader<'a> {
    record: &'a Value,
    unresolved: Vec<UnresolvedFact>,
}

impl<'a> FactReader<'a> {
    pub fn new(record: &'a Value) -> Self {
        FactReader {
            record,
            unresolved: Vec::new(),
        }
    }

    pub fn record(&self) -> &'a Value {
        self.record
    }

    fn note(&mut self, path: &FieldPath, reason: UnresolvedReason) {
        self.unresolved.push(UnresolvedFact {
            fact: path.fact,
            reason,
        });
    }

    fn coerce<T>(&mut self, path: &FieldPath, convert: impl Fn(&Value) -> Option<T>) -> Option<T> {
        match resolve(self.record, path) {
            None => {
                self.note(path, UnresolvedReason::Missing);
                None
            }
            Some(value) => {
                let converted = convert(value);
                if converted.is_none() {
                    self.note(path, UnresolvedReason::Unusable);
                }
                converted
            }
        }
    }

    pub fn value(&mut self, path: &FieldPath) -> Option<&'a Value> {
        let found = resolve(self.record, path);
        if found.is_none() {
            self.note(path, UnresolvedReason::Missing);
        }
        found
    }

    /// Resolve without recording absence. For facts that are optional by nature.
    pub fn peek(&self, path: &FieldPath) -> Option<&'a Value> {
        resolve(self.record, path)
    }

    pub fn decimal(&mut self, path: &FieldPath) -> Option<Decimal> {
        self.coerce(path, as_decimal)
    }

    pub fn count(&mut self, path: &FieldPath) -> Option<u32> {
        self.coerce(path, as_count)
    }

    pub fn string(&mut self, path: &FieldPath) -> Option<String> {
        self.coerce(path, as_string)
    }

    pub fn bool(&mut self, path: &FieldPath) -> Option<bool> {
        self.coerce(path, as_bool)
    }

    pub fn unresolved(&self) -> &[UnresolvedFact] {
        &self.unresolved
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.unresolved.iter().map(UnresolvedFact::warning).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    const TVPI: FieldPath = FieldPath::new("metrics.tvpi", &["metrics.tvpi", "tvpi"]);
    const DPI: FieldPath = FieldPath::new("metrics.dpi", &["metrics.dpi", "dpi"]);

    #[test]
    fn test_reader_records_missing_and_unusable() {
        let raw = json!({ "tvpi": 1.4, "dpi": "soon" });
        let mut reader = FactReader::new(&raw);
        assert_eq!(reader.decimal(&TVPI), Some(dec!(1.4)));
        assert_eq!(reader.decimal(&DPI), None);
        assert_eq!(
            reader.unresolved(),
            &[UnresolvedFact {
                fact: "metrics.dpi",
                reason: UnresolvedReason::Unusable
            }]
        );
        assert_eq!(reader.into_warnings(), vec!["unusable field: metrics.dpi"]);
    }

    #[test]
    fn test_peek_does_not_record() {
        let raw = json!({});
        let reader = FactReader::new(&raw);
        assert!(reader.peek(&TVPI).is_none());
        assert!(reader.unresolved().is_empty());
    }
}
