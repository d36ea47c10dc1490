use std::collections::BTreeMap;

use serde_json::Value;

use super::fields::{MONTHLY_INDEX, YEARLY_INDEX};
use super::periods::Granularity;
use crate::resolver::{resolve_count, FieldPath};

fn index_path(granularity: Granularity) -> &'static FieldPath {
    match granularity {
        Granularity::Yearly => &YEARLY_INDEX,
        Granularity::Monthly => &MONTHLY_INDEX,
    }
}

/// Index a period collection by numeric period, whatever shape it arrived in.
///
/// Duplicate indices keep their first occurrence.
pub(crate) fn index_records(collection: &Value, granularity: Granularity) -> BTreeMap<u32, &Value> {
    let mut indexed = BTreeMap::new();
    collect(collection, granularity, true, &mut indexed);
    indexed
}

fn collect<'a>(
    collection: &'a Value,
    granularity: Granularity,
    allow_split: bool,
    out: &mut BTreeMap<u32, &'a Value>,
) {
    match collection {
        Value::Array(items) => {
            for (position, item) in items.iter().enumerate() {
                if !item.is_object() {
                    continue;
                }
                let index = resolve_count(item, index_path(granularity)).unwrap_or(position as u32);
                out.entry(index).or_insert(item);
            }
        }
        Value::Object(map) => {
            let is_split = map.contains_key("yearly") || map.contains_key("monthly");
            if is_split {
                if !allow_split {
                    return;
                }
                if let Some(sub) = map.get(granularity.key()) {
                    collect(sub, granularity, false, out);
                }
                return;
            }
            for (key, item) in map {
                if !item.is_object() {
                    continue;
                }
                if let Ok(index) = key.trim().parse::<u32>() {
                    out.entry(index).or_insert(item);
                }
            }
        }
        _ => {}
    }
}
