//! Reserved record properties.
//!
//! Documents travel as plain JSON objects. Two `$`-prefixed properties are
//! reserved: `$id` carries the record key and `$bucketname` the bucket the
//! record was read from.

use serde_json::Value;

pub const RECORD_ID_KEY: &str = "$id";
pub const RECORD_BUCKET_KEY: &str = "$bucketname";

/// The record key, if set. Empty strings count as unset.
pub fn record_id(record: &Value) -> Option<String> {
    reserved_identifier(record, RECORD_ID_KEY)
}

/// The record's bucket, if set. Empty strings count as unset.
pub fn record_bucket(record: &Value) -> Option<String> {
    reserved_identifier(record, RECORD_BUCKET_KEY)
}

fn reserved_identifier(record: &Value, property: &str) -> Option<String> {
    match record.get(property)? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
