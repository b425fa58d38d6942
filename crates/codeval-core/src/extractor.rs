//! Pulls the tagged result out of sandbox stdout and canonicalizes it.
//!
//! The payload is whatever sits between the first and the last `<<RESULT>>`
//! marker. Output that itself prints the marker will be mis-bounded; that is
//! the observed protocol and is kept as is.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::errors::ExtractError;

pub const RESULT_MARKER: &str = "<<RESULT>>";

pub fn extract_result(raw_output: &str) -> Result<String, ExtractError> {
    let start = raw_output
        .find(RESULT_MARKER)
        .ok_or(ExtractError::MalformedResult)?;
    let end = raw_output
        .rfind(RESULT_MARKER)
        .ok_or(ExtractError::MalformedResult)?;
    if start == end {
        return Err(ExtractError::MalformedResult);
    }

    let payload = &raw_output[start + RESULT_MARKER.len()..end];
    let value: Value =
        serde_json::from_str(payload).map_err(|e| ExtractError::InvalidJson(e.to_string()))?;

    to_canonical_json(&value)
}

/// JSON with 4-space indentation, object keys sorted at every level and
/// integral floats written as integers.
pub fn to_canonical_json(value: &Value) -> Result<String, ExtractError> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    canonicalize(value)
        .serialize(&mut serializer)
        .map_err(|e| ExtractError::InvalidJson(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| ExtractError::InvalidJson(e.to_string()))
}

// Largest magnitude below which every integral f64 has an exact i64 form.
const MAX_EXACT_INTEGRAL_FLOAT: f64 = 9_007_199_254_740_992.0;

// `Map` keeps insertion order under `preserve_order`, so entries are
// reinserted from a `BTreeMap` to come out sorted.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonicalize(v))).collect();
            let mut out = Map::with_capacity(sorted.len());
            for (key, value) in sorted {
                out.insert(key.clone(), value);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Number(number) => match number.as_f64() {
            Some(f)
                if !number.is_i64()
                    && !number.is_u64()
                    && f.is_finite()
                    && f.fract() == 0.0
                    && f.abs() < MAX_EXACT_INTEGRAL_FLOAT =>
            {
                Value::from(f as i64)
            }
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}
