//! JSON serialization helpers for deterministic on-disk output.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Serializes a value to deterministic JSON: 2-space indentation,
/// trailing newline, map keys in `BTreeMap` order.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    let mut json = String::from_utf8(buffer).map_err(|e| {
        serde::ser::Error::custom(format!("serialized JSON was not UTF-8: {e}"))
    })?;
    json.push('\n');
    Ok(json)
}

/// Deserializes JSON from bytes. Handles both pretty-printed and
/// minified input.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or does not match the type.
pub fn from_json_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(bytes)
}
