// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Value codec: structured values <-> the backend's string storage model.
//
// Serialization is plain JSON. Deserialization is deliberately defensive:
// a backend may hold entries written by something other than this codec
// (a bare legacy string, say), and those must come back as strings instead
// of failing the whole read. Both directions are pure functions.

use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;

/// Marker for a raw string that is not structured JSON. Handled locally by
/// substituting the raw string itself; never propagated.
struct NotStructured;

/// Serialize a value into the string form stored in a backend.
///
/// Any value the serde data model can represent round-trips. Values it
/// cannot encode (for instance non-string map keys, the closest Rust
/// gets to an unencodable cyclic structure) surface as
/// [`StoreError::Encode`].
pub fn serialize<T: Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(StoreError::Encode)
}

/// Attempt a structured decode of a raw stored string.
fn decode(raw: &str) -> Result<Value, NotStructured> {
    serde_json::from_str(raw).map_err(|_| NotStructured)
}

/// Deserialize a raw stored string back into a structured value.
///
/// Absent or empty input yields `None`; the caller substitutes its own
/// default. A raw string that does not decode as JSON was written by
/// foreign code and is returned unchanged as `Value::String`; this is
/// the legacy-compatibility policy, not an error path.
pub fn deserialize(raw: Option<&str>) -> Option<Value> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }
    match decode(raw) {
        Ok(value) => Some(value),
        Err(NotStructured) => Some(Value::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_scalars() {
        assert_eq!(serialize(&42i64).unwrap(), "42");
        assert_eq!(serialize(&true).unwrap(), "true");
        assert_eq!(serialize(&"hi").unwrap(), "\"hi\"");
        assert_eq!(serialize(&Value::Null).unwrap(), "null");
    }

    #[test]
    fn test_serialize_nested() {
        let value = json!({"user": {"name": "Alice", "tags": ["a", "b"]}, "n": 3});
        let raw = serialize(&value).unwrap();
        // Round-trips through the decoder.
        assert_eq!(deserialize(Some(&raw)), Some(value));
    }

    #[test]
    fn test_serialize_rejects_non_string_map_keys() {
        use std::collections::HashMap;
        let mut map: HashMap<Vec<u8>, u32> = HashMap::new();
        map.insert(vec![1, 2], 3);
        let err = serialize(&map).unwrap_err();
        assert!(matches!(err, StoreError::Encode(_)));
    }

    #[test]
    fn test_deserialize_absent_and_empty() {
        assert_eq!(deserialize(None), None);
        assert_eq!(deserialize(Some("")), None);
    }

    #[test]
    fn test_deserialize_structured() {
        assert_eq!(deserialize(Some("42")), Some(json!(42)));
        assert_eq!(deserialize(Some("[1,2]")), Some(json!([1, 2])));
        assert_eq!(deserialize(Some("{\"a\":1}")), Some(json!({"a": 1})));
    }

    #[test]
    fn test_deserialize_legacy_string() {
        // Written by foreign code: not valid JSON, comes back verbatim.
        assert_eq!(
            deserialize(Some("plainstring")),
            Some(Value::String("plainstring".to_string()))
        );
        assert_eq!(
            deserialize(Some("{broken json")),
            Some(Value::String("{broken json".to_string()))
        );
    }

    #[test]
    fn test_deserialize_null_is_a_value() {
        // JSON null is a real stored value, not the absent case.
        assert_eq!(deserialize(Some("null")), Some(Value::Null));
    }
}
