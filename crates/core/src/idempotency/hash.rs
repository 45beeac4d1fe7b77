//! Canonical request-body hashing.
//!
//! Two bodies that differ only in mapping key order must hash identically,
//! so the serialization sorts object keys recursively before digesting.
//! Array order is meaningful (seat lists are ordered) and is preserved.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// SHA-256 hex digest over the canonical serialization of `body`.
pub fn request_hash(body: &Value) -> String {
    let canonical = canonical_json(body);
    let digest = Sha256::digest(canonical.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Deterministic serialization: objects with sorted keys, arrays in order,
/// scalars via serde_json's standard formatting.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[*key as &str], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_order_does_not_change_hash() {
        let a: Value =
            serde_json::from_str(r#"{"showtime_id":"st-1","seats":["A1","A2"]}"#).unwrap();
        let b: Value =
            serde_json::from_str(r#"{"seats":["A1","A2"],"showtime_id":"st-1"}"#).unwrap();
        assert_eq!(request_hash(&a), request_hash(&b));
    }

    #[test]
    fn test_nested_key_order_does_not_change_hash() {
        let a: Value = serde_json::from_str(r#"{"outer":{"x":1,"y":{"b":2,"a":3}}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"outer":{"y":{"a":3,"b":2},"x":1}}"#).unwrap();
        assert_eq!(request_hash(&a), request_hash(&b));
    }

    #[test]
    fn test_sequence_order_is_significant() {
        let a = json!({"seats": ["A1", "A2"]});
        let b = json!({"seats": ["A2", "A1"]});
        assert_ne!(request_hash(&a), request_hash(&b));
    }

    #[test]
    fn test_different_values_hash_differently() {
        let a = json!({"seats": ["A1"]});
        let b = json!({"seats": ["A2"]});
        assert_ne!(request_hash(&a), request_hash(&b));
    }

    #[test]
    fn test_canonical_form_is_sorted_and_compact() {
        let value = json!({"b": 1, "a": [true, null, "x"]});
        assert_eq!(canonical_json(&value), r#"{"a":[true,null,"x"],"b":1}"#);
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = request_hash(&json!({}));
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
