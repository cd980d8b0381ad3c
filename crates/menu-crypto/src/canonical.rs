//! Canonical JSON serialization.
//!
//! The rules are small and language-neutral so a snapshot hash can be
//! recomputed by any implementation:
//!
//! 1. UTF-8 JSON with no insignificant whitespace.
//! 2. Object keys sorted by the byte order of their UTF-8 encoding, at every
//!    nesting level.
//! 3. Array order is preserved.
//! 4. Strings are escaped exactly as `serde_json` escapes them.
//! 5. Numbers must be integers. Floating-point values are rejected; decimal
//!    quantities such as prices are carried as fixed-scale strings.

use serde::Serialize;
use serde_json::Value;

/// Errors from canonical serialization.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("floating-point number {0} cannot be canonicalized; encode it as a string")]
    FloatNotAllowed(String),
}

/// Serialize `value` into its canonical byte form.
pub fn to_canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CanonicalError> {
    let tree =
        serde_json::to_value(value).map_err(|e| CanonicalError::Serialization(e.to_string()))?;
    let mut out = Vec::with_capacity(256);
    write_value(&tree, &mut out)?;
    Ok(out)
}

/// Canonical form as a `String` (always valid UTF-8).
pub fn to_canonical_string<T: Serialize + ?Sized>(value: &T) -> Result<String, CanonicalError> {
    let bytes = to_canonical_bytes(value)?;
    String::from_utf8(bytes).map_err(|e| CanonicalError::Serialization(e.to_string()))
}

fn write_value(value: &Value, out: &mut Vec<u8>) -> Result<(), CanonicalError> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => {
            if !(n.is_i64() || n.is_u64()) {
                return Err(CanonicalError::FloatNotAllowed(n.to_string()));
            }
            out.extend_from_slice(n.to_string().as_bytes());
        }
        Value::String(s) => write_string(s, out)?,
        Value::Array(items) => {
            out.push(b'[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(b',');
                }
                write_value(item, out)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

            out.push(b'{');
            for (index, (key, item)) in entries.into_iter().enumerate() {
                if index > 0 {
                    out.push(b',');
                }
                write_string(key, out)?;
                out.push(b':');
                write_value(item, out)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

fn write_string(s: &str, out: &mut Vec<u8>) -> Result<(), CanonicalError> {
    serde_json::to_writer(&mut *out, s).map_err(|e| CanonicalError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn keys_are_sorted_recursively() {
        let value = json!({"b": 1, "a": {"z": true, "m": null}, "c": [3, 2, 1]});
        assert_eq!(
            to_canonical_string(&value).unwrap(),
            r#"{"a":{"m":null,"z":true},"b":1,"c":[3,2,1]}"#
        );
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let mut first = serde_json::Map::new();
        first.insert("price".into(), json!("120.00"));
        first.insert("name".into(), json!("Tea"));
        let mut second = serde_json::Map::new();
        second.insert("name".into(), json!("Tea"));
        second.insert("price".into(), json!("120.00"));
        assert_eq!(
            to_canonical_bytes(&Value::Object(first)).unwrap(),
            to_canonical_bytes(&Value::Object(second)).unwrap()
        );
    }

    #[test]
    fn floats_are_rejected() {
        let err = to_canonical_bytes(&json!({"price": 1.5})).unwrap_err();
        assert_eq!(err, CanonicalError::FloatNotAllowed("1.5".into()));
    }

    #[test]
    fn negative_and_large_integers_are_allowed() {
        let out = to_canonical_string(&json!([-7, u64::MAX])).unwrap();
        assert_eq!(out, format!("[-7,{}]", u64::MAX));
    }

    #[test]
    fn strings_are_escaped_like_serde_json() {
        let out = to_canonical_string(&json!({"name": "Çay \"special\"\n"})).unwrap();
        assert_eq!(out, "{\"name\":\"Çay \\\"special\\\"\\n\"}");
    }

    #[test]
    fn keys_sort_by_bytes_not_locale() {
        let out = to_canonical_string(&json!({"b": 0, "B": 0, "a": 0})).unwrap();
        assert_eq!(out, r#"{"B":0,"a":0,"b":0}"#);
    }

    #[test]
    fn structs_serialize_like_equivalent_maps() {
        #[derive(Serialize)]
        struct Entry {
            zeta: u32,
            alpha: &'static str,
        }
        let out = to_canonical_string(&Entry { zeta: 1, alpha: "x" }).unwrap();
        assert_eq!(out, r#"{"alpha":"x","zeta":1}"#);
    }

    proptest! {
        #[test]
        fn canonical_form_is_order_independent(
            entries in proptest::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..12)
        ) {
            let forward: serde_json::Map<String, Value> =
                entries.iter().map(|(k, v)| (k.clone(), json!(v))).collect();
            let reversed: serde_json::Map<String, Value> =
                entries.iter().rev().map(|(k, v)| (k.clone(), json!(v))).collect();
            prop_assert_eq!(
                to_canonical_bytes(&Value::Object(forward)).unwrap(),
                to_canonical_bytes(&Value::Object(reversed)).unwrap()
            );
        }

        #[test]
        fn canonical_output_parses_back_to_same_value(
            entries in proptest::collection::btree_map("[a-z]{1,6}", "[ -~]{0,10}", 0..8)
        ) {
            let value = json!(entries);
            let text = to_canonical_string(&value).unwrap();
            let parsed: Value = serde_json::from_str(&text).unwrap();
            prop_assert_eq!(parsed, value);
        }
    }
}
