//! # Canonical Serialization: JCS Byte Production
//!
//! `CanonicalBytes` is the sole construction path for bytes that are hashed
//! (record digests, deployment addresses) or signed (messages verified
//! against a signet's Ed25519 material).
//!
//! ## Security Invariant
//!
//! The inner buffer is private. The only constructor runs the coercion
//! pipeline and then RFC 8785 serialization, so two parties that serialize
//! the same logical value always agree on the bytes they hash or sign.
//!
//! ## Coercion Rules
//!
//! 1. **Reject floats.** JCS number formatting of non-integers is a
//!    cross-implementation hazard; versions and sequences are integers.
//! 2. **Object keys are strings.** Guaranteed by `serde_json::Map`.
//! 3. **Sorted keys, compact separators.** Delegated to `serde_jcs`.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization with float rejection.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - No float values appear anywhere in the encoded tree.
/// - Object keys are sorted; separators are compact (RFC 8785).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value contains a
    /// non-integer number, or `SerializationFailed` if serde cannot encode it.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let coerced = coerce_json_value(value)?;
        let bytes = serialize_canonical(&coerced)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn coerce_json_value(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(value),
        Value::Number(ref n) => {
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(value)
        }
        Value::Object(map) => {
            let mut coerced = serde_json::Map::new();
            for (k, v) in map {
                coerced.insert(k, coerce_json_value(v)?);
            }
            Ok(Value::Object(coerced))
        }
        Value::Array(arr) => {
            let coerced: Result<Vec<_>, _> = arr.into_iter().map(coerce_json_value).collect();
            Ok(Value::Array(coerced?))
        }
    }
}

fn serialize_canonical(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    let s = serde_jcs::to_string(value)?;
    Ok(s.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical_str(value: &impl Serialize) -> String {
        let cb = CanonicalBytes::new(value).expect("should canonicalize");
        String::from_utf8(cb.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn keys_are_sorted_and_compact() {
        let data = serde_json::json!({"subject": "S1", "owner": "O1", "version": 0});
        assert_eq!(
            canonical_str(&data),
            r#"{"owner":"O1","subject":"S1","version":0}"#
        );
    }

    #[test]
    fn nested_objects_are_sorted() {
        let data = serde_json::json!({
            "record": {"status": "active", "material": {"type": "opaque"}},
            "events": [3, 2, 1]
        });
        assert_eq!(
            canonical_str(&data),
            r#"{"events":[3,2,1],"record":{"material":{"type":"opaque"},"status":"active"}}"#
        );
    }

    #[test]
    fn float_is_rejected() {
        let data = serde_json::json!({"threshold": 0.25});
        match CanonicalBytes::new(&data).unwrap_err() {
            CanonicalizationError::FloatRejected(f) => assert_eq!(f, 0.25),
            other => panic!("expected FloatRejected, got: {other}"),
        }
    }

    #[test]
    fn deeply_nested_float_is_rejected() {
        let data = serde_json::json!({"a": [{"b": {"c": 1.5}}]});
        assert!(CanonicalBytes::new(&data).is_err());
    }

    #[test]
    fn large_unsigned_integers_pass() {
        let data = serde_json::json!({"sequence": u64::MAX});
        assert_eq!(
            canonical_str(&data),
            format!(r#"{{"sequence":{}}}"#, u64::MAX)
        );
    }

    #[test]
    fn unicode_passes_through_as_utf8() {
        let data = serde_json::json!({"title": "Bukti Keaslian \u{00e9}"});
        assert!(canonical_str(&data).contains('\u{00e9}'));
    }

    #[test]
    fn empty_containers() {
        assert_eq!(canonical_str(&serde_json::json!({})), "{}");
        assert_eq!(canonical_str(&serde_json::json!([])), "[]");
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert!(!cb.is_empty());
        assert_eq!(cb.len(), 2);
    }
}
