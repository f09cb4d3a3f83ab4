//! Content digests: BLAKE2b-256 over the canonical LC-B encoding.
//!
//! Canonicalization is exactly the plain LC-B encoding with one change:
//! `Object` entries are written in lexicographic key order instead of
//! insertion order. `Contract` fields need no such step — `Contract`
//! itself only ever holds fields in ascending index order.

use crate::encode::write_value;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest as _};
use hlx_value::{Digest, Handle, Value};

type Blake2b256 = Blake2b<U32>;

/// Encodes `value` the way [`crate::encode::encode_value`] does, except
/// `Object` keys are sorted lexicographically first.
pub fn canonical_encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    write_value(&mut buf, value, true);
    buf
}

/// The content digest of `value`: BLAKE2b-256 of its canonical LC-B
/// encoding.
pub fn digest(value: &Value) -> Digest {
    digest_bytes(&canonical_encode(value))
}

/// BLAKE2b-256 over raw bytes, with no LC-B encoding step. Used by the
/// content-addressed store, whose digest covers the exact bytes of the
/// stored blob rather than a `Value`.
pub fn digest_bytes(bytes: &[u8]) -> Digest {
    let mut hasher = Blake2b256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&out);
    Digest(arr)
}

/// Builds the handle string for `value` under the given tag prefix
/// (e.g. [`hlx_value::TAG_GENERIC`] or [`hlx_value::TAG_SHADER`]).
pub fn handle(tag: impl Into<String>, value: &Value) -> Handle {
    Handle::new(tag, digest(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlx_value::Object;

    #[test]
    fn object_key_order_does_not_affect_digest() {
        let mut a = Object::new();
        a.insert("a", Value::Int(1)).unwrap();
        a.insert("b", Value::Int(2)).unwrap();
        let mut b = Object::new();
        b.insert("b", Value::Int(2)).unwrap();
        b.insert("a", Value::Int(1)).unwrap();

        let da = digest(&Value::Object(a));
        let db = digest(&Value::Object(b));
        assert_eq!(da, db);
    }

    #[test]
    fn digest_bytes_is_deterministic() {
        let bytes = vec![0x03, 0x02, 0x23, 0x07, 0, 0, 1, 0];
        assert_eq!(digest_bytes(&bytes), digest_bytes(&bytes));
        assert_ne!(digest_bytes(&bytes), digest_bytes(&[0u8; 8]));
    }

    #[test]
    fn digest_equality_matches_value_equality() {
        let a = Value::Int(7);
        let b = Value::Int(7);
        let c = Value::Int(8);
        assert_eq!(digest(&a), digest(&b));
        assert_ne!(digest(&a), digest(&c));
    }
}
