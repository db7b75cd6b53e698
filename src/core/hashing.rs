//! Canonical serialization and content hashing
//!
//! Values go through `serde_json::Value` first: its object maps are ordered,
//! so keys come out sorted while arrays keep insertion order. Hashing that
//! string is a valid identity check for any serializable record.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::core::error::Result;

/// Serialize with sorted object keys
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let tree = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&tree)?)
}

/// SHA-256 hex digest of the canonical serialization
pub fn hash_value<T: Serialize>(value: &T) -> Result<String> {
    let json = canonical_json(value)?;
    Ok(sha256_hex(json.as_bytes()))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Unordered {
        zebra: u32,
        apple: Vec<u32>,
    }

    #[test]
    fn test_keys_are_sorted_and_arrays_kept() {
        let json = canonical_json(&Unordered {
            zebra: 1,
            apple: vec![3, 1, 2],
        })
        .unwrap();
        assert_eq!(json, r#"{"apple":[3,1,2],"zebra":1}"#);
    }

    #[test]
    fn test_hash_ignores_map_insertion_order() {
        let mut a = HashMap::new();
        a.insert("x", 1);
        a.insert("y", 2);
        let mut b = HashMap::new();
        b.insert("y", 2);
        b.insert("x", 1);
        assert_eq!(hash_value(&a).unwrap(), hash_value(&b).unwrap());
    }

    #[test]
    fn test_sha256_known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
