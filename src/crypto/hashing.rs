// This file is used to fingerprint documents into 256-bit hashes.

use primitive_types::H256;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

// Domain separation constants so a document fingerprint can never collide with a ledger key.
const DOCUMENT_DOMAIN: &[u8] = b"SHIPLEDGER_DOC";
const ENTITY_KEY_DOMAIN: &[u8] = b"SHIPLEDGER_KEY";

/// A helper function to sort a JSON object's keys recursively.
/// This is essential for canonical serialization.
fn sort_json_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted_map: BTreeMap<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), sort_json_value(v)))
                .collect();
            Value::Object(sorted_map.into_iter().collect())
        }
        Value::Array(arr) => {
            let sorted_arr = arr.iter().map(sort_json_value).collect();
            Value::Array(sorted_arr)
        }
        _ => value.clone(),
    }
}

/// Hashes a generic JSON value into a H256 digest.
/// Object key order never affects the result.
pub fn hash_value(value: &Value) -> H256 {
    let canonical_string = sort_json_value(value).to_string();

    let mut hasher = Sha256::new();
    hasher.update(DOCUMENT_DOMAIN);
    hasher.update(canonical_string.as_bytes());
    H256::from_slice(&hasher.finalize())
}

/// Derives the ledger key for an entity (`doc_key` on the registry program).
pub fn hash_key(entity_type: &str, entity_id: &str) -> H256 {
    let mut hasher = Sha256::new();
    hasher.update(ENTITY_KEY_DOMAIN);
    hasher.update(entity_type.as_bytes());
    hasher.update(b":");
    hasher.update(entity_id.as_bytes());
    H256::from_slice(&hasher.finalize())
}

/// Lowercase hex without a `0x` prefix, the form stored in `documentHash`.
pub fn to_hex(hash: &H256) -> String {
    hex::encode(hash.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_does_not_change_the_hash() {
        let a = json!({"shipper": "Acme", "cargo": {"weight": 10, "kind": "boxes"}});
        let b = json!({"cargo": {"kind": "boxes", "weight": 10}, "shipper": "Acme"});
        assert_eq!(hash_value(&a), hash_value(&b));
    }

    #[test]
    fn any_field_change_changes_the_hash() {
        let a = json!({"shipper": "Acme", "packages": 10});
        let b = json!({"shipper": "Acme", "packages": 11});
        let c = json!({"shipper": "Acme Ltd", "packages": 10});
        assert_ne!(hash_value(&a), hash_value(&b));
        assert_ne!(hash_value(&a), hash_value(&c));
    }

    #[test]
    fn entity_keys_are_separated_by_type() {
        assert_ne!(hash_key("shipment", "1"), hash_key("bill_of_lading", "1"));
        assert_ne!(hash_key("ab", "c"), hash_key("a", "bc"));
    }

    #[test]
    fn hex_is_lowercase_and_unprefixed() {
        let rendered = to_hex(&hash_value(&json!({"x": 1})));
        assert_eq!(rendered.len(), 64);
        assert!(rendered.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}
