use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use sov_canon::{GENESIS, Hash};

use crate::error::LedgerError;

pub const GENESIS_TYPE: &str = "genesis";
pub const CONSTITUTION_VERSION: &str = "constitution_version";
pub const VIOLATION: &str = "violation";

/// Immutable audit record.
///
/// The hash covers every field; a missing `prev_hash` hashes as `"GENESIS"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawRecord")]
pub struct LedgerRecord {
    tick: u64,
    record_type: String,
    payload: Map<String, Value>,
    node_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    prev_hash: Option<String>,
    metadata: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawRecord {
    tick: u64,
    record_type: String,
    payload: Map<String, Value>,
    node_id: String,
    #[serde(default)]
    prev_hash: Option<String>,
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl TryFrom<RawRecord> for LedgerRecord {
    type Error = LedgerError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let record = LedgerRecord::new(raw.tick, raw.record_type, raw.node_id, raw.payload)?
            .with_metadata(raw.metadata);
        // Archived lines carry the sentinel; in memory the genesis link is `None`.
        let prev_hash = raw.prev_hash.filter(|hash| hash != GENESIS);
        if let Some(hash) = &prev_hash {
            Hash::from_hex_str(hash)
                .map_err(|err| LedgerError::MalformedRecord(format!("prev_hash: {err}")))?;
        }
        Ok(record.with_prev_hash(prev_hash))
    }
}

impl LedgerRecord {
    pub fn new(
        tick: u64,
        record_type: impl Into<String>,
        node_id: impl Into<String>,
        payload: Map<String, Value>,
    ) -> Result<Self, LedgerError> {
        let record_type = record_type.into();
        let node_id = node_id.into();
        if record_type.is_empty() {
            return Err(LedgerError::MalformedRecord("record_type is empty".into()));
        }
        if node_id.is_empty() {
            return Err(LedgerError::MalformedRecord("node_id is empty".into()));
        }
        Ok(Self {
            tick,
            record_type,
            payload,
            node_id,
            prev_hash: None,
            metadata: Map::new(),
        })
    }

    /// First record of a chain: tick 0, type `genesis`, emitted by `system`.
    pub fn genesis() -> Self {
        Self {
            tick: 0,
            record_type: GENESIS_TYPE.to_string(),
            payload: Map::new(),
            node_id: "system".to_string(),
            prev_hash: None,
            metadata: Map::new(),
        }
    }

    /// Parse a record from JSON, rejecting missing or empty required fields.
    pub fn from_value(value: Value) -> Result<Self, LedgerError> {
        serde_json::from_value(value).map_err(|err| LedgerError::MalformedRecord(err.to_string()))
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Copy of this record linked to `prev_hash`.
    pub fn with_prev_hash(&self, prev_hash: Option<String>) -> Self {
        Self {
            prev_hash,
            ..self.clone()
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn prev_hash(&self) -> Option<&str> {
        self.prev_hash.as_deref()
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// The exact object that is hashed and archived.
    pub fn canonical_payload(&self) -> Value {
        json!({
            "tick": self.tick,
            "record_type": self.record_type,
            "payload": self.payload,
            "node_id": self.node_id,
            "prev_hash": self.prev_hash.as_deref().unwrap_or(GENESIS),
            "metadata": self.metadata,
        })
    }

    /// Hex SHA-256 of the canonical JSON encoding of [`canonical_payload`](Self::canonical_payload).
    pub fn compute_hash(&self) -> String {
        Hash::of_value(&self.canonical_payload()).to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sov_canon::to_canonical_json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn hash_is_stable_and_field_determined() {
        let a = LedgerRecord::new(3, "policy_change", "n1", payload(json!({"rule": "deny"})))
            .unwrap()
            .with_prev_hash(Some("ab".repeat(32)));
        let b = LedgerRecord::new(3, "policy_change", "n1", payload(json!({"rule": "deny"})))
            .unwrap()
            .with_prev_hash(Some("ab".repeat(32)));
        assert_eq!(a.compute_hash(), a.compute_hash());
        assert_eq!(a.compute_hash(), b.compute_hash());
        assert_eq!(a.compute_hash().len(), 64);

        let other = a.with_prev_hash(None);
        assert_ne!(a.compute_hash(), other.compute_hash());
        assert_eq!(a.prev_hash(), Some("ab".repeat(32).as_str()));
    }

    #[test]
    fn canonical_encoding_matches_reference_layout() {
        let record = LedgerRecord::genesis();
        assert_eq!(
            to_canonical_json(&record.canonical_payload()).unwrap(),
            r#"{"metadata":{},"node_id":"system","payload":{},"prev_hash":"GENESIS","record_type":"genesis","tick":0}"#
        );
        // A missing link and the explicit sentinel hash identically.
        let explicit = record.with_prev_hash(Some(GENESIS.to_string()));
        assert_eq!(record.compute_hash(), explicit.compute_hash());
    }

    #[test]
    fn empty_required_fields_are_rejected() {
        assert!(matches!(
            LedgerRecord::new(1, "", "n1", Map::new()),
            Err(LedgerError::MalformedRecord(_))
        ));
        assert!(matches!(
            LedgerRecord::new(1, "violation", "", Map::new()),
            Err(LedgerError::MalformedRecord(_))
        ));
    }

    #[test]
    fn from_value_requires_fields() {
        let missing_node = json!({"tick": 1, "record_type": "violation", "payload": {}});
        assert!(matches!(
            LedgerRecord::from_value(missing_node),
            Err(LedgerError::MalformedRecord(_))
        ));

        let archived = json!({
            "tick": 2,
            "record_type": "violation",
            "payload": {"rule": "r1"},
            "node_id": "n1",
            "prev_hash": "GENESIS",
            "metadata": {"scenario": "s1"}
        });
        let record = LedgerRecord::from_value(archived.clone()).unwrap();
        assert_eq!(record.prev_hash(), None);
        assert_eq!(record.canonical_payload(), archived);
    }

    #[test]
    fn from_value_rejects_malformed_links() {
        let base = json!({"tick": 2, "record_type": "violation", "payload": {}, "node_id": "n1"});
        let not_hex = "zz".repeat(32);
        for bad in ["abc", "GENESIS ", not_hex.as_str()] {
            let mut value = base.clone();
            value["prev_hash"] = json!(bad);
            assert!(matches!(
                LedgerRecord::from_value(value),
                Err(LedgerError::MalformedRecord(reason)) if reason.contains("prev_hash")
            ));
        }

        let mut linked = base;
        linked["prev_hash"] = json!("0f".repeat(32));
        let record = LedgerRecord::from_value(linked).unwrap();
        assert_eq!(record.prev_hash(), Some("0f".repeat(32).as_str()));
    }
}
