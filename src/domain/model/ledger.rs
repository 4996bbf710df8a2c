use crate::domain::model::{Entity, EntityKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// Local copy of one anchoring submission. Only `verified` changes after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainTransactionRecord {
    pub tx_hash: String,
    pub event_type: String,
    pub entity_type: EntityKind,
    pub entity_id: String,
    pub block_number: u64,
    pub gas_used: u64,
    pub document_hash: String,
    pub participant_id: String,
    #[schema(value_type = Object)]
    pub metadata: JsonValue,
    pub verified: bool,
    pub timestamp: DateTime<Utc>,
}

impl Entity for BlockchainTransactionRecord {
    const TABLE: &'static str = "blockchain_transactions";

    fn id(&self) -> &str {
        &self.tx_hash
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.tx_hash.clone())
    }
}

/// Returned by the record-hash service after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordReceipt {
    pub tx_hash: String,
    pub block_number: u64,
    pub gas_used: u64,
    pub document_hash: String,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
}

impl NetworkStatus {
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            block_number: None,
            chain_id: None,
        }
    }
}
