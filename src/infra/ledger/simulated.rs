use crate::domain::model::{BlockchainTransactionRecord, EntityKind, NetworkStatus};
use crate::infra::ledger::{AnchorRequest, LedgerClient, LedgerError, LedgerReceipt};
use crate::storage::{Filter, Repository};
use async_trait::async_trait;
use rand::Rng;
use serde_json::json;
use std::ops::Range;

pub const DEMO_CHAIN_ID: &str = "999";
pub const DEMO_BLOCK_RANGE: Range<u64> = 12_345_000..13_345_000;
pub const DEMO_GAS_RANGE: Range<u64> = 20_000..50_000;

/// Demo ledger. Nothing leaves the process; verification consults local records.
#[derive(Clone)]
pub struct SimulatedLedgerClient {
    repo: Repository,
}

impl SimulatedLedgerClient {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }
}

fn fabricate_receipt() -> LedgerReceipt {
    let mut rng = rand::thread_rng();
    let tx_bytes: [u8; 32] = rng.gen();
    LedgerReceipt {
        tx_hash: format!("0x{}", hex::encode(tx_bytes)),
        block_number: rng.gen_range(DEMO_BLOCK_RANGE),
        gas_used: rng.gen_range(DEMO_GAS_RANGE),
        verified: true,
        metadata: json!({ "demoMode": true }),
    }
}

#[async_trait]
impl LedgerClient for SimulatedLedgerClient {
    fn mode(&self) -> &'static str {
        "demo"
    }

    async fn submit(&self, _request: AnchorRequest<'_>) -> Result<LedgerReceipt, LedgerError> {
        Ok(fabricate_receipt())
    }

    async fn verify(&self, entity_type: EntityKind, entity_id: &str) -> Result<bool, LedgerError> {
        let filter = Filter::new()
            .eq("entityType", entity_type.as_str())
            .eq("entityId", entity_id);
        let records: Vec<BlockchainTransactionRecord> = self.repo.recent(&filter, Some(1)).await?;
        Ok(!records.is_empty())
    }

    async fn network_status(&self) -> Result<NetworkStatus, LedgerError> {
        let block = rand::thread_rng().gen_range(DEMO_BLOCK_RANGE);
        Ok(NetworkStatus {
            connected: true,
            block_number: Some(block),
            chain_id: Some(DEMO_CHAIN_ID.to_string()),
        })
    }
}
