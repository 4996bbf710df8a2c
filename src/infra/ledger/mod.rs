//! Ledger clients that anchor document hashes.
//!
//! [`SimulatedLedgerClient`] fabricates receipts for demo deployments;
//! [`RemoteLedgerClient`] talks to the document registry program over Solana RPC.
//! One of them is chosen at startup from [`AppConfig`].

use crate::domain::model::{EntityKind, NetworkStatus};
use crate::infra::config::AppConfig;
use crate::storage::{Repository, StoreError};
use async_trait::async_trait;
use primitive_types::H256;
use serde_json::Value as JsonValue;
use std::sync::Arc;

pub mod simulated;
pub mod solana;

pub use simulated::SimulatedLedgerClient;
pub use solana::RemoteLedgerClient;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger RPC failed: {0}")]
    Rpc(String),
    #[error("ledger is misconfigured: {0}")]
    Config(String),
    #[error("local ledger records unavailable: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorRequest<'a> {
    pub entity_type: EntityKind,
    pub entity_id: &'a str,
    pub document_hash: H256,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerReceipt {
    pub tx_hash: String,
    pub block_number: u64,
    pub gas_used: u64,
    pub verified: bool,
    /// Stored alongside the local transaction record.
    pub metadata: JsonValue,
}

#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// "demo" or "live".
    fn mode(&self) -> &'static str;

    async fn submit(&self, request: AnchorRequest<'_>) -> Result<LedgerReceipt, LedgerError>;

    async fn verify(&self, entity_type: EntityKind, entity_id: &str) -> Result<bool, LedgerError>;

    async fn network_status(&self) -> Result<NetworkStatus, LedgerError>;
}

/// Picks the ledger for this process: simulated in demo mode, remote otherwise.
pub fn ledger_from_config(
    config: &AppConfig,
    repo: Repository,
) -> Result<Arc<dyn LedgerClient>, LedgerError> {
    match (&config.ledger, config.demo_mode) {
        (_, true) => Ok(Arc::new(SimulatedLedgerClient::new(repo))),
        (Some(settings), false) => Ok(Arc::new(RemoteLedgerClient::from_settings(settings)?)),
        (None, false) => Err(LedgerError::Config(
            "DEMO_MODE=false but no ledger settings were provided".to_string(),
        )),
    }
}
