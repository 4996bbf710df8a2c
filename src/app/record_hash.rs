//! The record-hash service.
//!
//! Fingerprints entity payloads, submits the fingerprint to the configured ledger and
//! keeps a local [`BlockchainTransactionRecord`] for every successful submission.

use crate::crypto::hashing::{hash_value, to_hex};
use crate::domain::model::{
    Anchored, BlockchainTransactionRecord, EntityKind, NetworkStatus, RecordReceipt,
};
use crate::infra::ledger::{AnchorRequest, LedgerClient, LedgerError};
use crate::storage::{Filter, Repository, StoreError};
use chrono::Utc;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct RecordHashService {
    repo: Repository,
    ledger: Arc<dyn LedgerClient>,
}

impl RecordHashService {
    pub fn new(repo: Repository, ledger: Arc<dyn LedgerClient>) -> Self {
        Self { repo, ledger }
    }

    pub fn mode(&self) -> &'static str {
        self.ledger.mode()
    }

    /// Lowercase hex SHA-256 of the canonical form of `data`.
    pub fn hash(data: &JsonValue) -> String {
        to_hex(&hash_value(data))
    }

    /// Submits the fingerprint of `data` and stores the local transaction record.
    pub async fn record_document(
        &self,
        entity_type: EntityKind,
        entity_id: &str,
        data: &JsonValue,
        participant_id: &str,
        event_type: &str,
    ) -> Result<RecordReceipt, RecordError> {
        let document_hash = hash_value(data);
        let receipt = self
            .ledger
            .submit(AnchorRequest {
                entity_type,
                entity_id,
                document_hash,
            })
            .await
            .map_err(|e| {
                error!(%entity_type, entity_id, error = %e, "ledger submission failed");
                e
            })?;

        let record = BlockchainTransactionRecord {
            tx_hash: receipt.tx_hash.clone(),
            event_type: event_type.to_string(),
            entity_type,
            entity_id: entity_id.to_string(),
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            document_hash: to_hex(&document_hash),
            participant_id: participant_id.to_string(),
            metadata: receipt.metadata,
            verified: receipt.verified,
            timestamp: Utc::now(),
        };
        self.repo.insert(&record).await?;

        info!(
            mode = self.mode(),
            %entity_type,
            entity_id,
            tx_hash = %record.tx_hash,
            block = record.block_number,
            "document anchored"
        );

        Ok(RecordReceipt {
            tx_hash: record.tx_hash,
            block_number: record.block_number,
            gas_used: record.gas_used,
            document_hash: record.document_hash,
            verified: record.verified,
        })
    }

    /// Anchors `entity` and persists the updated anchor fields.
    ///
    /// Returns `None` when the entity is already verified under the same hash.
    pub async fn anchor<T: Anchored>(
        &self,
        entity: &mut T,
        event_type: &str,
        participant_id: &str,
    ) -> Result<Option<RecordReceipt>, RecordError> {
        let payload = entity.anchor_payload();
        let hash = Self::hash(&payload);
        let current = entity.anchor();
        if current.blockchain_verified && current.document_hash.as_deref() == Some(hash.as_str()) {
            return Ok(None);
        }

        let receipt = self
            .record_document(
                entity.entity_kind(),
                entity.id(),
                &payload,
                participant_id,
                event_type,
            )
            .await?;

        let state = entity.anchor_mut();
        state.document_hash = Some(receipt.document_hash.clone());
        state.blockchain_tx_hash = Some(receipt.tx_hash.clone());
        state.blockchain_verified = receipt.verified;
        self.repo.update(&*entity).await?;
        Ok(Some(receipt))
    }

    /// Asks the ledger whether `entity_id` was anchored; ledger failures read as `false`.
    pub async fn verify_document(
        &self,
        entity_type: EntityKind,
        entity_id: &str,
    ) -> Result<bool, RecordError> {
        let verified = match self.ledger.verify(entity_type, entity_id).await {
            Ok(v) => v,
            Err(e) => {
                error!(%entity_type, entity_id, error = %e, "verification failed");
                false
            }
        };
        if verified {
            let pending = Filter::new()
                .eq("entityType", entity_type.as_str())
                .eq("entityId", entity_id)
                .eq("verified", false);
            let records: Vec<BlockchainTransactionRecord> = self.repo.list(&pending).await?;
            for mut record in records {
                record.verified = true;
                self.repo.update(&record).await?;
            }
        }
        Ok(verified)
    }

    pub async fn network_status(&self) -> NetworkStatus {
        match self.ledger.network_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "ledger network status unavailable");
                NetworkStatus::disconnected()
            }
        }
    }

    pub async fn transactions(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<BlockchainTransactionRecord>, RecordError> {
        Ok(self.repo.recent(&Filter::new(), limit).await?)
    }

    pub async fn transaction(
        &self,
        tx_hash: &str,
    ) -> Result<Option<BlockchainTransactionRecord>, RecordError> {
        Ok(self.repo.get(tx_hash).await?)
    }
}
