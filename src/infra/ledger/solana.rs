// Responsible for all communication with the document registry program on Solana.

use crate::crypto::hashing::hash_key;
use crate::domain::model::{EntityKind, NetworkStatus};
use crate::infra::config::LedgerSettings;
use crate::infra::ledger::{AnchorRequest, LedgerClient, LedgerError, LedgerReceipt};
use async_trait::async_trait;
use primitive_types::H256;
use serde_json::json;
use sha2::{Digest, Sha256};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    signer::{
        keypair::{read_keypair_file, Keypair},
        Signer,
    },
    transaction::Transaction,
};
use std::str::FromStr;
use tracing::info;

/// PDA seed prefix; must match the program.
pub const DOCUMENT_SEED: &[u8] = b"document";

// Account layout: 8-byte discriminator + 32-byte hash + 32-byte participant + 8-byte timestamp.
const HASH_OFFSET: usize = 8;
const HASH_END: usize = HASH_OFFSET + 32;

fn rpc_err(err: impl std::fmt::Display) -> LedgerError {
    LedgerError::Rpc(err.to_string())
}

/// Anchor's instruction discriminator: first 8 bytes of sha256("global:<name>").
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("global:{}", name).as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// Address of the registry account holding one entity's hash.
pub fn document_pda(program_id: &Pubkey, doc_key: &H256) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[DOCUMENT_SEED, doc_key.as_bytes()], program_id)
}

/// Builds `record_document(doc_key, doc_hash)` signed by `payer`.
pub fn record_document_instruction(
    program_id: Pubkey,
    payer: Pubkey,
    doc_key: H256,
    doc_hash: H256,
) -> Instruction {
    let (pda, _bump) = document_pda(&program_id, &doc_key);
    let accounts = vec![
        AccountMeta::new(pda, false),
        AccountMeta::new(payer, true),
        AccountMeta::new_readonly(solana_program::system_program::ID, false),
    ];

    let mut data = instruction_discriminator("record_document").to_vec();
    data.extend_from_slice(&doc_key.to_fixed_bytes());
    data.extend_from_slice(&doc_hash.to_fixed_bytes());

    Instruction {
        program_id,
        accounts,
        data,
    }
}

/// Live ledger backed by a Solana cluster.
pub struct RemoteLedgerClient {
    client: RpcClient,
    payer: Keypair,
    program_id: Pubkey,
}

impl RemoteLedgerClient {
    pub fn from_settings(settings: &LedgerSettings) -> Result<Self, LedgerError> {
        let payer = read_keypair_file(&settings.keypair_path).map_err(|e| {
            LedgerError::Config(format!(
                "failed to read keypair file {}: {}",
                settings.keypair_path.display(),
                e
            ))
        })?;
        let program_id = Pubkey::from_str(&settings.program_id).map_err(|e| {
            LedgerError::Config(format!("LEDGER_PROGRAM_ID is not a valid pubkey: {}", e))
        })?;
        let client =
            RpcClient::new_with_commitment(settings.rpc_url.clone(), CommitmentConfig::confirmed());
        Ok(Self {
            client,
            payer,
            program_id,
        })
    }
}

#[async_trait]
impl LedgerClient for RemoteLedgerClient {
    fn mode(&self) -> &'static str {
        "live"
    }

    async fn submit(&self, request: AnchorRequest<'_>) -> Result<LedgerReceipt, LedgerError> {
        let doc_key = hash_key(request.entity_type.as_str(), request.entity_id);
        let instruction = record_document_instruction(
            self.program_id,
            self.payer.pubkey(),
            doc_key,
            request.document_hash,
        );

        let recent_blockhash = self.client.get_latest_blockhash().await.map_err(rpc_err)?;
        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&self.payer.pubkey()),
            &[&self.payer],
            recent_blockhash,
        );
        let fee = self
            .client
            .get_fee_for_message(&transaction.message)
            .await
            .map_err(rpc_err)?;
        let signature = self
            .client
            .send_and_confirm_transaction(&transaction)
            .await
            .map_err(rpc_err)?;

        let statuses = self
            .client
            .get_signature_statuses(&[signature])
            .await
            .map_err(rpc_err)?;
        let slot = match statuses.value.first().and_then(|s| s.as_ref()) {
            Some(status) => status.slot,
            None => self.client.get_slot().await.map_err(rpc_err)?,
        };

        info!(
            entity_type = %request.entity_type,
            entity_id = request.entity_id,
            %signature,
            slot,
            "document hash recorded on chain"
        );

        Ok(LedgerReceipt {
            tx_hash: signature.to_string(),
            block_number: slot,
            gas_used: fee,
            verified: true,
            metadata: json!({ "programId": self.program_id.to_string() }),
        })
    }

    async fn verify(&self, entity_type: EntityKind, entity_id: &str) -> Result<bool, LedgerError> {
        let doc_key = hash_key(entity_type.as_str(), entity_id);
        let (pda, _bump) = document_pda(&self.program_id, &doc_key);
        let account = self
            .client
            .get_account_with_commitment(&pda, CommitmentConfig::confirmed())
            .await
            .map_err(rpc_err)?
            .value;
        Ok(match account {
            Some(acct) if acct.data.len() >= HASH_END => {
                acct.data[HASH_OFFSET..HASH_END].iter().any(|b| *b != 0)
            }
            _ => false,
        })
    }

    async fn network_status(&self) -> Result<NetworkStatus, LedgerError> {
        let slot = self.client.get_slot().await.map_err(rpc_err)?;
        let genesis = self.client.get_genesis_hash().await.map_err(rpc_err)?;
        Ok(NetworkStatus {
            connected: true,
            block_number: Some(slot),
            chain_id: Some(genesis.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_document_instruction_layout() {
        let program_id = Pubkey::new_unique();
        let payer = Pubkey::new_unique();
        let key = H256::repeat_byte(1);
        let hash = H256::repeat_byte(2);
        let ix = record_document_instruction(program_id, payer, key, hash);

        assert_eq!(ix.data.len(), 8 + 32 + 32);
        assert_eq!(&ix.data[..8], &instruction_discriminator("record_document"));
        assert_eq!(&ix.data[8..40], key.as_bytes());
        assert_eq!(&ix.data[40..], hash.as_bytes());
        assert_eq!(ix.accounts[0].pubkey, document_pda(&program_id, &key).0);
        assert!(ix.accounts[1].is_signer);
        assert!(!ix.accounts[2].is_writable);
    }

    #[test]
    fn pda_depends_on_entity_key() {
        let program_id = Pubkey::new_unique();
        let a = document_pda(&program_id, &hash_key("bill_of_lading", "1")).0;
        let b = document_pda(&program_id, &hash_key("bill_of_lading", "2")).0;
        assert_ne!(a, b);
    }
}
