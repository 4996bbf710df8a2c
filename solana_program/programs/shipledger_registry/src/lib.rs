// Document hash registry: one PDA per anchored record.
use anchor_lang::prelude::*;

declare_id!("BQLoF8MG6G8aFZhUkDc9dSDf819eG6jX27whotX7Ra6S");

#[program]
pub mod shipledger_registry {
    use super::*;

    /// Stores the hash for `doc_key`. Only the first recorder may overwrite it.
    pub fn record_document(
        ctx: Context<RecordDocument>,
        doc_key: [u8; 32],
        doc_hash: [u8; 32],
    ) -> Result<()> {
        let record = &mut ctx.accounts.document_record;
        record.doc_hash = doc_hash;
        record.recorder = ctx.accounts.user.key();
        record.timestamp = Clock::get()?.unix_timestamp;
        msg!("recorded document {:?}", &doc_key[..4]);
        Ok(())
    }
}

/// A fresh record has no recorder yet; afterwards only that key may write.
pub fn may_record(current: &Pubkey, signer: &Pubkey) -> bool {
    *current == Pubkey::default() || current == signer
}

#[derive(Accounts)]
#[instruction(doc_key: [u8; 32])]
pub struct RecordDocument<'info> {
    #[account(
        init_if_needed,
        payer = user,
        space = 8 + 32 + 32 + 8,
        seeds = [b"document", doc_key.as_ref()],
        bump,
        constraint = may_record(&document_record.recorder, &user.key()) @ RegistryError::RecorderMismatch
    )]
    pub document_record: Account<'info, DocumentRecord>,
    #[account(mut)]
    pub user: Signer<'info>,
    pub system_program: Program<'info, System>,
}

#[account]
pub struct DocumentRecord {
    pub doc_hash: [u8; 32],
    pub recorder: Pubkey,
    pub timestamp: i64,
}

#[error_code]
pub enum RegistryError {
    #[msg("document was recorded by a different signer")]
    RecorderMismatch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_first_recorder_may_overwrite() {
        let first = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        assert!(may_record(&Pubkey::default(), &first));
        assert!(may_record(&first, &first));
        assert!(!may_record(&first, &other));
    }
}
