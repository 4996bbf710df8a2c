pub mod record_hash;
