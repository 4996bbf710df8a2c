pub mod app;
pub mod crypto;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::record_hash::{RecordError, RecordHashService};
pub use crypto::hashing::{hash_key, hash_value};
pub use domain::access::{authorize, Operation};
pub use domain::role::Role;
pub use infra::config::AppConfig;
pub use infra::ledger::{LedgerClient, RemoteLedgerClient, SimulatedLedgerClient};
pub use storage::{MemoryStore, PostgresStore, RecordStore, Repository};
