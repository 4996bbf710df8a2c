//! Record persistence.
//!
//! Every entity family lives in its own table as a JSON body keyed by id, with an
//! optional unique business key. [`RecordStore`] is the backend capability;
//! [`Repository`] is the typed view handlers use.

use crate::domain::model::{
    ActivityEntry, BlockchainTransactionRecord, CustomsClearance, Document, Entity,
    ForwarderCoordination, InsuranceClaim, InsurancePolicy, PortOperation, Shipment,
    TradeFinance, User,
};
use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use tracing::warn;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// All tables, in creation order.
pub const TABLES: [&str; 11] = [
    User::TABLE,
    Document::TABLE,
    Shipment::TABLE,
    TradeFinance::TABLE,
    InsurancePolicy::TABLE,
    InsuranceClaim::TABLE,
    CustomsClearance::TABLE,
    PortOperation::TABLE,
    ForwarderCoordination::TABLE,
    BlockchainTransactionRecord::TABLE,
    ActivityEntry::TABLE,
];

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    Conflict(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("stored record could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Row selection by top-level field equality.
///
/// A filter holds one or more alternatives; a row matches when every pair of at
/// least one alternative matches. `Filter::new()` matches everything.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    alternatives: Vec<Map<String, JsonValue>>,
}

impl Default for Filter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter {
    pub fn new() -> Self {
        Self {
            alternatives: vec![Map::new()],
        }
    }

    /// Adds an equality condition to the current alternative.
    pub fn eq(mut self, field: &str, value: impl Into<JsonValue>) -> Self {
        if let Some(current) = self.alternatives.last_mut() {
            current.insert(field.to_string(), value.into());
        }
        self
    }

    /// Like [`Filter::eq`], skipped when `value` is `None`.
    pub fn eq_opt<V: Into<JsonValue>>(self, field: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(field, v),
            None => self,
        }
    }

    /// Starts a new, empty alternative.
    pub fn or(mut self) -> Self {
        self.alternatives.push(Map::new());
        self
    }

    pub fn alternatives(&self) -> &[Map<String, JsonValue>] {
        &self.alternatives
    }

    pub fn matches(&self, body: &JsonValue) -> bool {
        self.alternatives
            .iter()
            .any(|alt| alt.iter().all(|(k, v)| body.get(k) == Some(v)))
    }
}

/// Backend capability. Both implementations list newest first.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(
        &self,
        table: &'static str,
        id: &str,
        unique_key: Option<&str>,
        body: JsonValue,
    ) -> Result<(), StoreError>;

    async fn get(&self, table: &'static str, id: &str) -> Result<Option<JsonValue>, StoreError>;

    async fn find_unique(
        &self,
        table: &'static str,
        unique_key: &str,
    ) -> Result<Option<JsonValue>, StoreError>;

    /// Replaces the body of an existing row. The unique key is fixed at insert.
    async fn update(&self, table: &'static str, id: &str, body: JsonValue)
        -> Result<(), StoreError>;

    async fn list(
        &self,
        table: &'static str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<JsonValue>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Typed access to a [`RecordStore`].
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn RecordStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub async fn insert<T: Entity>(&self, entity: &T) -> Result<(), StoreError> {
        let body = serde_json::to_value(entity)?;
        let unique_key = entity.unique_key();
        self.store
            .insert(T::TABLE, entity.id(), unique_key.as_deref(), body)
            .await
    }

    pub async fn get<T: Entity>(&self, id: &str) -> Result<Option<T>, StoreError> {
        match self.store.get(T::TABLE, id).await? {
            Some(body) => Ok(Some(serde_json::from_value(body)?)),
            None => Ok(None),
        }
    }

    pub async fn find_unique<T: Entity>(&self, unique_key: &str) -> Result<Option<T>, StoreError> {
        match self.store.find_unique(T::TABLE, unique_key).await? {
            Some(body) => Ok(Some(serde_json::from_value(body)?)),
            None => Ok(None),
        }
    }

    pub async fn update<T: Entity>(&self, entity: &T) -> Result<(), StoreError> {
        let body = serde_json::to_value(entity)?;
        self.store.update(T::TABLE, entity.id(), body).await
    }

    pub async fn list<T: Entity>(&self, filter: &Filter) -> Result<Vec<T>, StoreError> {
        self.recent(filter, None).await
    }

    pub async fn recent<T: Entity>(
        &self,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<T>, StoreError> {
        self.store
            .list(T::TABLE, filter, limit)
            .await?
            .into_iter()
            .map(|body| serde_json::from_value(body).map_err(StoreError::from))
            .collect()
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}

/// Connects to Postgres when a URL is configured, otherwise falls back to process memory.
pub async fn open_store(
    database_url: Option<&str>,
    max_connections: u32,
) -> Result<Arc<dyn RecordStore>, StoreError> {
    match database_url {
        Some(url) => Ok(Arc::new(PostgresStore::connect(url, max_connections).await?)),
        None => {
            warn!("DATABASE_URL not set; records are kept in memory and lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
