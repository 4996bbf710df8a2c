//! Process-local store. Same observable behaviour as the Postgres backend.

use crate::storage::{Filter, RecordStore, StoreError};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Table {
    // Insertion order; listing walks it backwards.
    rows: Vec<Row>,
    by_id: HashMap<String, usize>,
    by_unique: HashMap<String, usize>,
}

struct Row {
    body: JsonValue,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<&'static str, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(
        &self,
        table: &'static str,
        id: &str,
        unique_key: Option<&str>,
        body: JsonValue,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let t = tables.entry(table).or_default();
        if t.by_id.contains_key(id) {
            return Err(StoreError::Conflict(format!("{} '{}'", table, id)));
        }
        if let Some(key) = unique_key {
            if t.by_unique.contains_key(key) {
                return Err(StoreError::Conflict(format!("{} '{}'", table, key)));
            }
        }
        let idx = t.rows.len();
        t.rows.push(Row { body });
        t.by_id.insert(id.to_string(), idx);
        if let Some(key) = unique_key {
            t.by_unique.insert(key.to_string(), idx);
        }
        Ok(())
    }

    async fn get(&self, table: &'static str, id: &str) -> Result<Option<JsonValue>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .and_then(|t| t.by_id.get(id).map(|&idx| t.rows[idx].body.clone())))
    }

    async fn find_unique(
        &self,
        table: &'static str,
        unique_key: &str,
    ) -> Result<Option<JsonValue>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .and_then(|t| t.by_unique.get(unique_key).map(|&idx| t.rows[idx].body.clone())))
    }

    async fn update(
        &self,
        table: &'static str,
        id: &str,
        body: JsonValue,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let t = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::NotFound(format!("{} '{}'", table, id)))?;
        let idx = *t
            .by_id
            .get(id)
            .ok_or_else(|| StoreError::NotFound(format!("{} '{}'", table, id)))?;
        t.rows[idx].body = body;
        Ok(())
    }

    async fn list(
        &self,
        table: &'static str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<JsonValue>, StoreError> {
        let tables = self.tables.read().await;
        let Some(t) = tables.get(table) else {
            return Ok(Vec::new());
        };
        Ok(t.rows
            .iter()
            .rev()
            .filter(|row| filter.matches(&row.body))
            .take(limit.unwrap_or(usize::MAX))
            .map(|row| row.body.clone())
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ActivityEntry, ActivityKind, User};
    use crate::domain::role::Role;
    use crate::storage::Repository;
    use serde_json::json;

    #[tokio::test]
    async fn unique_keys_are_enforced() {
        let store = MemoryStore::new();
        store
            .insert("t", "1", Some("BL-1"), json!({"id": "1"}))
            .await
            .unwrap();
        let dup = store.insert("t", "2", Some("BL-1"), json!({"id": "2"})).await;
        assert!(matches!(dup, Err(StoreError::Conflict(_))));
        let same_id = store.insert("t", "1", None, json!({"id": "1"})).await;
        assert!(matches!(same_id, Err(StoreError::Conflict(_))));
        assert!(store.find_unique("t", "BL-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let store = MemoryStore::new();
        let res = store.update("t", "nope", json!({})).await;
        assert!(matches!(res, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_capped() {
        let repo = Repository::in_memory();
        for i in 0..5 {
            let entry = ActivityEntry::new(
                ActivityKind::ShipmentUpdated,
                "carrier-1",
                format!("update {}", i),
                None,
            );
            repo.insert(&entry).await.unwrap();
        }
        let recent: Vec<ActivityEntry> = repo.recent(&Filter::new(), Some(3)).await.unwrap();
        let details: Vec<_> = recent.iter().map(|e| e.details.as_str()).collect();
        assert_eq!(details, vec!["update 4", "update 3", "update 2"]);
    }

    #[tokio::test]
    async fn typed_round_trip_through_repository() {
        let repo = Repository::in_memory();
        let mut user = User::new("u-1".into(), Role::Shipper);
        repo.insert(&user).await.unwrap();
        user.role = Role::Bank;
        repo.update(&user).await.unwrap();
        let loaded: User = repo.get("u-1").await.unwrap().unwrap();
        assert_eq!(loaded.role, Role::Bank);
        let banks: Vec<User> = repo.list(&Filter::new().eq("role", "bank")).await.unwrap();
        assert_eq!(banks.len(), 1);
    }
}
