//! PostgreSQL store: one JSONB table per entity family.

use crate::storage::{Filter, RecordStore, StoreError, TABLES};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::info;

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connects and creates any missing tables.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        info!(max_connections, "connected to postgres");
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        for table in TABLES {
            sqlx::query(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    seq BIGSERIAL,
                    id TEXT PRIMARY KEY,
                    unique_key TEXT UNIQUE,
                    body JSONB NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )"
            ))
            .execute(&self.pool)
            .await?;
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {table}_body_idx ON {table} USING GIN (body jsonb_path_ops)"
            ))
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }
}

fn conflict_or_backend(err: sqlx::Error, table: &str, key: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(format!("{} '{}'", table, key))
        }
        _ => StoreError::from(err),
    }
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn insert(
        &self,
        table: &'static str,
        id: &str,
        unique_key: Option<&str>,
        body: JsonValue,
    ) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO {table} (id, unique_key, body) VALUES ($1, $2, $3)"
        ))
        .bind(id)
        .bind(unique_key)
        .bind(Json(body))
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or_backend(e, table, unique_key.unwrap_or(id)))?;
        Ok(())
    }

    async fn get(&self, table: &'static str, id: &str) -> Result<Option<JsonValue>, StoreError> {
        let row = sqlx::query(&format!("SELECT body FROM {table} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(row.try_get::<Json<JsonValue>, _>("body")?.0)),
            None => Ok(None),
        }
    }

    async fn find_unique(
        &self,
        table: &'static str,
        unique_key: &str,
    ) -> Result<Option<JsonValue>, StoreError> {
        let row = sqlx::query(&format!("SELECT body FROM {table} WHERE unique_key = $1"))
            .bind(unique_key)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(row.try_get::<Json<JsonValue>, _>("body")?.0)),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        table: &'static str,
        id: &str,
        body: JsonValue,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(&format!(
            "UPDATE {table} SET body = $2, updated_at = now() WHERE id = $1"
        ))
        .bind(id)
        .bind(Json(body))
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("{} '{}'", table, id)));
        }
        Ok(())
    }

    async fn list(
        &self,
        table: &'static str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<JsonValue>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT body FROM {table} WHERE ("));
        let mut sep = qb.separated(" OR ");
        for alt in filter.alternatives() {
            sep.push("body @> ");
            sep.push_bind_unseparated(Json(JsonValue::Object(alt.clone())));
        }
        qb.push(") ORDER BY seq DESC LIMIT ");
        qb.push_bind(limit.map(|l| l as i64));

        let rows = qb.build().fetch_all(&self.pool).await?;
        let mut bodies = Vec::with_capacity(rows.len());
        for row in rows {
            bodies.push(row.try_get::<Json<JsonValue>, _>("body")?.0);
        }
        Ok(bodies)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
