//! SQLite-backed [`Store`] implementation.
//!
//! One table keyed by `(partition_key, sort_key)`. Conditional inserts use
//! `ON CONFLICT DO NOTHING` and detect collisions via `rows_affected`, so a
//! batch reports its duplicates without aborting. The table name comes from
//! configuration and is validated there to be a plain identifier.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::entries::{KEYWORD_PREFIX, ORG_PREFIX};
use crate::error::IndexError;
use crate::models::{EntryKey, EntryPayload, IndexEntry};

use super::{BatchOutcome, Store};

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
    table: String,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool, table: &str) -> Self {
        Self {
            pool,
            table: table.to_string(),
        }
    }

    /// Open the configured database and bind to the configured table.
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        Ok(Self::new(pool, &config.store.table))
    }
}

fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<IndexEntry, IndexError> {
    let routes_json: String = row.get("routes_json");
    let routes: Vec<String> = serde_json::from_str(&routes_json)
        .map_err(|e| IndexError::Transport(anyhow::Error::from(e)))?;

    Ok(IndexEntry {
        key: EntryKey {
            partition: row.get("partition_key"),
            sort: row.get("sort_key"),
        },
        payload: EntryPayload {
            organisation_name: row.get("organisation_name"),
            town: row.get("town"),
            county: row.get("county"),
            type_rating: row.get("type_rating"),
            routes,
            entity_type: row.get("entity_type"),
            created_at: row.get("created_at"),
        },
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn put_batch(&self, batch: &[IndexEntry]) -> Result<BatchOutcome, IndexError> {
        let mut outcome = BatchOutcome::default();
        let mut tx = self.pool.begin().await?;

        let insert = format!(
            "INSERT INTO {} (partition_key, sort_key, organisation_name, town, county, \
             type_rating, routes_json, entity_type, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(partition_key, sort_key) DO NOTHING",
            self.table
        );

        for entry in batch {
            let routes_json = serde_json::to_string(&entry.payload.routes)
                .map_err(|e| IndexError::Transport(anyhow::Error::from(e)))?;

            let result = sqlx::query(&insert)
                .bind(&entry.key.partition)
                .bind(&entry.key.sort)
                .bind(&entry.payload.organisation_name)
                .bind(&entry.payload.town)
                .bind(&entry.payload.county)
                .bind(&entry.payload.type_rating)
                .bind(&routes_json)
                .bind(&entry.payload.entity_type)
                .bind(&entry.payload.created_at)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                outcome.duplicates.push(entry.key.clone());
            } else {
                outcome.written += 1;
            }
        }

        tx.commit().await?;
        Ok(outcome)
    }

    async fn get_entry(
        &self,
        partition: &str,
        sort: &str,
    ) -> Result<Option<IndexEntry>, IndexError> {
        let query = format!(
            "SELECT partition_key, sort_key, organisation_name, town, county, type_rating, \
             routes_json, entity_type, created_at \
             FROM {} WHERE partition_key = ? AND sort_key = ?",
            self.table
        );

        let row = sqlx::query(&query)
            .bind(partition)
            .bind(sort)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_entry).transpose()
    }

    async fn keyword_lookup(
        &self,
        token: &str,
        limit: i64,
    ) -> Result<Vec<IndexEntry>, IndexError> {
        let query = format!(
            "SELECT partition_key, sort_key, organisation_name, town, county, type_rating, \
             routes_json, entity_type, created_at \
             FROM {} WHERE partition_key = ? ORDER BY sort_key LIMIT ?",
            self.table
        );

        let rows = sqlx::query(&query)
            .bind(format!("{}{}", KEYWORD_PREFIX, token))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_entry).collect()
    }

    async fn keywords_for(&self, org_id: &str) -> Result<Vec<String>, IndexError> {
        let query = format!(
            "SELECT partition_key FROM {} \
             WHERE sort_key = ? AND partition_key LIKE ? ORDER BY partition_key",
            self.table
        );

        let rows = sqlx::query(&query)
            .bind(format!("{}{}", ORG_PREFIX, org_id))
            .bind(format!("{}%", KEYWORD_PREFIX))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let partition: String = row.get("partition_key");
                partition[KEYWORD_PREFIX.len()..].to_string()
            })
            .collect())
    }
}
