//! SQLite-backed record store
//!
//! All collections share one table:
//! `records(collection, key, document, updated_at)` with
//! `(collection, key)` as primary key. Documents are stored as JSON text.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

use super::{RecordFilter, RecordStore};
use crate::time::now;
use crate::Result;

/// Record store over a sqlx SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database file and ensure the schema
    pub async fn open(db_path: &Path) -> Result<Self> {
        let newly_created = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(&db_url)
            .await?;

        if newly_created {
            info!("Initialized new database: {}", db_path.display());
        } else {
            info!("Opened existing database: {}", db_path.display());
        }

        // WAL journal, 5s lock wait
        sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
        sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database, mainly for tests
    pub async fn in_memory() -> Result<Self> {
        // A second connection would see a different empty database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the records table if missing
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                collection TEXT NOT NULL,
                key TEXT NOT NULL,
                document TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (collection, key)
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn decode_rows(rows: Vec<(String, String)>, filter: &RecordFilter) -> Result<Vec<(String, Value)>> {
    let mut records = Vec::with_capacity(rows.len());
    for (key, text) in rows {
        let document: Value = serde_json::from_str(&text)?;
        if filter.matches(&key, &document) {
            records.push((key, document));
        }
    }
    Ok(records)
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT document FROM records WHERE collection = ? AND key = ?")
                .bind(collection)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((text,)) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, collection: &str, key: &str, document: Value) -> Result<()> {
        sqlx::query(
            "INSERT INTO records (collection, key, document, updated_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(collection, key) DO UPDATE SET
                document = excluded.document,
                updated_at = excluded.updated_at",
        )
        .bind(collection)
        .bind(key)
        .bind(document.to_string())
        .bind(now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM records WHERE collection = ? AND key = ?")
            .bind(collection)
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, collection: &str, filter: &RecordFilter) -> Result<Vec<(String, Value)>> {
        let rows: Vec<(String, String)> = match filter {
            // substr() instead of LIKE so '%' and '_' in keys stay literal
            RecordFilter::KeyPrefix(prefix) => {
                sqlx::query_as(
                    "SELECT key, document FROM records
                     WHERE collection = ? AND substr(key, 1, length(?)) = ?
                     ORDER BY key",
                )
                .bind(collection)
                .bind(prefix)
                .bind(prefix)
                .fetch_all(&self.pool)
                .await?
            }
            RecordFilter::All | RecordFilter::FieldEquals(..) => {
                sqlx::query_as("SELECT key, document FROM records WHERE collection = ? ORDER BY key")
                    .bind(collection)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        decode_rows(rows, filter)
    }
}
