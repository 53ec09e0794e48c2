//! Record store interface
//!
//! Documents are JSON values addressed by `(collection, key)`. Backends:
//! - [`MemoryStore`]: process-local map, used in tests and when no database
//!   path is configured
//! - [`SqliteStore`]: single `records` table through sqlx

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::Result;

pub mod memory;
#[cfg(feature = "sqlx")]
pub mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "sqlx")]
pub use sqlite::SqliteStore;

/// Selects documents for [`RecordStore::list`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordFilter {
    /// Every document in the collection
    All,
    /// Documents whose key starts with the prefix
    KeyPrefix(String),
    /// Documents whose top-level field equals the value
    FieldEquals(String, Value),
}

impl RecordFilter {
    pub fn matches(&self, key: &str, document: &Value) -> bool {
        match self {
            RecordFilter::All => true,
            RecordFilter::KeyPrefix(prefix) => key.starts_with(prefix.as_str()),
            RecordFilter::FieldEquals(field, expected) => document.get(field) == Some(expected),
        }
    }
}

/// Key/document persistence used by the CRUD services
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch one document
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>>;

    /// Insert or replace one document
    async fn set(&self, collection: &str, key: &str, document: Value) -> Result<()>;

    /// Remove one document; returns whether it existed
    async fn delete(&self, collection: &str, key: &str) -> Result<bool>;

    /// List `(key, document)` pairs ordered by key
    async fn list(&self, collection: &str, filter: &RecordFilter) -> Result<Vec<(String, Value)>>;
}

/// Fetch and decode a typed record
pub async fn get_record<T>(store: &dyn RecordStore, collection: &str, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    match store.get(collection, key).await? {
        Some(document) => Ok(Some(serde_json::from_value(document)?)),
        None => Ok(None),
    }
}

/// Encode and upsert a typed record
pub async fn set_record<T>(store: &dyn RecordStore, collection: &str, key: &str, record: &T) -> Result<()>
where
    T: Serialize,
{
    store.set(collection, key, serde_json::to_value(record)?).await
}

/// List and decode typed records
pub async fn list_records<T>(
    store: &dyn RecordStore,
    collection: &str,
    filter: &RecordFilter,
) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    store
        .list(collection, filter)
        .await?
        .into_iter()
        .map(|(_, document)| serde_json::from_value(document).map_err(Into::into))
        .collect()
}
