use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// A stored record as a generic attribute map
pub type Attributes = Map<String, Value>;

/// Errors from a key-value table backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record with key '{0}' already exists")]
    AlreadyExists(String),

    #[error("record with key '{0}' not found")]
    NotFound(String),

    #[error("update for key '{0}' has no fields to set")]
    EmptyUpdate(String),

    #[error("record is missing key field '{0}'")]
    MissingKey(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("DynamoDB {operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<serde_dynamo::Error> for StorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// How a put treats an existing record at the same key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutMode {
    /// Unconditional write of the full record
    Upsert,
    /// Write only when no record exists at the key
    CreateOnly,
}

/// Single-table key-value storage keyed by one string attribute.
///
/// Every method is one logical storage operation. A backend may page
/// internally, as a DynamoDB scan does.
#[async_trait]
pub trait Table: Send + Sync {
    /// Name of the partition key attribute
    fn key_name(&self) -> &str;

    /// All records in the table, unpaginated
    async fn scan(&self) -> Result<Vec<Attributes>, StorageError>;

    /// Record at `key`, or `None` when absent
    async fn get(&self, key: &str) -> Result<Option<Attributes>, StorageError>;

    async fn put(&self, record: Attributes, mode: PutMode) -> Result<(), StorageError>;

    /// Set each attribute in `changes` on the existing record at `key` and
    /// return the merged record. `changes` must not contain the key field.
    async fn update(&self, key: &str, changes: Attributes) -> Result<Attributes, StorageError>;

    /// Remove the record at `key`, returning its prior value
    async fn delete(&self, key: &str) -> Result<Option<Attributes>, StorageError>;

    async fn health_check(&self) -> Result<(), StorageError>;
}

/// Extract the string key from a record
pub(crate) fn record_key(record: &Attributes, key_name: &str) -> Result<String, StorageError> {
    match record.get(key_name) {
        Some(Value::String(key)) if !key.is_empty() => Ok(key.clone()),
        _ => Err(StorageError::MissingKey(key_name.to_string())),
    }
}
