use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::table::{record_key, Attributes, PutMode, StorageError, Table};

/// In-process table for local runs and tests.
///
/// Mirrors the DynamoDB backend: conditional create, merge-on-update with an
/// existence check, and delete returning the prior record.
#[derive(Debug)]
pub struct MemoryTable {
    key_name: String,
    records: RwLock<HashMap<String, Attributes>>,
}

impl MemoryTable {
    pub fn new(key_name: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
            records: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl Table for MemoryTable {
    fn key_name(&self) -> &str {
        &self.key_name
    }

    async fn scan(&self) -> Result<Vec<Attributes>, StorageError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn get(&self, key: &str) -> Result<Option<Attributes>, StorageError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn put(&self, record: Attributes, mode: PutMode) -> Result<(), StorageError> {
        let key = record_key(&record, &self.key_name)?;
        let mut records = self.records.write().await;

        if mode == PutMode::CreateOnly && records.contains_key(&key) {
            return Err(StorageError::AlreadyExists(key));
        }

        records.insert(key, record);
        Ok(())
    }

    async fn update(&self, key: &str, changes: Attributes) -> Result<Attributes, StorageError> {
        if changes.is_empty() {
            return Err(StorageError::EmptyUpdate(key.to_string()));
        }

        let mut records = self.records.write().await;
        let existing = records
            .get_mut(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;

        for (field, value) in changes {
            if field != self.key_name {
                existing.insert(field, value);
            }
        }

        Ok(existing.clone())
    }

    async fn delete(&self, key: &str) -> Result<Option<Attributes>, StorageError> {
        Ok(self.records.write().await.remove(key))
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
