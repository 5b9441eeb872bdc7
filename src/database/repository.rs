use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use super::table::{Attributes, PutMode, StorageError, Table};

/// A typed record stored in a single table
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// Attribute name of the partition key
    const KEY: &'static str;
}

/// Typed access to one table. Cheap to clone; holds no state of its own.
pub struct Repository<T> {
    table: Arc<dyn Table>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            _phantom: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Repository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("key", &self.table.key_name())
            .finish()
    }
}

impl<T: Record> Repository<T> {
    pub fn new(table: Arc<dyn Table>) -> Self {
        debug_assert_eq!(table.key_name(), T::KEY);
        Self {
            table,
            _phantom: PhantomData,
        }
    }

    pub async fn list(&self) -> Result<Vec<T>, StorageError> {
        self.table
            .scan()
            .await?
            .into_iter()
            .map(from_attributes)
            .collect()
    }

    pub async fn get_by_key(&self, key: &str) -> Result<Option<T>, StorageError> {
        self.table.get(key).await?.map(from_attributes).transpose()
    }

    /// Unconditional write of the full record
    pub async fn insert_or_replace(&self, record: &T) -> Result<(), StorageError> {
        self.table.put(to_attributes(record)?, PutMode::Upsert).await
    }

    /// Write only if no record exists under the same key
    pub async fn insert_new(&self, record: &T) -> Result<(), StorageError> {
        self.table.put(to_attributes(record)?, PutMode::CreateOnly).await
    }

    /// Merge every field of `changes` except the key into the stored record.
    ///
    /// The key field locates the target and is never part of the patch. Absent
    /// (`None`) fields must be skipped by the patch type's serializer.
    pub async fn partial_update<P>(&self, changes: &P) -> Result<T, StorageError>
    where
        P: Serialize,
    {
        let mut fields = to_attributes(changes)?;
        let key = match fields.remove(T::KEY) {
            Some(Value::String(key)) if !key.is_empty() => key,
            _ => return Err(StorageError::MissingKey(T::KEY.to_string())),
        };

        if fields.is_empty() {
            return Err(StorageError::EmptyUpdate(key));
        }

        from_attributes(self.table.update(&key, fields).await?)
    }

    /// Remove the record, returning its prior value
    pub async fn delete(&self, key: &str) -> Result<Option<T>, StorageError> {
        self.table.delete(key).await?.map(from_attributes).transpose()
    }

    pub async fn health_check(&self) -> Result<(), StorageError> {
        self.table.health_check().await
    }
}

fn to_attributes<S: Serialize>(value: &S) -> Result<Attributes, StorageError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StorageError::Serialization(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

fn from_attributes<T: DeserializeOwned>(attributes: Attributes) -> Result<T, StorageError> {
    Ok(serde_json::from_value(Value::Object(attributes))?)
}
