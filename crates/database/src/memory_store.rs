use crate::error::DbError;
use crate::store::{KeyValueStore, check_key};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A `KeyValueStore` that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DbError> {
        check_key(key)?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DbError> {
        check_key(key)?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
