use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{KvStore, StoreError};
use crate::models::{DeleteItemOutput, GetItemOutput, PutItemOutput, Record};

/// Process-local store, used for local runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<GetItemOutput, StoreError> {
        let item = self.items.read().await.get(key).cloned();
        tracing::debug!("Read key {} (found: {})", key, item.is_some());
        Ok(GetItemOutput { item })
    }

    async fn put(&self, key: &str, record: Record) -> Result<PutItemOutput, StoreError> {
        self.items.write().await.insert(key.to_string(), record);
        tracing::debug!("Stored key {}", key);
        Ok(PutItemOutput::default())
    }

    async fn delete(&self, key: &str) -> Result<DeleteItemOutput, StoreError> {
        let removed = self.items.write().await.remove(key);
        tracing::debug!("Deleted key {} (existed: {})", key, removed.is_some());
        Ok(DeleteItemOutput::default())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = MemoryStore::new();
        let output = store.get("missing").await.unwrap();
        assert_eq!(output.item, None);
    }

    #[tokio::test]
    async fn test_put_replaces_whole_record() {
        let store = MemoryStore::new();

        store.put("1", record(json!({"id": "1", "a": 1, "b": 2}))).await.unwrap();
        store.put("1", record(json!({"id": "1", "c": 3}))).await.unwrap();

        let item = store.get("1").await.unwrap().item.unwrap();
        assert_eq!(item, record(json!({"id": "1", "c": 3})));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.put("1", record(json!({"id": "1"}))).await.unwrap();

        assert_eq!(store.delete("1").await.unwrap(), DeleteItemOutput::default());
        assert_eq!(store.delete("1").await.unwrap(), DeleteItemOutput::default());
        assert_eq!(store.get("1").await.unwrap().item, None);
    }
}
