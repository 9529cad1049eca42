pub mod memory;
pub mod spanner;

pub use memory::MemoryStore;
pub use spanner::SpannerStore;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{Config, StoreBackend};
use crate::models::{DeleteItemOutput, GetItemOutput, PutItemOutput, Record};

/// Failure reported by the key-value store for any get, put or delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct StoreError {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Message")]
    pub message: String,
}

impl StoreError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Body shape of a failed store call: `{"Error": {"Code": .., "Message": ..}}`
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreErrorBody {
    #[serde(rename = "Error")]
    pub error: StoreError,
}

/// Single-item key-value operations the dispatcher relies on
///
/// Implementations must be safe to share across concurrent invocations.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the record stored at `key`; a missing key is not an error
    async fn get(&self, key: &str) -> Result<GetItemOutput, StoreError>;

    /// Write `record` at `key`, replacing whatever was there
    async fn put(&self, key: &str, record: Record) -> Result<PutItemOutput, StoreError>;

    /// Remove the record at `key`; removing a missing key succeeds
    async fn delete(&self, key: &str) -> Result<DeleteItemOutput, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Open the backend selected by the configuration
///
/// Called once at startup; the returned handle is reused for every request.
pub async fn connect(config: &Config) -> Result<Arc<dyn KvStore>> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store for table: {}", config.table_name);
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Spanner => {
            let spanner = config
                .spanner
                .as_ref()
                .context("Spanner backend selected without Spanner configuration")?;
            let store = SpannerStore::from_config(spanner, &config.table_name).await?;
            Ok(Arc::new(store))
        }
    }
}
