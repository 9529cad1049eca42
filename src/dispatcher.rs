use serde::Serialize;
use std::sync::Arc;

use crate::models::{
    DeleteItemOutput, EnvelopeHeaders, GatewayEvent, GetItemOutput, ID_FIELD, PutItemOutput,
    Record, ResponseEnvelope,
};
use crate::store::{KvStore, StoreError, StoreErrorBody};

/// Storage operation selected by the request verb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateOrReplace,
    Read,
    Delete,
}

impl Operation {
    /// Map an HTTP verb (exact, case-sensitive) to its operation
    pub fn from_method(method: &str) -> Option<Self> {
        match method {
            "POST" => Some(Operation::CreateOrReplace),
            "GET" => Some(Operation::Read),
            "DELETE" => Some(Operation::Delete),
            _ => None,
        }
    }
}

/// Requests the dispatcher refuses before reaching the store
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("missing 'id' path parameter")]
    MissingId,
    #[error("request body is required for POST")]
    MissingBody,
    #[error("request body must be a JSON object: {0}")]
    InvalidBody(serde_json::Error),
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),
    #[error("failed to encode response body: {0}")]
    Encode(serde_json::Error),
}

/// Translates gateway events into single-item store calls
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn KvStore>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Handle one gateway event end to end
    ///
    /// Store failures are not errors here: they come back as a "400"
    /// envelope. `Err` is reserved for requests that never reach the store.
    pub async fn handle(&self, event: GatewayEvent) -> Result<ResponseEnvelope, DispatchError> {
        let id = event.id().ok_or(DispatchError::MissingId)?.to_string();
        let operation = Operation::from_method(&event.http_method)
            .ok_or_else(|| DispatchError::UnsupportedMethod(event.http_method.clone()))?;

        tracing::debug!("Dispatching {:?} for id: {}", operation, id);

        match operation {
            Operation::CreateOrReplace => {
                let body = event.body.as_deref().ok_or(DispatchError::MissingBody)?;
                let record = parse_record(body)?;
                respond(&self.create_or_replace(&id, record).await)
            }
            Operation::Read => respond(&self.read(&id).await),
            Operation::Delete => respond(&self.delete(&id).await),
        }
    }

    pub async fn read(&self, id: &str) -> Result<GetItemOutput, StoreError> {
        self.store
            .get(id)
            .await
            .inspect_err(|e| tracing::error!("Failed to read item {}: {}", id, e))
    }

    /// Store `record` under `id`; the record's own `id` field is overwritten
    pub async fn create_or_replace(
        &self,
        id: &str,
        mut record: Record,
    ) -> Result<PutItemOutput, StoreError> {
        record.insert(ID_FIELD.to_string(), id.into());

        self.store
            .put(id, record)
            .await
            .inspect_err(|e| tracing::error!("Failed to put item {}: {}", id, e))
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteItemOutput, StoreError> {
        self.store
            .delete(id)
            .await
            .inspect_err(|e| tracing::error!("Failed to delete item {}: {}", id, e))
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.store.health_check().await
    }
}

fn parse_record(body: &str) -> Result<Record, DispatchError> {
    serde_json::from_str(body).map_err(DispatchError::InvalidBody)
}

/// Wrap a store outcome in a response envelope
///
/// Success gives "200" with the store result as body; a store error gives
/// "400" with `{"Error": ...}` as body.
pub fn respond<T: Serialize>(
    outcome: &Result<T, StoreError>,
) -> Result<ResponseEnvelope, DispatchError> {
    let (status_code, body) = match outcome {
        Ok(output) => ("200", serde_json::to_string(output)),
        Err(error) => (
            "400",
            serde_json::to_string(&StoreErrorBody {
                error: error.clone(),
            }),
        ),
    };
    let body = body.map_err(DispatchError::Encode)?;

    tracing::info!(status = status_code, "Store result: {}", body);

    Ok(ResponseEnvelope {
        status_code: status_code.to_string(),
        body,
        headers: EnvelopeHeaders::default(),
    })
}
