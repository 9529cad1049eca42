use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

/// A stored item: field names mapped to arbitrary JSON values
pub type Record = Map<String, JsonValue>;

/// Record field holding the primary key
pub const ID_FIELD: &str = "id";

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Inbound HTTP-gateway event
///
/// Only the fields the dispatcher reads are modelled; everything else the
/// gateway sends along is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    pub http_method: String,
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

impl GatewayEvent {
    /// The `id` path parameter, if the gateway supplied one
    pub fn id(&self) -> Option<&str> {
        self.path_parameters
            .as_ref()
            .and_then(|params| params.get(ID_FIELD))
            .map(String::as_str)
    }
}

/// Headers attached to every envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EnvelopeHeaders {
    #[serde(rename = "Content-Type")]
    pub content_type: String,
}

impl Default for EnvelopeHeaders {
    fn default() -> Self {
        Self {
            content_type: JSON_CONTENT_TYPE.to_string(),
        }
    }
}

/// Outbound response handed back to the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: String,
    /// JSON-encoded store result or store error
    pub body: String,
    pub headers: EnvelopeHeaders,
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let status = self
            .status_code
            .parse::<u16>()
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (
            status,
            [(header::CONTENT_TYPE, self.headers.content_type)],
            self.body,
        )
            .into_response()
    }
}

/// Result of a single-item read; serializes to `{}` when the key is absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetItemOutput {
    #[serde(rename = "Item", default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Record>,
}

/// Acknowledgement of a create-or-replace write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutItemOutput {}

/// Acknowledgement of a delete; also returned when nothing was stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteItemOutput {}
