use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::string::FromUtf8Error;

use crate::dispatcher::DispatchError;

/// Error response type
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response type for health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
    pub table: String,
}

/// Response type for unhealthy status
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct UnhealthyResponse {
    pub status: String,
    pub backend: String,
    pub error: String,
}

/// Error type for the local gateway endpoints
///
/// Store failures never end up here; they are already folded into a "400"
/// envelope by the dispatcher. This only covers requests refused before
/// any store call was made.
#[derive(Debug)]
pub enum ApiError {
    Dispatch(DispatchError),
    /// POST body that is not valid UTF-8
    InvalidEncoding(FromUtf8Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Dispatch(err) => {
                let status = match &err {
                    DispatchError::UnsupportedMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
                    DispatchError::MissingId
                    | DispatchError::MissingBody
                    | DispatchError::InvalidBody(_) => StatusCode::BAD_REQUEST,
                    DispatchError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
            ApiError::InvalidEncoding(err) => (
                StatusCode::BAD_REQUEST,
                format!("request body must be UTF-8: {}", err),
            ),
        };

        tracing::warn!("Rejected request: {}", error_message);

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        ApiError::Dispatch(err)
    }
}
