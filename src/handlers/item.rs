use crate::error::{ApiError, ErrorResponse};
use crate::models::{GatewayEvent, ResponseEnvelope};
use crate::routes;
use crate::state::AppState;
use axum::{body::Bytes, extract::Path, extract::State, http::Method};
use std::collections::HashMap;
use tracing::Instrument;
use uuid::Uuid;

/// /items/{id} handler - Forward an HTTP request through the dispatcher
///
/// The request is rebuilt as a gateway event, so the envelope's status code,
/// content type and body become the HTTP response. Store failures come back
/// as 400 with `{"Error": ...}` in the body.
#[utoipa::path(
    method(get, post, delete),
    path = routes::ITEM,
    params(
        ("id" = String, Path, description = "Item key")
    ),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Store result as JSON"),
        (status = 400, description = "Store error, missing body or malformed JSON"),
        (status = 405, description = "Unsupported method", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn item_handler(
    State(state): State<AppState>,
    method: Method,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<ResponseEnvelope, ApiError> {
    let event = GatewayEvent {
        http_method: method.as_str().to_string(),
        path_parameters: Some(HashMap::from([("id".to_string(), id)])),
        body: event_body(&method, body)?,
    };

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("dispatch", %request_id, method = %method);

    let envelope = state.dispatcher.handle(event).instrument(span).await?;
    Ok(envelope)
}

/// Only POST reads the body, so only POST needs it to be UTF-8
fn event_body(method: &Method, body: Bytes) -> Result<Option<String>, ApiError> {
    if body.is_empty() {
        return Ok(None);
    }
    match String::from_utf8(body.to_vec()) {
        Ok(text) => Ok(Some(text)),
        Err(_) if *method != Method::POST => Ok(None),
        Err(err) => Err(ApiError::InvalidEncoding(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dispatcher::Dispatcher;
    use crate::store::MemoryStore;
    use axum::{body::Body, http::Request, http::StatusCode, routing::any, Router};
    use serde_json::{json, Value as JsonValue};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn setup_test_app() -> Router {
        let config = Config::from_lookup(|key| match key {
            "TABLE_NAME" => Some("items".to_string()),
            "STORE_BACKEND" => Some("memory".to_string()),
            _ => None,
        })
        .expect("memory config");

        let state = AppState {
            dispatcher: Dispatcher::new(Arc::new(MemoryStore::new())),
            config: Arc::new(config),
        };

        Router::new()
            .route(routes::ITEM, any(item_handler))
            .with_state(state)
    }

    fn request(method: &str, uri: &str, body: &str) -> Request<Body> {
        raw_request(method, uri, body.as_bytes().to_vec())
    }

    fn raw_request(method: &str, uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> JsonValue {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_post_then_get() {
        let app = setup_test_app();

        let post_response = app
            .clone()
            .oneshot(request("POST", "/items/42", "{\"name\":\"a\",\"id\":\"other\"}"))
            .await
            .unwrap();

        assert_eq!(post_response.status(), StatusCode::OK);
        assert_eq!(
            post_response.headers().get("content-type").unwrap(),
            "application/json"
        );
        assert_eq!(body_json(post_response).await, json!({}));

        let get_response = app
            .oneshot(request("GET", "/items/42", ""))
            .await
            .unwrap();

        assert_eq!(get_response.status(), StatusCode::OK);
        assert_eq!(
            body_json(get_response).await,
            json!({"Item": {"id": "42", "name": "a"}})
        );
    }

    #[tokio::test]
    async fn test_get_missing_is_empty_object() {
        let app = setup_test_app();

        let response = app
            .oneshot(request("GET", "/items/missing", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({}));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let app = setup_test_app();

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(request("DELETE", "/items/42", ""))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let app = setup_test_app();

        let response = app
            .oneshot(request("PUT", "/items/42", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let error: ErrorResponse =
            serde_json::from_value(body_json(response).await).unwrap();
        assert!(error.error.contains("unsupported method: PUT"));
    }

    #[tokio::test]
    async fn test_post_without_body() {
        let app = setup_test_app();

        let response = app
            .oneshot(request("POST", "/items/42", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_invalid_json() {
        let app = setup_test_app();

        let response = app
            .oneshot(request("POST", "/items/42", "{invalid json}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse =
            serde_json::from_value(body_json(response).await).unwrap();
        assert!(error.error.contains("JSON object"));
    }

    #[tokio::test]
    async fn test_non_utf8_body_ignored_for_get_and_delete() {
        let app = setup_test_app();
        let garbage = vec![0xff, 0xfe, 0x00, 0x80];

        let get_response = app
            .clone()
            .oneshot(raw_request("GET", "/items/42", garbage.clone()))
            .await
            .unwrap();
        assert_eq!(get_response.status(), StatusCode::OK);
        assert_eq!(body_json(get_response).await, json!({}));

        let delete_response = app
            .oneshot(raw_request("DELETE", "/items/42", garbage))
            .await
            .unwrap();
        assert_eq!(delete_response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_utf8_post_body_rejected() {
        let app = setup_test_app();

        let response = app
            .oneshot(raw_request("POST", "/items/42", b"{\"name\":\"\xff\"}".to_vec()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorResponse =
            serde_json::from_value(body_json(response).await).unwrap();
        assert!(error.error.contains("UTF-8"));
    }
}
