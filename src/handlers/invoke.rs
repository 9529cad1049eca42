use crate::error::{ApiError, ErrorResponse};
use crate::models::{GatewayEvent, ResponseEnvelope};
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, Json};
use tracing::Instrument;
use uuid::Uuid;

/// POST /invoke handler - Run a raw gateway event through the dispatcher
///
/// Mirrors a direct function invocation: the envelope itself is the JSON
/// response, whatever its `statusCode`.
#[utoipa::path(
    post,
    path = routes::INVOKE,
    request_body = GatewayEvent,
    responses(
        (status = 200, description = "Envelope produced by the dispatcher", body = ResponseEnvelope),
        (status = 400, description = "Missing id, missing body or malformed body", body = ErrorResponse),
        (status = 405, description = "Unsupported method in the event", body = ErrorResponse)
    ),
    tag = "items"
)]
pub async fn invoke_handler(
    State(state): State<AppState>,
    Json(event): Json<GatewayEvent>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("invoke", %request_id);

    let envelope = state.dispatcher.handle(event).instrument(span).await?;
    Ok(Json(envelope))
}
