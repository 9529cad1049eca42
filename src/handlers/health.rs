use crate::error::{HealthResponse, UnhealthyResponse};
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// GET /health handler - Store reachability check
///
/// 200 names the backend and table being served; 503 carries the store
/// error that the backend's health check reported.
#[utoipa::path(
    get,
    path = routes::HEALTH,
    responses(
        (status = 200, description = "Store backend reachable", body = HealthResponse),
        (status = 503, description = "Store backend unreachable", body = UnhealthyResponse)
    ),
    tag = "health"
)]
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<UnhealthyResponse>)> {
    let backend = state.config.store_backend.as_str().to_string();

    if let Err(e) = state.dispatcher.health_check().await {
        tracing::error!(backend = %backend, "Store health check failed: {}", e);
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(UnhealthyResponse {
                status: "unhealthy".to_string(),
                backend,
                error: e.to_string(),
            }),
        ));
    }

    tracing::debug!(backend = %backend, "Store health check passed");
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        backend,
        table: state.config.table_name.clone(),
    }))
}
