// Route path constants - single source of truth for all API paths

use axum::{
    routing::{any, get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::handlers::{health_handler, invoke_handler, item_handler};
use crate::state::AppState;

pub const HEALTH: &str = "/health";
pub const INVOKE: &str = "/invoke";
pub const ITEM: &str = "/items/{id}";
pub const SWAGGER_UI: &str = "/swagger-ui";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

/// Local gateway emulation: the same dispatcher the Lambda entry point uses
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH, get(health_handler))
        .route(INVOKE, post(invoke_handler))
        .route(ITEM, any(item_handler))
        .merge(SwaggerUi::new(SWAGGER_UI).url(OPENAPI_JSON, ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
