use utoipa::OpenApi;

use crate::error::{ErrorResponse, HealthResponse, UnhealthyResponse};
use crate::handlers;
use crate::models::{EnvelopeHeaders, GatewayEvent, ResponseEnvelope};

/// OpenAPI documentation for the local gateway
#[derive(OpenApi)]
#[openapi(
    info(
        title = "kv-gateway-handler API",
        version = "1.0.0",
        description = "Gateway-style GET/POST/DELETE handler over a single-item key-value store"
    ),
    paths(
        handlers::health::health_handler,
        handlers::item::item_handler,
        handlers::invoke::invoke_handler
    ),
    components(
        schemas(
            GatewayEvent,
            ResponseEnvelope,
            EnvelopeHeaders,
            ErrorResponse,
            HealthResponse,
            UnhealthyResponse
        )
    ),
    tags(
        (name = "health", description = "Health check operations"),
        (name = "items", description = "Item operations dispatched by HTTP method")
    )
)]
pub struct ApiDoc;
