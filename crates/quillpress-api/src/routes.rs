//! Router assembly: security routes, health check, OpenAPI document,
//! CORS and request tracing layers.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{routing::get, Json, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::handlers::security;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>, cors_origins: &[String]) -> Result<Router, anyhow::Error> {
    let cors = cors_layer(cors_origins)?;

    let router = Router::new()
        .route("/api/v0/security/dashboard", get(security::get_dashboard))
        .route("/api/v0/security/detections", get(security::get_detections))
        .route("/health", get(health))
        .route("/api-doc/openapi.json", get(openapi))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer, anyhow::Error> {
    if origins.iter().any(|o| o == "*") {
        return Ok(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));
    }

    let parsed: Result<Vec<HeaderValue>, _> = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect();
    let parsed = parsed.map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any))
}
