//! Security dashboard handlers
//!
//! Pure read-through over the metrics aggregator and the detection store.
//! Authorization is the `AdminUser` extractor; no filtering, sorting, or
//! pagination beyond what the store provides.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};
use quillpress_core::models::{DetectionListResponse, SecurityMetrics};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::AdminUser;
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DetectionsQuery {
    /// Restrict the listing to one owning principal
    pub user_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v0/security/dashboard",
    tag = "security",
    responses(
        (status = 200, description = "Security metrics snapshot", body = SecurityMetrics),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_token" = []))
)]
pub async fn get_dashboard(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let metrics = state
        .metrics
        .compute_metrics()
        .await
        .map_err(HttpAppError::from)?;
    Ok(Json(metrics))
}

#[utoipa::path(
    get,
    path = "/api/v0/security/detections",
    tag = "security",
    params(DetectionsQuery),
    responses(
        (status = 200, description = "Detections with count", body = DetectionListResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_token" = []))
)]
pub async fn get_detections(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<DetectionsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let detections = match query.user_id {
        Some(ref user_id) => state.detections.list_by_user(user_id).await,
        None => state.detections.list_all().await,
    }
    .map_err(HttpAppError::from)?;

    let count = detections.len();
    Ok(Json(DetectionListResponse { detections, count }))
}
