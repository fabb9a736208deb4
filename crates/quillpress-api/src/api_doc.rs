//! OpenAPI document for the security surface.

use quillpress_core::models::{
    Detection, DetectionListResponse, DetectionStatus, SecurityMetrics,
};
use utoipa::OpenApi;

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "QuillPress Security API",
        description = "Admin dashboard over the media security-scanning pipeline"
    ),
    paths(
        handlers::security::get_dashboard,
        handlers::security::get_detections,
    ),
    components(schemas(
        Detection,
        DetectionStatus,
        DetectionListResponse,
        SecurityMetrics,
    ))
)]
pub struct ApiDoc;
