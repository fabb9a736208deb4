//! Application state shared by the security handlers.

use std::sync::Arc;

use quillpress_db::DetectionRepository;
use quillpress_scan::SecurityMetricsService;

pub struct AppState {
    /// Raw detection listing for the detections endpoint
    pub detections: Arc<dyn DetectionRepository>,
    /// Aggregated dashboard projection
    pub metrics: SecurityMetricsService,
    /// Secret for verifying caller JWTs issued by the platform's auth layer
    pub jwt_secret: String,
}
