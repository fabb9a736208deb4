use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Detection;

/// Point-in-time projection over the detection set and the media bucket.
///
/// Never persisted; recomputed on every dashboard request. Serializes
/// camelCase for the dashboard client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecurityMetrics {
    /// Objects currently under the media prefix in storage
    pub total_files: i64,
    /// Every stored object is assumed already scanned
    pub total_scanned: i64,
    pub threats_detected: i64,
    /// Histogram keyed by threat type; values sum to `threats_detected`
    pub threats_by_type: HashMap<String, i64>,
    /// Most recent detections, descending by `detected_at`, at most 10
    pub recent_threats: Vec<Detection>,
    /// Display metric: `total_files / (total_files + threats_detected) * 100`,
    /// rounded to 2 decimals; 100 when the bucket is empty
    pub scan_rate: f64,
}
