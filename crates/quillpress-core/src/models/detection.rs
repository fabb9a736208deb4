use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle status of a detection.
///
/// Records are created as `Detected`; the pipeline itself never transitions
/// them. `Quarantined` and `Resolved` exist for operator tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "detection_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum DetectionStatus {
    Detected,
    Quarantined,
    Resolved,
}

/// Durable record of a positive scan on an uploaded object.
///
/// Serializes to the wire shape consumed by the security dashboard:
/// camelCase field names and `detectedAt` as epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub id: Uuid,
    /// Full object key, e.g. `media/{user_id}/{filename}`
    pub s3_key: String,
    pub bucket: String,
    /// Display filename, the trailing segment of the key
    pub file_name: String,
    pub file_size: i64,
    pub content_type: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub detected_at: DateTime<Utc>,
    /// Coarse category tag, e.g. "suspicious_extension", "executable"
    pub threat_type: String,
    /// Human-readable description of the threat
    pub threat_name: String,
    /// Owning principal, parsed from the key path; absent for malformed keys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Usually unset: the scan runs without an authenticated caller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    pub status: DetectionStatus,
}

/// Response body for the detections listing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DetectionListResponse {
    pub detections: Vec<Detection>,
    pub count: usize,
}
