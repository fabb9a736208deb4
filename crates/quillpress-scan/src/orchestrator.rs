//! Scan orchestrator
//!
//! Drives fetch → classify → persist for each upload notification.
//! Batch processing is sequential in receipt order; a failure or timeout on
//! one item is logged and never aborts the rest of the batch. There is no
//! retry and no dead-lettering here - redelivery is the transport's concern.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use quillpress_core::config::{ScannerSettings, MEDIA_KEY_PREFIX};
use quillpress_core::models::{Detection, DetectionStatus, UploadNotification};
use quillpress_core::AppError;
use quillpress_db::DetectionRepository;
use quillpress_storage::ObjectStorage;
use uuid::Uuid;

use crate::detector::Detector;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub struct ScanOrchestrator {
    storage: Arc<dyn ObjectStorage>,
    detections: Arc<dyn DetectionRepository>,
    detector: Arc<dyn Detector>,
    settings: ScannerSettings,
}

impl ScanOrchestrator {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        detections: Arc<dyn DetectionRepository>,
        detector: Arc<dyn Detector>,
        settings: ScannerSettings,
    ) -> Self {
        Self {
            storage,
            detections,
            detector,
            settings,
        }
    }

    /// Process a batch of notifications sequentially. Per-item failures and
    /// timeouts are caught and logged; the batch always runs to completion.
    /// Returns the number of detections recorded.
    pub async fn process_batch(&self, notifications: &[UploadNotification]) -> usize {
        tracing::info!(count = notifications.len(), "Processing upload notifications");
        let per_item_timeout = Duration::from_secs(self.settings.fetch_timeout_secs);
        let mut threats = 0;

        for notification in notifications {
            let result = tokio::time::timeout(per_item_timeout, self.process_upload(notification))
                .await
                .unwrap_or_else(|_| {
                    Err(AppError::Timeout(format!(
                        "scan exceeded {}s for {}",
                        self.settings.fetch_timeout_secs, notification.key
                    )))
                });

            match result {
                Ok(Some(detection)) => {
                    threats += 1;
                    tracing::warn!(
                        threat = %detection.threat_name,
                        threat_type = %detection.threat_type,
                        key = %detection.s3_key,
                        "Threat detected in uploaded file"
                    );
                }
                Ok(None) => {
                    tracing::debug!(key = %notification.key, "File scanned clean");
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        key = %notification.key,
                        "Error scanning uploaded file"
                    );
                }
            }
        }

        threats
    }

    /// Scan a single uploaded object. Returns the persisted detection on a
    /// positive classification, `None` for clean or out-of-scope objects.
    pub async fn process_upload(
        &self,
        notification: &UploadNotification,
    ) -> Result<Option<Detection>, AppError> {
        // Not user-uploaded media: silently skipped, not an error
        if notification.bucket != self.settings.media_bucket {
            tracing::debug!(bucket = %notification.bucket, "Skipping notification for foreign bucket");
            return Ok(None);
        }
        if !notification.key.starts_with(MEDIA_KEY_PREFIX) {
            tracing::debug!(key = %notification.key, "Skipping non-media key");
            return Ok(None);
        }

        let fetched = self
            .storage
            .get_object(&notification.bucket, &notification.key)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        // Key format: media/{user_id}/{filename}
        let key_parts: Vec<&str> = notification.key.split('/').collect();
        let file_name = key_parts
            .last()
            .copied()
            .filter(|segment| !segment.is_empty())
            .unwrap_or(notification.key.as_str());

        let Some(threat) = self.detector.classify(&fetched.body, file_name) else {
            return Ok(None);
        };

        let user_id = if key_parts.len() > 1 {
            Some(key_parts[1].to_string())
        } else {
            None
        };

        let detection = Detection {
            id: Uuid::new_v4(),
            s3_key: notification.key.clone(),
            bucket: notification.bucket.clone(),
            file_name: file_name.to_string(),
            file_size: fetched.body.len() as i64,
            content_type: fetched
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            detected_at: Utc::now(),
            threat_type: threat.threat_type,
            threat_name: threat.name,
            user_id,
            user_email: None,
            status: DetectionStatus::Detected,
        };

        self.detections.insert(&detection).await?;

        Ok(Some(detection))
    }
}
