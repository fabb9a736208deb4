//! Security metrics aggregator
//!
//! Recomputes the dashboard projection on every request: object count from
//! storage, histogram and recent feed from the detection store. A storage
//! listing failure degrades the object count to zero; a detection scan
//! failure propagates, since the dashboard is meaningless without it.

use std::collections::HashMap;
use std::sync::Arc;

use quillpress_core::config::MEDIA_KEY_PREFIX;
use quillpress_core::models::SecurityMetrics;
use quillpress_core::AppError;
use quillpress_db::DetectionRepository;
use quillpress_storage::ObjectStorage;

/// How many detections the recent-threats feed carries.
pub const RECENT_THREATS_LIMIT: usize = 10;

#[derive(Clone)]
pub struct SecurityMetricsService {
    storage: Arc<dyn ObjectStorage>,
    detections: Arc<dyn DetectionRepository>,
    media_bucket: String,
}

impl SecurityMetricsService {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        detections: Arc<dyn DetectionRepository>,
        media_bucket: String,
    ) -> Self {
        Self {
            storage,
            detections,
            media_bucket,
        }
    }

    pub async fn compute_metrics(&self) -> Result<SecurityMetrics, AppError> {
        let total_files = self.count_media_objects().await;

        let mut detections = self.detections.list_all().await?;
        let threats_detected = detections.len() as i64;

        let mut threats_by_type: HashMap<String, i64> = HashMap::new();
        for detection in &detections {
            *threats_by_type.entry(detection.threat_type.clone()).or_insert(0) += 1;
        }

        detections.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));
        detections.truncate(RECENT_THREATS_LIMIT);

        Ok(SecurityMetrics {
            total_files,
            total_scanned: total_files,
            threats_detected,
            threats_by_type,
            recent_threats: detections,
            scan_rate: compute_scan_rate(total_files, threats_detected),
        })
    }

    /// Count objects under the media prefix, following continuation tokens
    /// until the listing is exhausted. Degrades to 0 on failure: a dashboard
    /// read should stay available even when the bucket is unreachable.
    async fn count_media_objects(&self) -> i64 {
        let mut count = 0i64;
        let mut token: Option<String> = None;

        loop {
            let page = match self
                .storage
                .list_objects(&self.media_bucket, MEDIA_KEY_PREFIX, token.as_deref())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        bucket = %self.media_bucket,
                        "Failed to count media objects, reporting zero"
                    );
                    return 0;
                }
            };

            count += page.key_count;
            match page.next_continuation_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        count
    }
}

/// Scan rate as a display percentage: `total / (total + threats) * 100`,
/// rounded half-up to 2 decimals; 100 for an empty bucket.
pub fn compute_scan_rate(total_files: i64, threats_detected: i64) -> f64 {
    if total_files == 0 {
        return 100.0;
    }
    let rate = total_files as f64 / (total_files + threats_detected) as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_rate_is_100_for_empty_bucket() {
        assert_eq!(compute_scan_rate(0, 0), 100.0);
        assert_eq!(compute_scan_rate(0, 25), 100.0);
    }

    #[test]
    fn scan_rate_basic_ratio() {
        assert_eq!(compute_scan_rate(950, 50), 95.0);
        assert_eq!(compute_scan_rate(100, 0), 100.0);
    }

    #[test]
    fn scan_rate_rounds_to_two_decimals() {
        // 1 / 3 * 100 = 33.333... -> 33.33
        assert_eq!(compute_scan_rate(1, 2), 33.33);
        // 2 / 3 * 100 = 66.666... -> 66.67
        assert_eq!(compute_scan_rate(2, 1), 66.67);
    }
}
