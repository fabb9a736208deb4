//! Scanning pipeline integration tests.
//!
//! Exercises the orchestrator and the metrics aggregator end-to-end over
//! the in-memory storage and detection store backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use quillpress_core::config::ScannerSettings;
use quillpress_core::models::{Detection, DetectionStatus, UploadNotification};
use quillpress_db::{DetectionRepository, InMemoryDetectionRepository};
use quillpress_scan::{HeuristicDetector, ScanOrchestrator, SecurityMetricsService};
use quillpress_storage::{
    FetchedObject, InMemoryObjectStorage, ObjectPage, ObjectStorage, StorageError, StorageResult,
};
use uuid::Uuid;

const BUCKET: &str = "quillpress-media";

/// Wraps the in-memory backend to count fetches and inject failures.
struct FaultInjectingStorage {
    inner: InMemoryObjectStorage,
    get_calls: AtomicUsize,
    fail_keys: Vec<String>,
    fail_listing: bool,
}

impl FaultInjectingStorage {
    fn new(inner: InMemoryObjectStorage) -> Self {
        Self {
            inner,
            get_calls: AtomicUsize::new(0),
            fail_keys: Vec::new(),
            fail_listing: false,
        }
    }

    fn failing_on(mut self, key: &str) -> Self {
        self.fail_keys.push(key.to_string());
        self
    }

    fn with_failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }
}

#[async_trait]
impl ObjectStorage for FaultInjectingStorage {
    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<FetchedObject> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_keys.iter().any(|k| k == key) {
            return Err(StorageError::DownloadFailed("injected failure".to_string()));
        }
        self.inner.get_object(bucket, key).await
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> StorageResult<ObjectPage> {
        if self.fail_listing {
            return Err(StorageError::ListFailed("injected failure".to_string()));
        }
        self.inner.list_objects(bucket, prefix, continuation_token).await
    }
}

fn orchestrator(
    storage: Arc<dyn ObjectStorage>,
    detections: Arc<dyn DetectionRepository>,
) -> ScanOrchestrator {
    ScanOrchestrator::new(
        storage,
        detections,
        Arc::new(HeuristicDetector::new()),
        ScannerSettings {
            media_bucket: BUCKET.to_string(),
            fetch_timeout_secs: 5,
        },
    )
}

fn detection_with(threat_type: &str, age_minutes: i64) -> Detection {
    Detection {
        id: Uuid::new_v4(),
        s3_key: "media/user-1/file.exe".to_string(),
        bucket: BUCKET.to_string(),
        file_name: "file.exe".to_string(),
        file_size: 64,
        content_type: "application/octet-stream".to_string(),
        detected_at: Utc::now() - Duration::minutes(age_minutes),
        threat_type: threat_type.to_string(),
        threat_name: format!("{} threat", threat_type),
        user_id: Some("user-1".to_string()),
        user_email: None,
        status: DetectionStatus::Detected,
    }
}

#[tokio::test]
async fn exe_upload_produces_detection_end_to_end() {
    let storage = InMemoryObjectStorage::new();
    storage
        .put_object(BUCKET, "media/user-42/evil.exe", b"whatever".to_vec(), None)
        .await;
    let repo = Arc::new(InMemoryDetectionRepository::new());
    let orchestrator = orchestrator(Arc::new(storage), repo.clone());

    let detection = orchestrator
        .process_upload(&UploadNotification::new(BUCKET, "media/user-42/evil.exe"))
        .await
        .unwrap()
        .expect("detection expected");

    assert_eq!(detection.threat_type, "suspicious_extension");
    assert_eq!(detection.user_id.as_deref(), Some("user-42"));
    assert_eq!(detection.file_name, "evil.exe");
    assert_eq!(detection.file_size, 8);
    assert_eq!(detection.content_type, "application/octet-stream");
    assert_eq!(detection.status, DetectionStatus::Detected);
    assert_eq!(repo.len().await, 1);
}

#[tokio::test]
async fn declared_content_type_is_carried_into_detection() {
    let storage = InMemoryObjectStorage::new();
    storage
        .put_object(
            BUCKET,
            "media/user-1/photo.png",
            b"<script>alert(1)</script>".to_vec(),
            Some("image/png"),
        )
        .await;
    let repo = Arc::new(InMemoryDetectionRepository::new());
    let orchestrator = orchestrator(Arc::new(storage), repo);

    let detection = orchestrator
        .process_upload(&UploadNotification::new(BUCKET, "media/user-1/photo.png"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(detection.threat_type, "embedded_script");
    assert_eq!(detection.content_type, "image/png");
}

#[tokio::test]
async fn clean_file_records_nothing() {
    let storage = InMemoryObjectStorage::new();
    storage
        .put_object(BUCKET, "media/user-1/notes.txt", b"hello".to_vec(), Some("text/plain"))
        .await;
    let repo = Arc::new(InMemoryDetectionRepository::new());
    let orchestrator = orchestrator(Arc::new(storage), repo.clone());

    let result = orchestrator
        .process_upload(&UploadNotification::new(BUCKET, "media/user-1/notes.txt"))
        .await
        .unwrap();

    assert!(result.is_none());
    assert!(repo.is_empty().await);
}

#[tokio::test]
async fn non_media_prefix_is_skipped_without_fetching() {
    let storage = Arc::new(FaultInjectingStorage::new(InMemoryObjectStorage::new()));
    let repo = Arc::new(InMemoryDetectionRepository::new());
    let orchestrator = orchestrator(storage.clone(), repo.clone());

    let result = orchestrator
        .process_upload(&UploadNotification::new(BUCKET, "other/1/file.txt"))
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(storage.get_calls.load(Ordering::SeqCst), 0);
    assert!(repo.is_empty().await);
}

#[tokio::test]
async fn foreign_bucket_is_skipped_without_fetching() {
    let storage = Arc::new(FaultInjectingStorage::new(InMemoryObjectStorage::new()));
    let repo = Arc::new(InMemoryDetectionRepository::new());
    let orchestrator = orchestrator(storage.clone(), repo);

    let result = orchestrator
        .process_upload(&UploadNotification::new("someone-elses-bucket", "media/u/f.exe"))
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(storage.get_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn batch_isolates_per_item_failures() {
    let inner = InMemoryObjectStorage::new();
    inner
        .put_object(BUCKET, "media/user-1/first.exe", b"x".to_vec(), None)
        .await;
    inner
        .put_object(BUCKET, "media/user-3/third.scr", b"x".to_vec(), None)
        .await;
    let storage =
        Arc::new(FaultInjectingStorage::new(inner).failing_on("media/user-2/second.png"));
    let repo = Arc::new(InMemoryDetectionRepository::new());
    let orchestrator = orchestrator(storage, repo.clone());

    let batch = vec![
        UploadNotification::new(BUCKET, "media/user-1/first.exe"),
        UploadNotification::new(BUCKET, "media/user-2/second.png"),
        UploadNotification::new(BUCKET, "media/user-3/third.scr"),
    ];
    let threats = orchestrator.process_batch(&batch).await;

    // Items 1 and 3 still produce their detections despite item 2 failing
    assert_eq!(threats, 2);
    let recorded = repo.list_all().await.unwrap();
    assert_eq!(recorded.len(), 2);
    assert!(recorded.iter().any(|d| d.file_name == "first.exe"));
    assert!(recorded.iter().any(|d| d.file_name == "third.scr"));
}

/// Storage whose fetches for selected keys never resolve.
struct HangingStorage {
    inner: InMemoryObjectStorage,
    hang_keys: Vec<String>,
}

#[async_trait]
impl ObjectStorage for HangingStorage {
    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<FetchedObject> {
        if self.hang_keys.iter().any(|k| k == key) {
            std::future::pending::<()>().await;
        }
        self.inner.get_object(bucket, key).await
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> StorageResult<ObjectPage> {
        self.inner.list_objects(bucket, prefix, continuation_token).await
    }
}

#[tokio::test]
async fn stuck_fetch_times_out_without_stalling_batch() {
    let inner = InMemoryObjectStorage::new();
    inner
        .put_object(BUCKET, "media/user-2/after.exe", b"x".to_vec(), None)
        .await;
    let storage = Arc::new(HangingStorage {
        inner,
        hang_keys: vec!["media/user-1/stuck.png".to_string()],
    });
    let repo = Arc::new(InMemoryDetectionRepository::new());
    let orchestrator = ScanOrchestrator::new(
        storage,
        repo.clone(),
        Arc::new(HeuristicDetector::new()),
        ScannerSettings {
            media_bucket: BUCKET.to_string(),
            fetch_timeout_secs: 1,
        },
    );

    let batch = vec![
        UploadNotification::new(BUCKET, "media/user-1/stuck.png"),
        UploadNotification::new(BUCKET, "media/user-2/after.exe"),
    ];
    let threats = orchestrator.process_batch(&batch).await;

    // The stuck item is abandoned at the timeout; the item behind it still runs
    assert_eq!(threats, 1);
    let recorded = repo.list_all().await.unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].file_name, "after.exe");
}

#[tokio::test]
async fn redelivered_notification_records_a_second_detection() {
    // At-least-once delivery with no dedup key: two scans, two rows
    let storage = InMemoryObjectStorage::new();
    storage
        .put_object(BUCKET, "media/user-1/evil.exe", b"x".to_vec(), None)
        .await;
    let repo = Arc::new(InMemoryDetectionRepository::new());
    let orchestrator = orchestrator(Arc::new(storage), repo.clone());

    let notification = UploadNotification::new(BUCKET, "media/user-1/evil.exe");
    let first = orchestrator.process_upload(&notification).await.unwrap().unwrap();
    let second = orchestrator.process_upload(&notification).await.unwrap().unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(repo.len().await, 2);
}

#[tokio::test]
async fn metrics_aggregate_over_paginated_listing() {
    let storage = InMemoryObjectStorage::with_page_size(2);
    for i in 0..5 {
        storage
            .put_object(BUCKET, &format!("media/u/f{}.txt", i), vec![0u8], None)
            .await;
    }
    let repo = Arc::new(InMemoryDetectionRepository::new());
    repo.insert(&detection_with("suspicious_extension", 3)).await.unwrap();
    repo.insert(&detection_with("suspicious_extension", 2)).await.unwrap();
    repo.insert(&detection_with("executable", 1)).await.unwrap();

    let service = SecurityMetricsService::new(Arc::new(storage), repo, BUCKET.to_string());
    let metrics = service.compute_metrics().await.unwrap();

    assert_eq!(metrics.total_files, 5);
    assert_eq!(metrics.total_scanned, 5);
    assert_eq!(metrics.threats_detected, 3);
    assert_eq!(metrics.threats_by_type["suspicious_extension"], 2);
    assert_eq!(metrics.threats_by_type["executable"], 1);
    // Histogram values sum to the detection count
    assert_eq!(metrics.threats_by_type.values().sum::<i64>(), 3);
    // 5 / (5 + 3) * 100 = 62.5
    assert_eq!(metrics.scan_rate, 62.5);
}

#[tokio::test]
async fn recent_threats_sorted_descending_and_capped_at_ten() {
    let storage = InMemoryObjectStorage::new();
    let repo = Arc::new(InMemoryDetectionRepository::new());
    for age in 0..12 {
        repo.insert(&detection_with("executable", age)).await.unwrap();
    }

    let service = SecurityMetricsService::new(Arc::new(storage), repo, BUCKET.to_string());
    let metrics = service.compute_metrics().await.unwrap();

    assert_eq!(metrics.recent_threats.len(), 10);
    for pair in metrics.recent_threats.windows(2) {
        assert!(pair[0].detected_at >= pair[1].detected_at);
    }
}

#[tokio::test]
async fn listing_failure_degrades_to_zero_files() {
    let storage =
        Arc::new(FaultInjectingStorage::new(InMemoryObjectStorage::new()).with_failing_listing());
    let repo = Arc::new(InMemoryDetectionRepository::new());
    repo.insert(&detection_with("executable", 1)).await.unwrap();

    let service = SecurityMetricsService::new(storage, repo, BUCKET.to_string());
    let metrics = service.compute_metrics().await.unwrap();

    // Degraded but available: zero files, detections still reported
    assert_eq!(metrics.total_files, 0);
    assert_eq!(metrics.threats_detected, 1);
    assert_eq!(metrics.scan_rate, 100.0);
}
