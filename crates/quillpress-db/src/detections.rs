//! Detection repository
//!
//! The durable record of positive scans. Inserts are unconditional: no
//! dedup key exists, so re-scanning an object (e.g. on notification
//! redelivery) records a new row. Reads are full or filtered scans; any
//! ordering is imposed by the caller.

use async_trait::async_trait;
use quillpress_core::models::Detection;
use quillpress_core::AppError;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Trait for detection store operations, abstracting the database
/// implementation (PostgreSQL in production, in-memory in tests).
#[async_trait]
pub trait DetectionRepository: Send + Sync {
    /// Unconditional insert. Callers must only call this once per logical
    /// detection they intend to record.
    async fn insert(&self, detection: &Detection) -> Result<(), AppError>;

    /// Every stored detection, in no guaranteed order.
    async fn list_all(&self) -> Result<Vec<Detection>, AppError>;

    /// Detections whose owning principal equals `user_id`.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Detection>, AppError>;
}

#[derive(Clone)]
pub struct PgDetectionRepository {
    pool: PgPool,
}

impl PgDetectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DetectionRepository for PgDetectionRepository {
    #[tracing::instrument(skip(self, detection), fields(
        db.system = "postgresql",
        db.table = "virus_detections",
        db.operation = "insert",
        detection.id = %detection.id
    ))]
    async fn insert(&self, detection: &Detection) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO virus_detections (
                id, s3_key, bucket, file_name, file_size, content_type,
                detected_at, threat_type, threat_name, user_id, user_email, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(detection.id)
        .bind(&detection.s3_key)
        .bind(&detection.bucket)
        .bind(&detection.file_name)
        .bind(detection.file_size)
        .bind(&detection.content_type)
        .bind(detection.detected_at)
        .bind(&detection.threat_type)
        .bind(&detection.threat_name)
        .bind(&detection.user_id)
        .bind(&detection.user_email)
        .bind(detection.status)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, detection_id = %detection.id, "Failed to save detection");
            AppError::from(e)
        })?;

        tracing::info!(detection_id = %detection.id, "Detection saved");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "virus_detections",
        db.operation = "select"
    ))]
    async fn list_all(&self) -> Result<Vec<Detection>, AppError> {
        let detections = sqlx::query_as::<_, Detection>(
            r#"
            SELECT id, s3_key, bucket, file_name, file_size, content_type,
                   detected_at, threat_type, threat_name, user_id, user_email, status
            FROM virus_detections
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(detections)
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "virus_detections",
        db.operation = "select"
    ))]
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Detection>, AppError> {
        let detections = sqlx::query_as::<_, Detection>(
            r#"
            SELECT id, s3_key, bucket, file_name, file_size, content_type,
                   detected_at, threat_type, threat_name, user_id, user_email, status
            FROM virus_detections
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(detections)
    }
}

/// In-memory detection store for tests and local development.
#[derive(Clone, Default)]
pub struct InMemoryDetectionRepository {
    records: Arc<RwLock<Vec<Detection>>>,
}

impl InMemoryDetectionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl DetectionRepository for InMemoryDetectionRepository {
    async fn insert(&self, detection: &Detection) -> Result<(), AppError> {
        self.records.write().await.push(detection.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Detection>, AppError> {
        Ok(self.records.read().await.clone())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Detection>, AppError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|d| d.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quillpress_core::models::DetectionStatus;
    use uuid::Uuid;

    fn detection_for(user_id: Option<&str>) -> Detection {
        Detection {
            id: Uuid::new_v4(),
            s3_key: "media/u/f.exe".to_string(),
            bucket: "bucket".to_string(),
            file_name: "f.exe".to_string(),
            file_size: 10,
            content_type: "application/octet-stream".to_string(),
            detected_at: Utc::now(),
            threat_type: "suspicious_extension".to_string(),
            threat_name: "Suspicious file extension: exe".to_string(),
            user_id: user_id.map(str::to_string),
            user_email: None,
            status: DetectionStatus::Detected,
        }
    }

    #[tokio::test]
    async fn in_memory_insert_and_scan() {
        let repo = InMemoryDetectionRepository::new();
        repo.insert(&detection_for(Some("alice"))).await.unwrap();
        repo.insert(&detection_for(Some("bob"))).await.unwrap();
        repo.insert(&detection_for(None)).await.unwrap();

        assert_eq!(repo.list_all().await.unwrap().len(), 3);
        let alice = repo.list_by_user("alice").await.unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].user_id.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn duplicate_inserts_both_recorded() {
        // No dedup key: the same logical detection inserted twice is two rows.
        let repo = InMemoryDetectionRepository::new();
        let d = detection_for(Some("alice"));
        repo.insert(&d).await.unwrap();
        repo.insert(&d).await.unwrap();
        assert_eq!(repo.len().await, 2);
    }
}
