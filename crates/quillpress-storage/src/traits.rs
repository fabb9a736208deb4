//! Storage abstraction trait
//!
//! This module defines the ObjectStorage trait that all storage backends
//! must implement.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// An object fetched from storage: the full body plus the content type the
/// uploader declared, if any.
#[derive(Debug, Clone)]
pub struct FetchedObject {
    pub body: Bytes,
    pub content_type: Option<String>,
}

/// One page of a bucket listing. `next_continuation_token` is `Some` while
/// more pages remain; callers loop until it is `None`.
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    pub key_count: i64,
    pub next_continuation_token: Option<String>,
}

/// Read-side storage abstraction
///
/// Both backends (S3, in-memory) implement this trait so the orchestrator
/// and the metrics aggregator stay decoupled from any concrete client.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Fetch the full body and declared content type of an object.
    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<FetchedObject>;

    /// List one page of keys under a prefix. Pass the continuation token
    /// from the previous page to advance; `None` starts from the beginning.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> StorageResult<ObjectPage>;
}
