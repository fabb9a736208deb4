//! In-memory storage backend, used by tests and local development.
//!
//! Listing emulates S3-style pagination: pages are cut at `page_size` keys
//! and a continuation token (the next key offset) is returned while more
//! keys remain, so callers exercise the same token loop they run against S3.

use crate::traits::{FetchedObject, ObjectPage, ObjectStorage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Clone)]
struct StoredObject {
    body: Bytes,
    content_type: Option<String>,
}

/// In-memory object storage keyed by (bucket, key).
#[derive(Clone)]
pub struct InMemoryObjectStorage {
    objects: Arc<RwLock<BTreeMap<(String, String), StoredObject>>>,
    page_size: usize,
}

impl InMemoryObjectStorage {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create with a small page size to exercise pagination in tests.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            objects: Arc::new(RwLock::new(BTreeMap::new())),
            page_size: page_size.max(1),
        }
    }

    /// Store an object, as the upload path outside this workspace would.
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: impl Into<Bytes>,
        content_type: Option<&str>,
    ) {
        let mut objects = self.objects.write().await;
        objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: body.into(),
                content_type: content_type.map(str::to_string),
            },
        );
    }
}

impl Default for InMemoryObjectStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<FetchedObject> {
        let objects = self.objects.read().await;
        let stored = objects
            .get(&(bucket.to_string(), key.to_string()))
            .ok_or_else(|| StorageError::NotFound(format!("{}/{}", bucket, key)))?;
        Ok(FetchedObject {
            body: stored.body.clone(),
            content_type: stored.content_type.clone(),
        })
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> StorageResult<ObjectPage> {
        let offset: usize = match continuation_token {
            Some(token) => token
                .parse()
                .map_err(|_| StorageError::ListFailed(format!("bad token: {}", token)))?,
            None => 0,
        };

        let objects = self.objects.read().await;
        let matching: Vec<String> = objects
            .keys()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect();

        let page: Vec<String> = matching
            .iter()
            .skip(offset)
            .take(self.page_size)
            .cloned()
            .collect();
        let next_offset = offset + page.len();
        let next_continuation_token = if next_offset < matching.len() {
            Some(next_offset.to_string())
        } else {
            None
        };

        Ok(ObjectPage {
            key_count: page.len() as i64,
            keys: page,
            next_continuation_token,
        })
    }
}
