use serde::{Deserialize, Serialize};

/// Reference to a newly uploaded object, as delivered by the storage
/// notification transport. Ephemeral; delivery is at-least-once, so the
/// same (bucket, key) pair may be seen more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadNotification {
    pub bucket: String,
    /// Decoded object key, e.g. `media/{user_id}/{filename}`
    pub key: String,
}

impl UploadNotification {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}
