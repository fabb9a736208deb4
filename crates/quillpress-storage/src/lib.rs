//! QuillPress Storage Library
//!
//! Read-side object storage abstraction for the scanning pipeline.
//! The pipeline never writes objects; uploads land in the bucket through the
//! presigned-upload path, which is outside this workspace. What the scanner
//! needs is fetching object bodies and counting objects under the media
//! prefix, so the trait surface is deliberately small.

#[cfg(feature = "storage-memory")]
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-memory")]
pub use memory::InMemoryObjectStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3ObjectStorage;
pub use traits::{FetchedObject, ObjectPage, ObjectStorage, StorageError, StorageResult};
