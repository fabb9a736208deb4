use crate::traits::{FetchedObject, ObjectPage, ObjectStorage, StorageError, StorageResult};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3ObjectStorage {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStorage {
    /// Create a new S3ObjectStorage instance
    ///
    /// # Arguments
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(region: Option<String>, endpoint_url: Option<String>) -> StorageResult<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let shared_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if let Some(endpoint) = endpoint_url {
            // S3-compatible providers generally require path-style addressing
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(S3ObjectStorage {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
        })
    }

    /// Wrap an existing client, mainly for tests against localstack/MinIO.
    pub fn from_client(client: aws_sdk_s3::Client) -> Self {
        S3ObjectStorage { client }
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<FetchedObject> {
        let start = std::time::Instant::now();

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    StorageError::NotFound(key.to_string())
                } else {
                    tracing::error!(
                        error = %service_error,
                        bucket = %bucket,
                        key = %key,
                        "S3 get_object failed"
                    );
                    StorageError::DownloadFailed(service_error.to_string())
                }
            })?;

        let content_type = response.content_type().map(str::to_string);
        let body = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?
            .into_bytes();

        tracing::debug!(
            bucket = %bucket,
            key = %key,
            size_bytes = body.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 get_object successful"
        );

        Ok(FetchedObject { body, content_type })
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> StorageResult<ObjectPage> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix);
        if let Some(token) = continuation_token {
            request = request.continuation_token(token);
        }

        let response = request.send().await.map_err(|e| {
            let service_error = e.into_service_error();
            tracing::error!(
                error = %service_error,
                bucket = %bucket,
                prefix = %prefix,
                "S3 list_objects_v2 failed"
            );
            StorageError::ListFailed(service_error.to_string())
        })?;

        Ok(ObjectPage {
            keys: response
                .contents()
                .iter()
                .filter_map(|object| object.key().map(str::to_string))
                .collect(),
            key_count: response.key_count().unwrap_or(0) as i64,
            next_continuation_token: response.next_continuation_token().map(str::to_string),
        })
    }
}
