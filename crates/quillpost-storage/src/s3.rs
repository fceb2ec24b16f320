use crate::keys::{content_type_for, image_key};
use crate::traits::{ImageStorage, StorageError, StorageResult, StoredImage};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload};
use std::time::Instant;

/// Images kept in an S3 (or S3-compatible) bucket under `images/`.
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    /// Set for MinIO and other S3-compatible providers
    endpoint_url: Option<String>,
}

impl S3Storage {
    /// Credentials come from the usual `AWS_*` environment variables.
    /// Plain-HTTP endpoints are allowed only when `endpoint_url` says so.
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let builder = AmazonS3Builder::from_env()
            .with_region(region.as_str())
            .with_bucket_name(bucket.as_str());

        let builder = match endpoint_url.as_deref() {
            Some(endpoint) => builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://")),
            None => builder,
        };

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Invalid S3 configuration: {}", e)))?;

        tracing::info!(bucket = %bucket, region = %region, custom_endpoint = endpoint_url.is_some(), "S3 client configured");

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Virtual-hosted URL on AWS, path-style under a custom endpoint.
    fn public_url(&self, key: &str) -> String {
        match self.endpoint_url.as_deref() {
            Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key),
            None => format!("https://{}.s3.{}.amazonaws.com/{}", self.bucket, self.region, key),
        }
    }

    fn log_failure(&self, operation: &str, key: &str, started: Instant, error: &ObjectStoreError) {
        tracing::error!(
            error = %error,
            bucket = %self.bucket,
            key = %key,
            operation,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "S3 request failed"
        );
    }
}

#[async_trait]
impl ImageStorage for S3Storage {
    async fn get(&self, file_name: &str) -> StorageResult<StoredImage> {
        let key = image_key(file_name)?;
        let started = Instant::now();

        let object = match self.store.get(&Path::from(key.as_str())).await {
            Ok(object) => object,
            Err(ObjectStoreError::NotFound { .. }) => {
                return Err(StorageError::NotFound(file_name.to_string()))
            }
            Err(e) => {
                self.log_failure("get", &key, started, &e);
                return Err(StorageError::DownloadFailed(e.to_string()));
            }
        };

        let data = object.bytes().await.map_err(|e| {
            self.log_failure("read body", &key, started, &e);
            StorageError::DownloadFailed(e.to_string())
        })?;

        tracing::debug!(
            key = %key,
            size_bytes = data.len(),
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "S3 object fetched"
        );

        Ok(StoredImage {
            data,
            content_type: content_type_for(file_name),
        })
    }

    async fn insert(&self, file_name: &str, data: Bytes) -> StorageResult<String> {
        let key = image_key(file_name)?;
        let size = data.len();
        let started = Instant::now();

        self.store
            .put(&Path::from(key.as_str()), PutPayload::from(data))
            .await
            .map_err(|e| {
                self.log_failure("put", &key, started, &e);
                StorageError::UploadFailed(e.to_string())
            })?;

        tracing::info!(
            key = %key,
            size_bytes = size,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "S3 object stored"
        );

        Ok(self.public_url(&key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
