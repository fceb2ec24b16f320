//! Storage abstraction trait
//!
//! This module defines the ImageStorage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Whether the provider answered and reported that it cannot serve the
    /// object, as opposed to the provider itself failing.
    pub fn is_provider_miss(&self) -> bool {
        matches!(
            self,
            StorageError::NotFound(_) | StorageError::InvalidKey(_) | StorageError::DownloadFailed(_)
        )
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// An image read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub data: Bytes,
    pub content_type: String,
}

/// Storage abstraction trait
///
/// Blob store keyed by stored file name. Handlers depend only on this trait,
/// so the backend can be swapped without touching request logic.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Read an image by its stored file name
    async fn get(&self, file_name: &str) -> StorageResult<StoredImage>;

    /// Store an image under the given file name and return its location
    async fn insert(&self, file_name: &str, data: Bytes) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
