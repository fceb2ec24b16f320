//! Quillpost Storage Library
//!
//! Storage abstraction and backends for uploaded images.
//!
//! # Storage key format
//!
//! Images are addressed by their stored file name. Every backend maps a file
//! name to the key `images/{file_name}` through the `keys` module so the
//! layout stays identical whichever backend is configured.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use quillpost_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ImageStorage, StorageError, StorageResult, StoredImage};
