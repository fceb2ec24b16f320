//! In-memory asset cache in front of the storage provider.
//!
//! Image lookups use a sliding (time-to-idle) window: every hit pushes the
//! expiry back, and an entry idle for the whole window is fetched again on
//! the next request. Concurrent misses on one key share a single fetch.
//!
//! The avatar lives in its own single-entry cache with no expiry.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use moka::future::Cache;
use quillpost_core::ImageSettings;
use quillpost_storage::{ImageStorage, StoredImage};
use std::sync::Arc;
use std::time::Duration;

pub const AVATAR_CACHE_KEY: &str = "avatar";

/// What the storage provider answered for a name.
#[derive(Debug, Clone)]
pub enum AssetLookup {
    Found(StoredImage),
    Missing(String),
}

#[derive(Clone)]
pub struct AssetCache {
    images: Cache<String, Arc<AssetLookup>>,
    avatar: Cache<&'static str, Bytes>,
}

impl AssetCache {
    pub fn new(sliding_expiration: Duration, max_entries: u64) -> Self {
        let images = Cache::builder()
            .max_capacity(max_entries)
            .time_to_idle(sliding_expiration)
            .build();
        let avatar = Cache::builder().max_capacity(1).build();

        Self { images, avatar }
    }

    pub fn from_settings(settings: &ImageSettings) -> Self {
        Self::new(
            Duration::from_secs(settings.cache_sliding_expiration_minutes * 60),
            settings.cache_max_entries,
        )
    }

    /// Cached lookup, fetching from `storage` on a miss.
    ///
    /// Whatever the provider answers is cached for the window, failures
    /// included, so a broken or missing object is not refetched on every
    /// request.
    pub async fn get_or_fetch(
        &self,
        file_name: &str,
        storage: &Arc<dyn ImageStorage>,
    ) -> Arc<AssetLookup> {
        let storage = storage.clone();
        let name = file_name.to_string();

        self.images
            .get_with(file_name.to_string(), async move {
                tracing::debug!(file_name = %name, "Asset cache miss, fetching from storage");
                match storage.get(&name).await {
                    Ok(image) => Arc::new(AssetLookup::Found(image)),
                    Err(e) => {
                        if e.is_provider_miss() {
                            tracing::debug!(file_name = %name, reason = %e, "Storage has no usable object");
                        } else {
                            tracing::error!(file_name = %name, error = %e, "Storage lookup failed");
                        }
                        Arc::new(AssetLookup::Missing(e.to_string()))
                    }
                }
            })
            .await
    }

    /// Decoded avatar bytes, decoding `encoded` only when not cached yet.
    pub async fn avatar_or_decode(
        &self,
        encoded: &str,
    ) -> Result<Bytes, Arc<base64::DecodeError>> {
        let encoded = encoded.trim().to_string();

        self.avatar
            .try_get_with(AVATAR_CACHE_KEY, async move {
                STANDARD.decode(encoded.as_bytes()).map(Bytes::from)
            })
            .await
    }
}
