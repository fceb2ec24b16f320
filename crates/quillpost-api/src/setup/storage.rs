//! Storage setup and initialization

use anyhow::Result;
use quillpost_core::StorageSettings;
use quillpost_storage::{create_storage, ImageStorage};
use std::sync::Arc;

pub async fn setup_storage(settings: &StorageSettings) -> Result<Arc<dyn ImageStorage>> {
    tracing::info!(backend = %settings.backend, "Initializing image storage");
    let storage = create_storage(settings).await?;
    tracing::info!(
        backend = %storage.backend_type(),
        "Image storage initialized successfully"
    );
    Ok(storage)
}
