//! Application setup and initialization
//!
//! Everything main.rs needs to go from a settings snapshot to a running
//! router, kept here so tests can build the same router around fakes.

pub mod routes;
pub mod server;
pub mod storage;

use crate::cache::AssetCache;
use crate::captcha_sessions::CaptchaSessions;
use crate::state::AppState;
use anyhow::{Context, Result};
use quillpost_core::BlogSettings;
use quillpost_processing::{
    load_font, CaptchaGenerator, GlyphCaptcha, TextWatermarker, Watermarker,
};
use quillpost_worker::{PersistQueue, PersistQueueConfig};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(settings: BlogSettings) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(settings.is_production());
    crate::error::set_production_mode(settings.is_production());

    tracing::info!(
        environment = %settings.server.environment,
        "Configuration loaded and validated successfully"
    );

    let storage = storage::setup_storage(&settings.storage).await?;

    let font = match settings.image.font_path.as_deref() {
        Some(path) => Some(
            load_font(path).with_context(|| format!("Failed to load FONT_PATH {}", path.display()))?,
        ),
        None => {
            tracing::warn!("FONT_PATH not set, captcha rendering is disabled");
            None
        }
    };

    let watermarker = match (&font, settings.watermark.enabled) {
        (Some(font), true) => {
            Some(Arc::new(TextWatermarker::new(font.clone())) as Arc<dyn Watermarker>)
        }
        _ => None,
    };
    let captcha = font.map(|font| Arc::new(GlyphCaptcha::new(font)) as Arc<dyn CaptchaGenerator>);

    let persist_queue = Arc::new(PersistQueue::spawn(
        storage.clone(),
        PersistQueueConfig::default(),
    ));

    let state = Arc::new(AppState {
        cache: AssetCache::from_settings(&settings.image),
        settings: Arc::new(settings),
        storage,
        watermarker,
        captcha,
        captcha_sessions: CaptchaSessions::default(),
        persist_queue,
    });

    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
