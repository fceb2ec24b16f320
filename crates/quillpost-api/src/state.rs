//! Application state shared by every handler.
//!
//! Built once at startup. The settings snapshot is immutable; the only shared
//! mutable pieces are the caches and the persist queue, which synchronise
//! internally.

use crate::cache::AssetCache;
use crate::captcha_sessions::CaptchaSessions;
use quillpost_core::BlogSettings;
use quillpost_processing::{CaptchaGenerator, Watermarker};
use quillpost_storage::ImageStorage;
use quillpost_worker::PersistQueue;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<BlogSettings>,
    pub storage: Arc<dyn ImageStorage>,
    pub cache: AssetCache,
    /// Present whenever watermarking is enabled
    pub watermarker: Option<Arc<dyn Watermarker>>,
    /// Absent when no font is configured; the captcha route then answers 500
    pub captcha: Option<Arc<dyn CaptchaGenerator>>,
    pub captcha_sessions: CaptchaSessions,
    pub persist_queue: Arc<PersistQueue>,
}
