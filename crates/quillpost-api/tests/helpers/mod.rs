//! Shared harness for the HTTP integration tests.
//!
//! Builds the real router over an in-memory storage and fake renderers so
//! every route runs end to end without touching disk or fonts.

pub mod fakes;
pub mod fixtures;
pub mod storage;

use axum_test::TestServer;
use quillpost_api::cache::AssetCache;
use quillpost_api::captcha_sessions::CaptchaSessions;
use quillpost_api::setup::routes::setup_routes;
use quillpost_api::AppState;
use quillpost_core::BlogSettings;
use quillpost_processing::{CaptchaGenerator, Watermarker};
use quillpost_worker::{PersistQueue, PersistQueueConfig};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use fakes::{FixedCaptcha, RecordingWatermarker};
use fixtures::{DEFAULT_AVATAR_PLACEHOLDER, NOT_FOUND_PLACEHOLDER};
use storage::CountingStorage;

pub const TEST_API_KEY: &str = "test-admin-key";

pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<CountingStorage>,
    pub watermarker: Arc<RecordingWatermarker>,
    pub state: Arc<AppState>,
    _static_root: TempDir,
}

impl TestApp {
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", TEST_API_KEY)
    }
}

pub struct TestAppBuilder {
    settings: BlogSettings,
    cache_window: Duration,
    storage: Arc<CountingStorage>,
    with_captcha: bool,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        let mut settings = BlogSettings::default();
        settings.server.admin_api_key = TEST_API_KEY.to_string();

        Self {
            settings,
            cache_window: Duration::from_secs(60),
            storage: Arc::new(CountingStorage::new()),
            with_captcha: true,
        }
    }

    pub fn settings(mut self, configure: impl FnOnce(&mut BlogSettings)) -> Self {
        configure(&mut self.settings);
        self
    }

    pub fn cache_window(mut self, window: Duration) -> Self {
        self.cache_window = window;
        self
    }

    pub fn without_captcha(mut self) -> Self {
        self.with_captcha = false;
        self
    }

    pub fn build(mut self) -> TestApp {
        let static_root = TempDir::new().expect("create static root");
        let images = static_root.path().join("images");
        std::fs::create_dir_all(&images).expect("create images dir");
        std::fs::write(images.join("image-not-found.png"), NOT_FOUND_PLACEHOLDER)
            .expect("write not-found placeholder");
        std::fs::write(images.join("default-avatar.png"), DEFAULT_AVATAR_PLACEHOLDER)
            .expect("write avatar placeholder");
        self.settings.server.static_root = static_root.path().to_path_buf();

        let watermarker = Arc::new(RecordingWatermarker::default());
        let captcha: Option<Arc<dyn CaptchaGenerator>> = if self.with_captcha {
            Some(Arc::new(FixedCaptcha))
        } else {
            None
        };

        let persist_queue = PersistQueue::spawn(self.storage.clone(), PersistQueueConfig::default());

        let state = Arc::new(AppState {
            settings: Arc::new(self.settings),
            storage: self.storage.clone(),
            cache: AssetCache::new(self.cache_window, 100),
            watermarker: Some(watermarker.clone() as Arc<dyn Watermarker>),
            captcha,
            captcha_sessions: CaptchaSessions::default(),
            persist_queue: Arc::new(persist_queue),
        });

        let router = setup_routes(state.clone()).expect("build router");
        let server = TestServer::new(router).expect("start test server");

        TestApp {
            server,
            storage: self.storage,
            watermarker,
            state,
            _static_root: static_root,
        }
    }
}

pub fn setup_test_app() -> TestApp {
    TestAppBuilder::new().build()
}
