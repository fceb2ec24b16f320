//! Stand-ins for the CPU-bound renderers.

use image::ImageFormat;
use quillpost_processing::{
    Captcha, CaptchaError, CaptchaGenerator, WatermarkError, WatermarkOptions, Watermarker,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Appended to every watermarked payload.
pub const WATERMARK_SUFFIX: &[u8] = b"<wm>";

/// Records calls and tags the bytes instead of drawing.
#[derive(Default)]
pub struct RecordingWatermarker {
    calls: AtomicUsize,
    last_options: Mutex<Option<WatermarkOptions>>,
}

impl RecordingWatermarker {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<WatermarkOptions> {
        self.last_options.lock().unwrap().clone()
    }
}

impl Watermarker for RecordingWatermarker {
    fn apply(
        &self,
        data: &[u8],
        _format: ImageFormat,
        options: &WatermarkOptions,
    ) -> Result<Option<Vec<u8>>, WatermarkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options.clone());

        let mut marked = data.to_vec();
        marked.extend_from_slice(WATERMARK_SUFFIX);
        Ok(Some(marked))
    }
}

pub const CAPTCHA_CODE: &str = "AB3K";

pub struct FixedCaptcha;

impl CaptchaGenerator for FixedCaptcha {
    fn generate(&self, width: u32, height: u32) -> Result<Captcha, CaptchaError> {
        Ok(Captcha {
            code: CAPTCHA_CODE.to_string(),
            png: super::fixtures::encoded_image(width, height, ImageFormat::Png),
        })
    }
}
