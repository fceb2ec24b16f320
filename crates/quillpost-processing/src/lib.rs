//! Quillpost Processing Library
//!
//! Upload validation, text watermarking and captcha rendering. Everything here
//! is synchronous and CPU bound; async callers run it on the blocking pool.

pub mod captcha;
pub mod font;
pub mod image;
pub mod validator;

pub use captcha::{Captcha, CaptchaError, CaptchaGenerator, GlyphCaptcha};
pub use font::{load_font, FontError};
pub use self::image::watermark::{
    TextWatermarker, WatermarkError, WatermarkOptions, Watermarker,
};
pub use validator::{validate_asset_name, ImageExtension, UploadValidator, ValidationError};
