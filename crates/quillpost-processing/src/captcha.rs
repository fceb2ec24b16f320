//! Captcha rendering for the comment form.

use ab_glyph::{FontArc, PxScale};
use ::image::{DynamicImage, ImageError, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut, text_size};
use rand::Rng;
use std::io::Cursor;

/// Characters that cannot be confused with one another when distorted.
pub const CAPTCHA_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

pub const CAPTCHA_CODE_LENGTH: usize = 4;

const NOISE_LINES: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum CaptchaError {
    #[error("Invalid captcha dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Failed to encode captcha image: {0}")]
    Encode(#[from] ImageError),
}

/// A rendered challenge and the code it shows.
#[derive(Debug, Clone)]
pub struct Captcha {
    pub code: String,
    pub png: Vec<u8>,
}

pub trait CaptchaGenerator: Send + Sync {
    fn generate(&self, width: u32, height: u32) -> Result<Captcha, CaptchaError>;
}

pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<(), CaptchaError> {
    if width < CAPTCHA_CODE_LENGTH as u32 * 4 || height < 8 {
        return Err(CaptchaError::InvalidDimensions { width, height });
    }
    Ok(())
}

pub(crate) fn random_code<R: Rng>(rng: &mut R) -> String {
    (0..CAPTCHA_CODE_LENGTH)
        .map(|_| CAPTCHA_ALPHABET[rng.random_range(0..CAPTCHA_ALPHABET.len())] as char)
        .collect()
}

fn random_ink<R: Rng>(rng: &mut R) -> Rgb<u8> {
    Rgb([
        rng.random_range(0..140),
        rng.random_range(0..140),
        rng.random_range(0..140),
    ])
}

/// Draws each glyph with its own colour and jitter over a few noise lines.
pub struct GlyphCaptcha {
    font: FontArc,
}

impl GlyphCaptcha {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }
}

impl CaptchaGenerator for GlyphCaptcha {
    fn generate(&self, width: u32, height: u32) -> Result<Captcha, CaptchaError> {
        check_dimensions(width, height)?;

        let mut rng = rand::rng();
        let code = random_code(&mut rng);

        let mut canvas = RgbImage::from_pixel(width, height, Rgb([245, 245, 245]));

        for _ in 0..NOISE_LINES {
            let start = (
                rng.random_range(0..width) as f32,
                rng.random_range(0..height) as f32,
            );
            let end = (
                rng.random_range(0..width) as f32,
                rng.random_range(0..height) as f32,
            );
            let color = Rgb([
                rng.random_range(150..230),
                rng.random_range(150..230),
                rng.random_range(150..230),
            ]);
            draw_line_segment_mut(&mut canvas, start, end, color);
        }

        let scale = PxScale::from(height as f32 * 0.75);
        let slot = width / CAPTCHA_CODE_LENGTH as u32;

        for (i, ch) in code.chars().enumerate() {
            let glyph = ch.to_string();
            let (glyph_width, glyph_height) = text_size(scale, &self.font, &glyph);

            let base_x = (i as u32 * slot) as i32 + (slot.saturating_sub(glyph_width) / 2) as i32;
            let base_y = (height.saturating_sub(glyph_height) / 2) as i32;
            let x = base_x + rng.random_range(-2..=2);
            let y = base_y + rng.random_range(-3..=3);

            draw_text_mut(
                &mut canvas,
                random_ink(&mut rng),
                x,
                y,
                scale,
                &self.font,
                &glyph,
            );
        }

        let mut png = Vec::new();
        DynamicImage::ImageRgb8(canvas).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        Ok(Captcha { code, png })
    }
}
