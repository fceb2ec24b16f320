use ab_glyph::{FontArc, PxScale};
use ::image::{imageops, DynamicImage, GenericImageView, ImageError, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::io::Cursor;

/// Semi-transparent gray used for blog watermarks.
pub const DEFAULT_WATERMARK_COLOR: Rgba<u8> = Rgba([128, 128, 128, 128]);

/// Distance in pixels between the watermark and the anchored edges.
pub const DEFAULT_WATERMARK_MARGIN: u32 = 20;

#[derive(Debug, thiserror::Error)]
pub enum WatermarkError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] ImageError),
}

/// Watermark configuration. The mark is always anchored bottom-right.
#[derive(Debug, Clone)]
pub struct WatermarkOptions {
    pub text: String,
    pub color: Rgba<u8>,
    /// Distance from the right and bottom edges
    pub margin: u32,
    pub font_size: f32,
    /// Images with fewer pixels than this are left untouched
    pub skip_pixel_threshold: u64,
}

impl WatermarkOptions {
    /// Blog default: gray text anchored bottom-right with the standard margin.
    pub fn bottom_right(text: impl Into<String>, font_size: u32, skip_pixel_threshold: u64) -> Self {
        Self {
            text: text.into(),
            color: DEFAULT_WATERMARK_COLOR,
            margin: DEFAULT_WATERMARK_MARGIN,
            font_size: font_size as f32,
            skip_pixel_threshold,
        }
    }
}

/// Applies a visible watermark to encoded image bytes.
///
/// Returns `Ok(None)` when the image is left as uploaded (too small, or
/// nothing to draw); callers then store the original bytes.
pub trait Watermarker: Send + Sync {
    fn apply(
        &self,
        data: &[u8],
        format: ImageFormat,
        options: &WatermarkOptions,
    ) -> Result<Option<Vec<u8>>, WatermarkError>;
}

pub(crate) fn is_below_threshold(width: u32, height: u32, threshold: u64) -> bool {
    (width as u64) * (height as u64) < threshold
}

/// Top-left corner of a bottom-right anchored mark, clamped inside the image.
pub(crate) fn bottom_right_offset(image: (u32, u32), mark: (u32, u32), margin: u32) -> (i64, i64) {
    let x = image.0 as i64 - mark.0 as i64 - margin as i64;
    let y = image.1 as i64 - mark.1 as i64 - margin as i64;
    (x.max(0), y.max(0))
}

/// Draws text with a TrueType/OpenType font.
pub struct TextWatermarker {
    font: FontArc,
}

impl TextWatermarker {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }
}

impl Watermarker for TextWatermarker {
    fn apply(
        &self,
        data: &[u8],
        format: ImageFormat,
        options: &WatermarkOptions,
    ) -> Result<Option<Vec<u8>>, WatermarkError> {
        let img = ::image::load_from_memory_with_format(data, format)
            .map_err(WatermarkError::Decode)?;
        let (img_width, img_height) = img.dimensions();

        if is_below_threshold(img_width, img_height, options.skip_pixel_threshold) {
            tracing::debug!(
                width = img_width,
                height = img_height,
                threshold = options.skip_pixel_threshold,
                "Image below watermark pixel threshold, skipping"
            );
            return Ok(None);
        }

        let scale = PxScale::from(options.font_size);
        let (text_width, text_height) = text_size(scale, &self.font, &options.text);
        if text_width == 0 || text_height == 0 {
            return Ok(None);
        }

        // Text goes onto a transparent layer first so its alpha is composited
        // onto the photo instead of replacing pixels.
        let mut layer = RgbaImage::new(text_width, text_height);
        draw_text_mut(&mut layer, options.color, 0, 0, scale, &self.font, &options.text);

        let (x, y) = bottom_right_offset(
            (img_width, img_height),
            (text_width, text_height),
            options.margin,
        );

        let mut canvas = img.to_rgba8();
        imageops::overlay(&mut canvas, &layer, x, y);

        let output = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8()),
            _ => DynamicImage::ImageRgba8(canvas),
        };

        let mut buffer = Vec::new();
        output
            .write_to(&mut Cursor::new(&mut buffer), format)
            .map_err(WatermarkError::Encode)?;

        Ok(Some(buffer))
    }
}
