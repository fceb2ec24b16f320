//! Test fixtures: small encoded images.

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Solid-colour image encoded in `format`.
pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([200, 40, 40, 255]),
    ));
    let img = match format {
        ImageFormat::Jpeg | ImageFormat::Bmp => image::DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    };

    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format)
        .expect("encode fixture");
    buffer
}

pub fn create_minimal_png() -> Vec<u8> {
    encoded_image(4, 4, ImageFormat::Png)
}

pub fn create_minimal_gif() -> Vec<u8> {
    encoded_image(4, 4, ImageFormat::Gif)
}

/// Placeholder bytes written into the temporary static root.
pub const NOT_FOUND_PLACEHOLDER: &[u8] = b"placeholder: image not found";
pub const DEFAULT_AVATAR_PLACEHOLDER: &[u8] = b"placeholder: default avatar";
