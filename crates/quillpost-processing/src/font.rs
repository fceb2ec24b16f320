//! Font loading shared by the watermark and captcha renderers.

use ab_glyph::FontArc;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("Failed to read font {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid font data: {0}")]
    Invalid(String),
}

/// Parse a TrueType/OpenType font from raw bytes.
pub fn font_from_bytes(data: Vec<u8>) -> Result<FontArc, FontError> {
    FontArc::try_from_vec(data).map_err(|e| FontError::Invalid(e.to_string()))
}

/// Read and parse a font file.
pub fn load_font(path: &Path) -> Result<FontArc, FontError> {
    let data = std::fs::read(path).map_err(|source| FontError::Read {
        path: path.display().to_string(),
        source,
    })?;
    font_from_bytes(data)
}
