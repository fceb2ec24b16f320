use ::image::ImageFormat;
use std::path::Path;

/// Extensions accepted for upload, lower-cased with their leading dot.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".bmp", ".gif"];

/// Characters that may never appear in a requested asset name.
const RESERVED_FILENAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Common validation errors for uploaded images
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Missing file extension: {0}")]
    MissingExtension(String),

    #[error("Empty file")]
    EmptyFile,
}

/// Image types accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageExtension {
    Png,
    Jpg,
    Jpeg,
    Bmp,
    Gif,
}

impl ImageExtension {
    /// Derive the extension from an uploaded file name, case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self, ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::MissingExtension(filename.to_string()))?;

        match extension.as_str() {
            "png" => Ok(ImageExtension::Png),
            "jpg" => Ok(ImageExtension::Jpg),
            "jpeg" => Ok(ImageExtension::Jpeg),
            "bmp" => Ok(ImageExtension::Bmp),
            "gif" => Ok(ImageExtension::Gif),
            _ => Err(ValidationError::InvalidExtension {
                extension: format!(".{}", extension),
                allowed: ALLOWED_IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            }),
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            ImageExtension::Png => ImageFormat::Png,
            ImageExtension::Jpg | ImageExtension::Jpeg => ImageFormat::Jpeg,
            ImageExtension::Bmp => ImageFormat::Bmp,
            ImageExtension::Gif => ImageFormat::Gif,
        }
    }

    /// Animated formats are stored as uploaded; the watermarker cannot
    /// preserve their frames.
    pub fn supports_watermark(&self) -> bool {
        !matches!(self, ImageExtension::Gif)
    }
}

/// Reject names carrying reserved filename characters (separators,
/// wildcards, quotes, NUL and other control characters).
///
/// Only characters are inspected: a name such as `..` passes and is left to
/// the storage backend to refuse.
pub fn validate_asset_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::InvalidFilename(
            "Filename cannot be empty".to_string(),
        ));
    }

    if name
        .chars()
        .any(|c| c.is_control() || RESERVED_FILENAME_CHARS.contains(&c))
    {
        return Err(ValidationError::InvalidFilename(format!(
            "Filename contains reserved characters: {}",
            name.escape_debug()
        )));
    }

    Ok(())
}

/// Upload validator
///
/// Checks size limits and the extension allowlist before any bytes reach
/// the watermarker or storage.
pub struct UploadValidator {
    max_file_size: usize,
}

impl UploadValidator {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate file extension
    pub fn validate_extension(&self, filename: &str) -> Result<ImageExtension, ValidationError> {
        ImageExtension::from_filename(filename)
    }
}
