//! Stored file naming.
//!
//! Uploaded images are stored under a name built from a fresh identifier and
//! the original file's extension, so names never collide with one another or
//! with existing assets. The original base name is deliberately dropped.

use std::path::Path;

use uuid::Uuid;

/// Purpose suffix for the unwatermarked copy of an upload.
pub const ORIGIN_PURPOSE: &str = "origin";

/// Builds stored file names for one upload.
///
/// Every name produced by the same generator shares its identifier; names
/// with different purposes differ by their suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileNameGenerator {
    id: Uuid,
}

impl FileNameGenerator {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }

    /// Generator backed by a fresh random identifier.
    pub fn random() -> Self {
        Self::new(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// `{id}.{ext}` for the primary asset, `{id}-{purpose}.{ext}` otherwise.
    ///
    /// The extension is taken from `original_name` and lower-cased.
    pub fn file_name(&self, original_name: &str, purpose: Option<&str>) -> String {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();

        match purpose.map(str::trim).filter(|p| !p.is_empty()) {
            Some(purpose) => format!("{}-{}{}", self.id, purpose.to_lowercase(), extension),
            None => format!("{}{}", self.id, extension),
        }
    }
}
