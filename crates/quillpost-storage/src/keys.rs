//! Shared key generation for storage backends.
//!
//! Key format: `images/{file_name}`.

use crate::traits::{StorageError, StorageResult};

const KEY_PREFIX: &str = "images";

/// Map a stored file name to its backend key, rejecting names that could
/// address anything outside the image prefix.
pub fn image_key(file_name: &str) -> StorageResult<String> {
    if matches!(file_name, "" | "." | "..")
        || file_name.contains('/')
        || file_name.contains('\\')
    {
        return Err(StorageError::InvalidKey(file_name.to_string()));
    }
    Ok(format!("{}/{}", KEY_PREFIX, file_name))
}

/// Content type guessed from the file extension.
pub fn content_type_for(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
