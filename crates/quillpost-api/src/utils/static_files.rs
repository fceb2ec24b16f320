//! Placeholder images shipped under the static root.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use quillpost_core::AppError;
use std::path::Path;

pub const NOT_FOUND_IMAGE: &str = "images/image-not-found.png";
pub const DEFAULT_AVATAR_IMAGE: &str = "images/default-avatar.png";

/// Serve `relative` from `static_root` as a PNG.
pub async fn serve_static_png(static_root: &Path, relative: &str) -> Result<Response, AppError> {
    let path = static_root.join(relative);

    let data = tokio::fs::read(&path).await.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Static placeholder unavailable");
        AppError::NotFound(format!("{} is not available", relative))
    })?;

    Ok(([(header::CONTENT_TYPE, "image/png")], data).into_response())
}
