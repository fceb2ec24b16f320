use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use quillpost_core::naming::ORIGIN_PURPOSE;
use quillpost_core::{AppError, FileNameGenerator};
use quillpost_processing::{ImageExtension, UploadValidator, WatermarkOptions};
use quillpost_worker::PersistJob;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Public path of the stored image, e.g. `/uploads/{name}`
    pub location: String,
}

/// Upload image handler
///
/// Validates the file, stores it under a fresh name (watermarked when
/// enabled), and queues the untouched original when keep-origin is on.
///
/// # Errors
/// - `AppError::BadRequest` - No file or an empty file
/// - `AppError::InvalidInput` - Extension not allowed
/// - `AppError::PayloadTooLarge` - File exceeds size limit
/// - `AppError::ImageProcessing` - Watermarking failed
/// - `AppError::Storage` - Primary persist failed
#[utoipa::path(
    post,
    path = "/image/upload",
    tag = "images",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image uploaded successfully", body = UploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_image"))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let upload = extract_multipart_file(multipart).await?;
    if upload.data.is_empty() {
        return Err(AppError::BadRequest("File is empty".to_string()).into());
    }

    let settings = &state.settings;
    let validator = UploadValidator::new(settings.image.max_file_size_bytes);

    let extension = validator.validate_extension(&upload.filename).map_err(|e| {
        tracing::warn!(filename = %upload.filename, error = %e, "Rejected upload with disallowed extension");
        HttpAppError::from(e)
    })?;
    validator.validate_file_size(upload.data.len())?;

    let names = FileNameGenerator::random();
    let primary_name = names.file_name(&upload.filename, None);
    let origin_name = names.file_name(&upload.filename, Some(ORIGIN_PURPOSE));

    let raw = upload.data;
    let body = if settings.watermark.enabled && extension.supports_watermark() {
        watermark(&state, raw.clone(), extension).await?
    } else {
        raw.clone()
    };

    let size = body.len();
    state
        .storage
        .insert(&primary_name, body)
        .await
        .map_err(|e| {
            tracing::error!(file_name = %primary_name, error = %e, "Failed to persist uploaded image");
            AppError::Storage(e.to_string())
        })?;

    tracing::info!(
        file_name = %primary_name,
        size_bytes = size,
        backend = %state.storage.backend_type(),
        "Image uploaded"
    );

    if settings.watermark.keep_origin {
        state.persist_queue.submit(PersistJob {
            file_name: origin_name,
            data: raw,
        });
    }

    Ok(Json(UploadResponse {
        location: format!("/uploads/{}", primary_name),
    }))
}

/// Watermarked bytes, or the input unchanged when the watermarker declines.
async fn watermark(
    state: &AppState,
    raw: Bytes,
    extension: ImageExtension,
) -> Result<Bytes, HttpAppError> {
    let watermarker = state.watermarker.clone().ok_or_else(|| {
        AppError::Internal("Watermarking is enabled but no watermarker is configured".to_string())
    })?;

    let settings = &state.settings.watermark;
    let options = WatermarkOptions::bottom_right(
        settings.text.clone(),
        settings.font_size,
        settings.skip_pixel_threshold,
    );
    let format = extension.image_format();

    let input = raw.clone();
    let marked = tokio::task::spawn_blocking(move || watermarker.apply(&input, format, &options))
        .await
        .map_err(|e| AppError::Internal(format!("Watermark task failed: {}", e)))??;

    Ok(marked.map(Bytes::from).unwrap_or(raw))
}
