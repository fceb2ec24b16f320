use crate::cache::AssetLookup;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::static_files::{serve_static_png, NOT_FOUND_IMAGE};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use quillpost_core::AppError;
use quillpost_processing::validate_asset_name;
use std::sync::Arc;

fn cdn_location(endpoint: &str, filename: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), filename)
}

#[utoipa::path(
    get,
    path = "/uploads/{filename}",
    tag = "images",
    params(
        ("filename" = String, Path, description = "Stored file name")
    ),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 302, description = "Redirect to the CDN copy"),
        (status = 400, description = "File name contains reserved characters", body = ErrorResponse),
        (status = 404, description = "Image not found or storage failed, and the friendly placeholder is disabled", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "serve_upload"))]
pub async fn serve_upload(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    if let Err(e) = validate_asset_name(&filename) {
        tracing::warn!(filename = %filename.escape_debug(), "Rejected request for invalid file name");
        return Err(e.into());
    }

    let settings = &state.settings;
    if settings.cdn.enabled {
        let location = cdn_location(&settings.cdn.endpoint, &filename);
        return Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response());
    }

    let lookup = state.cache.get_or_fetch(&filename, &state.storage).await;

    match lookup.as_ref() {
        AssetLookup::Found(image) => Ok((
            [(header::CONTENT_TYPE, image.content_type.clone())],
            image.data.clone(),
        )
            .into_response()),
        AssetLookup::Missing(reason) => {
            tracing::debug!(filename = %filename, reason = %reason, "Serving not-found response");
            if settings.content.use_friendly_not_found_image {
                Ok(serve_static_png(&settings.server.static_root, NOT_FOUND_IMAGE).await?)
            } else {
                Err(AppError::NotFound(format!("Image not found: {}", filename)).into())
            }
        }
    }
}
