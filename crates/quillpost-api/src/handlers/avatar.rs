use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::static_files::{serve_static_png, DEFAULT_AVATAR_IMAGE};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

fn sniff_content_type(data: &[u8]) -> &'static str {
    ::image::guess_format(data)
        .map(|format| format.to_mime_type())
        .unwrap_or("image/png")
}

#[utoipa::path(
    get,
    path = "/avatar",
    tag = "images",
    responses(
        (status = 200, description = "Blogger avatar, or the default placeholder"),
        (status = 404, description = "Placeholder missing from the static root", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_avatar"))]
pub async fn get_avatar(State(state): State<Arc<AppState>>) -> Result<Response, HttpAppError> {
    let static_root = &state.settings.server.static_root;

    let Some(encoded) = state.settings.general.avatar_base64.as_deref() else {
        return Ok(serve_static_png(static_root, DEFAULT_AVATAR_IMAGE).await?);
    };

    match state.cache.avatar_or_decode(encoded).await {
        Ok(data) => {
            Ok(([(header::CONTENT_TYPE, sniff_content_type(&data))], data).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to decode configured avatar, serving placeholder");
            Ok(serve_static_png(static_root, DEFAULT_AVATAR_IMAGE).await?)
        }
    }
}
