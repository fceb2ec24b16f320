use crate::captcha_sessions::{session_cookie, session_from_headers};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use quillpost_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/get-captcha-image",
    tag = "captcha",
    responses(
        (status = 200, description = "PNG challenge; the answer is bound to the captcha_session cookie"),
        (status = 500, description = "Captcha rendering unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers), fields(operation = "get_captcha_image"))]
pub async fn get_captcha_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, HttpAppError> {
    let generator = state.captcha.clone().ok_or_else(|| {
        AppError::Internal("Captcha generator is not configured (FONT_PATH unset)".to_string())
    })?;

    let width = state.settings.image.captcha_width;
    let height = state.settings.image.captcha_height;
    let captcha = tokio::task::spawn_blocking(move || generator.generate(width, height))
        .await
        .map_err(|e| AppError::Internal(format!("Captcha task failed: {}", e)))??;

    let session = session_from_headers(&headers).unwrap_or_else(Uuid::new_v4);
    state.captcha_sessions.store(session, captcha.code).await;

    let cookie = session_cookie(session, state.settings.is_production());

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CACHE_CONTROL, "no-store".to_string()),
            (header::SET_COOKIE, cookie),
        ],
        captcha.png,
    )
        .into_response())
}
