//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. Domain errors convert into
//! [`AppError`] through the `From` impls below and render as a JSON
//! [`ErrorResponse`] with the status the error declares for itself.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quillpost_core::{AppError, ErrorMetadata, LogLevel};
use quillpost_processing::{CaptchaError, ValidationError, WatermarkError};
use serde::Serialize;
use std::any::Any;
use std::sync::OnceLock;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Client-safe message
    pub error: String,
    /// Error chain, omitted in production and for sensitive errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    pub code: String,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Boundary wrapper: `AppError` lives in the core crate, so the response
/// conversion needs a local type.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

/// Set once at startup from the settings snapshot; production bodies never
/// carry error details.
static PRODUCTION_MODE: OnceLock<bool> = OnceLock::new();

pub fn set_production_mode(production: bool) {
    if PRODUCTION_MODE.set(production).is_err() {
        tracing::debug!("Error detail mode already configured");
    }
}

fn production_mode() -> bool {
    PRODUCTION_MODE.get().copied().unwrap_or(false)
}

fn log_error(error: &AppError) {
    let kind = error.error_type();
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => tracing::debug!(error = %error, kind, code, "Request failed"),
        LogLevel::Warn => tracing::warn!(error = %error, kind, code, "Request failed"),
        LogLevel::Error => tracing::error!(error = %error, kind, code, "Request failed"),
    }
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        let show_details = !production_mode() && !error.is_sensitive();
        ErrorResponse {
            error: error.client_message(),
            details: show_details.then(|| error.detailed_message()),
            error_type: show_details.then(|| error.error_type().to_string()),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        log_error(&self.0);

        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

/// Last-resort translator for panics escaping a handler.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    tracing::error!(message = %message, "Handler panicked");

    HttpAppError(AppError::Internal("handler panicked".to_string())).into_response()
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        let app = match err {
            ValidationError::FileTooLarge { size, max } => {
                AppError::PayloadTooLarge(format!("{} bytes exceeds max {} bytes", size, max))
            }
            ValidationError::InvalidExtension { extension, allowed } => AppError::InvalidInput(
                format!("Invalid extension '{}', allowed: {:?}", extension, allowed),
            ),
            ValidationError::InvalidFilename(msg) => AppError::InvalidInput(msg),
            ValidationError::MissingExtension(filename) => {
                AppError::InvalidInput(format!("Missing file extension (filename: {})", filename))
            }
            ValidationError::EmptyFile => AppError::BadRequest("File is empty".to_string()),
        };
        HttpAppError(app)
    }
}

impl From<WatermarkError> for HttpAppError {
    fn from(err: WatermarkError) -> Self {
        HttpAppError(AppError::ImageProcessing(err.to_string()))
    }
}

impl From<CaptchaError> for HttpAppError {
    fn from(err: CaptchaError) -> Self {
        HttpAppError(AppError::ImageProcessing(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_validation_error_file_too_large() {
        let HttpAppError(app_err) = ValidationError::FileTooLarge {
            size: 1000,
            max: 500,
        }
        .into();
        match app_err {
            AppError::PayloadTooLarge(msg) => {
                assert!(msg.contains("1000"));
                assert!(msg.contains("500"));
            }
            _ => panic!("Expected PayloadTooLarge variant"),
        }
    }

    #[test]
    fn test_from_validation_error_invalid_extension() {
        let HttpAppError(app_err) = ValidationError::InvalidExtension {
            extension: ".exe".to_string(),
            allowed: vec![".jpg".to_string(), ".png".to_string()],
        }
        .into();
        match app_err {
            AppError::InvalidInput(msg) => {
                assert!(msg.contains(".exe"));
                assert!(msg.contains(".jpg"));
            }
            _ => panic!("Expected InvalidInput variant"),
        }
    }

    #[test]
    fn test_empty_file_is_bad_request() {
        let HttpAppError(app_err) = ValidationError::EmptyFile.into();
        assert!(matches!(app_err, AppError::BadRequest(_)));
        assert_eq!(app_err.http_status_code(), 400);
    }

    #[test]
    fn test_panic_response_is_generic_500() {
        let response = panic_response(Box::new("index out of bounds".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse {
            error: "Not found".to_string(),
            details: None,
            error_type: None,
            code: "NOT_FOUND".to_string(),
            recoverable: false,
            suggested_action: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["recoverable"], false);
        assert!(json.get("details").is_none());
    }
}
