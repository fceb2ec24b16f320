//! Error types module
//!
//! All failures that reach a request boundary are unified under [`AppError`].
//! Each variant describes its own HTTP presentation through [`ErrorMetadata`],
//! so the web layer only has to render what the error says about itself.

use std::io;

/// Severity an error is logged at when it reaches the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected client mistakes
    Debug,
    Warn,
    /// Server-side failures
    Error,
}

/// How an error presents itself to HTTP clients.
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Stable machine-readable code, e.g. `STORAGE_ERROR`
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same request may succeed
    fn is_recoverable(&self) -> bool;

    fn suggested_action(&self) -> Option<&'static str>;

    /// Message safe to show a client
    fn client_message(&self) -> String;

    /// Sensitive errors never expose their internal message
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    /// Rejected file names and extensions
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed requests, such as an upload without a file
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Fixed presentation of one error kind.
struct Presentation {
    status: u16,
    code: &'static str,
    recoverable: bool,
    action: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

const CLIENT_FAULT: Presentation = Presentation {
    status: 400,
    code: "BAD_REQUEST",
    recoverable: false,
    action: Some("Check request format and parameters"),
    sensitive: false,
    level: LogLevel::Debug,
};

const SERVER_FAULT: Presentation = Presentation {
    status: 500,
    code: "INTERNAL_ERROR",
    recoverable: true,
    action: Some("Retry after a short delay"),
    sensitive: true,
    level: LogLevel::Error,
};

impl AppError {
    fn presentation(&self) -> Presentation {
        match self {
            AppError::Storage(_) => Presentation {
                code: "STORAGE_ERROR",
                ..SERVER_FAULT
            },
            AppError::ImageProcessing(_) => Presentation {
                code: "IMAGE_PROCESSING_ERROR",
                recoverable: false,
                action: Some("Check image format and try a different file"),
                ..SERVER_FAULT
            },
            AppError::InvalidInput(_) => Presentation {
                code: "INVALID_INPUT",
                action: Some("Check request parameters and try again"),
                level: LogLevel::Warn,
                ..CLIENT_FAULT
            },
            AppError::BadRequest(_) => CLIENT_FAULT,
            AppError::NotFound(_) => Presentation {
                status: 404,
                code: "NOT_FOUND",
                action: Some("Verify the resource name exists"),
                ..CLIENT_FAULT
            },
            AppError::PayloadTooLarge(_) => Presentation {
                status: 413,
                code: "PAYLOAD_TOO_LARGE",
                action: Some("Reduce file size and try again"),
                ..CLIENT_FAULT
            },
            AppError::Unauthorized(_) => Presentation {
                status: 401,
                code: "UNAUTHORIZED",
                action: Some("Send a valid admin API key as a Bearer token"),
                ..CLIENT_FAULT
            },
            AppError::Internal(_) | AppError::InternalWithSource { .. } => SERVER_FAULT,
        }
    }

    /// Variant name, shown in non-production error bodies
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Storage(_) => "Storage",
            AppError::ImageProcessing(_) => "ImageProcessing",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Display text followed by up to five `Caused by` lines.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let causes: Vec<String> = std::iter::successors(self.source(), |&err| err.source())
            .map(|err| err.to_string())
            .collect();

        let mut details = self.to_string();
        for cause in causes.iter().take(MAX_CAUSE_DEPTH) {
            details.push_str("\n  Caused by: ");
            details.push_str(cause);
        }
        if causes.len() > MAX_CAUSE_DEPTH {
            details.push_str("\n  ... (truncated)");
        }
        details
    }
}

const MAX_CAUSE_DEPTH: usize = 5;

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.presentation().status
    }

    fn error_code(&self) -> &'static str {
        self.presentation().code
    }

    fn is_recoverable(&self) -> bool {
        self.presentation().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.presentation().action
    }

    fn is_sensitive(&self) -> bool {
        self.presentation().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.presentation().level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::ImageProcessing(_) => "Failed to process image".to_string(),
            AppError::InvalidInput(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::Unauthorized(msg) => msg.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
