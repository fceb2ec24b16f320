//! Quillpost API Library
//!
//! HTTP surface of the blog image service: handlers, caches, auth gate and
//! application setup.

pub mod api_doc;
mod auth;
pub mod cache;
pub mod captcha_sessions;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
mod utils;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
