//! Quillpost Core Library
//!
//! This crate provides the settings snapshot, error types and naming rules
//! shared by every quillpost component.

pub mod config;
pub mod error;
pub mod naming;
pub mod storage_types;

// Re-export commonly used types
pub use config::{
    BlogSettings, CdnSettings, ContentSettings, GeneralSettings, ImageSettings, ServerSettings,
    StorageSettings, WatermarkSettings,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use naming::FileNameGenerator;
pub use storage_types::StorageBackend;
