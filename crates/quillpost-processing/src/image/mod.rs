//! Image processing module
//!
//! Currently provides text watermarking of uploaded images.

pub mod watermark;
