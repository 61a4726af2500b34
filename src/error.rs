//! Error types for the gallery
//!
//! Most failures in the gallery are masked (fallback artwork list, dropped
//! images), but every masked failure still travels through [`GalleryError`]
//! so it can be logged with a meaningful message before being discarded.

use thiserror::Error;

/// Errors produced while fetching data, decoding assets or driving the GPU
#[derive(Debug, Error)]
pub enum GalleryError {
    /// The HTTP request failed or returned a non-success status
    #[error("request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    /// The response body could not be parsed
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// An image could not be decoded
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    /// Local file access failed
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The render surface could not provide a frame
    #[error("surface unavailable: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// A configuration value was present but unusable
    #[error("invalid value {value:?} for {key}")]
    Config { key: String, value: String },
}

impl GalleryError {
    pub(crate) fn http(url: &str, reason: impl ToString) -> Self {
        GalleryError::Http {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, GalleryError>;
