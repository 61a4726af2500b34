// src/lib.rs
//! Orbital Gallery
//!
//! A circular 3D art gallery floating in procedural space, built on wgpu and
//! winit. Artwork metadata comes from a public art API, with a built-in list
//! as fallback.

pub mod app;
pub mod config;
pub mod error;
pub mod gallery;
pub mod gfx;
pub mod prelude;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::GalleryApp;
pub use config::GalleryConfig;
pub use error::{GalleryError, Result};

/// Creates a gallery application with environment overrides applied
pub fn default() -> anyhow::Result<GalleryApp> {
    GalleryApp::new(GalleryConfig::from_env())
}
