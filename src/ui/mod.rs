//! # User Interface Module
//!
//! Dear ImGui-based overlays drawn on top of the gallery.
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu
//! - [`ArtworkOverlay`] - Artwork details panel plus Prev / Next buttons
//! - [`LoadingScreen`] - Start-up cover that fades out
//!
//! The gallery's interaction logic only sees the [`InfoDisplay`] trait, so it
//! can be driven without a window in tests.
//!
//! When ImGui wants the mouse (e.g. the cursor is over a button), camera
//! dragging and hover picking are suspended.

pub mod loading;
pub mod manager;
pub mod overlay;

// Re-export main types
pub use loading::LoadingScreen;
pub use manager::UiManager;
pub use overlay::{ArtworkCard, ArtworkOverlay, InfoDisplay, NavRequest};
