//! # Orbital Gallery Prelude
//!
//! Commonly used types in one import.
//!
//! ```no_run
//! use orbital_gallery::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = GalleryConfig::default().with_seed(7);
//!     let mut app = GalleryApp::new(config)?;
//!     app.start_default_sources()?;
//!     app.run()
//! }
//! ```

// Application and configuration
pub use crate::app::GalleryApp;
pub use crate::config::GalleryConfig;
pub use crate::error::{GalleryError, Result};

// Gallery state
pub use crate::gallery::{
    animation::tick, ArtworkRecord, ArtworkSource, GalleryContext, SceneCommand, TextureSource,
};

// Graphics and scene types
pub use crate::gfx::camera::{CameraManager, OrbitCamera};
pub use crate::gfx::resources::{Material, TextureImage};
pub use crate::gfx::scene::{NodeId, NodeRole, Scene, SceneNode};

// Math
pub use cgmath::{Deg, InnerSpace, Rad, Vector3, Zero};
