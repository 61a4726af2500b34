//! # Graphics Module
//!
//! Everything the gallery needs to put pixels on screen.
//!
//! - **Camera System** ([`camera`]) - Bounded orbit camera with damping
//! - **Geometry** ([`geometry`]) - Procedural boxes, spheres, cylinders and friends
//! - **Picking** ([`picking`]) - Ray casts from the cursor into the scene graph
//! - **Rendering Pipeline** ([`rendering`]) - Forward pass with blended geometry
//! - **Scene Management** ([`scene`]) - Node hierarchy, lights and meshes
//! - **Resource Management** ([`resources`]) - Materials, textures, and GPU resources
//!
//! ```no_run
//! use orbital_gallery::gfx::{RenderEngine, scene::Scene};
//!
//! // let render_engine = RenderEngine::new(window, width, height).await?;
//! // let mut scene = Scene::new(camera_manager);
//! ```

pub mod camera;
pub mod geometry;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
