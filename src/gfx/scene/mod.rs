//! # Scene Management Module
//!
//! The gallery's scene graph: nodes carrying meshes, lights or children,
//! each mesh with its own material and transform.
//!
//! ## Key Components
//!
//! - [`Scene`] - Top-level container owning the nodes, camera and ambient light
//! - [`SceneNode`] - Mesh, light or group node with a [`Transform`]
//! - [`Mesh`] - Vertex data and its GPU buffers
//! - [`Vertex3D`] - Interleaved vertex format
//!
//! ## Usage
//!
//! ```no_run
//! use orbital_gallery::gfx::geometry::generate_box;
//! use orbital_gallery::gfx::resources::Material;
//! use orbital_gallery::gfx::scene::SceneNode;
//!
//! let frame = SceneNode::mesh(
//!     "frame",
//!     generate_box(4.0, 3.0, 0.2).into_mesh(),
//!     Material::default().with_hex(0xffd700),
//! )
//! .with_position(0.0, 2.0, 9.0);
//! ```

pub mod node;
pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use node::{hex_to_rgb, Light, NodeContent, NodeId, NodeRole, SceneNode, Transform};
pub use object::{DrawObject, Mesh, Topology};
pub use scene::{AmbientLight, Fog, Scene};
pub use vertex::Vertex3D;
