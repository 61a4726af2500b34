//! GPU resource management
//!
//! Handles textures, buffers, and bind groups for rendering.

pub mod global_bindings;
pub mod gpu_context;
pub mod material;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{GlobalBindings, GlobalUBO, GlobalUniform, LightUniform, MAX_LIGHTS};
pub use gpu_context::{GpuContext, SceneLayouts};
pub use material::{BlendMode, Material, MaterialUniform};
pub use texture_resource::{TextureImage, TextureResource};
