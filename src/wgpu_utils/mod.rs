//! Small wgpu helpers shared by the scene graph and the render engine
//!
//! - [`BindGroupLayoutBuilder`] / [`BindGroupBuilder`] number bindings in
//!   insertion order
//! - [`UniformBuffer`] wraps a `Pod` struct and skips unchanged uploads

pub mod binding_builder;
pub mod binding_types;
pub mod uniform_buffer;

pub use binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};
pub use uniform_buffer::UniformBuffer;
