// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Handles render pipelines, draw ordering and frame submission.

pub mod pipeline_manager;
pub mod render_engine;

// Re-export main types
pub use pipeline_manager::{PipelineConfig, PipelineManager, PipelineStats, ADDITIVE_BLEND, ALPHA_BLEND};
pub use render_engine::{build_draw_list, pipeline_key, BlendClass, DrawItem, RenderEngine};
