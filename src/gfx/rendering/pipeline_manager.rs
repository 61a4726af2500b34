//! Named render pipelines built from declarative configs
//!
//! The gallery renders everything with one shader, so pipelines differ only
//! in topology, blending and depth writes. Configs are registered first and
//! built together once the device and layouts exist.

use std::{collections::HashMap, sync::Arc};

use log::{debug, error};
use wgpu::*;

use super::render_engine::BlendClass;
use crate::gfx::scene::vertex::Vertex3D;

/// Source-over blending for translucent surfaces
pub const ALPHA_BLEND: BlendState = BlendState::ALPHA_BLENDING;

/// `src * alpha + dst`; glowing particles
pub const ADDITIVE_BLEND: BlendState = BlendState {
    color: BlendComponent {
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::One,
        operation: BlendOperation::Add,
    },
    alpha: BlendComponent {
        src_factor: BlendFactor::Zero,
        dst_factor: BlendFactor::One,
        operation: BlendOperation::Add,
    },
};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub topology: PrimitiveTopology,
    pub cull_mode: Option<Face>,
    pub color_format: TextureFormat,
    pub blend: Option<BlendState>,
    pub depth_format: Option<TextureFormat>,
    pub depth_write: bool,
}

impl PipelineConfig {
    /// Opaque triangle pipeline for `shader` drawing into `color_format`
    pub fn new(shader: &str, color_format: TextureFormat) -> Self {
        Self {
            label: shader.to_string(),
            shader: shader.to_string(),
            bind_group_layouts: Vec::new(),
            topology: PrimitiveTopology::TriangleList,
            cull_mode: Some(Face::Back),
            color_format,
            blend: Some(BlendState::REPLACE),
            depth_format: None,
            depth_write: true,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    pub fn with_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Enables depth testing against a target of `format`
    pub fn with_depth(mut self, format: TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    /// Blending and depth writes for `class`
    ///
    /// Blended classes still depth test but never write depth, so they do
    /// not hide each other. Background draws replace colour without writing
    /// depth, so everything drawn after covers them.
    pub fn for_class(mut self, class: BlendClass) -> Self {
        let (blend, depth_write) = match class {
            BlendClass::Background => (BlendState::REPLACE, false),
            BlendClass::Opaque => (BlendState::REPLACE, true),
            BlendClass::Alpha => (ALPHA_BLEND, false),
            BlendClass::Additive => (ADDITIVE_BLEND, false),
        };
        self.blend = Some(blend);
        self.depth_write = depth_write;
        self
    }

    fn depth_stencil(&self) -> Option<DepthStencilState> {
        self.depth_format.map(|format| DepthStencilState {
            format,
            depth_write_enabled: self.depth_write,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        })
    }

    fn color_target(&self) -> ColorTargetState {
        ColorTargetState {
            format: self.color_format,
            blend: self.blend,
            write_mask: ColorWrites::ALL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub built: usize,
    pub pending: usize,
    pub shaders: usize,
}

pub struct PipelineManager {
    device: Arc<Device>,
    shaders: HashMap<String, ShaderModule>,
    pending: Vec<(String, PipelineConfig)>,
    pipelines: HashMap<String, RenderPipeline>,
}

impl PipelineManager {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            shaders: HashMap::new(),
            pending: Vec::new(),
            pipelines: HashMap::new(),
        }
    }

    pub fn load_shader(&mut self, name: &str, source: &str) {
        let module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });
        self.shaders.insert(name.to_string(), module);
    }

    /// Queues a pipeline; it is created by [`PipelineManager::build_pending`]
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.pending.push((name.to_string(), config));
    }

    /// Builds every queued pipeline; failed ones stay queued
    pub fn build_pending(&mut self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        for (name, config) in std::mem::take(&mut self.pending) {
            match self.build(&config) {
                Ok(pipeline) => {
                    debug!("Built pipeline '{}'", name);
                    self.pipelines.insert(name, pipeline);
                }
                Err(e) => {
                    error!("Pipeline '{}' failed: {}", name, e);
                    errors.push(format!("{}: {}", name, e));
                    self.pending.push((name, config));
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn pipeline(&self, name: &str) -> Option<&RenderPipeline> {
        self.pipelines.get(name)
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            built: self.pipelines.len(),
            pending: self.pending.len(),
            shaders: self.shaders.len(),
        }
    }

    fn build(&self, config: &PipelineConfig) -> Result<RenderPipeline, String> {
        let shader = self
            .shaders
            .get(&config.shader)
            .ok_or_else(|| format!("shader '{}' is not loaded", config.shader))?;

        let layouts: Vec<&BindGroupLayout> = config.bind_group_layouts.iter().collect();
        let layout = self.device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(&format!("{} Layout", config.label)),
            bind_group_layouts: &layouts,
            push_constant_ranges: &[],
        });

        Ok(self.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(&config.label),
            layout: Some(&layout),
            vertex: VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex3D::desc()],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(config.color_target())],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: config.topology,
                cull_mode: config.cull_mode,
                ..Default::default()
            },
            depth_stencil: config.depth_stencil(),
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PipelineConfig {
        PipelineConfig::new("gallery", TextureFormat::Bgra8Unorm).with_depth(TextureFormat::Depth32Float)
    }

    #[test]
    fn test_blended_classes_skip_depth_writes() {
        let opaque = base().for_class(BlendClass::Opaque);
        assert!(opaque.depth_stencil().unwrap().depth_write_enabled);
        assert_eq!(opaque.color_target().blend, Some(BlendState::REPLACE));

        let alpha = base().for_class(BlendClass::Alpha);
        assert!(!alpha.depth_stencil().unwrap().depth_write_enabled);
        assert_eq!(alpha.color_target().blend, Some(ALPHA_BLEND));

        let additive = base().for_class(BlendClass::Additive);
        assert!(!additive.depth_stencil().unwrap().depth_write_enabled);
        assert_eq!(additive.color_target().blend, Some(ADDITIVE_BLEND));

        let background = base().for_class(BlendClass::Background);
        assert!(!background.depth_stencil().unwrap().depth_write_enabled);
        assert_eq!(background.color_target().blend, Some(BlendState::REPLACE));
    }

    #[test]
    fn test_no_depth_format_means_no_depth_test() {
        let config = PipelineConfig::new("gallery", TextureFormat::Rgba8Unorm);
        assert!(config.depth_stencil().is_none());
        assert_eq!(config.color_target().format, TextureFormat::Rgba8Unorm);
    }
}
