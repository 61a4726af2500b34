//! WGPU-based rendering engine for the gallery
//!
//! One forward pass over the scene graph: the skybox first, then opaque
//! meshes, then blended geometry sorted back to front, then the UI overlay.

use std::sync::Arc;

use anyhow::Context;
use cgmath::{InnerSpace, Vector3};
use log::{debug, info, warn};
use wgpu::TextureFormat;

use crate::{
    error::GalleryError,
    gfx::{
        resources::{
            global_bindings::{GlobalBindings, GlobalUBO, GlobalUniform, MAX_LIGHTS},
            gpu_context::{GpuContext, SceneLayouts},
            material::{BlendMode, Material},
            texture_resource::TextureResource,
        },
        scene::{
            node::{world_origin, SceneNode},
            object::{DrawObject, Topology},
            scene::Scene,
        },
    },
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

/// How a draw combines with the frame
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlendClass {
    Background,
    Opaque,
    Alpha,
    Additive,
}

impl BlendClass {
    pub fn of(material: &Material) -> Self {
        match material.blend {
            BlendMode::Background => BlendClass::Background,
            BlendMode::Additive => BlendClass::Additive,
            BlendMode::Normal if material.is_transparent() => BlendClass::Alpha,
            BlendMode::Normal => BlendClass::Opaque,
        }
    }
}

/// Name of the pipeline that draws `topology` with `class`
pub fn pipeline_key(topology: Topology, class: BlendClass) -> &'static str {
    match (topology, class) {
        (Topology::Triangles, BlendClass::Background) => "Mesh Background",
        (Topology::Triangles, BlendClass::Opaque) => "Mesh Opaque",
        (Topology::Triangles, BlendClass::Alpha) => "Mesh Alpha",
        (Topology::Triangles, BlendClass::Additive) => "Mesh Additive",
        (Topology::Points, BlendClass::Background) => "Points Background",
        (Topology::Points, BlendClass::Opaque) => "Points Opaque",
        (Topology::Points, BlendClass::Alpha) => "Points Alpha",
        (Topology::Points, BlendClass::Additive) => "Points Additive",
        (Topology::LineStrip, BlendClass::Background) => "Lines Background",
        (Topology::LineStrip, BlendClass::Opaque) => "Lines Opaque",
        (Topology::LineStrip, BlendClass::Alpha) => "Lines Alpha",
        (Topology::LineStrip, BlendClass::Additive) => "Lines Additive",
    }
}

/// One mesh node scheduled for drawing
pub struct DrawItem<'a> {
    pub node: &'a SceneNode,
    pub pipeline: &'static str,
    pub class: BlendClass,
    /// Squared distance from the eye to the node origin
    pub depth: f32,
}

/// Background items, then opaque items, then blended items farthest-first
pub fn build_draw_list(scene: &Scene, eye: Vector3<f32>) -> Vec<DrawItem<'_>> {
    let mut background = Vec::new();
    let mut opaque = Vec::new();
    let mut blended = Vec::new();

    scene.traverse(|node, world, _| {
        let (Some(mesh), Some(material)) = (node.mesh_ref(), node.material()) else {
            return;
        };
        let class = BlendClass::of(material);
        let item = DrawItem {
            node,
            pipeline: pipeline_key(mesh.topology(), class),
            class,
            depth: (world_origin(world) - eye).magnitude2(),
        };
        match class {
            BlendClass::Background => background.push(item),
            BlendClass::Opaque => opaque.push(item),
            BlendClass::Alpha | BlendClass::Additive => blended.push(item),
        }
    });

    blended.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    background.extend(opaque);
    background.extend(blended);
    background
}

/// Surface extent for a window of `width` x `height`, kept within `max` on
/// both axes
pub fn surface_size(width: u32, height: u32, max: u32) -> (u32, u32) {
    (width.clamp(1, max), height.clamp(1, max))
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    layouts: SceneLayouts,
    fallback_texture: TextureResource,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> anyhow::Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to request adapter")?;
        info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: adapter.limits().max_texture_dimension_2d,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to request a device")?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .context("Surface reports no formats")?;

        let (width, height) =
            surface_size(width, height, device.limits().max_texture_dimension_2d);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_ubo = GlobalUBO::new(&device);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo);

        let layouts = SceneLayouts::new(&device);
        let fallback_texture = TextureResource::white(&device, &queue);

        let device_handle: Arc<wgpu::Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());
        pipeline_manager.load_shader("gallery", include_str!("gallery.wgsl"));

        let base = PipelineConfig::new("gallery", format)
            .with_depth(TextureResource::DEPTH_FORMAT)
            .with_cull_mode(None)
            .with_bind_group_layouts(vec![
                global_bindings.bind_group_layouts().clone(),
                layouts.transform.layout.clone(),
                layouts.material.layout.clone(),
            ]);

        for topology in [Topology::Triangles, Topology::Points, Topology::LineStrip] {
            for class in [
                BlendClass::Background,
                BlendClass::Opaque,
                BlendClass::Alpha,
                BlendClass::Additive,
            ] {
                let name = pipeline_key(topology, class);
                pipeline_manager.register_pipeline(
                    name,
                    base.clone()
                        .for_class(class)
                        .with_label(name)
                        .with_topology(topology.primitive_topology()),
                );
            }
        }

        if let Err(errors) = pipeline_manager.build_pending() {
            anyhow::bail!("Pipeline creation failed: {}", errors.join("; "));
        }
        debug!("{:?}", pipeline_manager.stats());

        Ok(RenderEngine {
            device: device_handle,
            config,
            format,
            surface,
            queue: queue_handle,
            depth_texture,
            pipeline_manager,
            global_bindings,
            global_ubo,
            layouts,
            fallback_texture,
        })
    }

    /// Uploads new scene content and refreshes all uniforms for this frame
    pub fn prepare(&mut self, scene: &mut Scene) {
        let ctx = GpuContext {
            device: &self.device,
            queue: &self.queue,
            layouts: &self.layouts,
            fallback_texture: &self.fallback_texture,
        };
        scene.sync_gpu(&ctx);

        let camera = &scene.camera_manager.camera;
        let lights = scene.collect_lights(camera.eye, MAX_LIGHTS);
        let globals = GlobalUniform::new(
            camera.uniform(),
            scene.ambient.premultiplied(),
            scene.fog.packed(),
            &lights,
        );
        self.global_ubo.update_content(&self.queue, globals);
    }

    /// Renders a frame with an optional UI overlay
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render_frame<F>(&mut self, scene: &Scene, ui_callback: Option<F>) -> Result<(), GalleryError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let draw_list = build_draw_list(scene, scene.camera_manager.camera.eye);
        let [r, g, b] = scene.background;

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(globals) = self.global_bindings.bind_groups() {
                render_pass.set_bind_group(0, globals, &[]);

                let mut bound: Option<&'static str> = None;
                for item in &draw_list {
                    let Some(pipeline) = self.pipeline_manager.pipeline(item.pipeline) else {
                        continue;
                    };
                    let (Some(transform), Some(material), Some(mesh)) = (
                        item.node.transform_bind_group(),
                        item.node.material().and_then(Material::get_bind_group),
                        item.node.mesh_ref(),
                    ) else {
                        continue;
                    };

                    if bound != Some(item.pipeline) {
                        render_pass.set_pipeline(pipeline);
                        bound = Some(item.pipeline);
                    }
                    render_pass.set_bind_group(1, transform, &[]);
                    render_pass.set_bind_group(2, material, &[]);
                    render_pass.draw_mesh(mesh);
                }
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Resizes the surface and recreates the depth buffer
    ///
    /// Sizes beyond the device's texture limit are clamped; the compositor
    /// stretches the smaller surface over the window.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        let (width, height) =
            surface_size(width, height, self.device.limits().max_texture_dimension_2d);
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        camera::{CameraController, CameraManager, OrbitCamera},
        geometry::generate_box,
        scene::{Mesh, Vertex3D},
    };
    use cgmath::Zero;

    fn scene() -> Scene {
        let camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        Scene::new(CameraManager::new(camera, CameraController::new(0.5, 1.0)))
    }

    fn boxed(name: &str, material: Material, z: f32) -> SceneNode {
        SceneNode::mesh(name, generate_box(1.0, 1.0, 1.0).into_mesh(), material)
            .with_position(0.0, 0.0, z)
    }

    #[test]
    fn test_opaque_before_blended_and_blended_back_to_front() {
        let mut scene = scene();
        scene.add(boxed("near glass", Material::default().with_opacity(0.3), 4.0));
        scene.add(boxed("wall", Material::default(), 0.0));
        scene.add(boxed("far glass", Material::default().with_opacity(0.5), -10.0));

        let names: Vec<&str> = build_draw_list(&scene, Vector3::new(0.0, 0.0, 5.0))
            .iter()
            .map(|item| item.node.name.as_str())
            .collect();
        assert_eq!(names, vec!["wall", "far glass", "near glass"]);
    }

    #[test]
    fn test_pipeline_selection() {
        let mut scene = scene();
        scene.add(SceneNode::mesh(
            "cluster",
            Mesh::points(vec![Vertex3D::point([0.0; 3], [1.0; 3])]),
            Material::unlit("cluster", [1.0; 3])
                .with_opacity(0.8)
                .with_blend(BlendMode::Additive),
        ));
        let list = build_draw_list(&scene, Vector3::zero());
        assert_eq!(list[0].pipeline, "Points Additive");
        assert_eq!(list[0].class, BlendClass::Additive);
    }

    #[test]
    fn test_background_draws_first_even_when_nearest() {
        let mut scene = scene();
        scene.add(boxed("glass", Material::default().with_opacity(0.5), -2.0));
        scene.add(boxed("wall", Material::default(), 0.0));
        scene.add(boxed(
            "sky",
            Material::unlit("sky", [1.0; 3]).with_blend(BlendMode::Background),
            4.5,
        ));

        let list = build_draw_list(&scene, Vector3::new(0.0, 0.0, 5.0));
        let names: Vec<&str> = list.iter().map(|item| item.node.name.as_str()).collect();
        assert_eq!(names, vec!["sky", "wall", "glass"]);
        assert_eq!(list[0].pipeline, "Mesh Background");
    }

    #[test]
    fn test_surface_size_stays_within_device_limit() {
        assert_eq!(surface_size(1920, 1080, 8192), (1920, 1080));
        assert_eq!(surface_size(5120, 2880, 4096), (4096, 2880));
        assert_eq!(surface_size(0, 600, 4096), (1, 600));
    }
}
