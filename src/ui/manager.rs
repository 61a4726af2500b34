// src/ui/manager.rs
//! ImGui integration for the gallery overlays
//!
//! [`UiManager`] owns the ImGui context, the winit platform glue and the
//! wgpu renderer. Each frame the app hands it a closure that draws the
//! artwork overlay and the loading screen; the result is composited on top
//! of the already rendered scene.

use std::time::Instant;

use imgui::{Context, FontConfig, FontSource, MouseCursor, Style, StyleColor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use log::{error, warn};
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::Window,
};

const FONT_SIZE: f32 = 20.0;

/// Dark translucent panels with gold accents, matching the frames
fn apply_gallery_style(style: &mut Style) {
    style.use_dark_colors();
    style.window_rounding = 6.0;
    style.frame_rounding = 4.0;
    style.window_border_size = 0.0;
    style.window_padding = [16.0, 12.0];

    let gold = [0.72, 0.60, 0.36, 1.0];
    style[StyleColor::WindowBg] = [0.06, 0.06, 0.08, 1.0];
    style[StyleColor::Button] = [0.72, 0.60, 0.36, 0.55];
    style[StyleColor::ButtonHovered] = [0.80, 0.67, 0.40, 0.85];
    style[StyleColor::ButtonActive] = gold;
    style[StyleColor::Separator] = gold;
}

pub struct UiManager {
    pub context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    last_cursor: Option<MouseCursor>,
}

impl UiManager {
    /// The display size is driven by the surface through
    /// [`UiManager::update_display_size`], so DPI scaling is locked at 1.
    pub fn new(
        device: &Device,
        queue: &Queue,
        output_color_format: TextureFormat,
        window: &Window,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);
        apply_gallery_style(context.style_mut());

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(1.0));

        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: FONT_SIZE,
                ..Default::default()
            }),
        }]);

        let renderer = Renderer::new(
            &mut context,
            device,
            queue,
            RendererConfig {
                texture_format: output_color_format,
                ..Default::default()
            },
        );

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            last_cursor: None,
        }
    }

    pub fn update_display_size(&mut self, width: u32, height: u32) {
        self.context.io_mut().display_size = [width as f32, height as f32];
    }

    pub fn get_display_size(&self) -> [f32; 2] {
        self.context.io().display_size
    }

    /// Forwards pointer and keyboard events; true when the UI keeps them
    pub fn handle_input<T>(&mut self, window: &Window, event: &Event<T>) -> bool {
        let Event::WindowEvent {
            event: window_event,
            ..
        } = event
        else {
            return false;
        };
        if !matches!(
            window_event,
            WindowEvent::CursorMoved { .. }
                | WindowEvent::MouseInput { .. }
                | WindowEvent::MouseWheel { .. }
                | WindowEvent::KeyboardInput { .. }
                | WindowEvent::Focused(_)
        ) {
            return false;
        }

        self.platform.handle_event(self.context.io_mut(), window, event);
        // Cursor motion always reaches the gallery too, for hover picking
        !matches!(window_event, WindowEvent::CursorMoved { .. }) && self.wants_input()
    }

    /// Whether the pointer is over an overlay window or button
    pub fn wants_mouse(&self) -> bool {
        self.context.io().want_capture_mouse
    }

    fn wants_input(&self) -> bool {
        let io = self.context.io();
        io.want_capture_mouse || io.want_capture_keyboard
    }

    /// Builds one UI frame with `run_ui` and draws it over `color_attachment`
    pub fn draw<F>(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        window: &Window,
        color_attachment: &TextureView,
        run_ui: F,
    ) where
        F: FnOnce(&imgui::Ui),
    {
        let now = Instant::now();
        self.context.io_mut().update_delta_time(now - self.last_frame);
        self.last_frame = now;

        if let Err(e) = self.platform.prepare_frame(self.context.io_mut(), window) {
            warn!("Failed to prepare UI frame: {}", e);
        }

        let ui = self.context.frame();
        run_ui(ui);
        if self.last_cursor != ui.mouse_cursor() {
            self.last_cursor = ui.mouse_cursor();
            self.platform.prepare_render(ui, window);
        }

        let draw_data = self.context.render();
        let [width, height] = draw_data.display_size;
        if width <= 0.0 || height <= 0.0 {
            return;
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Overlay Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_attachment,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(e) = self.renderer.render(draw_data, queue, device, &mut render_pass) {
            error!("Failed to render UI: {:?}", e);
        }
    }
}
