use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Context as _;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::GalleryConfig,
    error::GalleryError,
    gallery::{
        animation::tick,
        artwork::{ArtworkSource, HarvardArtSource},
        context::GalleryContext,
        loader::{ImageFetcher, TextureSource},
    },
    gfx::RenderEngine,
    ui::UiManager,
};

const WINDOW_TITLE: &str = "Orbital Gallery";
const INITIAL_SIZE: (u32, u32) = (1280, 800);

/// Longest frame step fed to the animation; avoids jumps after a stall
const MAX_FRAME_STEP: Duration = Duration::from_millis(100);

pub struct GalleryApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    gallery: GalleryContext,
    last_frame: Option<Instant>,
}

impl GalleryApp {
    /// Builds the gallery scene and the event loop; no window exists yet
    pub fn new(config: GalleryConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("Failed to create event loop")?;
        let (width, height) = INITIAL_SIZE;
        let gallery = GalleryContext::new(config, width as f32 / height as f32);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                render_engine: None,
                ui_manager: None,
                gallery,
                last_frame: None,
            },
        })
    }

    /// Starts the background loaders against the configured art API
    pub fn start_default_sources(&mut self) -> anyhow::Result<()> {
        let source = HarvardArtSource::new(&self.app_state.gallery.config);
        self.start_background_tasks(Box::new(source), Arc::new(ImageFetcher::default()))
    }

    pub fn start_background_tasks(
        &mut self,
        source: Box<dyn ArtworkSource + Send>,
        textures: Arc<dyn TextureSource>,
    ) -> anyhow::Result<()> {
        self.app_state
            .gallery
            .start_background_tasks(source, textures)
            .context("Failed to start background loaders")
    }

    pub fn gallery(&self) -> &GalleryContext {
        &self.app_state.gallery
    }

    /// Runs the event loop until the window closes
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("Event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .context("Event loop terminated with an error")?;

        // GPU buffers go before the device that owns them
        if let Some(engine) = self.app_state.render_engine.take() {
            self.app_state.gallery.scene.dispose();
            drop(engine);
        }
        Ok(())
    }
}

impl AppState {
    fn frame_step(&mut self) -> Duration {
        let now = Instant::now();
        let step = self
            .last_frame
            .map(|last| (now - last).min(MAX_FRAME_STEP))
            .unwrap_or_default();
        self.last_frame = Some(now);
        step
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        let PhysicalKey::Code(key_code) = event.physical_key else {
            return;
        };
        match key_code {
            KeyCode::ArrowLeft => {
                self.gallery.rotate(-1);
            }
            KeyCode::ArrowRight => {
                self.gallery.rotate(1);
            }
            KeyCode::Escape => event_loop.exit(),
            _ => (),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let dt = self.frame_step();
        tick(&mut self.gallery, dt);

        let (Some(render_engine), Some(window)) = (self.render_engine.as_mut(), self.window.as_ref())
        else {
            return;
        };
        render_engine.prepare(&mut self.gallery.scene);

        let gallery = &self.gallery;
        let mut nav = None;
        let result = match self.ui_manager.as_mut() {
            Some(ui_manager) => {
                let display_size = ui_manager.get_display_size();
                render_engine.render_frame(
                    &gallery.scene,
                    Some(|device: &wgpu::Device,
                          queue: &wgpu::Queue,
                          encoder: &mut wgpu::CommandEncoder,
                          view: &wgpu::TextureView| {
                        ui_manager.draw(device, queue, encoder, window, view, |ui| {
                            nav = gallery.overlay.draw(ui, display_size);
                            gallery.loading.draw(ui, display_size);
                        });
                    }),
                )
            }
            None => render_engine.render_frame(
                &gallery.scene,
                None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
            ),
        };

        match result {
            Ok(()) => {}
            Err(GalleryError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                error!("Out of GPU memory, shutting down");
                event_loop.exit();
            }
            Err(e) => warn!("Frame dropped: {}", e),
        }

        if let Some(request) = nav {
            self.gallery.rotate(request.direction());
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = INITIAL_SIZE;
        let attributes = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(width, height));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let (width, height) = window.inner_size().into();
        let renderer = match pollster::block_on(RenderEngine::new(window.clone(), width, height)) {
            Ok(renderer) => renderer,
            Err(e) => {
                error!("Failed to initialise renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        let mut ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window,
        );
        ui_manager.update_display_size(width, height);
        self.gallery.resize(width, height);

        info!("Window ready at {}x{}", width, height);
        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(renderer);
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // Handle UI input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            let ui_event: Event<()> = Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui_manager.handle_input(&window, &ui_event) {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::CursorMoved { position, .. } => {
                if self.ui_manager.as_ref().is_some_and(UiManager::wants_mouse) {
                    return;
                }
                let size = window.inner_size();
                self.gallery.hover(
                    (position.x as f32, position.y as f32),
                    (size.width as f32, size.height as f32),
                );
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.gallery.resize(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.update_display_size(width, height);
                }
            }
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        // Camera dragging pauses while the pointer is over the UI
        if let Some(ui_manager) = self.ui_manager.as_ref() {
            let io = ui_manager.context.io();
            if io.want_capture_mouse || io.want_capture_keyboard {
                return;
            }
        }
        self.gallery.scene.camera_manager.process_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}
