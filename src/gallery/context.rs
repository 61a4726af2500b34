//! Everything the running gallery owns, built once at start-up

use std::{f32::consts::PI, sync::Arc, time::Duration};

use cgmath::Vector3;
use log::{debug, info, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    config::GalleryConfig,
    gfx::{
        camera::{CameraController, CameraManager, OrbitCamera, OrbitCameraBounds},
        resources::TextureImage,
        scene::{NodeId, NodeRole, Scene},
    },
    ui::{ArtworkOverlay, LoadingScreen},
};

use super::{
    artwork::{ArtworkEntity, ArtworkRecord, ArtworkRegistry, ArtworkSource, Placement},
    assembler::{assemble, GalleryRoom},
    commands::{spawn_interval, CommandQueue, CommandSender, SceneCommand},
    effects::ShootingStars,
    factory::{artwork_plane, luxury_frame},
    interaction::InteractionController,
    loader::{spawn_artwork_loader, spawn_texture_load, TextureSource},
    space::{SpaceEnvironment, TextureRequest},
};

/// Distance the image plane sits in front of its frame
const PLANE_OFFSET: f32 = 0.05;

pub struct GalleryContext {
    pub config: GalleryConfig,
    pub scene: Scene,
    pub artworks: ArtworkRegistry,
    pub room: GalleryRoom,
    pub space: SpaceEnvironment,
    pub interaction: InteractionController,
    pub shooting_stars: ShootingStars,
    pub overlay: ArtworkOverlay,
    pub loading: LoadingScreen,
    pub(crate) commands: CommandQueue,
    pub(crate) rng: StdRng,
    pub(crate) elapsed: Duration,
    texture_requests: Vec<TextureRequest>,
}

/// Orbit camera at the configured start position with the room's limits
pub fn gallery_camera(config: &GalleryConfig, aspect: f32) -> CameraManager {
    let [x, y, z] = config.camera_start;
    let mut camera = OrbitCamera::looking_at(Vector3::new(x, y, z), Vector3::new(0.0, 0.0, 0.0), aspect);
    camera.bounds = OrbitCameraBounds {
        min_distance: Some(config.min_distance),
        max_distance: Some(config.max_distance),
        ..OrbitCameraBounds::from_polar(PI / 3.0, PI / 1.5)
    };
    camera.set_eye(camera.eye);

    let controller = CameraController::new(config.rotate_speed, 1.0).with_damping(config.damping_factor);
    CameraManager::new(camera, controller)
}

impl GalleryContext {
    /// Builds the static room and space backdrop; nothing is loaded yet
    pub fn new(config: GalleryConfig, aspect: f32) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut scene = Scene::new(gallery_camera(&config, aspect));
        let mut texture_requests = Vec::new();

        let room = assemble(&mut scene, &config, &mut rng, &mut texture_requests);
        let space = SpaceEnvironment::build(&mut scene, &config, &mut rng, &mut texture_requests);

        let interaction = InteractionController::new(config.rotation_radius, config.rotation_duration);
        let loading = LoadingScreen::new(config.loading_delay, config.loading_fade);

        info!("Gallery scene ready");
        Self {
            config,
            scene,
            artworks: ArtworkRegistry::default(),
            room,
            space,
            interaction,
            shooting_stars: ShootingStars::default(),
            overlay: ArtworkOverlay::default(),
            loading,
            commands: CommandQueue::new(),
            rng,
            elapsed: Duration::ZERO,
            texture_requests,
        }
    }

    /// Starts the artwork loader, texture loads and the shooting-star timer
    pub fn start_background_tasks(
        &mut self,
        source: Box<dyn ArtworkSource + Send>,
        textures: Arc<dyn TextureSource>,
    ) -> std::io::Result<()> {
        spawn_artwork_loader(&self.config, source, textures.clone(), self.sender())?;

        for request in self.texture_requests.drain(..) {
            spawn_texture_load(textures.clone(), request.location, request.target, self.commands.sender());
        }

        spawn_interval(self.sender(), self.config.shooting_star_interval, || {
            SceneCommand::SpawnShootingStar
        })?;
        Ok(())
    }

    pub fn sender(&self) -> CommandSender {
        self.commands.sender()
    }

    /// Time since the gallery started ticking
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Applies every queued command
    ///
    /// Spawn ticks that piled up while frames stalled collapse into one star.
    pub fn drain_commands(&mut self) {
        let mut spawn = false;
        for command in self.commands.drain() {
            match command {
                SceneCommand::SpawnShootingStar => spawn = true,
                other => self.apply(other),
            }
        }
        if spawn {
            self.apply(SceneCommand::SpawnShootingStar);
        }
    }

    pub fn apply(&mut self, command: SceneCommand) {
        match command {
            SceneCommand::ArtworkLoaded {
                record,
                placement,
                image,
            } => {
                self.place_artwork(record, placement, image);
            }
            SceneCommand::TextureLoaded { target, image } => {
                match self.scene.get_mut(target).and_then(|node| node.material_mut()) {
                    Some(material) => material.set_texture(image),
                    None => debug!("Texture target {:?} no longer exists", target),
                }
                if self.room.skybox.contains(&target) {
                    self.reveal_skybox();
                }
            }
            SceneCommand::SpawnShootingStar => {
                self.shooting_stars
                    .spawn(&mut self.scene, &mut self.rng, &self.config);
            }
        }
    }

    /// Shows the skybox once every face has its texture
    fn reveal_skybox(&mut self) {
        let complete = self.room.skybox.iter().all(|&id| {
            self.scene
                .get(id)
                .and_then(|face| face.material())
                .is_some_and(|material| material.has_texture())
        });
        if !complete {
            return;
        }
        for &id in &self.room.skybox {
            if let Some(face) = self.scene.get_mut(id) {
                face.visible = true;
            }
        }
        info!("Skybox loaded");
    }

    /// Adds the frame and image plane for a loaded artwork and registers it
    ///
    /// Returns the registry index, or `None` when the image is unusable.
    pub fn place_artwork(
        &mut self,
        record: ArtworkRecord,
        placement: Placement,
        image: TextureImage,
    ) -> Option<usize> {
        if !image.is_valid() {
            warn!("Discarding artwork '{}' with an invalid image", record.title);
            return None;
        }

        let index = self.artworks.next_index();
        let facing = placement.facing();
        let p = placement.position;

        let frame = self.scene.add(
            luxury_frame()
                .with_position(p.x, p.y, p.z)
                .with_rotation(0.0, facing, 0.0)
                .with_role(NodeRole::ArtworkFrame(index)),
        );

        let q = placement.plane_position(PLANE_OFFSET);
        let plane = self.scene.add(
            artwork_plane(image)
                .with_position(q.x, q.y, q.z)
                .with_rotation(0.0, facing, 0.0)
                .with_role(NodeRole::ArtworkPlane(index)),
        );

        debug!("Placed '{}' at slot {}", record.title, placement.index);
        Some(self.artworks.register(ArtworkEntity {
            frame,
            plane,
            placement,
            info: record,
        }))
    }

    /// Starts a quarter-turn rotation; ignored while one is running
    pub fn rotate(&mut self, direction: i64) -> bool {
        self.interaction
            .rotate_gallery(direction, &self.scene.camera_manager.camera)
    }

    /// Hover hit test at a cursor position in physical pixels
    pub fn hover(&mut self, position: (f32, f32), size: (f32, f32)) -> Option<usize> {
        self.interaction.on_mouse_move(
            position,
            size,
            &self.scene,
            &self.artworks,
            &mut self.overlay,
        )
    }

    /// Node ids of the frame and plane of artwork `index`
    pub fn artwork_nodes(&self, index: usize) -> Option<(NodeId, NodeId)> {
        self.artworks.get(index).map(|entity| (entity.frame, entity.plane))
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.scene.camera_manager.resize(width, height);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        gallery::artwork::{default_artworks, placements},
        ui::InfoDisplay,
    };

    pub(crate) fn small_config() -> GalleryConfig {
        GalleryConfig {
            star_count: 20,
            cluster_particles: 20,
            nebula_particles: 20,
            dust_particles: 20,
            ..GalleryConfig::default()
        }
    }

    pub(crate) fn loaded_context(count: usize) -> GalleryContext {
        let mut ctx = GalleryContext::new(small_config(), 1.5);
        let records = default_artworks();
        for (record, placement) in records.into_iter().zip(placements(count, 8, 9.0, 2.0)) {
            ctx.sender()
                .unbounded_send(SceneCommand::ArtworkLoaded {
                    record,
                    placement,
                    image: TextureImage::solid(2, 2, [255; 4]),
                })
                .unwrap();
        }
        ctx.drain_commands();
        ctx
    }

    #[test]
    fn test_camera_starts_inside_bounds() {
        let ctx = GalleryContext::new(small_config(), 1.5);
        let camera = &ctx.scene.camera_manager.camera;
        assert!((camera.eye.y - 1.7).abs() < 1e-3);
        assert!((camera.horizontal_radius() - 5.0).abs() < 1e-3);
        assert!(camera.distance >= 3.0 && camera.distance <= 10.0);
    }

    #[test]
    fn test_loaded_artworks_become_pickable_entities() {
        let ctx = loaded_context(4);
        assert_eq!(ctx.artworks.len(), 4);
        for i in 0..4 {
            let (frame, plane) = ctx.artwork_nodes(i).unwrap();
            assert_eq!(ctx.scene.get(frame).unwrap().role, NodeRole::ArtworkFrame(i));
            assert_eq!(ctx.scene.get(plane).unwrap().role, NodeRole::ArtworkPlane(i));
        }
    }

    #[test]
    fn test_hover_from_centre_shows_facing_artwork() {
        let mut ctx = loaded_context(4);
        // Slot 0 sits on +Z with its image normal along +X
        ctx.scene.camera_manager.camera = OrbitCamera::looking_at(
            Vector3::new(4.0, 2.0, 9.0),
            Vector3::new(0.0, 2.0, 9.0),
            1.0,
        );
        let shown = ctx.hover((45.0, 40.0), (100.0, 100.0));
        assert_eq!(shown, Some(0));
        assert!(ctx.overlay.is_visible());
        assert_eq!(ctx.overlay.card().unwrap().title, "Ethereal Dreams");
    }

    #[test]
    fn test_invalid_image_is_dropped() {
        let mut ctx = GalleryContext::new(small_config(), 1.5);
        let before = ctx.scene.node_count();
        let placement = placements(1, 8, 9.0, 2.0)[0];
        let broken = TextureImage {
            width: 0,
            height: 0,
            rgba: Vec::new(),
        };
        assert_eq!(ctx.place_artwork(default_artworks().remove(0), placement, broken), None);
        assert!(ctx.artworks.is_empty());
        assert_eq!(ctx.scene.node_count(), before);
    }

    #[test]
    fn test_texture_command_reaches_material() {
        let mut ctx = GalleryContext::new(small_config(), 1.5);
        let floor = ctx.room.floor;
        ctx.apply(SceneCommand::TextureLoaded {
            target: floor,
            image: TextureImage::solid(1, 1, [1, 2, 3, 255]),
        });
        assert!(ctx.scene.get(floor).unwrap().material().unwrap().has_texture());
    }

    #[test]
    fn test_spawn_command_adds_a_star() {
        let mut ctx = GalleryContext::new(small_config(), 1.5);
        let before = ctx.scene.node_count();
        ctx.apply(SceneCommand::SpawnShootingStar);
        assert_eq!(ctx.shooting_stars.active_count(), 1);
        assert_eq!(ctx.scene.node_count(), before + 1);
    }

    #[test]
    fn test_backlogged_spawns_collapse_to_one_star() {
        let mut ctx = GalleryContext::new(small_config(), 1.5);
        for _ in 0..5 {
            ctx.sender()
                .unbounded_send(SceneCommand::SpawnShootingStar)
                .unwrap();
        }
        ctx.drain_commands();
        assert_eq!(ctx.shooting_stars.active_count(), 1);

        ctx.drain_commands();
        assert_eq!(ctx.shooting_stars.active_count(), 1);
    }

    #[test]
    fn test_skybox_appears_after_all_faces_load() {
        let mut ctx = GalleryContext::new(small_config(), 1.5);
        let faces = ctx.room.skybox.clone();
        let hidden = |ctx: &GalleryContext| faces.iter().all(|&id| !ctx.scene.get(id).unwrap().visible);
        assert!(hidden(&ctx));

        for &face in &faces[..5] {
            ctx.apply(SceneCommand::TextureLoaded {
                target: face,
                image: TextureImage::solid(1, 1, [0, 0, 20, 255]),
            });
        }
        assert!(hidden(&ctx));

        ctx.apply(SceneCommand::TextureLoaded {
            target: faces[5],
            image: TextureImage::solid(1, 1, [0, 0, 20, 255]),
        });
        assert!(faces.iter().all(|&id| ctx.scene.get(id).unwrap().visible));
    }
}
