//! Gallery rotation, hover hit testing and the artwork overlay
//!
//! Rotations move the camera a quarter turn around the room at a time. While
//! a rotation is running every further request is dropped.

use std::{f32::consts::PI, time::Duration};

use log::debug;

use crate::{
    gfx::{camera::OrbitCamera, picking::ObjectPicker, scene::Scene},
    ui::{ArtworkCard, InfoDisplay},
};

use super::{
    artwork::ArtworkRegistry,
    tween::{Easing, Tween},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionState {
    pub is_transitioning: bool,
    /// Signed count of quarter turns; the rotation is `quarter_turns · π/2`
    pub quarter_turns: i64,
}

impl TransitionState {
    pub fn rotation(&self) -> f32 {
        self.quarter_turns as f32 * PI / 2.0
    }

    /// Artwork shown after a rotation, when `count` artworks are registered
    pub fn artwork_index(&self, count: usize) -> Option<usize> {
        (count > 0).then(|| self.quarter_turns.rem_euclid(count as i64) as usize)
    }
}

/// Camera move along the horizontal circle
#[derive(Debug, Clone)]
struct CameraTransition {
    yaw: Tween<f32>,
    radius: Tween<f32>,
}

impl CameraTransition {
    fn new(camera: &OrbitCamera, yaw: f32, radius: f32, duration: Duration) -> Self {
        // Start from the equivalent of the current yaw closest to the goal
        let offset = (camera.yaw - yaw + PI).rem_euclid(2.0 * PI) - PI;
        Self {
            yaw: Tween::new(yaw + offset, yaw, duration, Easing::Power2InOut),
            radius: Tween::new(camera.horizontal_radius(), radius, duration, Easing::Power2InOut),
        }
    }

    /// Returns true once the camera reached its goal
    fn advance(&mut self, camera: &mut OrbitCamera, dt: f32) -> bool {
        let yaw = self.yaw.advance(dt);
        let radius = self.radius.advance(dt);
        camera.set_horizontal(yaw, radius);
        self.yaw.is_finished() && self.radius.is_finished()
    }
}

pub struct InteractionController {
    state: TransitionState,
    transition: Option<CameraTransition>,
    picker: ObjectPicker,
    radius: f32,
    duration: Duration,
}

impl InteractionController {
    /// Rotations orbit at `radius` and take `duration`
    pub fn new(radius: f32, duration: Duration) -> Self {
        Self {
            state: TransitionState::default(),
            transition: None,
            picker: ObjectPicker::new(),
            radius,
            duration,
        }
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn is_transitioning(&self) -> bool {
        self.state.is_transitioning
    }

    /// Starts a quarter turn in `direction` (`-1` or `+1`)
    ///
    /// Returns false, changing nothing, while a rotation is running.
    pub fn rotate_gallery(&mut self, direction: i64, camera: &OrbitCamera) -> bool {
        if self.state.is_transitioning {
            return false;
        }
        self.state.is_transitioning = true;
        self.state.quarter_turns += direction;
        self.transition = Some(CameraTransition::new(
            camera,
            self.state.rotation(),
            self.radius,
            self.duration,
        ));
        debug!("Rotating gallery to {} quarter turns", self.state.quarter_turns);
        true
    }

    /// Moves a running rotation forward; on completion shows the artwork
    /// the camera arrived at
    pub fn advance(
        &mut self,
        dt: Duration,
        camera: &mut OrbitCamera,
        artworks: &ArtworkRegistry,
        display: &mut dyn InfoDisplay,
    ) {
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        if transition.advance(camera, dt.as_secs_f32()) {
            self.transition = None;
            self.state.is_transitioning = false;
            if let Some(index) = self.state.artwork_index(artworks.len()) {
                update_artwork_info(index, artworks, display);
            }
        }
    }

    /// Hit tests under the cursor and shows the artwork it points at
    ///
    /// Returns the artwork index that was shown.
    pub fn on_mouse_move(
        &self,
        position: (f32, f32),
        size: (f32, f32),
        scene: &Scene,
        artworks: &ArtworkRegistry,
        display: &mut dyn InfoDisplay,
    ) -> Option<usize> {
        let hit = self
            .picker
            .pick_object(position, size, &scene.camera_manager.camera, scene)?;
        let index = hit.role.artwork_index()?;
        update_artwork_info(index, artworks, display).then_some(index)
    }
}

/// Writes artwork `index` into `display`; false for an unknown index
pub fn update_artwork_info(
    index: usize,
    artworks: &ArtworkRegistry,
    display: &mut dyn InfoDisplay,
) -> bool {
    let Some(entity) = artworks.get(index) else {
        return false;
    };
    let info = &entity.info;
    display.show(ArtworkCard {
        title: info.title.clone(),
        byline: format!("By {}", info.artist),
        description: info.description.clone().unwrap_or_default(),
        year: info.date.clone(),
        medium: info.medium.clone(),
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gallery::artwork::{default_artworks, placements, ArtworkEntity},
        gfx::{
            camera::{CameraController, CameraManager},
            scene::SceneNode,
        },
        ui::ArtworkOverlay,
    };
    use cgmath::Vector3;

    const FRAME: Duration = Duration::from_millis(16);

    fn camera() -> OrbitCamera {
        OrbitCamera::looking_at(Vector3::new(0.0, 1.7, 5.0), Vector3::new(0.0, 0.0, 0.0), 1.5)
    }

    fn registry(count: usize) -> ArtworkRegistry {
        let mut registry = ArtworkRegistry::default();
        let records = default_artworks();
        for (placement, info) in placements(count, 8, 9.0, 2.0).into_iter().zip(records) {
            registry.register(ArtworkEntity {
                frame: SceneNode::group("frame").id(),
                plane: SceneNode::group("plane").id(),
                placement,
                info,
            });
        }
        registry
    }

    fn run_to_completion(
        controller: &mut InteractionController,
        camera: &mut OrbitCamera,
        artworks: &ArtworkRegistry,
        overlay: &mut ArtworkOverlay,
    ) {
        for _ in 0..200 {
            controller.advance(FRAME, camera, artworks, overlay);
        }
    }

    #[test]
    fn test_rotation_ignored_while_transitioning() {
        let mut controller = InteractionController::new(5.0, Duration::from_secs(2));
        let cam = camera();
        assert!(controller.rotate_gallery(1, &cam));
        assert!(!controller.rotate_gallery(1, &cam));
        assert!(!controller.rotate_gallery(-1, &cam));
        assert_eq!(controller.state().quarter_turns, 1);
        assert!(controller.is_transitioning());
    }

    #[test]
    fn test_completed_rotations_accumulate() {
        let mut controller = InteractionController::new(5.0, Duration::from_secs(2));
        let mut cam = camera();
        let artworks = registry(3);
        let mut overlay = ArtworkOverlay::default();
        let height = cam.eye_height();

        for expected in 1..=5 {
            assert!(controller.rotate_gallery(1, &cam));
            run_to_completion(&mut controller, &mut cam, &artworks, &mut overlay);
            assert!(!controller.is_transitioning());
            assert_eq!(controller.state().quarter_turns, expected);
        }

        let angle = controller.state().rotation();
        assert!((cam.eye.x - angle.sin() * 5.0).abs() < 1e-3);
        assert!((cam.eye.z - angle.cos() * 5.0).abs() < 1e-3);
        assert!((cam.eye_height() - height).abs() < 1e-3);

        // 5 mod 3
        assert_eq!(overlay.card().unwrap().title, default_artworks()[2].title);
    }

    #[test]
    fn test_negative_turns_wrap_to_valid_index() {
        let mut controller = InteractionController::new(5.0, Duration::from_secs(2));
        let mut cam = camera();
        let artworks = registry(4);
        let mut overlay = ArtworkOverlay::default();

        controller.rotate_gallery(-1, &cam);
        run_to_completion(&mut controller, &mut cam, &artworks, &mut overlay);
        assert_eq!(controller.state().artwork_index(4), Some(3));
        assert_eq!(overlay.card().unwrap().title, default_artworks()[3].title);
    }

    #[test]
    fn test_rotation_without_artworks_keeps_overlay_hidden() {
        let mut controller = InteractionController::new(5.0, Duration::from_secs(2));
        let mut cam = camera();
        let mut overlay = ArtworkOverlay::default();
        controller.rotate_gallery(1, &cam);
        run_to_completion(&mut controller, &mut cam, &ArtworkRegistry::default(), &mut overlay);
        assert!(!overlay.is_visible());
    }

    #[test]
    fn test_unknown_index_is_ignored() {
        let mut overlay = ArtworkOverlay::default();
        assert!(!update_artwork_info(3, &registry(2), &mut overlay));
        assert!(!overlay.is_visible());

        assert!(update_artwork_info(1, &registry(2), &mut overlay));
        let card = overlay.card().unwrap();
        assert_eq!(card.byline, format!("By {}", default_artworks()[1].artist));
        assert_eq!(card.description, "");
    }

    #[test]
    fn test_transition_lasts_its_duration() {
        let mut controller = InteractionController::new(5.0, Duration::from_secs(2));
        let mut cam = camera();
        let artworks = registry(1);
        let mut overlay = ArtworkOverlay::default();
        controller.rotate_gallery(1, &cam);
        for _ in 0..100 {
            controller.advance(FRAME, &mut cam, &artworks, &mut overlay);
        }
        assert!(controller.is_transitioning());
        for _ in 0..30 {
            controller.advance(FRAME, &mut cam, &artworks, &mut overlay);
        }
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn test_hover_hits_artwork_frame() {
        let cam = OrbitCamera::looking_at(
            Vector3::new(0.0, 2.0, 0.0),
            Vector3::new(0.0, 2.0, 9.0),
            1.0,
        );
        let mut scene = Scene::new(CameraManager::new(cam, CameraController::new(0.5, 1.0)));
        let artworks = registry(1);
        scene.add(
            crate::gallery::factory::luxury_frame()
                .with_position(0.0, 2.0, 9.0)
                .with_role(crate::gfx::scene::NodeRole::ArtworkFrame(0)),
        );

        let controller = InteractionController::new(5.0, Duration::from_secs(2));
        let mut overlay = ArtworkOverlay::default();
        let shown = controller.on_mouse_move((42.0, 46.0), (100.0, 100.0), &scene, &artworks, &mut overlay);
        assert_eq!(shown, Some(0));
        assert!(overlay.is_visible());

        overlay = ArtworkOverlay::default();
        let miss = controller.on_mouse_move((1.0, 1.0), (100.0, 100.0), &scene, &artworks, &mut overlay);
        assert_eq!(miss, None);
        assert!(!overlay.is_visible());
    }
}
