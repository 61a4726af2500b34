//! Short-lived scene objects
//!
//! A transient node is owned through a [`TransientHandle`]. The handle is
//! not `Clone` and `retire` consumes it, so a node is removed and its GPU
//! buffers released exactly once.

use std::time::Duration;

use cgmath::{InnerSpace, Vector3, Zero};
use log::trace;
use rand::Rng;

use crate::{
    config::GalleryConfig,
    gfx::scene::{NodeId, Scene},
};

use super::{
    factory::shooting_star_trail,
    tween::{Easing, Tween},
};

/// Unique ownership of a node that must be removed later
#[derive(Debug)]
pub struct TransientHandle(NodeId);

impl TransientHandle {
    pub fn new(scene: &mut Scene, node: crate::gfx::scene::SceneNode) -> Self {
        Self(scene.add(node))
    }

    pub fn id(&self) -> NodeId {
        self.0
    }

    /// Removes the node and releases its GPU resources
    ///
    /// Returns false when the node was already gone from the scene.
    pub fn retire(self, scene: &mut Scene) -> bool {
        match scene.remove(self.0) {
            Some(mut node) => {
                node.dispose();
                true
            }
            None => false,
        }
    }
}

/// A line trail flying away from the gallery while fading out
#[derive(Debug)]
pub struct ShootingStar {
    handle: TransientHandle,
    pub direction: Vector3<f32>,
    position: Tween<Vector3<f32>>,
    opacity: Tween<f32>,
}

fn random_direction<R: Rng>(rng: &mut R) -> Vector3<f32> {
    loop {
        let v = Vector3::new(
            rng.random::<f32>() - 0.5,
            rng.random::<f32>() - 0.5,
            rng.random::<f32>() - 0.5,
        );
        if v.magnitude2() > 1e-6 {
            return v.normalize();
        }
    }
}

impl ShootingStar {
    pub fn spawn<R: Rng>(scene: &mut Scene, rng: &mut R, config: &GalleryConfig) -> Self {
        let origin = Vector3::new(
            (rng.random::<f32>() - 0.5) * 1000.0,
            (rng.random::<f32>() - 0.5) * 1000.0,
            (rng.random::<f32>() - 0.5) * 1000.0,
        );
        let direction = random_direction(rng);
        let lifetime = config.shooting_star_lifetime;

        let trail = shooting_star_trail(origin, direction, config.shooting_star_trail);
        Self {
            handle: TransientHandle::new(scene, trail),
            direction,
            position: Tween::new(
                Vector3::zero(),
                direction * config.shooting_star_travel,
                lifetime,
                Easing::Linear,
            ),
            opacity: Tween::new(1.0, 0.0, lifetime, Easing::Linear),
        }
    }

    pub fn id(&self) -> NodeId {
        self.handle.id()
    }

    /// Moves the trail and fades it; returns true once both tweens are done
    pub fn advance(&mut self, scene: &mut Scene, dt: f32) -> bool {
        let position = self.position.advance(dt);
        let opacity = self.opacity.advance(dt);
        if let Some(node) = scene.get_mut(self.handle.id()) {
            node.transform.position = position;
            if let Some(material) = node.material_mut() {
                material.opacity = opacity;
            }
        }
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.position.is_finished() && self.opacity.is_finished()
    }

    pub fn retire(self, scene: &mut Scene) -> bool {
        self.handle.retire(scene)
    }
}

/// Every shooting star currently in flight
#[derive(Debug, Default)]
pub struct ShootingStars {
    active: Vec<ShootingStar>,
    retired: usize,
}

impl ShootingStars {
    pub fn spawn<R: Rng>(&mut self, scene: &mut Scene, rng: &mut R, config: &GalleryConfig) {
        let star = ShootingStar::spawn(scene, rng, config);
        trace!("Shooting star {:?} launched", star.id());
        self.active.push(star);
    }

    /// Advances every star and retires the ones that completed
    pub fn update(&mut self, scene: &mut Scene, dt: Duration) {
        let dt = dt.as_secs_f32();
        let mut flying = Vec::with_capacity(self.active.len());
        for mut star in self.active.drain(..) {
            if star.advance(scene, dt) {
                star.retire(scene);
                self.retired += 1;
            } else {
                flying.push(star);
            }
        }
        self.active = flying;
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn retired_count(&self) -> usize {
        self.retired
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShootingStar> {
        self.active.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        camera::{CameraController, CameraManager, OrbitCamera},
        scene::SceneNode,
    };
    use rand::{rngs::StdRng, SeedableRng};

    fn scene() -> Scene {
        let camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        Scene::new(CameraManager::new(camera, CameraController::new(0.5, 1.0)))
    }

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn test_handle_retires_once() {
        let mut scene = scene();
        let handle = TransientHandle::new(&mut scene, SceneNode::group("temp"));
        let id = handle.id();
        assert!(scene.contains(id));
        assert!(handle.retire(&mut scene));
        assert!(!scene.contains(id));
    }

    #[test]
    fn test_star_moves_fades_and_retires_on_time() {
        let mut scene = scene();
        let mut rng = StdRng::seed_from_u64(5);
        let config = GalleryConfig::default();
        let mut stars = ShootingStars::default();
        stars.spawn(&mut scene, &mut rng, &config);
        let id = stars.iter().next().unwrap().id();
        let direction = stars.iter().next().unwrap().direction;

        stars.update(&mut scene, Duration::from_secs(1));
        let node = scene.get(id).unwrap();
        let expected = direction * 500.0;
        assert!((node.transform.position - expected).magnitude() < 1e-2);
        assert!((node.material().unwrap().opacity - 0.5).abs() < 1e-4);

        // 2 s lifetime plus one frame of slack
        let mut elapsed = Duration::from_secs(1);
        while elapsed < Duration::from_secs(2) + FRAME {
            stars.update(&mut scene, FRAME);
            elapsed += FRAME;
        }
        assert_eq!(stars.active_count(), 0);
        assert_eq!(stars.retired_count(), 1);
        assert!(!scene.contains(id));
    }

    #[test]
    fn test_three_second_schedule_keeps_the_sky_busy() {
        let mut scene = scene();
        let mut rng = StdRng::seed_from_u64(9);
        let config = GalleryConfig::default();
        let mut stars = ShootingStars::default();
        let baseline = scene.node_count();

        let mut max_active = 0;
        let mut since_spawn = Duration::ZERO;
        let mut empty = Duration::ZERO;
        let mut longest_empty = Duration::ZERO;
        for _ in 0..(30_000 / 16) {
            since_spawn += FRAME;
            if since_spawn >= config.shooting_star_interval {
                since_spawn -= config.shooting_star_interval;
                stars.spawn(&mut scene, &mut rng, &config);
            }
            stars.update(&mut scene, FRAME);
            max_active = max_active.max(stars.active_count());
            assert_eq!(scene.node_count(), baseline + stars.active_count());

            // Gaps only count once the first star has flown
            if stars.active_count() == 0 && stars.retired_count() > 0 {
                empty += FRAME;
                longest_empty = longest_empty.max(empty);
            } else {
                empty = Duration::ZERO;
            }
        }
        assert_eq!(max_active, 1);
        assert!(stars.retired_count() >= 8);
        // 3 s interval minus 2 s lifetime
        assert!(longest_empty >= Duration::from_millis(900));
        assert!(longest_empty <= Duration::from_millis(1100));
    }

    #[test]
    fn test_direction_is_normalized() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            assert!((random_direction(&mut rng).magnitude() - 1.0).abs() < 1e-5);
        }
    }
}
