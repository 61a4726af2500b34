//! Per-frame animation tick
//!
//! Steps run in a fixed order every redraw. Increments are per frame, not
//! per second, except where a step reads the elapsed time.

use std::time::Duration;

use log::trace;

use crate::gfx::scene::{NodeId, Scene};

use super::{context::GalleryContext, space::SpaceEnvironment};

const DUST_TIME_SCALE: f32 = 0.1;
const DUST_SPIN: f32 = 0.05;
const DUST_BOB: f32 = 0.1;
const PLANET_SPIN: f32 = 0.001;
const CLUSTER_SPIN_Y: f32 = 0.0001;
const CLUSTER_SPIN_X: f32 = 0.00005;
const NEBULA_TIME_STEP: f32 = 0.001;
const NEBULA_SPIN: f32 = 0.0001;
const SHIMMER_SPIN: f32 = 0.001;
const CAMERA_BOB_RATE: f32 = 0.5;
const CAMERA_BOB: f32 = 0.0005;

/// Advances the whole gallery by one frame of length `dt`
pub fn tick(ctx: &mut GalleryContext, dt: Duration) {
    ctx.elapsed += dt;
    let elapsed = ctx.elapsed.as_secs_f32();

    ctx.drain_commands();

    if ctx.interaction.is_transitioning() {
        ctx.scene.camera_manager.controller.halt();
    }
    ctx.scene.camera_manager.update();
    ctx.interaction.advance(
        dt,
        &mut ctx.scene.camera_manager.camera,
        &ctx.artworks,
        &mut ctx.overlay,
    );

    animate_dust(&mut ctx.scene, ctx.room.dust, elapsed);
    animate_space(&mut ctx.scene, &mut ctx.space);
    shimmer(&mut ctx.scene);

    if !ctx.interaction.is_transitioning() {
        ctx.scene
            .camera_manager
            .camera
            .nudge_height((elapsed * CAMERA_BOB_RATE).sin() * CAMERA_BOB);
    }

    ctx.shooting_stars.update(&mut ctx.scene, dt);
    ctx.loading.update(dt);

    trace!(
        "Tick at {:.3}s, {} shooting stars in flight",
        elapsed,
        ctx.shooting_stars.active_count()
    );
}

/// Slow spin and vertical drift of the dust cloud
fn animate_dust(scene: &mut Scene, dust: NodeId, elapsed: f32) {
    let Some(node) = scene.get_mut(dust) else {
        return;
    };
    let t = elapsed * DUST_TIME_SCALE;
    node.transform.rotation.y = t * DUST_SPIN;
    node.transform.position.y = t.sin() * DUST_BOB;
}

fn animate_space(scene: &mut Scene, space: &mut SpaceEnvironment) {
    for planet in &mut space.planets {
        planet.orbit.advance();
        if let Some(node) = scene.get_mut(planet.node) {
            node.transform.position = planet.orbit.position(node.transform.position.y);
            node.transform.rotation.y += PLANET_SPIN;
        }
    }

    for (i, &cluster) in space.clusters.iter().enumerate() {
        if let Some(node) = scene.get_mut(cluster) {
            let factor = (i + 1) as f32;
            node.transform.rotation.y += CLUSTER_SPIN_Y * factor;
            node.transform.rotation.x += CLUSTER_SPIN_X * factor;
        }
    }

    for (i, &nebula) in space.nebulae.iter().enumerate() {
        if let Some(node) = scene.get_mut(nebula) {
            if let Some(material) = node.material_mut() {
                material.time += NEBULA_TIME_STEP;
            }
            node.transform.rotation.y += NEBULA_SPIN * (i + 1) as f32;
        }
    }
}

/// Turns every translucent object a little
fn shimmer(scene: &mut Scene) {
    scene.traverse_mut(|node| {
        if node.material().is_some_and(|m| m.opacity < 1.0) {
            node.transform.rotation.y += SHIMMER_SPIN;
        }
    });
}
