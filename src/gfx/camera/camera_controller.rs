use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, MouseScrollDelta},
};

use super::orbit_camera::OrbitCamera;

/// Mouse-driven orbit controls with inertial damping
///
/// Drag input accumulates into a pending spherical delta. Each `update`
/// applies a `damping_factor` share of it to the camera and decays the rest,
/// so the view keeps gliding briefly after the mouse stops.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    viewport_height: f32,
    yaw_delta: f32,
    pitch_delta: f32,
    is_mouse_pressed: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            damping_factor: 0.05,
            enable_damping: true,
            viewport_height: 600.0,
            yaw_delta: 0.0,
            pitch_delta: 0.0,
            is_mouse_pressed: false,
        }
    }

    pub fn with_damping(mut self, damping_factor: f32) -> Self {
        self.damping_factor = damping_factor;
        self.enable_damping = damping_factor > 0.0;
        self
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    pub fn process_events(&mut self, event: &DeviceEvent, camera: &mut OrbitCamera) {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseWheel { delta, .. } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32 / 50.0
                    }
                };
                camera.add_distance(scroll_amount * self.zoom_speed);
            }
            DeviceEvent::MouseMotion { delta } => {
                if self.is_mouse_pressed {
                    self.drag(delta.0 as f32, delta.1 as f32, camera);
                }
            }
            _ => (),
        }
    }

    /// Converts a drag of `dx`/`dy` pixels into a rotation. A drag across
    /// the full viewport height turns the view by `2π * rotate_speed`.
    pub fn drag(&mut self, dx: f32, dy: f32, camera: &mut OrbitCamera) {
        let scale = std::f32::consts::TAU * self.rotate_speed / self.viewport_height;
        let yaw = -dx * scale;
        let pitch = dy * scale;
        if self.enable_damping {
            self.yaw_delta += yaw;
            self.pitch_delta += pitch;
        } else {
            camera.add_yaw(yaw);
            camera.add_pitch(pitch);
        }
    }

    /// Applies pending rotation; call once per frame
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        if !self.enable_damping {
            return;
        }
        if self.yaw_delta.abs() > f32::EPSILON || self.pitch_delta.abs() > f32::EPSILON {
            camera.add_yaw(self.yaw_delta * self.damping_factor);
            camera.add_pitch(self.pitch_delta * self.damping_factor);
        }
        self.yaw_delta *= 1.0 - self.damping_factor;
        self.pitch_delta *= 1.0 - self.damping_factor;
    }

    /// Drops any pending inertia
    pub fn halt(&mut self) {
        self.yaw_delta = 0.0;
        self.pitch_delta = 0.0;
    }

    pub fn is_rotating(&self) -> bool {
        self.is_mouse_pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector3, Zero};

    #[test]
    fn test_damped_drag_glides_and_decays() {
        let mut camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        let mut controller = CameraController::new(0.5, 1.0).with_damping(0.05);
        controller.set_viewport_height(600);

        controller.drag(-60.0, 0.0, &mut camera);
        assert_eq!(camera.yaw, 0.0);

        controller.update(&mut camera);
        let first_step = camera.yaw;
        assert!(first_step > 0.0);

        controller.update(&mut camera);
        let second_step = camera.yaw - first_step;
        assert!(second_step > 0.0 && second_step < first_step);
    }

    #[test]
    fn test_undamped_drag_applies_immediately() {
        let mut camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        let mut controller = CameraController::new(0.5, 1.0).with_damping(0.0);
        controller.drag(-10.0, 0.0, &mut camera);
        assert!(camera.yaw > 0.0);
    }
}
