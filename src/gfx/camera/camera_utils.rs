use cgmath::{Matrix4, SquareMatrix, Vector3};
use winit::event::DeviceEvent;

use super::{camera_controller::CameraController, orbit_camera::OrbitCamera};

/// The gallery camera together with the input that drives it
pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    pub fn process_event(&mut self, event: &DeviceEvent) {
        self.controller.process_events(event, &mut self.camera);
    }

    /// Applies damped orbit input accumulated since the last frame
    pub fn update(&mut self) {
        self.controller.update(&mut self.camera);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize_projection(width, height);
        self.controller.set_viewport_height(height);
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    /// Eye position; `w` pads the field to 16 bytes
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(eye: Vector3<f32>, view_proj: Matrix4<f32>) -> Self {
        Self {
            view_position: eye.extend(1.0).into(),
            view_proj: view_proj.into(),
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.0, 0.0), Matrix4::identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_pads_eye_and_stores_columns() {
        let view_proj = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        let uniform = CameraUniform::new(Vector3::new(4.0, 5.0, 6.0), view_proj);
        assert_eq!(uniform.view_position, [4.0, 5.0, 6.0, 1.0]);
        assert_eq!(uniform.view_proj[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
