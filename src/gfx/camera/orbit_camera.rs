use super::camera_utils::CameraUniform;
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Camera orbiting a target point in spherical coordinates (Y-up)
///
/// `yaw` is measured around +Y from the +Z axis, so a yaw of `θ` puts the
/// eye at `(sin θ, ·, cos θ)` relative to the target. `pitch` is the
/// elevation above the horizontal plane.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Recomputed by `update()` below
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Deg(75.0).into(),
            znear: 0.1,
            zfar: 1000.0,
        };
        camera.update();
        camera
    }

    /// Creates a camera whose eye sits at `eye`, looking at `target`
    pub fn looking_at(eye: Vector3<f32>, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self::new(1.0, 0.0, 0.0, target, aspect);
        camera.set_eye(eye);
        camera
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            Point3::from_vec(self.eye),
            Point3::from_vec(self.target),
            self.up,
        )
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    pub fn add_distance(&mut self, delta: f32) {
        self.set_distance(self.distance + delta);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        let mut bounded_yaw = yaw;
        if let Some(min_yaw) = self.bounds.min_yaw {
            bounded_yaw = bounded_yaw.max(min_yaw);
        }
        if let Some(max_yaw) = self.bounds.max_yaw {
            bounded_yaw = bounded_yaw.min(max_yaw);
        }
        self.yaw = bounded_yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Moves the eye to an explicit world position, re-deriving the
    /// spherical coordinates. Bounds are applied.
    pub fn set_eye(&mut self, eye: Vector3<f32>) {
        let offset = eye - self.target;
        let distance = offset.magnitude();
        if distance <= f32::EPSILON {
            return;
        }
        let horizontal = (offset.x * offset.x + offset.z * offset.z).sqrt();
        self.yaw = offset.x.atan2(offset.z);
        self.pitch = offset
            .y
            .atan2(horizontal)
            .clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    /// Distance from the target projected onto the horizontal plane
    pub fn horizontal_radius(&self) -> f32 {
        let offset = self.eye - self.target;
        (offset.x * offset.x + offset.z * offset.z).sqrt()
    }

    /// Height of the eye above the target
    pub fn eye_height(&self) -> f32 {
        self.eye.y - self.target.y
    }

    /// Places the eye on the horizontal circle of `radius` at angle `yaw`,
    /// keeping the current eye height
    pub fn set_horizontal(&mut self, yaw: f32, radius: f32) {
        let height = self.eye_height();
        let eye = self.target + Vector3::new(yaw.sin() * radius, height, yaw.cos() * radius);
        self.set_eye(eye);
        // atan2 folds the yaw into (-π, π]; keep the caller's unwrapped angle
        self.yaw = yaw;
        self.update();
    }

    /// Raises (or lowers) the eye by `delta`, keeping the horizontal radius
    pub fn nudge_height(&mut self, delta: f32) {
        let eye = self.eye + Vector3::new(0.0, delta, 0.0);
        let yaw = self.yaw;
        self.set_eye(eye);
        self.yaw = yaw;
        self.update();
    }

    /// Updates the camera after changing `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Clip-space transform in wgpu's depth range
    pub fn view_projection(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * self.projection_matrix() * self.view_matrix()
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform::new(self.eye, self.view_projection())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: None,
            max_distance: None,
            min_pitch: -std::f32::consts::PI / 2.0 + f32::EPSILON,
            max_pitch: std::f32::consts::PI / 2.0 - f32::EPSILON,
            min_yaw: None,
            max_yaw: None,
        }
    }
}

impl OrbitCameraBounds {
    /// Bounds expressed as polar angles measured from +Y, the way orbit
    /// controls usually specify them
    pub fn from_polar(min_polar: f32, max_polar: f32) -> Self {
        let half_pi = std::f32::consts::FRAC_PI_2;
        Self {
            min_pitch: half_pi - max_polar,
            max_pitch: half_pi - min_polar,
            ..Default::default()
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_looking_at_recovers_eye() {
        let camera = OrbitCamera::looking_at(Vector3::new(0.0, 1.7, 5.0), Vector3::zero(), 1.5);
        assert!(approx(camera.eye.x, 0.0));
        assert!(approx(camera.eye.y, 1.7));
        assert!(approx(camera.eye.z, 5.0));
        assert!(approx(camera.yaw, 0.0));
    }

    #[test]
    fn test_set_horizontal_keeps_height() {
        let mut camera =
            OrbitCamera::looking_at(Vector3::new(0.0, 1.7, 5.0), Vector3::zero(), 1.5);
        camera.set_horizontal(std::f32::consts::FRAC_PI_2, 5.0);
        assert!(approx(camera.eye.x, 5.0));
        assert!(approx(camera.eye.y, 1.7));
        assert!(approx(camera.eye.z, 0.0));
    }

    #[test]
    fn test_polar_bounds_clamp_pitch() {
        let mut camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::zero(), 1.0);
        camera.bounds = OrbitCameraBounds::from_polar(
            std::f32::consts::PI / 3.0,
            std::f32::consts::PI / 1.5,
        );
        camera.set_pitch(1.2);
        assert!(approx(camera.pitch, std::f32::consts::PI / 6.0));
        camera.set_pitch(-1.2);
        assert!(approx(camera.pitch, -std::f32::consts::PI / 6.0));
    }
}
