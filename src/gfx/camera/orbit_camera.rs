use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use crate::config::CameraConfig;
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Perspective camera looking from `eye` at `target`, Y up.
///
/// The eye is written directly by [`OrbitControls`](super::OrbitControls) and
/// [`ObstacleAvoidance`](super::ObstacleAvoidance); call
/// [`OrbitCamera::update_view_proj`] once both have run.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for OrbitCamera {
    fn build_view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            Point3::from_vec(self.eye),
            Point3::from_vec(self.target),
            self.up,
        )
    }

    fn build_projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

impl OrbitCamera {
    pub fn new(eye: Vector3<f32>, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            eye,
            target,
            up: Vector3::unit_y(),
            aspect,
            fovy: Rad(std::f32::consts::PI / 4.0),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
        };
        camera.update_view_proj();
        camera
    }

    pub fn from_config(config: &CameraConfig, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self::new(config.position, target, aspect);
        camera.fovy = Deg(config.fov_y_degrees).into();
        camera.znear = config.znear;
        camera.zfar = config.zfar;
        camera.update_view_proj();
        camera
    }

    /// Unit view direction. Falls back to -Z when eye and target coincide.
    pub fn forward(&self) -> Vector3<f32> {
        let offset = self.target - self.eye;
        let length = offset.magnitude();
        if length.is_finite() && length > f32::EPSILON {
            offset / length
        } else {
            -Vector3::unit_z()
        }
    }

    pub fn distance_to_target(&self) -> f32 {
        (self.eye - self.target).magnitude()
    }

    /// Zero heights are ignored so the aspect never becomes infinite.
    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
        self.uniform.view = convert_matrix4_to_array(self.build_view_matrix());
    }
}
