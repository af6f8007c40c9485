use glam::{EulerRot, Mat4, Quat, Vec3};
use warpfield_common::{CameraConfig, SceneConfig};
use warpfield_input::Pointer;

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    (1.0 - t) * from + t * to
}

/// Camera pinned at the origin that eases its yaw and pitch toward the
/// pointer. Looks down -Z at rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAroundCamera {
    pub position: Vec3,
    /// Rotation about +Y, radians.
    pub yaw: f32,
    /// Rotation about +X, radians.
    pub pitch: f32,
    pub look_range: f32,
    pub lerp_factor: f32,
}

impl Default for LookAroundCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl LookAroundCamera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            look_range: config.look_range,
            lerp_factor: config.lerp_factor,
        }
    }

    /// `(yaw, pitch)` the camera settles at for a pointer held still.
    pub fn target(&self, pointer: Pointer) -> (f32, f32) {
        (-pointer.x * self.look_range, pointer.y * self.look_range)
    }

    /// Re-pin the position and move a fixed fraction of the way toward the
    /// pointer's target orientation.
    pub fn tick(&mut self, pointer: Pointer) {
        self.position = Vec3::ZERO;
        let (yaw, pitch) = self.target(pointer);
        self.yaw = lerp(self.yaw, yaw, self.lerp_factor);
        self.pitch = lerp(self.pitch, pitch, self.lerp_factor);
    }

    /// Pitch about X, then yaw about Y, in the camera's local frame.
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.pitch, self.yaw, 0.0)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(), self.position).inverse()
    }
}

/// Perspective projection with a vertical field of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Perspective {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default())
    }
}

impl Perspective {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            fov_y: config.fov_degrees.to_radians(),
            aspect: 16.0 / 9.0,
            near: config.near,
            far: config.far,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }
}
