//! Shared tuning for the warpfield starfield.
//!
//! Every constant the simulation and renderer depend on lives here, both as a
//! bare `const` and as the `Default` of the matching config section, so a YAML
//! file can override any subset of them.

pub mod config;

pub use config::{CameraConfig, ConfigError, SceneConfig, StarConfig, WarpConfig};

/// Number of stars in the field.
pub const STAR_COUNT: usize = 8000;
/// Base scale of the star volume, in world units.
pub const STAR_AREA: f32 = 200.0;
/// A star whose depth exceeds this value has passed the camera.
pub const RECYCLE_THRESHOLD: f32 = 5.0;
/// Speed of the farthest and nearest stars, in units per tick.
pub const SPEED_RANGE: (f32, f32) = (0.1, 1.5);
/// Edge length of the glow sprite bitmap, in pixels.
pub const GLOW_TEXTURE_SIZE: u32 = 64;
/// Vertical field of view of the scene camera.
pub const FOV_DEGREES: f32 = 75.0;
/// Fraction of the remaining angle the camera covers each tick.
pub const LOOK_LERP_FACTOR: f32 = 0.03;
/// Maximum look angle at the pointer extremes, in radians.
pub const LOOK_RANGE: f32 = 0.3;
/// Largest star count a config may ask for; keeps the GPU buffer in limits.
pub const MAX_STAR_COUNT: usize = 10_000_000;
/// Largest glow sprite edge, matching the common 2D texture limit.
pub const MAX_GLOW_TEXTURE_SIZE: u32 = 8192;

pub fn crate_info() -> &'static str {
    "warpfield-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }

    #[test]
    fn speed_range_is_ordered() {
        assert!(SPEED_RANGE.0 < SPEED_RANGE.1);
    }
}
