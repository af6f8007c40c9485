use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    FOV_DEGREES, GLOW_TEXTURE_SIZE, LOOK_LERP_FACTOR, LOOK_RANGE, MAX_GLOW_TEXTURE_SIZE,
    MAX_STAR_COUNT, RECYCLE_THRESHOLD, SPEED_RANGE, STAR_AREA, STAR_COUNT,
};

/// Errors from loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Star volume and motion tuning.
///
/// Scatter values are full widths in multiples of `area`: an init scatter of
/// 5 places stars in `[-2.5 * area, 2.5 * area)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    pub count: usize,
    pub area: f32,
    pub recycle_threshold: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub init_scatter: f32,
    pub init_depth: f32,
    pub recycle_scatter: f32,
    pub recycle_depth: f32,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            count: STAR_COUNT,
            area: STAR_AREA,
            recycle_threshold: RECYCLE_THRESHOLD,
            min_speed: SPEED_RANGE.0,
            max_speed: SPEED_RANGE.1,
            init_scatter: 5.0,
            init_depth: 2.0,
            recycle_scatter: 3.0,
            recycle_depth: 1.0,
        }
    }
}

/// Pointer-driven look behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Look angle reached when the pointer sits at an edge, in radians.
    pub look_range: f32,
    pub lerp_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            look_range: LOOK_RANGE,
            lerp_factor: LOOK_LERP_FACTOR,
        }
    }
}

/// Projection, lighting and star material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub background: [f32; 3],
    pub ambient_intensity: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub point_size: f32,
    pub opacity: f32,
    pub alpha_test: f32,
    pub glow_size: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: [0.0, 0.0, 0.0],
            ambient_intensity: 0.1,
            fov_degrees: FOV_DEGREES,
            near: 0.1,
            far: 1000.0,
            point_size: 1.5,
            opacity: 0.9,
            alpha_test: 0.01,
            glow_size: GLOW_TEXTURE_SIZE,
        }
    }
}

/// Complete configuration. Missing YAML keys keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpConfig {
    pub stars: StarConfig,
    pub camera: CameraConfig,
    pub scene: SceneConfig,
}

impl WarpConfig {
    /// Read and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` when given, otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse and validate YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.stars;
        if s.count == 0 {
            return Err(invalid("stars.count", "must be at least 1"));
        }
        if s.count > MAX_STAR_COUNT {
            return Err(invalid(
                "stars.count",
                format!("{} exceeds {MAX_STAR_COUNT}", s.count),
            ));
        }
        if !(s.area.is_finite() && s.area > 0.0) {
            return Err(invalid("stars.area", format!("{} is not positive", s.area)));
        }
        if !s.recycle_threshold.is_finite() {
            return Err(invalid("stars.recycle_threshold", "must be finite"));
        }
        if !(s.min_speed.is_finite() && s.max_speed.is_finite()) || s.min_speed > s.max_speed {
            return Err(invalid(
                "stars.min_speed",
                format!("range [{}, {}] is not ordered", s.min_speed, s.max_speed),
            ));
        }
        // Stars at the far edge must still move toward the camera.
        if s.min_speed <= 0.0 {
            return Err(invalid(
                "stars.min_speed",
                format!("{} is not positive", s.min_speed),
            ));
        }
        for (field, value) in [
            ("stars.init_scatter", s.init_scatter),
            ("stars.init_depth", s.init_depth),
            ("stars.recycle_scatter", s.recycle_scatter),
            ("stars.recycle_depth", s.recycle_depth),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("{value} is not positive")));
            }
        }
        // Recycled stars restart inside the volume, where speed is positive.
        if s.recycle_depth > s.init_depth {
            return Err(invalid(
                "stars.recycle_depth",
                format!("{} is deeper than init_depth {}", s.recycle_depth, s.init_depth),
            ));
        }

        let c = &self.camera;
        if !(c.lerp_factor > 0.0 && c.lerp_factor <= 1.0) {
            return Err(invalid(
                "camera.lerp_factor",
                format!("{} is outside (0, 1]", c.lerp_factor),
            ));
        }
        if !c.look_range.is_finite() {
            return Err(invalid("camera.look_range", "must be finite"));
        }

        let sc = &self.scene;
        if !(sc.fov_degrees > 0.0 && sc.fov_degrees < 180.0) {
            return Err(invalid(
                "scene.fov_degrees",
                format!("{} is outside (0, 180)", sc.fov_degrees),
            ));
        }
        if !(sc.near > 0.0 && sc.far > sc.near) {
            return Err(invalid(
                "scene.near",
                format!("clip range [{}, {}] is empty", sc.near, sc.far),
            ));
        }
        if sc.glow_size == 0 || sc.glow_size > MAX_GLOW_TEXTURE_SIZE {
            return Err(invalid(
                "scene.glow_size",
                format!("{} is outside [1, {MAX_GLOW_TEXTURE_SIZE}]", sc.glow_size),
            ));
        }
        Ok(())
    }
}
