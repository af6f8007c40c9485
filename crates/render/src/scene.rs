use glam::Mat4;
use warpfield_common::{SceneConfig, WarpConfig};
use warpfield_input::Pointer;
use warpfield_kernel::StarField;

use crate::camera::{LookAroundCamera, Perspective};
use crate::glow::GlowCache;

/// How a sprite's color combines with what is already on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blending {
    Normal,
    /// Overlapping sprites sum, so clusters brighten instead of occluding.
    Additive,
}

/// Uniform look of every star sprite.
#[derive(Debug)]
pub struct PointsMaterial {
    pub color: [f32; 3],
    pub size: f32,
    pub opacity: f32,
    /// Fragments with texture alpha below this are discarded.
    pub alpha_test: f32,
    pub size_attenuation: bool,
    pub depth_write: bool,
    pub blending: Blending,
    glow: GlowCache,
}

impl PointsMaterial {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            size: config.point_size,
            opacity: config.opacity,
            alpha_test: config.alpha_test,
            size_attenuation: true,
            depth_write: false,
            blending: Blending::Additive,
            glow: GlowCache::new(config.glow_size),
        }
    }

    /// The glow sprite, rasterized on first request.
    pub fn glow(&self) -> &GlowCache {
        &self.glow
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

/// The star buffer together with the material it is drawn with.
pub struct StarLayer {
    pub field: StarField,
    pub material: PointsMaterial,
}

/// Top-level parts of a scene, for inspection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneNode {
    Background([f32; 3]),
    AmbientLight(AmbientLight),
    Stars { count: usize },
    LookAroundCamera,
}

/// Black backdrop, dim ambient light, the star layer and the look-around
/// camera, viewed through a fixed perspective.
pub struct Scene {
    pub background: [f32; 3],
    pub ambient: AmbientLight,
    pub stars: StarLayer,
    pub camera: LookAroundCamera,
    pub projection: Perspective,
}

impl Scene {
    pub fn new(config: &WarpConfig, seed: u64) -> Self {
        let scene = Self {
            background: config.scene.background,
            ambient: AmbientLight {
                color: [1.0, 1.0, 1.0],
                intensity: config.scene.ambient_intensity,
            },
            stars: StarLayer {
                field: StarField::new(&config.stars, seed),
                material: PointsMaterial::from_config(&config.scene),
            },
            camera: LookAroundCamera::from_config(&config.camera),
            projection: Perspective::from_config(&config.scene),
        };
        tracing::info!(
            "scene assembled: {} stars, fov {:.0} deg, seed {seed}",
            scene.stars.field.len(),
            config.scene.fov_degrees
        );
        scene
    }

    /// One frame: stars first, then the camera. Returns stars recycled.
    pub fn tick(&mut self, pointer: Pointer) -> usize {
        let recycled = self.stars.field.tick();
        self.camera.tick(pointer);
        recycled
    }

    pub fn children(&self) -> Vec<SceneNode> {
        vec![
            SceneNode::Background(self.background),
            SceneNode::AmbientLight(self.ambient),
            SceneNode::Stars {
                count: self.stars.field.len(),
            },
            SceneNode::LookAroundCamera,
        ]
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection.projection_matrix() * self.camera.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use warpfield_common::StarConfig;

    fn small_config() -> WarpConfig {
        WarpConfig {
            stars: StarConfig {
                count: 16,
                ..StarConfig::default()
            },
            ..WarpConfig::default()
        }
    }

    #[test]
    fn scene_has_all_children() {
        let scene = Scene::new(&small_config(), 1);
        let children = scene.children();
        assert_eq!(children.len(), 4);
        assert!(children.contains(&SceneNode::Background([0.0, 0.0, 0.0])));
        assert!(children.iter().any(|c| matches!(
            c,
            SceneNode::AmbientLight(AmbientLight { intensity, .. }) if *intensity == 0.1
        )));
        assert!(children.contains(&SceneNode::Stars { count: 16 }));
        assert!(children.contains(&SceneNode::LookAroundCamera));
    }

    #[test]
    fn material_matches_star_look() {
        let scene = Scene::new(&small_config(), 1);
        let m = &scene.stars.material;
        assert_eq!(m.size, 1.5);
        assert_eq!(m.opacity, 0.9);
        assert_eq!(m.alpha_test, 0.01);
        assert_eq!(m.blending, Blending::Additive);
        assert!(!m.depth_write);
        assert!(m.size_attenuation);
    }

    #[test]
    fn glow_is_shared_within_scene() {
        let scene = Scene::new(&small_config(), 1);
        let a = Arc::clone(scene.stars.material.glow().get());
        let b = Arc::clone(scene.stars.material.glow().get());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.size(), 64);
    }

    #[test]
    fn tick_moves_stars_and_camera() {
        let mut scene = Scene::new(&small_config(), 3);
        let before = scene.stars.field.state_hash();
        scene.tick(Pointer::new(1.0, 0.0));
        assert_ne!(scene.stars.field.state_hash(), before);
        assert!(scene.camera.yaw < 0.0);
        assert_eq!(scene.stars.field.tick_count(), 1);
    }

    #[test]
    fn three_star_scene_centered_pointer() {
        let config = WarpConfig {
            stars: StarConfig {
                count: 3,
                ..StarConfig::default()
            },
            ..WarpConfig::default()
        };
        let mut scene = Scene::new(&config, 2024);
        let before: Vec<_> = scene.stars.field.positions().to_vec();
        let recycled = scene.tick(Pointer::CENTER);
        assert_eq!(recycled, 0);
        let params = *scene.stars.field.params();
        for (b, a) in before.iter().zip(scene.stars.field.positions()) {
            assert_eq!(a.z, b.z + params.depth_speed(b.z));
            assert!(a.z <= 5.0);
        }
        assert_eq!((scene.camera.yaw, scene.camera.pitch), (0.0, 0.0));
    }

    #[test]
    fn view_projection_is_finite() {
        let scene = Scene::new(&small_config(), 0);
        assert!(scene.view_projection().is_finite());
    }
}
