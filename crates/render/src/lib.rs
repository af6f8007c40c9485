//! Rendering Adapter: the renderer-agnostic starfield scene.
//!
//! # Invariants
//! - Renderers read the scene; only `Scene::tick` advances it.
//! - The glow sprite is rasterized at most once per material.
//! - The camera never leaves the origin.

mod camera;
mod glow;
mod renderer;
mod scene;

pub use camera::{LookAroundCamera, Perspective};
pub use glow::{GLOW_STOPS, GlowCache, GlowTexture, gradient_alpha};
pub use renderer::{DebugTextRenderer, Renderer};
pub use scene::{AmbientLight, Blending, PointsMaterial, Scene, SceneNode, StarLayer};

pub fn crate_info() -> &'static str {
    "warpfield-render v0.1.0"
}
