//! wgpu render backend for the starfield.
//!
//! Draws every star as a camera-facing quad textured with the glow sprite,
//! summed with additive blending over the scene background.
//!
//! # Invariants
//! - Renderer never advances the scene; it only clears the upload flag.
//! - The star buffer is re-uploaded only when the field reports a change.
//! - The glow texture is uploaded once, at construction.

mod gpu;
mod shaders;

pub use gpu::WgpuRenderer;
