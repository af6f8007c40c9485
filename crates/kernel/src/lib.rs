//! Star Kernel: the star buffer and its per-tick advance.
//!
//! # Invariants
//! - The buffer is allocated once and never resized.
//! - After every tick, no star sits beyond the recycle threshold.
//! - Given the same seed and tick count, positions are bit-identical.

pub mod starfield;

pub use starfield::{DepthStats, StarField, WarpParams, advance, map_linear};

pub fn crate_info() -> &'static str {
    "warpfield-kernel v0.1.0"
}
