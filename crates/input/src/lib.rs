//! Pointer input: window-space cursor positions mapped to normalized device
//! coordinates.
//!
//! # Invariants
//! - Both axes are clamped to [-1, 1]; +y points up.
//! - An unreported pointer is the centered pointer.

pub mod pointer;

pub use pointer::Pointer;

pub fn crate_info() -> &'static str {
    "warpfield-input v0.1.0"
}
