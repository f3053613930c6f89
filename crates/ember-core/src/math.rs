//! Vector math re-exported from [`glam`].
//!
//! Entity properties use these types directly, e.g. `vPosition: Vec2` and
//! `wFrameModifier: UVec2`.
//!
//! ```
//! use ember_core::math::Vec2;
//!
//! let position = Vec2::new(10.0, 20.0);
//! let velocity = Vec2::new(1.0, 0.5);
//! assert_eq!(position + velocity * 2.0, Vec2::new(12.0, 21.0));
//! ```
//!
//! [`glam`]: https://docs.rs/glam

pub use glam::{IVec2, UVec2, Vec2};

/// Converts degrees to radians.
#[inline]
pub fn to_radians(degrees: f32) -> f32 {
    degrees.to_radians()
}
