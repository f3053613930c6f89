//! Built-in systems.
//!
//! Property keys carry a type hint prefix: `v` vector, `f` float, `b` bool,
//! `r` rect, `w` unsigned vector.

mod action;
mod animation;
mod movement;
mod render;

pub use action::ActionSystem;
pub use animation::{AnimationSystem, FrameClock};
pub use movement::MovementSystem;
pub use render::{RenderSystem, Sprite};

pub const POSITION: &str = "vPosition";
pub const ROTATION: &str = "fRotation";
pub const SPRITE_RECT: &str = "rSpriteRect";
