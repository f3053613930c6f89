use std::any::Any;

use ember_core::geometry::IntRect;
use ember_core::math::UVec2;

use super::SPRITE_RECT;
use crate::entity::Entity;
use crate::system::{System, SystemContext, SystemId};

pub const FRAME_CLOCK: &str = "FrameClock";
pub const FRAME_DELAY: &str = "fFrameDelay";
pub const FRAME_MODIFIER: &str = "wFrameModifier";
pub const FRAME_RECT: &str = "rFrameRect";

/// Seconds since the entity last advanced a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    pub elapsed: f32,
}

/// Steps the sprite rect through a strip of frames.
///
/// `rFrameRect` bounds the strip inside the texture. Once more than
/// `fFrameDelay` seconds have passed, the sprite rect moves by
/// `wFrameModifier` frame widths (and heights) and wraps back to the strip
/// origin when it runs off the end.
#[derive(Debug, Default)]
pub struct AnimationSystem;

impl AnimationSystem {
    pub fn new() -> Self {
        Self
    }

    fn advance(sprite: &mut IntRect, frame: IntRect, modifier: UVec2) {
        if modifier.x > 0 {
            sprite.left = Self::step(sprite.left, sprite.width, modifier.x, frame.left, frame.width);
        }
        if modifier.y > 0 {
            sprite.top = Self::step(sprite.top, sprite.height, modifier.y, frame.top, frame.height);
        }
    }

    /// Moves `pos` by `count` frames of `size`, back to `origin` past the
    /// strip end. Saturates so oversized modifiers just wrap.
    fn step(pos: i32, size: i32, count: u32, origin: i32, extent: i32) -> i32 {
        let count = i32::try_from(count).unwrap_or(i32::MAX);
        let next = pos.saturating_add(size.saturating_mul(count));
        if next >= origin.saturating_add(extent) {
            origin
        } else {
            next
        }
    }
}

impl System for AnimationSystem {
    fn id(&self) -> SystemId {
        "AnimationSystem"
    }

    fn add_properties(&mut self, entity: &mut Entity) {
        let props = &mut entity.properties;
        props.add(FRAME_CLOCK, FrameClock::default());
        props.add(FRAME_DELAY, 0.0f32);
        props.add(FRAME_MODIFIER, UVec2::ZERO);
        props.add(FRAME_RECT, IntRect::default());
        props.add(SPRITE_RECT, IntRect::default());
    }

    fn update_fixed(&mut self, mut ctx: SystemContext<'_>) {
        ctx.for_each(|entity| {
            let props = &mut entity.properties;
            let clock = props.get::<FrameClock>(FRAME_CLOCK);
            if clock.elapsed <= props.get::<f32>(FRAME_DELAY) {
                return;
            }
            let frame = props.get::<IntRect>(FRAME_RECT);
            let modifier = props.get::<UVec2>(FRAME_MODIFIER);
            if let Some(sprite) = props.get_mut::<IntRect>(SPRITE_RECT) {
                Self::advance(sprite, frame, modifier);
            }
            props.set(FRAME_CLOCK, FrameClock::default());
        });
    }

    fn update_variable(&mut self, mut ctx: SystemContext<'_>, elapsed: f32) {
        ctx.for_each(|entity| {
            if let Some(clock) = entity.properties.get_mut::<FrameClock>(FRAME_CLOCK) {
                clock.elapsed += elapsed;
            }
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
