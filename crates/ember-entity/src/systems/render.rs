use std::any::Any;

use ember_assets::AssetId;
use ember_core::geometry::IntRect;
use ember_core::math::Vec2;

use super::{POSITION, ROTATION, SPRITE_RECT};
use crate::entity::Entity;
use crate::system::{DrawTarget, SpriteDraw, System, SystemContext, SystemId};

pub const SPRITE: &str = "Sprite";
pub const SCALE: &str = "vScale";
pub const ORIGIN: &str = "vOrigin";
pub const VISIBLE: &str = "bVisible";

/// Texture reference of a drawable entity. `None` draws the region
/// untextured.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sprite {
    pub texture: Option<AssetId>,
}

impl Sprite {
    pub fn new(texture: impl Into<AssetId>) -> Self {
        Self {
            texture: Some(texture.into()),
        }
    }
}

/// Paints every visible entity, lowest z-order first.
#[derive(Debug, Default)]
pub struct RenderSystem {
    drawn_last_frame: usize,
}

impl RenderSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sprites submitted by the last [`System::draw`].
    pub fn drawn_last_frame(&self) -> usize {
        self.drawn_last_frame
    }
}

impl System for RenderSystem {
    fn id(&self) -> SystemId {
        "RenderSystem"
    }

    fn add_properties(&mut self, entity: &mut Entity) {
        let props = &mut entity.properties;
        props.add(SPRITE, Sprite::default());
        props.add(SPRITE_RECT, IntRect::default());
        props.add(SCALE, Vec2::ONE);
        props.add(ORIGIN, Vec2::ZERO);
        props.add(POSITION, Vec2::ZERO);
        props.add(ROTATION, 0.0f32);
        props.add(VISIBLE, true);
    }

    fn draw(&mut self, mut ctx: SystemContext<'_>, target: &mut dyn DrawTarget) {
        let mut drawn = 0;
        ctx.for_each(|entity| {
            let props = &entity.properties;
            if !props.get::<bool>(VISIBLE) {
                return;
            }
            let sprite = props.get_ref::<Sprite>(SPRITE);
            target.draw_sprite(&SpriteDraw {
                entity: entity.id(),
                texture: sprite.and_then(|sprite| sprite.texture.as_ref()),
                rect: props.get(SPRITE_RECT),
                position: props.get(POSITION),
                origin: props.get(ORIGIN),
                scale: props.get(SCALE),
                rotation: props.get(ROTATION),
            });
            drawn += 1;
        });
        self.drawn_last_frame = drawn;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
