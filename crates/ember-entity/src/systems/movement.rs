use std::any::Any;

use ember_core::event::Event;
use ember_core::geometry::{IntRect, Size};
use ember_core::math::Vec2;

use super::{POSITION, ROTATION, SPRITE_RECT};
use crate::entity::Entity;
use crate::system::{System, SystemContext, SystemId};

pub const VELOCITY: &str = "vVelocity";
pub const ACCELERATION: &str = "vAcceleration";
pub const ROTATIONAL_VELOCITY: &str = "fRotationalVelocity";
pub const ROTATIONAL_ACCELERATION: &str = "fRotationalAcceleration";
pub const FIXED_MOVEMENT: &str = "bFixedMovement";
pub const SCREEN_WRAP: &str = "bScreenWrap";
pub const MOVABLE: &str = "bMovable";

/// Integrates velocity and rotation.
///
/// Entities with `bFixedMovement` advance by whole steps on fixed updates;
/// the others advance by `elapsed` seconds on variable updates. With
/// `bScreenWrap` an entity leaving one edge of the screen enters at the
/// opposite one.
#[derive(Debug)]
pub struct MovementSystem {
    screen: Size<u32>,
}

impl MovementSystem {
    pub fn new(screen: Size<u32>) -> Self {
        Self { screen }
    }

    pub fn screen(&self) -> Size<u32> {
        self.screen
    }

    fn step(&self, entity: &mut Entity, dt: f32) {
        let props = &mut entity.properties;

        let velocity = props.get::<Vec2>(VELOCITY) + props.get::<Vec2>(ACCELERATION) * dt;
        props.set(VELOCITY, velocity);
        let mut position = props.get::<Vec2>(POSITION) + velocity * dt;

        let rotational_velocity = props.get::<f32>(ROTATIONAL_VELOCITY)
            + props.get::<f32>(ROTATIONAL_ACCELERATION) * dt;
        props.set(ROTATIONAL_VELOCITY, rotational_velocity);
        let rotation = props.get::<f32>(ROTATION) + rotational_velocity * dt;
        props.set(ROTATION, rotation);

        if props.get::<bool>(SCREEN_WRAP) {
            position = self.wrap(position, props.get::<IntRect>(SPRITE_RECT));
        }
        props.set(POSITION, position);
    }

    fn wrap(&self, mut position: Vec2, sprite: IntRect) -> Vec2 {
        let (width, height) = (self.screen.width as f32, self.screen.height as f32);
        let (sprite_width, sprite_height) = (sprite.width as f32, sprite.height as f32);

        if position.x > width {
            position.x = -sprite_width;
        } else if position.x < -sprite_width {
            position.x = width;
        }
        if position.y > height {
            position.y = -sprite_height;
        } else if position.y < -sprite_height {
            position.y = height;
        }
        position
    }
}

impl System for MovementSystem {
    fn id(&self) -> SystemId {
        "MovementSystem"
    }

    fn add_properties(&mut self, entity: &mut Entity) {
        let props = &mut entity.properties;
        props.add(VELOCITY, Vec2::ZERO);
        props.add(ACCELERATION, Vec2::ZERO);
        props.add(ROTATIONAL_VELOCITY, 0.0f32);
        props.add(ROTATIONAL_ACCELERATION, 0.0f32);
        props.add(FIXED_MOVEMENT, true);
        props.add(SCREEN_WRAP, true);
        props.add(MOVABLE, true);
        props.add(POSITION, Vec2::ZERO);
        props.add(ROTATION, 0.0f32);
        props.add(SPRITE_RECT, IntRect::default());
    }

    fn handle_event(&mut self, event: &Event) {
        if let Event::Resized(size) = event {
            self.screen = *size;
        }
    }

    fn update_fixed(&mut self, mut ctx: SystemContext<'_>) {
        ctx.for_each(|entity| {
            if entity.properties.get::<bool>(MOVABLE) && entity.properties.get::<bool>(FIXED_MOVEMENT)
            {
                self.step(entity, 1.0);
            }
        });
    }

    fn update_variable(&mut self, mut ctx: SystemContext<'_>, elapsed: f32) {
        ctx.for_each(|entity| {
            if entity.properties.get::<bool>(MOVABLE)
                && !entity.properties.get::<bool>(FIXED_MOVEMENT)
            {
                self.step(entity, elapsed);
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
