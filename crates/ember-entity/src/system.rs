//! The system interface and the per-frame context handed to systems.

use std::any::Any;

use ember_assets::AssetId;
use ember_core::event::Event;
use ember_core::geometry::IntRect;
use ember_core::math::Vec2;

use crate::entity::{Entities, Entity, EntityId};
use crate::registry::ZOrderRegistry;

/// Stable name of a system, e.g. `"MovementSystem"`.
pub type SystemId = &'static str;

/// One sprite paint request produced by the render system.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDraw<'a> {
    pub entity: EntityId,
    pub texture: Option<&'a AssetId>,
    pub rect: IntRect,
    pub position: Vec2,
    pub origin: Vec2,
    pub scale: Vec2,
    /// Degrees, clockwise.
    pub rotation: f32,
}

/// Receives paint requests. Implemented by the platform renderer.
pub trait DrawTarget {
    fn draw_sprite(&mut self, sprite: &SpriteDraw<'_>);
}

/// A behavior applied to every entity registered with it.
///
/// The [`World`](crate::World) stores each system next to its
/// [`ZOrderRegistry`] and drives the hooks below. A system must only read
/// properties it added in [`System::add_properties`]; that is what makes the
/// unchecked property reads in the update hooks safe.
pub trait System: Any {
    fn id(&self) -> SystemId;

    /// Gives a newly registered entity the properties this system reads.
    fn add_properties(&mut self, entity: &mut Entity);

    /// Called after the entity is registered and has its properties.
    #[allow(unused_variables)]
    fn handle_init(&mut self, entity: &mut Entity) {}

    /// Called when the entity leaves this system, before it is erased.
    #[allow(unused_variables)]
    fn handle_cleanup(&mut self, entity: &mut Entity) {}

    #[allow(unused_variables)]
    fn handle_event(&mut self, event: &Event) {}

    #[allow(unused_variables)]
    fn update_fixed(&mut self, ctx: SystemContext<'_>) {}

    #[allow(unused_variables)]
    fn update_variable(&mut self, ctx: SystemContext<'_>, elapsed: f32) {}

    #[allow(unused_variables)]
    fn draw(&mut self, ctx: SystemContext<'_>, target: &mut dyn DrawTarget) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The registered entities of one system, ready for dispatch.
pub struct SystemContext<'a> {
    registry: &'a ZOrderRegistry,
    entities: &'a mut Entities,
}

impl<'a> SystemContext<'a> {
    pub(crate) fn new(registry: &'a ZOrderRegistry, entities: &'a mut Entities) -> Self {
        Self { registry, entities }
    }

    /// Visits registered entities in ascending z-order, then insertion
    /// order.
    pub fn for_each(&mut self, mut f: impl FnMut(&mut Entity)) {
        for id in self.registry.iter() {
            if let Some(entity) = self.entities.get_mut(id) {
                f(entity);
            }
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.registry.iter()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}
