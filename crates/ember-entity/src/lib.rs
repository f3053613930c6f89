//! Entity composition for Ember.
//!
//! Entities carry no behavior of their own. Each one owns a
//! [`PropertyManager`] of named, runtime-typed values, and gains behavior by
//! being registered with [`System`]s. A system adds the properties it needs
//! when the entity joins, then reads and writes them every frame, visiting
//! its entities in ascending z-order.
//!
//! The [`World`] owns both sides and keeps membership consistent: every
//! entity knows the systems it belongs to, every system knows its entities,
//! and every add or remove path updates both.

pub mod action;
pub mod entity;
pub mod error;
pub mod property;
pub mod registry;
pub mod system;
pub mod systems;
pub mod world;

pub use action::{Action, ActionCatalog, ActionGroup};
pub use entity::{Entities, Entity, EntityId};
pub use error::EntityError;
pub use property::PropertyManager;
pub use registry::ZOrderRegistry;
pub use system::{DrawTarget, SpriteDraw, System, SystemContext, SystemId};
pub use systems::{ActionSystem, AnimationSystem, MovementSystem, RenderSystem};
pub use world::World;
