//! Entity identity, tree links and the entity arena.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use ember_core::alloc::HashMap;
use ember_core::alloc::sparse_set::{IndexSlot, SparseSet};

use crate::property::PropertyManager;
use crate::system::SystemId;

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique entity id. Ids ascend and are never reused;
/// [`EntityId::NONE`] (zero) never names an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    pub const NONE: EntityId = EntityId(0);

    fn next() -> Self {
        EntityId(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    pub const fn is_some(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A game object: an id, a place in the entity tree, its system
/// memberships and its properties.
///
/// Tree links and memberships are maintained by the [`World`](crate::World);
/// properties are free for game code to read and write.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    name: String,
    order: u32,
    parent: Option<EntityId>,
    children: BTreeMap<String, EntityId>,
    systems: BTreeSet<SystemId>,
    pub properties: PropertyManager,
}

impl Entity {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::next(),
            name: name.into(),
            order: 0,
            parent: None,
            children: BTreeMap::new(),
            systems: BTreeSet::new(),
            properties: PropertyManager::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Key under which the parent stores this entity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Z-order: `0` for a root, the parent's order plus one otherwise.
    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn children(&self) -> &BTreeMap<String, EntityId> {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<EntityId> {
        self.children.get(name).copied()
    }

    pub fn systems(&self) -> impl Iterator<Item = SystemId> + '_ {
        self.systems.iter().copied()
    }

    pub fn has_system(&self, system: SystemId) -> bool {
        self.systems.contains(system)
    }

    pub(crate) fn set_order(&mut self, order: u32) {
        self.order = order;
    }

    pub(crate) fn set_parent(&mut self, parent: Option<EntityId>) {
        self.parent = parent;
    }

    pub(crate) fn insert_child(&mut self, name: String, child: EntityId) {
        self.children.insert(name, child);
    }

    pub(crate) fn remove_child(&mut self, name: &str) -> Option<EntityId> {
        self.children.remove(name)
    }

    pub(crate) fn insert_system(&mut self, system: SystemId) -> bool {
        self.systems.insert(system)
    }

    pub(crate) fn remove_system(&mut self, system: SystemId) -> bool {
        self.systems.remove(system)
    }
}

/// Arena of live entities addressed by [`EntityId`].
#[derive(Debug, Default)]
pub struct Entities {
    set: SparseSet<Entity>,
    index: HashMap<EntityId, IndexSlot>,
}

impl Entities {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        let slot = self.set.push(entity);
        self.index.insert(id, slot);
        id
    }

    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self.index.remove(&id)?;
        self.set.try_remove(slot)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).and_then(|&slot| self.set.try_get(slot))
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let slot = *self.index.get(&id)?;
        self.set.try_get_mut(slot)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.set.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_ascend_and_skip_zero() {
        let a = Entity::new("a");
        let b = Entity::new("b");
        assert!(a.id().is_some());
        assert!(b.id() > a.id());
        assert!(EntityId::NONE.is_none());
    }

    #[test]
    fn arena_lookup_after_removal() {
        let mut entities = Entities::new();
        let a = entities.insert(Entity::new("a"));
        let b = entities.insert(Entity::new("b"));

        assert_eq!(entities.remove(a).map(|e| e.id()), Some(a));
        assert!(entities.get(a).is_none());
        assert_eq!(entities.get(b).map(Entity::name), Some("b"));

        // A new entity may reuse the slot but never the id.
        let c = entities.insert(Entity::new("c"));
        assert_ne!(c, a);
        assert!(entities.get(a).is_none());
        assert_eq!(entities.len(), 2);
    }
}
