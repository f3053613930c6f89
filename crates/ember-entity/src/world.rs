//! Owner of all entities and systems.
//!
//! Membership is recorded on both sides: an entity lists the systems it
//! belongs to and each system keeps a [`ZOrderRegistry`] of its entities.
//! Every add and remove path in this module updates both sides in one call,
//! and every removal runs the system's cleanup hook exactly once per pair.

use std::any::type_name;

use indexmap::IndexMap;

use ember_core::event::Event;
use ember_core::profiling::profile_function;

use crate::entity::{Entities, Entity, EntityId};
use crate::error::EntityError;
use crate::registry::ZOrderRegistry;
use crate::system::{DrawTarget, System, SystemContext, SystemId};

struct SystemSlot {
    system: Box<dyn System>,
    registry: ZOrderRegistry,
}

#[derive(Default)]
pub struct World {
    entities: Entities,
    systems: IndexMap<SystemId, SystemSlot>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Entities and the entity tree
    // ------------------------------------------------------------------

    /// Creates a root entity.
    pub fn spawn(&mut self) -> EntityId {
        self.spawn_named("")
    }

    pub fn spawn_named(&mut self, name: impl Into<String>) -> EntityId {
        let id = self.entities.insert(Entity::new(name));
        tracing::trace!("spawned entity {}", id);
        id
    }

    /// Creates an entity and attaches it to `parent` under `name`.
    pub fn spawn_child(&mut self, parent: EntityId, name: &str) -> Result<EntityId, EntityError> {
        let parent_entity = self
            .entities
            .get(parent)
            .ok_or(EntityError::UnknownEntity { id: parent })?;
        if parent_entity.child(name).is_some() {
            return Err(EntityError::DuplicateChild {
                parent,
                name: name.to_string(),
            });
        }
        let child = self.spawn_named(name);
        self.add_child(parent, child)?;
        Ok(child)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains(id)
    }

    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.entities.get(id).and_then(Entity::parent)
    }

    /// Walks up to the topmost ancestor. A root is its own root.
    pub fn root(&self, id: EntityId) -> Option<EntityId> {
        let mut current = self.entities.get(id)?;
        while let Some(parent) = current.parent().and_then(|p| self.entities.get(p)) {
            current = parent;
        }
        Some(current.id())
    }

    pub fn children(&self, id: EntityId) -> Vec<EntityId> {
        self.entities
            .get(id)
            .map(|entity| entity.children().values().copied().collect())
            .unwrap_or_default()
    }

    fn is_ancestor(&self, ancestor: EntityId, of: EntityId) -> bool {
        let mut current = Some(of);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Attaches `child` to `parent` under the child's name, detaching it from
    /// any previous parent. The child and its whole subtree move to the
    /// parent's z-order plus one, in every system they belong to.
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), EntityError> {
        let name = self
            .entities
            .get(child)
            .ok_or(EntityError::UnknownEntity { id: child })?
            .name()
            .to_string();
        let parent_entity = self
            .entities
            .get(parent)
            .ok_or(EntityError::UnknownEntity { id: parent })?;
        if self.is_ancestor(child, parent) {
            return Err(EntityError::Cycle { parent, child });
        }
        if let Some(existing) = parent_entity.child(&name) {
            if existing == child {
                return Ok(());
            }
            return Err(EntityError::DuplicateChild { parent, name });
        }
        let order = parent_entity.order() + 1;

        self.detach(child);
        if let Some(parent_entity) = self.entities.get_mut(parent) {
            parent_entity.insert_child(name, child);
        }
        if let Some(child_entity) = self.entities.get_mut(child) {
            child_entity.set_parent(Some(parent));
        }
        self.reorder(child, order);
        Ok(())
    }

    /// Unlinks `id` from its parent, leaving the parent's map and the
    /// child's back-link consistent. Orders are not touched.
    fn detach(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get_mut(id) else {
            return;
        };
        let Some(parent) = entity.parent() else {
            return;
        };
        entity.set_parent(None);
        let name = entity.name().to_string();
        if let Some(parent_entity) = self.entities.get_mut(parent) {
            parent_entity.remove_child(&name);
        }
    }

    /// Sets the z-order of `id` and its descendants, re-bucketing them in
    /// every system they belong to.
    fn reorder(&mut self, id: EntityId, order: u32) {
        let mut pending = vec![(id, order)];
        while let Some((id, order)) = pending.pop() {
            let Some(entity) = self.entities.get_mut(id) else {
                continue;
            };
            if entity.order() != order {
                entity.set_order(order);
                for system in entity.systems() {
                    if let Some(slot) = self.systems.get_mut(system) {
                        slot.registry.remove(id);
                        slot.registry.insert(order, id);
                    }
                }
            }
            pending.extend(entity.children().values().map(|&child| (child, order + 1)));
        }
    }

    /// Detaches the named child and makes it a root.
    pub fn detach_child(&mut self, parent: EntityId, name: &str) -> Option<EntityId> {
        let child = self.entities.get(parent)?.child(name)?;
        self.detach(child);
        self.reorder(child, 0);
        Some(child)
    }

    /// Destroys the named child and its subtree.
    pub fn drop_child(&mut self, parent: EntityId, name: &str) -> bool {
        match self.entities.get(parent).and_then(|entity| entity.child(name)) {
            Some(child) => self.despawn(child),
            None => {
                tracing::warn!("entity {} has no child named '{}'", parent, name);
                false
            }
        }
    }

    pub fn drop_all_children(&mut self, parent: EntityId) {
        for child in self.children(parent) {
            self.despawn(child);
        }
    }

    /// Destroys an entity: children first, then every system membership,
    /// then the link from its parent.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        if !self.entities.contains(id) {
            tracing::warn!("despawn: unknown entity {}", id);
            return false;
        }
        self.drop_all_children(id);
        self.drop_all_systems(id);
        self.detach(id);
        self.entities.remove(id);
        tracing::trace!("despawned entity {}", id);
        true
    }

    // ------------------------------------------------------------------
    // Systems
    // ------------------------------------------------------------------

    /// Registers a system. Systems are dispatched in registration order.
    pub fn add_system(&mut self, system: impl System) -> Result<(), EntityError> {
        let id = system.id();
        if self.systems.contains_key(id) {
            tracing::error!("system '{}' is already registered", id);
            return Err(EntityError::DuplicateSystem { id });
        }
        tracing::debug!("registered system '{}'", id);
        self.systems.insert(
            id,
            SystemSlot {
                system: Box::new(system),
                registry: ZOrderRegistry::new(),
            },
        );
        Ok(())
    }

    /// Drops every entity from the system, then unregisters it.
    pub fn remove_system(&mut self, id: SystemId) -> Option<Box<dyn System>> {
        if !self.systems.contains_key(id) {
            return None;
        }
        self.drop_all_entities(id);
        self.systems.shift_remove(id).map(|slot| slot.system)
    }

    pub fn has_system(&self, id: SystemId) -> bool {
        self.systems.contains_key(id)
    }

    pub fn system_ids(&self) -> impl Iterator<Item = SystemId> + '_ {
        self.systems.keys().copied()
    }

    /// Looks a system up by its concrete type.
    pub fn system<S: System>(&self) -> Option<&S> {
        self.systems
            .values()
            .find_map(|slot| slot.system.as_any().downcast_ref::<S>())
    }

    pub fn system_mut<S: System>(&mut self) -> Option<&mut S> {
        self.systems
            .values_mut()
            .find_map(|slot| slot.system.as_any_mut().downcast_mut::<S>())
    }

    pub fn registry(&self, id: SystemId) -> Option<&ZOrderRegistry> {
        self.systems.get(id).map(|slot| &slot.registry)
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    /// Registers `entity` with `system`: files it under its current z-order,
    /// adds the system's properties, records the membership on the entity
    /// and runs the init hook.
    ///
    /// Returns the entity id, or [`EntityId::NONE`] if either side is
    /// unknown or the entity is already registered.
    pub fn add_entity(&mut self, system: SystemId, entity: EntityId) -> EntityId {
        profile_function!();
        let Some(slot) = self.systems.get_mut(system) else {
            tracing::error!("add_entity: unknown system '{}'", system);
            return EntityId::NONE;
        };
        let Some(target) = self.entities.get_mut(entity) else {
            tracing::error!("add_entity: unknown entity {}", entity);
            return EntityId::NONE;
        };
        if !slot.registry.insert(target.order(), entity) {
            tracing::warn!("entity {} is already registered with '{}'", entity, system);
            return EntityId::NONE;
        }
        slot.system.add_properties(target);
        target.insert_system(system);
        slot.system.handle_init(target);
        entity
    }

    /// Entity-side spelling of [`World::add_entity`].
    pub fn add_system_to(&mut self, entity: EntityId, system: SystemId) -> bool {
        self.add_entity(system, entity).is_some()
    }

    /// Scans every z-order bucket of the system.
    pub fn has_entity(&self, system: SystemId, entity: EntityId) -> bool {
        self.systems
            .get(system)
            .is_some_and(|slot| slot.registry.contains(entity))
    }

    /// Systems the entity is registered with, in name order.
    pub fn systems_of(&self, entity: EntityId) -> Vec<SystemId> {
        self.entities
            .get(entity)
            .map(|target| target.systems().collect())
            .unwrap_or_default()
    }

    /// Entities of the system, in dispatch order.
    pub fn entities_of(&self, system: SystemId) -> Vec<EntityId> {
        self.systems
            .get(system)
            .map(|slot| slot.registry.iter().collect())
            .unwrap_or_default()
    }

    pub fn entity_has_system(&self, entity: EntityId, system: SystemId) -> bool {
        self.entities
            .get(entity)
            .is_some_and(|target| target.has_system(system))
    }

    /// Erases one membership pair: out of the registry, cleanup hook, off
    /// the entity's set.
    fn erase(&mut self, system: SystemId, entity: EntityId) -> bool {
        let Some(slot) = self.systems.get_mut(system) else {
            return false;
        };
        if slot.registry.remove(entity).is_none() {
            return false;
        }
        if let Some(target) = self.entities.get_mut(entity) {
            slot.system.handle_cleanup(target);
            target.remove_system(system);
        }
        true
    }

    /// Removes `entity` from `system`.
    pub fn drop_entity(&mut self, system: SystemId, entity: EntityId) -> bool {
        let erased = self.erase(system, entity);
        if !erased {
            tracing::warn!("drop_entity: {} is not in '{}'", entity, system);
        }
        erased
    }

    pub fn drop_all_entities(&mut self, system: SystemId) {
        let Some(slot) = self.systems.get(system) else {
            tracing::warn!("drop_all_entities: unknown system '{}'", system);
            return;
        };
        let ids: Vec<EntityId> = slot.registry.iter().collect();
        for entity in ids {
            self.erase(system, entity);
        }
    }

    /// Entity-side spelling of [`World::drop_entity`].
    pub fn drop_system(&mut self, entity: EntityId, system: SystemId) -> bool {
        self.drop_entity(system, entity)
    }

    pub fn drop_all_systems(&mut self, entity: EntityId) {
        let systems: Vec<SystemId> = match self.entities.get(entity) {
            Some(target) => target.systems().collect(),
            None => return,
        };
        for system in systems {
            self.erase(system, entity);
        }
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    pub fn handle_event(&mut self, event: &Event) {
        for slot in self.systems.values_mut() {
            slot.system.handle_event(event);
        }
    }

    pub fn update_fixed(&mut self) {
        profile_function!();
        for slot in self.systems.values_mut() {
            slot.system
                .update_fixed(SystemContext::new(&slot.registry, &mut self.entities));
        }
    }

    pub fn update_variable(&mut self, elapsed: f32) {
        profile_function!();
        for slot in self.systems.values_mut() {
            slot.system
                .update_variable(SystemContext::new(&slot.registry, &mut self.entities), elapsed);
        }
    }

    pub fn draw(&mut self, target: &mut dyn DrawTarget) {
        profile_function!();
        for slot in self.systems.values_mut() {
            slot.system
                .draw(SystemContext::new(&slot.registry, &mut self.entities), target);
        }
    }

    /// Destroys every entity, then every system.
    pub fn clear(&mut self) {
        let roots: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|entity| entity.is_root())
            .map(Entity::id)
            .collect();
        for root in roots {
            self.despawn(root);
        }
        let systems: Vec<SystemId> = self.systems.keys().copied().collect();
        for system in systems {
            self.remove_system(system);
        }
    }
}

impl Drop for World {
    fn drop(&mut self) {
        if !self.entities.is_empty() || !self.systems.is_empty() {
            tracing::trace!(
                "{} dropping {} entities and {} systems",
                type_name::<Self>(),
                self.entities.len(),
                self.systems.len()
            );
            self.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records hook calls so tests can check both sides of every membership.
    #[derive(Default)]
    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl System for Recorder {
        fn id(&self) -> SystemId {
            "Recorder"
        }

        fn add_properties(&mut self, entity: &mut Entity) {
            entity.properties.add("uVisits", 0u32);
        }

        fn handle_init(&mut self, entity: &mut Entity) {
            self.log.borrow_mut().push(format!("init {}", entity.name()));
        }

        fn handle_cleanup(&mut self, entity: &mut Entity) {
            self.log.borrow_mut().push(format!("cleanup {}", entity.name()));
        }

        fn update_fixed(&mut self, mut ctx: SystemContext<'_>) {
            let log = Rc::clone(&self.log);
            ctx.for_each(|entity| {
                if let Some(visits) = entity.properties.get_mut::<u32>("uVisits") {
                    *visits += 1;
                }
                log.borrow_mut().push(format!("visit {}", entity.name()));
            });
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    fn world_with_recorder() -> (World, Rc<RefCell<Vec<String>>>) {
        let recorder = Recorder::default();
        let log = Rc::clone(&recorder.log);
        let mut world = World::new();
        world.add_system(recorder).unwrap();
        (world, log)
    }

    #[test]
    fn duplicate_system_is_rejected() {
        let (mut world, _) = world_with_recorder();
        assert_eq!(
            world.add_system(Recorder::default()),
            Err(EntityError::DuplicateSystem { id: "Recorder" })
        );
        assert_eq!(world.system_ids().count(), 1);
        assert!(world.system::<Recorder>().is_some());
    }

    #[test]
    fn add_entity_records_both_sides() {
        let (mut world, log) = world_with_recorder();
        let ship = world.spawn_named("ship");

        assert_eq!(world.add_entity("Recorder", ship), ship);
        assert!(world.has_entity("Recorder", ship));
        assert!(world.entity_has_system(ship, "Recorder"));
        assert_eq!(world.systems_of(ship), ["Recorder"]);
        assert_eq!(world.entities_of("Recorder"), [ship]);
        assert!(world.entity(ship).unwrap().properties.has_id("uVisits"));

        assert!(world.add_entity("Recorder", ship).is_none());
        assert!(world.add_entity("Missing", ship).is_none());
        assert!(world.add_entity("Recorder", EntityId::NONE).is_none());
        assert_eq!(*log.borrow(), ["init ship"]);
    }

    #[test]
    fn drop_entity_cleans_up_once() {
        let (mut world, log) = world_with_recorder();
        let ship = world.spawn_named("ship");
        world.add_system_to(ship, "Recorder");

        assert!(world.drop_system(ship, "Recorder"));
        assert!(!world.drop_entity("Recorder", ship));
        assert!(!world.has_entity("Recorder", ship));
        assert!(!world.entity_has_system(ship, "Recorder"));
        assert_eq!(*log.borrow(), ["init ship", "cleanup ship"]);
    }

    #[test]
    fn despawn_removes_subtree_and_memberships() {
        let (mut world, log) = world_with_recorder();
        let ship = world.spawn_named("ship");
        let turret = world.spawn_child(ship, "turret").unwrap();
        world.add_entity("Recorder", ship);
        world.add_entity("Recorder", turret);

        assert!(world.despawn(ship));
        assert!(!world.contains(ship));
        assert!(!world.contains(turret));
        assert!(world.registry("Recorder").unwrap().is_empty());
        assert_eq!(world.entity_count(), 0);
        assert_eq!(
            *log.borrow(),
            ["init ship", "init turret", "cleanup turret", "cleanup ship"]
        );
    }

    #[test]
    fn children_sit_one_level_above_their_parent() {
        let mut world = World::new();
        let root = world.spawn_named("root");
        let child = world.spawn_child(root, "child").unwrap();
        let grandchild = world.spawn_child(child, "grandchild").unwrap();

        assert_eq!(world.entity(root).unwrap().order(), 0);
        assert_eq!(world.entity(child).unwrap().order(), 1);
        assert_eq!(world.entity(grandchild).unwrap().order(), 2);
        assert_eq!(world.root(grandchild), Some(root));
        assert_eq!(world.parent(grandchild), Some(child));
        assert_eq!(world.children(root), [child]);
    }

    #[test]
    fn reparenting_moves_registry_buckets() {
        let (mut world, _) = world_with_recorder();
        let a = world.spawn_named("a");
        let b = world.spawn_named("b");
        let c = world.spawn_child(b, "c").unwrap();
        world.add_entity("Recorder", c);
        assert_eq!(world.registry("Recorder").unwrap().order_of(c), Some(1));

        let deep = world.spawn_child(a, "deep").unwrap();
        world.add_child(deep, b).unwrap();

        assert_eq!(world.entity(b).unwrap().order(), 2);
        assert_eq!(world.registry("Recorder").unwrap().order_of(c), Some(3));
        assert_eq!(world.root(c), Some(a));
    }

    #[test]
    fn add_child_rejects_cycles_and_name_clashes() {
        let mut world = World::new();
        let root = world.spawn_named("root");
        let child = world.spawn_child(root, "child").unwrap();
        let other = world.spawn_named("child");

        assert_eq!(
            world.add_child(child, root),
            Err(EntityError::Cycle {
                parent: child,
                child: root
            })
        );
        assert_eq!(
            world.add_child(root, other),
            Err(EntityError::DuplicateChild {
                parent: root,
                name: "child".to_string()
            })
        );
        assert!(matches!(
            world.spawn_child(root, "child"),
            Err(EntityError::DuplicateChild { .. })
        ));
        assert_eq!(world.add_child(root, child), Ok(()));
    }

    #[test]
    fn detach_child_makes_a_root() {
        let mut world = World::new();
        let root = world.spawn_named("root");
        let child = world.spawn_child(root, "child").unwrap();

        assert_eq!(world.detach_child(root, "child"), Some(child));
        assert!(world.entity(child).unwrap().is_root());
        assert_eq!(world.entity(child).unwrap().order(), 0);
        assert!(world.children(root).is_empty());
        assert!(!world.drop_child(root, "child"));
    }

    #[test]
    fn remove_system_clears_entity_memberships() {
        let (mut world, log) = world_with_recorder();
        let ship = world.spawn_named("ship");
        world.add_entity("Recorder", ship);

        assert!(world.remove_system("Recorder").is_some());
        assert!(!world.entity_has_system(ship, "Recorder"));
        assert!(!world.has_system("Recorder"));
        assert_eq!(log.borrow().last().map(String::as_str), Some("cleanup ship"));
    }

    #[test]
    fn fixed_update_visits_in_z_order() {
        let (mut world, log) = world_with_recorder();
        let top = world.spawn_named("top");
        let mid = world.spawn_named("mid");
        let low = world.spawn_named("low");
        world.entity_mut(top).unwrap().set_order(2);
        world.entity_mut(mid).unwrap().set_order(1);
        for id in [top, low, mid] {
            world.add_entity("Recorder", id);
        }
        log.borrow_mut().clear();

        world.update_fixed();

        assert_eq!(*log.borrow(), ["visit low", "visit mid", "visit top"]);
        assert_eq!(world.entity(top).unwrap().properties.get::<u32>("uVisits"), 1);
    }

    #[test]
    fn clear_runs_every_cleanup() {
        let (mut world, log) = world_with_recorder();
        let a = world.spawn_named("a");
        world.spawn_child(a, "b").unwrap();
        world.add_entity("Recorder", a);

        world.clear();

        assert_eq!(world.entity_count(), 0);
        assert!(!world.has_system("Recorder"));
        assert!(log.borrow().iter().any(|entry| entry == "cleanup a"));
    }
}
