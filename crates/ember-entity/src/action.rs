//! Named behaviors switched on and off per entity.
//!
//! Actions live in a shared [`ActionCatalog`] owned by the action system.
//! Each entity carries an [`ActionGroup`] under the `"Actions"` property that
//! references catalog entries and tracks which of them are active.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::entity::Entity;

/// Property key of the per-entity [`ActionGroup`].
pub const ACTIONS_PROPERTY: &str = "Actions";

/// A behavior run against an entity once per fixed update while active.
pub trait Action {
    fn id(&self) -> &str;

    fn do_action(&self, entity: &mut Entity);
}

/// Shared registry of actions, keyed by id.
///
/// Cloning yields another handle to the same catalog.
#[derive(Clone, Default)]
pub struct ActionCatalog {
    actions: Rc<RefCell<IndexMap<String, Rc<dyn Action>>>>,
}

impl ActionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action under its id. The first registration wins.
    pub fn add_action(&self, action: impl Action + 'static) -> bool {
        let id = action.id().to_string();
        let mut actions = self.actions.borrow_mut();
        if actions.contains_key(&id) {
            tracing::warn!("action '{}' is already registered", id);
            return false;
        }
        tracing::debug!("registered action '{}'", id);
        actions.insert(id, Rc::new(action));
        true
    }

    pub fn get(&self, id: &str) -> Option<Rc<dyn Action>> {
        self.actions.borrow().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.actions.borrow().contains_key(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.actions.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.actions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.borrow().is_empty()
    }
}

impl fmt::Debug for ActionCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.actions.borrow().keys()).finish()
    }
}

#[derive(Clone)]
struct Slot {
    action: Rc<dyn Action>,
    active: bool,
}

/// The actions one entity may run.
///
/// Every id is either active or disabled, never both, because the state is
/// a single flag per entry. Entries keep the order they were added in, which
/// is also the order active actions run in.
#[derive(Clone, Default)]
pub struct ActionGroup {
    catalog: Option<ActionCatalog>,
    actions: IndexMap<String, Slot>,
}

impl ActionGroup {
    pub fn new(catalog: ActionCatalog) -> Self {
        Self {
            catalog: Some(catalog),
            actions: IndexMap::new(),
        }
    }

    pub fn set_catalog(&mut self, catalog: ActionCatalog) {
        self.catalog = Some(catalog);
    }

    /// Looks `id` up in the catalog and adds it disabled.
    pub fn add(&mut self, id: &str) -> bool {
        if self.actions.contains_key(id) {
            tracing::warn!("action '{}' is already in this group", id);
            return false;
        }
        let Some(action) = self.catalog.as_ref().and_then(|catalog| catalog.get(id)) else {
            tracing::error!("action '{}' is not registered", id);
            return false;
        };
        self.actions.insert(
            id.to_string(),
            Slot {
                action,
                active: false,
            },
        );
        true
    }

    /// Removes `id` from whichever set holds it.
    pub fn drop_action(&mut self, id: &str) -> bool {
        self.actions.shift_remove(id).is_some()
    }

    /// Moves `id` to the active set. Already active ids are left alone.
    pub fn activate(&mut self, id: &str) -> bool {
        match self.actions.get_mut(id) {
            Some(slot) => {
                slot.active = true;
                true
            }
            None => {
                tracing::warn!("cannot activate '{}': not in this group", id);
                false
            }
        }
    }

    pub fn disable(&mut self, id: &str) -> bool {
        match self.actions.get_mut(id) {
            Some(slot) => {
                slot.active = false;
                true
            }
            None => {
                tracing::warn!("cannot disable '{}': not in this group", id);
                false
            }
        }
    }

    /// In the group at all, active or not.
    pub fn is_available(&self, id: &str) -> bool {
        self.actions.contains_key(id)
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.actions.get(id).is_some_and(|slot| slot.active)
    }

    pub fn active_ids(&self) -> impl Iterator<Item = &str> {
        self.actions
            .iter()
            .filter(|(_, slot)| slot.active)
            .map(|(id, _)| id.as_str())
    }

    pub fn disabled_ids(&self) -> impl Iterator<Item = &str> {
        self.actions
            .iter()
            .filter(|(_, slot)| !slot.active)
            .map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Runs every active action of `entity` once.
    ///
    /// The active set is captured before the first action runs. An action
    /// may activate, disable or drop entries of its own group; entries it
    /// disables or drops are skipped for the rest of this call, and entries
    /// it activates wait for the next one.
    pub fn do_actions(entity: &mut Entity) {
        let pending: Vec<(String, Rc<dyn Action>)> =
            match entity.properties.get_ref::<ActionGroup>(ACTIONS_PROPERTY) {
                Some(group) => group
                    .actions
                    .iter()
                    .filter(|(_, slot)| slot.active)
                    .map(|(id, slot)| (id.clone(), Rc::clone(&slot.action)))
                    .collect(),
                None => return,
            };

        for (id, action) in pending {
            let still_active = entity
                .properties
                .get_ref::<ActionGroup>(ACTIONS_PROPERTY)
                .is_some_and(|group| group.is_active(&id));
            if still_active {
                action.do_action(entity);
            }
        }
    }
}

impl fmt::Debug for ActionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionGroup")
            .field("active", &self.active_ids().collect::<Vec<_>>())
            .field("disabled", &self.disabled_ids().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Count(&'static str);

    impl Action for Count {
        fn id(&self) -> &str {
            self.0
        }

        fn do_action(&self, entity: &mut Entity) {
            if let Some(count) = entity.properties.get_mut::<u32>(self.0) {
                *count += 1;
            }
        }
    }

    fn catalog() -> ActionCatalog {
        let catalog = ActionCatalog::new();
        catalog.add_action(Count("left"));
        catalog.add_action(Count("right"));
        catalog
    }

    #[test]
    fn catalog_rejects_duplicate_ids() {
        let catalog = catalog();
        assert!(!catalog.add_action(Count("left")));
        assert_eq!(catalog.ids(), ["left", "right"]);
    }

    #[test]
    fn actions_start_disabled() {
        let mut group = ActionGroup::new(catalog());
        assert!(group.add("left"));
        assert!(group.is_available("left"));
        assert!(!group.is_active("left"));
        assert!(!group.add("left"));
        assert!(!group.add("jump"));
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn activate_and_disable_keep_sets_disjoint() {
        let mut group = ActionGroup::new(catalog());
        group.add("left");
        group.add("right");

        group.activate("left");
        group.activate("left");
        assert_eq!(group.active_ids().collect::<Vec<_>>(), ["left"]);
        assert_eq!(group.disabled_ids().collect::<Vec<_>>(), ["right"]);

        group.disable("left");
        assert_eq!(group.active_ids().count(), 0);
        assert_eq!(group.disabled_ids().collect::<Vec<_>>(), ["left", "right"]);

        assert!(group.drop_action("left"));
        assert!(!group.is_available("left"));
        assert!(!group.activate("left"));
    }

    #[test]
    fn group_without_catalog_accepts_nothing() {
        let mut group = ActionGroup::default();
        assert!(!group.add("left"));
        group.set_catalog(catalog());
        assert!(group.add("left"));
    }
}
