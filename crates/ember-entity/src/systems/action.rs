use std::any::Any;

use crate::action::{ACTIONS_PROPERTY, Action, ActionCatalog, ActionGroup};
use crate::entity::Entity;
use crate::system::{System, SystemContext, SystemId};

/// Runs each entity's active actions once per fixed update.
///
/// Owns the [`ActionCatalog`]; every registered entity gets an
/// [`ActionGroup`] bound to it.
#[derive(Debug, Default)]
pub struct ActionSystem {
    catalog: ActionCatalog,
}

impl ActionSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_action(&mut self, action: impl Action + 'static) -> bool {
        self.catalog.add_action(action)
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }
}

impl System for ActionSystem {
    fn id(&self) -> SystemId {
        "ActionSystem"
    }

    fn add_properties(&mut self, entity: &mut Entity) {
        entity
            .properties
            .add(ACTIONS_PROPERTY, ActionGroup::new(self.catalog.clone()));
    }

    fn update_fixed(&mut self, mut ctx: SystemContext<'_>) {
        ctx.for_each(ActionGroup::do_actions);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
