use std::fmt;

use crate::entity::EntityId;
use crate::system::SystemId;

/// Errors from structural [`World`](crate::World) operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    UnknownEntity { id: EntityId },
    UnknownSystem { id: SystemId },
    DuplicateSystem { id: SystemId },
    /// The parent already has a child under this name.
    DuplicateChild { parent: EntityId, name: String },
    /// Attaching the child would make an entity its own ancestor.
    Cycle { parent: EntityId, child: EntityId },
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::UnknownEntity { id } => write!(f, "Unknown entity: {}", id),
            EntityError::UnknownSystem { id } => write!(f, "Unknown system: {}", id),
            EntityError::DuplicateSystem { id } => write!(f, "System already registered: {}", id),
            EntityError::DuplicateChild { parent, name } => {
                write!(f, "Entity {} already has a child named '{}'", parent, name)
            }
            EntityError::Cycle { parent, child } => {
                write!(f, "Entity {} is an ancestor of {}", child, parent)
            }
        }
    }
}

impl std::error::Error for EntityError {}
