//! Asset events for change detection.

use crate::policy::AssetId;

/// Events emitted by asset handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetEvent {
    /// A load routine succeeded.
    Loaded {
        id: AssetId,
        type_name: &'static str,
    },

    /// A record was released and removed.
    Evicted {
        id: AssetId,
        type_name: &'static str,
    },

    /// A load routine failed; the placeholder stays in use.
    LoadFailed {
        id: AssetId,
        type_name: &'static str,
        error: String,
    },
}

impl AssetEvent {
    pub fn id(&self) -> &AssetId {
        match self {
            AssetEvent::Loaded { id, .. } => id,
            AssetEvent::Evicted { id, .. } => id,
            AssetEvent::LoadFailed { id, .. } => id,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            AssetEvent::Loaded { type_name, .. } => type_name,
            AssetEvent::Evicted { type_name, .. } => type_name,
            AssetEvent::LoadFailed { type_name, .. } => type_name,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, AssetEvent::Loaded { .. })
    }

    pub fn is_evicted(&self) -> bool {
        matches!(self, AssetEvent::Evicted { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AssetEvent::LoadFailed { .. })
    }
}

/// A buffer of asset events that can be drained each frame.
#[derive(Debug, Default)]
pub struct AssetEventBuffer {
    events: Vec<AssetEvent>,
}

impl AssetEventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: AssetEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = AssetEvent> + '_ {
        self.events.drain(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
