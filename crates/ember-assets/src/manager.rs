//! Registry of asset handlers, one per asset type.

use std::any::{Any, TypeId};

use ember_core::alloc::HashMap;

use crate::Asset;
use crate::error::{AssetError, AssetResult};
use crate::event::AssetEvent;
use crate::handle::Handle;
use crate::handler::AssetHandler;
use crate::policy::{AssetId, AssetPolicy};

/// Type-erased view of an [`AssetHandler`] for the registry.
trait ErasedHandler {
    fn type_name(&self) -> &'static str;

    fn len(&self) -> usize;

    fn release_all(&self) -> usize;

    fn take_events(&self) -> Vec<AssetEvent>;

    fn as_any(&self) -> &dyn Any;
}

impl<T: Asset> ErasedHandler for AssetHandler<T> {
    fn type_name(&self) -> &'static str {
        T::type_name()
    }

    fn len(&self) -> usize {
        AssetHandler::len(self)
    }

    fn release_all(&self) -> usize {
        AssetHandler::release_all(self)
    }

    fn take_events(&self) -> Vec<AssetEvent> {
        AssetHandler::take_events(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Routes asset requests to the handler registered for each type.
///
/// # Example
///
/// ```
/// use ember_assets::{AssetHandler, AssetManager, TextLoader};
///
/// let mut assets = AssetManager::new();
/// assets.register_handler(AssetHandler::new(TextLoader)).unwrap();
///
/// let texts = assets.get_handler::<String>().unwrap();
/// assert!(texts.is_empty());
/// assert!(assets.get_handler::<Vec<u8>>().is_err());
/// ```
#[derive(Default)]
pub struct AssetManager {
    handlers: HashMap<TypeId, Box<dyn ErasedHandler>>,
}

impl AssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of the handler for `T`. A second handler for the same
    /// type is rejected and the first one stays in place.
    pub fn register_handler<T: Asset>(&mut self, handler: AssetHandler<T>) -> AssetResult<()> {
        let type_id = TypeId::of::<T>();
        if self.handlers.contains_key(&type_id) {
            tracing::error!("Handler for {} already registered", T::type_name());
            return Err(AssetError::DuplicateHandler {
                type_name: T::type_name(),
            });
        }
        tracing::debug!("Registered asset handler for {}", T::type_name());
        self.handlers.insert(type_id, Box::new(handler));
        Ok(())
    }

    /// The handler for `T`, or [`AssetError::NoHandler`] if none was
    /// registered.
    pub fn get_handler<T: Asset>(&self) -> AssetResult<AssetHandler<T>> {
        self.handlers
            .get(&TypeId::of::<T>())
            .and_then(|handler| handler.as_any().downcast_ref::<AssetHandler<T>>())
            .cloned()
            .ok_or_else(|| {
                tracing::error!("No handler registered for {}", T::type_name());
                AssetError::NoHandler {
                    type_name: T::type_name(),
                }
            })
    }

    pub fn has_handler<T: Asset>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<T>())
    }

    /// Shorthand for `Handle::new(&self.get_handler::<T>()?, id)`.
    pub fn handle<T: Asset>(&self, id: impl Into<AssetId>) -> AssetResult<Handle<T>> {
        Ok(Handle::new(&self.get_handler::<T>()?, id))
    }

    pub fn handle_with_policy<T: Asset>(
        &self,
        id: impl Into<AssetId>,
        policy: AssetPolicy,
    ) -> AssetResult<Handle<T>> {
        Ok(Handle::with_policy(&self.get_handler::<T>()?, id, policy))
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Total number of records across all handlers.
    pub fn asset_count(&self) -> usize {
        self.handlers.values().map(|handler| handler.len()).sum()
    }

    /// Collects the events every handler recorded since the last call.
    pub fn drain_events(&self) -> Vec<AssetEvent> {
        self.handlers
            .values()
            .flat_map(|handler| handler.take_events())
            .collect()
    }

    /// Releases every record in every handler, including pinned ones.
    pub fn shutdown(&self) {
        for handler in self.handlers.values() {
            let released = handler.release_all();
            if released > 0 {
                tracing::debug!("Released {} {} assets", released, handler.type_name());
            }
        }
    }
}
