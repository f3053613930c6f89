//! Reference-counted asset cache.
//!
//! One [`AssetHandler`] per asset type owns the records for that type, keyed
//! by [`AssetId`]. [`Handle`]s are RAII references into a handler: creating
//! one acquires a reference, dropping it releases the reference, and a
//! record whose count reaches zero is evicted unless it is pinned with
//! [`DropTime::AtExit`]. The [`AssetManager`] routes requests to the handler
//! registered for each type.

pub mod config;
pub mod error;
pub mod event;
pub mod handle;
pub mod handler;
pub mod io;
pub mod loader;
pub mod loaders;
pub mod manager;
pub mod policy;
pub mod record;

pub use config::ConfigReader;
pub use error::{AssetError, AssetResult};
pub use event::{AssetEvent, AssetEventBuffer};
pub use handle::Handle;
pub use handler::AssetHandler;
pub use io::{FileReader, MemoryReader};
pub use loader::{AssetLoader, LoadContext};
pub use loaders::{BytesLoader, ConfigLoader, TextLoader};
pub use manager::AssetManager;
pub use policy::{AssetId, AssetPolicy, DropTime, LoadStyle, LoadTime};
pub use record::AssetRecord;

/// Types that can be cached by an [`AssetHandler`].
///
/// `Default` provides the placeholder served while the real resource is not
/// loaded, so callers always get something usable back.
pub trait Asset: Default + 'static {
    /// Human-readable name used in log messages.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl Asset for String {
    fn type_name() -> &'static str {
        "String"
    }
}

impl Asset for Vec<u8> {
    fn type_name() -> &'static str {
        "Bytes"
    }
}
