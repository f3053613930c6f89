//! Load strategies.

use std::path::Path;

use crate::error::{AssetError, AssetResult};
use crate::policy::{AssetId, LoadStyle};

/// Context provided to a loader for one load attempt.
pub struct LoadContext<'a> {
    /// The asset being loaded.
    pub id: &'a AssetId,
    /// Resolved file path for file loads, the id otherwise.
    pub path: &'a Path,
    /// The raw bytes of the asset.
    pub bytes: &'a [u8],
}

impl<'a> LoadContext<'a> {
    pub fn new(id: &'a AssetId, path: &'a Path, bytes: &'a [u8]) -> Self {
        Self { id, path, bytes }
    }

    /// Decode the bytes as UTF-8 text.
    pub fn text(&self) -> AssetResult<&'a str> {
        std::str::from_utf8(self.bytes).map_err(|e| AssetError::LoaderError {
            path: self.path.display().to_string(),
            message: format!("Invalid UTF-8: {}", e),
        })
    }
}

/// Builds a `T` for an [`AssetHandler<T>`](crate::AssetHandler).
///
/// Only file loading is mandatory. Memory and network loading report
/// [`AssetError::Unsupported`] unless overridden; the handler logs the error
/// and keeps serving the placeholder.
///
/// # Example
///
/// ```
/// use ember_assets::{AssetLoader, AssetResult, LoadContext};
///
/// struct LineCount;
///
/// impl AssetLoader<String> for LineCount {
///     fn load_from_file(&self, ctx: &LoadContext<'_>) -> AssetResult<String> {
///         Ok(ctx.text()?.lines().count().to_string())
///     }
/// }
/// ```
pub trait AssetLoader<T>: 'static {
    fn load_from_file(&self, ctx: &LoadContext<'_>) -> AssetResult<T>;

    fn load_from_memory(&self, ctx: &LoadContext<'_>) -> AssetResult<T> {
        Err(AssetError::Unsupported {
            id: ctx.id.to_string(),
            style: LoadStyle::Memory,
        })
    }

    fn load_from_network(&self, id: &AssetId) -> AssetResult<T> {
        Err(AssetError::Unsupported {
            id: id.to_string(),
            style: LoadStyle::Network,
        })
    }
}
