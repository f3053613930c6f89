//! Built-in loaders for text, raw bytes and configuration files.

use crate::config::ConfigReader;
use crate::error::AssetResult;
use crate::loader::{AssetLoader, LoadContext};

/// Loads UTF-8 text.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextLoader;

impl AssetLoader<String> for TextLoader {
    fn load_from_file(&self, ctx: &LoadContext<'_>) -> AssetResult<String> {
        Ok(ctx.text()?.to_string())
    }

    fn load_from_memory(&self, ctx: &LoadContext<'_>) -> AssetResult<String> {
        self.load_from_file(ctx)
    }
}

/// Loads raw bytes unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct BytesLoader;

impl AssetLoader<Vec<u8>> for BytesLoader {
    fn load_from_file(&self, ctx: &LoadContext<'_>) -> AssetResult<Vec<u8>> {
        Ok(ctx.bytes.to_vec())
    }

    fn load_from_memory(&self, ctx: &LoadContext<'_>) -> AssetResult<Vec<u8>> {
        Ok(ctx.bytes.to_vec())
    }
}

/// Loads [`ConfigReader`] files.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigLoader;

impl AssetLoader<ConfigReader> for ConfigLoader {
    fn load_from_file(&self, ctx: &LoadContext<'_>) -> AssetResult<ConfigReader> {
        Ok(ConfigReader::parse(ctx.text()?))
    }

    fn load_from_memory(&self, ctx: &LoadContext<'_>) -> AssetResult<ConfigReader> {
        self.load_from_file(ctx)
    }
}
