//! Plugins extend the game at startup.
//!
//! A plugin gets the [`GameContext`] before the settings are read and the
//! platform opens, which is where asset handlers are registered. Plugins
//! are built in the order they were added.

use std::any::type_name;
use std::path::PathBuf;

use ember_assets::{AssetHandler, BytesLoader, ConfigLoader, TextLoader};

use crate::error::GameResult;
use crate::game::GameContext;

pub trait Plugin: 'static {
    /// By default, the type name.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Registers handlers and other startup resources.
    fn build(&self, ctx: &mut GameContext) -> GameResult<()>;

    /// Called after every plugin is built and the platform is open.
    #[allow(unused_variables)]
    fn finish(&self, ctx: &mut GameContext) {}

    /// Called after the state stack shut down, in reverse build order.
    #[allow(unused_variables)]
    fn cleanup(&self, ctx: &mut GameContext) {}
}

/// Registers the configuration, text and raw byte handlers, all reading
/// files below one asset root.
#[derive(Debug, Clone)]
pub struct CoreAssetsPlugin {
    root: PathBuf,
}

impl CoreAssetsPlugin {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for CoreAssetsPlugin {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Plugin for CoreAssetsPlugin {
    fn name(&self) -> &'static str {
        "CoreAssetsPlugin"
    }

    fn build(&self, ctx: &mut GameContext) -> GameResult<()> {
        tracing::debug!("asset root: {}", self.root.display());
        ctx.assets
            .register_handler(AssetHandler::with_base_path(ConfigLoader, &self.root))?;
        ctx.assets
            .register_handler(AssetHandler::with_base_path(TextLoader, &self.root))?;
        ctx.assets
            .register_handler(AssetHandler::with_base_path(BytesLoader, &self.root))?;
        Ok(())
    }
}

/// A plugin made from a closure.
///
/// ```
/// use ember::{FnPlugin, GameContext};
///
/// let plugin = FnPlugin::new("show-stats", |ctx: &mut GameContext| {
///     ctx.stats.set_show(true);
///     Ok(())
/// });
/// ```
pub struct FnPlugin<F> {
    name: &'static str,
    build: F,
}

impl<F> FnPlugin<F>
where
    F: Fn(&mut GameContext) -> GameResult<()> + 'static,
{
    pub fn new(name: &'static str, build: F) -> Self {
        Self { name, build }
    }
}

impl<F> Plugin for FnPlugin<F>
where
    F: Fn(&mut GameContext) -> GameResult<()> + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn build(&self, ctx: &mut GameContext) -> GameResult<()> {
        (self.build)(ctx)
    }
}
