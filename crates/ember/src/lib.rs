//! Ember - a small 2D game engine
//!
//! Ember ties the engine crates together into a runnable game:
//!
//! - **State stack**: menus, levels and splash screens as [`State`]s
//! - **Game loop**: fixed-timestep updates, variable updates and drawing
//! - **Plugins**: startup hooks that register asset handlers
//! - **Platform seam**: windowing and rendering behind the [`Platform`] trait
//!
//! Entities and systems live in [`ember_entity`]; the asset cache lives in
//! [`ember_assets`]. Both are re-exported.
//!
//! # Quick Start
//!
//! ```ignore
//! use ember::prelude::*;
//!
//! fn main() -> std::process::ExitCode {
//!     ember::core::logging::init().ok();
//!     let mut platform = MyWindow::new();
//!     Game::new("Space Dots")
//!         .with_state(SplashState::new("resources/splash.png", 3.0))
//!         .run(&mut platform)
//!         .into()
//! }
//! ```

pub mod error;
pub mod game;
pub mod platform;
pub mod plugin;
pub mod settings;
pub mod state;
pub mod states;
pub mod stats;
pub mod time;

pub use ember_assets as assets;
pub use ember_core as core;
pub use ember_core::math;
pub use ember_entity as entity;

pub use error::{GameError, GameResult};
pub use game::{ExitCode, Game, GameContext};
pub use platform::{DrawnSprite, HeadlessPlatform, Platform};
pub use plugin::{CoreAssetsPlugin, FnPlugin, Plugin};
pub use settings::{GraphicRange, Settings};
pub use state::{State, StateBase, StateCommand, StateId, StateManager, StateStatus};
pub use states::SplashState;
pub use stats::FrameStats;
pub use time::Time;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::game::{ExitCode, Game, GameContext};
    pub use crate::platform::Platform;
    pub use crate::plugin::Plugin;
    pub use crate::state::{State, StateBase, StateCommand};
    pub use crate::states::SplashState;
    pub use ember_assets::{AssetManager, AssetPolicy, Handle};
    pub use ember_core::event::{Event, Key};
    pub use ember_entity::{DrawTarget, Entity, EntityId, System, World};
}
