//! Window and loop settings read from the settings config asset.

use std::time::Duration;

use ember_assets::{AssetManager, AssetPolicy, ConfigReader};
use ember_core::geometry::Size;

/// Asset id of the settings file, relative to the asset base path.
pub const SETTINGS_PATH: &str = "resources/settings.cfg";

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;
pub const DEFAULT_DEPTH: u32 = 32;
pub const DEFAULT_UPDATE_RATE: f32 = 20.0;
pub const MIN_UPDATE_RATE: f32 = 1.0;
pub const MAX_UPDATE_RATE: f32 = 200.0;

/// Coarse screen-size class, used to pick asset resolutions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum GraphicRange {
    #[default]
    Low,
    Mid,
    High,
}

impl GraphicRange {
    /// Classifies a screen by height: up to 760 pixels is low, up to 960 is
    /// mid, anything taller is high.
    pub fn from_height(height: u32) -> Self {
        let steps = (f64::from(height) - 240.0) / 10.0;
        if steps > 72.0 {
            GraphicRange::High
        } else if steps > 52.0 {
            GraphicRange::Mid
        } else {
            GraphicRange::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Bits per pixel.
    pub depth: u32,
    pub fullscreen: bool,
    update_rate: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: String::from("Ember"),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            depth: DEFAULT_DEPTH,
            fullscreen: false,
            update_rate: DEFAULT_UPDATE_RATE,
        }
    }
}

impl Settings {
    /// Reads `[window] width, height, depth, fullscreen` and
    /// `[game] updaterate`. Missing keys keep their defaults.
    pub fn from_config(config: &ConfigReader) -> Self {
        let mut settings = Settings {
            width: config.get_u32("window", "width", DEFAULT_WIDTH),
            height: config.get_u32("window", "height", DEFAULT_HEIGHT),
            depth: config.get_u32("window", "depth", DEFAULT_DEPTH),
            fullscreen: config.get_bool("window", "fullscreen", false),
            ..Settings::default()
        };
        settings.title = config.get_string("window", "title", &settings.title);
        settings.set_update_rate(config.get_f32("game", "updaterate", DEFAULT_UPDATE_RATE));
        settings
    }

    /// Loads [`SETTINGS_PATH`] through the config handler. Without a handler
    /// or a readable file the defaults are used.
    pub fn load(assets: &AssetManager) -> Self {
        match assets.handle_with_policy::<ConfigReader>(SETTINGS_PATH, AssetPolicy::eager()) {
            Ok(handle) if handle.is_loaded() => {
                let settings = Settings::from_config(&handle.get_asset());
                tracing::info!(
                    "settings: {}x{}x{} fullscreen={} updaterate={}",
                    settings.width,
                    settings.height,
                    settings.depth,
                    settings.fullscreen,
                    settings.update_rate
                );
                settings
            }
            Ok(_) => {
                tracing::warn!("'{}' could not be loaded, using defaults", SETTINGS_PATH);
                Settings::default()
            }
            Err(e) => {
                tracing::warn!("cannot read settings ({}), using defaults", e);
                Settings::default()
            }
        }
    }

    pub fn size(&self) -> Size<u32> {
        Size::new(self.width, self.height)
    }

    pub fn graphic_range(&self) -> GraphicRange {
        GraphicRange::from_height(self.height)
    }

    /// Fixed updates per second.
    pub fn update_rate(&self) -> f32 {
        self.update_rate
    }

    /// Sets the fixed update rate. Rates outside `1..=200` are ignored.
    pub fn set_update_rate(&mut self, rate: f32) {
        if (MIN_UPDATE_RATE..=MAX_UPDATE_RATE).contains(&rate) {
            self.update_rate = rate;
        } else {
            tracing::warn!("ignoring update rate {} outside {}..={}", rate, MIN_UPDATE_RATE, MAX_UPDATE_RATE);
        }
    }

    pub fn fixed_timestep(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.update_rate))
    }
}
