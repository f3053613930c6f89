//! INI-style configuration files as an asset type.
//!
//! ```text
//! ; comment
//! [window]
//! width=800
//! fullscreen=off
//! ```
//!
//! Keys outside any section belong to the `""` section. Sections and keys
//! are case-sensitive and keep file order.

use indexmap::IndexMap;

use ember_core::math::Vec2;
use ember_core::strings::{parse_bool, parse_or, parse_pair};

use crate::Asset;

type Section = IndexMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigReader {
    sections: IndexMap<String, Section>,
}

impl Asset for ConfigReader {
    fn type_name() -> &'static str {
        "ConfigReader"
    }
}

impl ConfigReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses configuration text. Malformed lines are skipped with a
    /// warning.
    pub fn parse(text: &str) -> Self {
        let mut config = Self::new();
        let mut section = String::new();

        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[') {
                match name.strip_suffix(']') {
                    Some(name) => {
                        section = name.trim().to_string();
                        config.sections.entry(section.clone()).or_default();
                    }
                    None => tracing::warn!("config line {}: unterminated section '{}'", number + 1, line),
                }
                continue;
            }

            match line.split_once('=') {
                Some((key, value)) => {
                    config
                        .sections
                        .entry(section.clone())
                        .or_default()
                        .insert(key.trim().to_string(), value.trim().to_string());
                }
                None => tracing::warn!("config line {}: expected key=value, got '{}'", number + 1, line),
            }
        }

        config
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    pub fn has_key(&self, section: &str, key: &str) -> bool {
        self.value(section, key).is_some()
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn keys(&self, section: &str) -> impl Iterator<Item = &str> {
        self.sections
            .get(section)
            .into_iter()
            .flat_map(|keys| keys.keys().map(String::as_str))
    }

    pub fn value(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|keys| keys.get(key))
            .map(String::as_str)
    }

    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.value(section, key).unwrap_or(default).to_string()
    }

    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.value(section, key)
            .map_or(default, |value| parse_bool(value, default))
    }

    pub fn get_u32(&self, section: &str, key: &str, default: u32) -> u32 {
        self.value(section, key)
            .map_or(default, |value| parse_or(value, default))
    }

    pub fn get_i32(&self, section: &str, key: &str, default: i32) -> i32 {
        self.value(section, key)
            .map_or(default, |value| parse_or(value, default))
    }

    pub fn get_f32(&self, section: &str, key: &str, default: f32) -> f32 {
        self.value(section, key)
            .map_or(default, |value| parse_or(value, default))
    }

    /// Reads `"x, y"`.
    pub fn get_vec2(&self, section: &str, key: &str, default: Vec2) -> Vec2 {
        self.value(section, key).map_or(default, |value| {
            let (x, y) = parse_pair(value, (default.x, default.y));
            Vec2::new(x, y)
        })
    }

    pub fn set_string(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }
}
