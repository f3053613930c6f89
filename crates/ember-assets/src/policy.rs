//! Asset identifiers and per-asset loading policy.

use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;

/// Stable, case-sensitive name of an asset, usually a relative file path.
///
/// Cloning is cheap; the string is shared.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(Rc<str>);

impl AssetId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Rc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({:?})", &*self.0)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for AssetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AssetId {
    fn from(id: String) -> Self {
        Self(Rc::from(id))
    }
}

impl From<&AssetId> for AssetId {
    fn from(id: &AssetId) -> Self {
        id.clone()
    }
}

/// When a record is loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LoadTime {
    /// Load as soon as the first reference is acquired.
    Now,
    /// Load on first use.
    #[default]
    Later,
}

/// Where the resource bytes come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LoadStyle {
    #[default]
    File,
    Memory,
    Network,
    /// Returned for ids the handler does not know.
    Unknown,
}

/// When an unreferenced record is released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DropTime {
    /// Evict as soon as the reference count reaches zero.
    #[default]
    AtZero,
    /// Keep until the owning manager shuts down.
    AtExit,
    /// Returned for ids the handler does not know.
    Unspecified,
}

/// The three policy knobs applied when a record is first created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AssetPolicy {
    pub load_time: LoadTime,
    pub load_style: LoadStyle,
    pub drop_time: DropTime,
}

impl AssetPolicy {
    pub const fn new(load_time: LoadTime, load_style: LoadStyle, drop_time: DropTime) -> Self {
        Self {
            load_time,
            load_style,
            drop_time,
        }
    }

    pub const fn with_load_time(mut self, load_time: LoadTime) -> Self {
        self.load_time = load_time;
        self
    }

    pub const fn with_load_style(mut self, load_style: LoadStyle) -> Self {
        self.load_style = load_style;
        self
    }

    pub const fn with_drop_time(mut self, drop_time: DropTime) -> Self {
        self.drop_time = drop_time;
        self
    }

    /// Load on first reference.
    pub const fn eager() -> Self {
        Self::new(LoadTime::Now, LoadStyle::File, DropTime::AtZero)
    }

    /// Load on first reference and keep until shutdown.
    pub const fn pinned() -> Self {
        Self::new(LoadTime::Now, LoadStyle::File, DropTime::AtExit)
    }
}
