//! Named, runtime-typed entity attributes.
//!
//! A key is bound to one type when it is first added and keeps that type
//! until it is removed. Reads of a missing key or with the wrong type are not
//! errors: they log a warning and return `T::default()`, which systems rely
//! on as ordinary control flow.
//!
//! Keys conventionally carry a type hint prefix (`v` for vectors, `f` for
//! floats, `b` for bools, `r` for rects), but nothing enforces it.

use std::any::Any;
use std::fmt;

use indexmap::IndexMap;

/// A value stored in a [`PropertyManager`].
///
/// Implemented for every `Clone + 'static` type, so stored values are deep
/// copied when the manager is cloned.
pub trait PropertyValue: Any {
    fn clone_box(&self) -> Box<dyn PropertyValue>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn value_type_name(&self) -> &'static str;
}

impl<T: Clone + 'static> PropertyValue for T {
    fn clone_box(&self) -> Box<dyn PropertyValue> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn value_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

#[derive(Default)]
pub struct PropertyManager {
    values: IndexMap<String, Box<dyn PropertyValue>>,
}

impl PropertyManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_id(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Adds `key` with an initial value. Does nothing if the key exists,
    /// whatever its type.
    pub fn add<T: Clone + 'static>(&mut self, key: &str, value: T) {
        if self.values.contains_key(key) {
            tracing::trace!("property '{}' already exists", key);
            return;
        }
        self.values.insert(key.to_string(), Box::new(value));
    }

    /// Returns a copy of the value, or `T::default()` when the key is missing
    /// or holds another type.
    pub fn get<T: Clone + Default + 'static>(&self, key: &str) -> T {
        match self.values.get(key) {
            Some(value) => match (**value).as_any().downcast_ref::<T>() {
                Some(value) => value.clone(),
                None => {
                    tracing::warn!(
                        "property '{}' holds {}, not {}",
                        key,
                        (**value).value_type_name(),
                        std::any::type_name::<T>()
                    );
                    T::default()
                }
            },
            None => {
                tracing::warn!("property '{}' not found", key);
                T::default()
            }
        }
    }

    /// Borrows the value, or `None` when the key is missing or holds another
    /// type.
    pub fn get_ref<T: 'static>(&self, key: &str) -> Option<&T> {
        self.values
            .get(key)
            .and_then(|value| (**value).as_any().downcast_ref::<T>())
    }

    pub fn get_mut<T: 'static>(&mut self, key: &str) -> Option<&mut T> {
        self.values
            .get_mut(key)
            .and_then(|value| (**value).as_any_mut().downcast_mut::<T>())
    }

    /// Overwrites an existing value of the same type. A missing key or a
    /// different type is logged and ignored.
    pub fn set<T: 'static>(&mut self, key: &str, value: T) {
        let Some(slot) = self.values.get_mut(key) else {
            tracing::error!("cannot set property '{}': not found", key);
            return;
        };
        let stored_type = (**slot).value_type_name();
        match (**slot).as_any_mut().downcast_mut::<T>() {
            Some(stored) => *stored = value,
            None => tracing::error!(
                "cannot set property '{}': holds {}, not {}",
                key,
                stored_type,
                std::any::type_name::<T>()
            ),
        }
    }

    /// Erases `key` regardless of its type.
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.shift_remove(key).is_some()
    }

    /// Deep-copies every entry of `other` whose key is not present here.
    pub fn clone_properties(&mut self, other: &PropertyManager) {
        for (key, value) in &other.values {
            if !self.values.contains_key(key) {
                self.values.insert(key.clone(), (**value).clone_box());
            }
        }
    }

    pub fn type_name_of(&self, key: &str) -> Option<&'static str> {
        self.values.get(key).map(|value| (**value).value_type_name())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Clone for PropertyManager {
    fn clone(&self) -> Self {
        let mut copy = PropertyManager::new();
        copy.clone_properties(self);
        copy
    }
}

impl fmt::Debug for PropertyManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.values
                    .iter()
                    .map(|(key, value)| (key, (**value).value_type_name())),
            )
            .finish()
    }
}
