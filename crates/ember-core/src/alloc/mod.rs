//! Allocation and collection types shared across Ember.
//!
//! This module provides:
//! - Re-exports of hash collections using AHash
//! - A generational `SparseSet` arena used for asset records and entities

pub mod sparse_set;

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_names_hash() {
        let mut map = HashMap::new();
        map.insert("vPosition", 1);
        assert_eq!(map.get("vPosition"), Some(&1));
    }

    #[test]
    fn system_names_hash() {
        let mut set = HashSet::new();
        set.insert("MovementSystem");
        assert!(set.contains("MovementSystem"));
    }
}
