//! Z-order buckets of entity ids.

use std::collections::BTreeMap;

use crate::entity::EntityId;

/// The entities registered with one system, bucketed by z-order.
///
/// Buckets are visited in ascending order and entities within a bucket in
/// insertion order. An id appears at most once per bucket.
#[derive(Debug, Default, Clone)]
pub struct ZOrderRegistry {
    buckets: BTreeMap<u32, Vec<EntityId>>,
}

impl ZOrderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` to the bucket for `order`. Returns `false` if it is
    /// already in that bucket.
    pub fn insert(&mut self, order: u32, id: EntityId) -> bool {
        let bucket = self.buckets.entry(order).or_default();
        if bucket.contains(&id) {
            return false;
        }
        bucket.push(id);
        true
    }

    pub fn contains_in(&self, order: u32, id: EntityId) -> bool {
        self.buckets
            .get(&order)
            .is_some_and(|bucket| bucket.contains(&id))
    }

    /// Scans every bucket.
    pub fn contains(&self, id: EntityId) -> bool {
        self.order_of(id).is_some()
    }

    pub fn order_of(&self, id: EntityId) -> Option<u32> {
        self.buckets
            .iter()
            .find(|(_, bucket)| bucket.contains(&id))
            .map(|(&order, _)| order)
    }

    /// Removes `id` from whichever bucket holds it and returns that bucket's
    /// order. Empty buckets are dropped.
    pub fn remove(&mut self, id: EntityId) -> Option<u32> {
        let order = self.order_of(id)?;
        if let Some(bucket) = self.buckets.get_mut(&order) {
            bucket.retain(|&other| other != id);
            if bucket.is_empty() {
                self.buckets.remove(&order);
            }
        }
        Some(order)
    }

    /// Ids in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.buckets.values().flatten().copied()
    }

    /// Empties the registry, returning ids in dispatch order.
    pub fn drain(&mut self) -> Vec<EntityId> {
        let ids = self.iter().collect();
        self.buckets.clear();
        ids
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: u64) -> Vec<EntityId> {
        (0..n).map(|_| crate::entity::Entity::new("").id()).collect()
    }

    #[test]
    fn iterates_by_order_then_insertion() {
        let ids = ids(3);
        let mut registry = ZOrderRegistry::new();
        registry.insert(2, ids[0]);
        registry.insert(0, ids[1]);
        registry.insert(1, ids[2]);

        assert_eq!(registry.iter().collect::<Vec<_>>(), [ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn same_bucket_rejects_duplicates() {
        let ids = ids(1);
        let mut registry = ZOrderRegistry::new();
        assert!(registry.insert(0, ids[0]));
        assert!(!registry.insert(0, ids[0]));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_drops_empty_buckets() {
        let ids = ids(2);
        let mut registry = ZOrderRegistry::new();
        registry.insert(4, ids[0]);
        registry.insert(4, ids[1]);

        assert_eq!(registry.remove(ids[0]), Some(4));
        assert!(registry.contains_in(4, ids[1]));
        assert_eq!(registry.remove(ids[1]), Some(4));
        assert!(registry.is_empty());
        assert_eq!(registry.remove(ids[1]), None);
    }

    #[test]
    fn drain_empties_in_dispatch_order() {
        let ids = ids(2);
        let mut registry = ZOrderRegistry::new();
        registry.insert(1, ids[0]);
        registry.insert(0, ids[1]);
        assert_eq!(registry.drain(), [ids[1], ids[0]]);
        assert!(registry.is_empty());
    }
}
