//! Sequence-numbered idempotent merge for subscriber local views
//!
//! Delivery is at-least-once and ordered only per-topic-per-entity, so a
//! subscriber may see duplicates and, across entities, arbitrary
//! interleavings. [`VersionedMap`] makes the merge safe: an incoming event
//! is applied only when its sequence number is strictly newer than the one
//! held locally for that entity. Deletes leave a tombstone so a stale
//! update arriving late cannot resurrect a removed entity.

use crate::event::{ChangeEvent, ChangePayload};
use crate::models::{CatalogItem, Order};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Versioned<T> {
    sequence: u64,
    value: T,
}

/// Entity map keyed by id, merged by sequence number
#[derive(Debug, Clone)]
pub struct VersionedMap<T> {
    entries: HashMap<String, Versioned<T>>,
    tombstones: HashMap<String, u64>,
}

impl<T> Default for VersionedMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> VersionedMap<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            tombstones: HashMap::new(),
        }
    }

    /// Apply an insert/update. Returns `false` when the event is stale
    /// (sequence not newer than the held entry or a tombstone) and was
    /// discarded.
    pub fn apply_upsert(&mut self, id: &str, sequence: u64, value: T) -> bool {
        if let Some(deleted_at) = self.tombstones.get(id)
            && *deleted_at >= sequence
        {
            return false;
        }
        match self.entries.get(id) {
            Some(held) if held.sequence >= sequence => false,
            _ => {
                self.entries
                    .insert(id.to_string(), Versioned { sequence, value });
                true
            }
        }
    }

    /// Apply a delete. Returns `false` when the held entry is already newer.
    pub fn apply_delete(&mut self, id: &str, sequence: u64) -> bool {
        if let Some(held) = self.entries.get(id)
            && held.sequence >= sequence
        {
            return false;
        }
        self.entries.remove(id);
        let tombstone = self.tombstones.entry(id.to_string()).or_insert(0);
        *tombstone = (*tombstone).max(sequence);
        true
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id).map(|held| &held.value)
    }

    /// Sequence number currently held for an entity
    pub fn sequence_of(&self, id: &str) -> Option<u64> {
        self.entries.get(id).map(|held| held.sequence)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries
            .iter()
            .map(|(id, held)| (id.as_str(), &held.value))
    }
}

/// A session's local replica of both feeds
#[derive(Debug, Clone, Default)]
pub struct StoreView {
    pub catalog: VersionedMap<CatalogItem>,
    pub orders: VersionedMap<Order>,
}

impl StoreView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one incoming event. Returns `false` when it was discarded as
    /// stale.
    pub fn apply(&mut self, event: &ChangeEvent) -> bool {
        let applied = self.merge(event);
        if !applied {
            tracing::debug!(
                entity_id = event.payload.entity_id(),
                sequence = event.sequence,
                "discarded stale change event"
            );
        }
        applied
    }

    fn merge(&mut self, event: &ChangeEvent) -> bool {
        match &event.payload {
            ChangePayload::CatalogInserted { item } | ChangePayload::CatalogUpdated { item } => {
                self.catalog
                    .apply_upsert(&item.id, event.sequence, item.clone())
            }
            ChangePayload::CatalogDeleted { item_id } => {
                self.catalog.apply_delete(item_id, event.sequence)
            }
            ChangePayload::OrderInserted { order } | ChangePayload::OrderUpdated { order } => {
                self.orders
                    .apply_upsert(&order.id, event.sequence, order.clone())
            }
            ChangePayload::OrderDeleted { order_id, .. } => {
                self.orders.apply_delete(order_id, event.sequence)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_sequence_always_wins() {
        let mut map = VersionedMap::new();
        assert!(map.apply_upsert("a", 2, "v2"));
        assert!(!map.apply_upsert("a", 1, "v1"));
        assert_eq!(map.get("a"), Some(&"v2"));
        assert!(map.apply_upsert("a", 3, "v3"));
        assert_eq!(map.get("a"), Some(&"v3"));
    }

    #[test]
    fn duplicate_delivery_is_idempotent() {
        let mut map = VersionedMap::new();
        assert!(map.apply_upsert("a", 5, "v5"));
        assert!(!map.apply_upsert("a", 5, "v5"));
        assert_eq!(map.sequence_of("a"), Some(5));
    }

    #[test]
    fn out_of_order_events_settle_on_higher_sequence() {
        // Applying two updates out of order must leave the subscriber at
        // the higher sequence number's values, never the lower.
        let mut forward = VersionedMap::new();
        forward.apply_upsert("a", 1, "old");
        forward.apply_upsert("a", 2, "new");

        let mut reversed = VersionedMap::new();
        reversed.apply_upsert("a", 2, "new");
        reversed.apply_upsert("a", 1, "old");

        assert_eq!(forward.get("a"), reversed.get("a"));
        assert_eq!(reversed.get("a"), Some(&"new"));
    }

    #[test]
    fn tombstone_blocks_stale_resurrection() {
        let mut map = VersionedMap::new();
        map.apply_upsert("a", 1, "v1");
        assert!(map.apply_delete("a", 3));
        // A stale update from before the delete must not bring it back.
        assert!(!map.apply_upsert("a", 2, "stale"));
        assert!(map.get("a").is_none());
        // A genuinely newer insert may.
        assert!(map.apply_upsert("a", 4, "reborn"));
        assert_eq!(map.get("a"), Some(&"reborn"));
    }

    #[test]
    fn delete_of_newer_entry_is_discarded() {
        let mut map = VersionedMap::new();
        map.apply_upsert("a", 5, "v5");
        assert!(!map.apply_delete("a", 4));
        assert_eq!(map.get("a"), Some(&"v5"));
    }
}
