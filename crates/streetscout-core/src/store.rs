//! # Entity Store
//!
//! The single keyed container of all records, `id → Entity`.
//!
//! The map sits behind one exclusive lock, held for exactly one access.
//! Every operation therefore observes either all or none of a concurrent
//! write, but a sequence of calls is not atomic as a whole; callers that
//! read, modify and write back must serialize themselves (see
//! `UpsertEngine`).
//!
//! Ids are ordered (`BTreeMap`), so listings come out stably sorted by id.

use crate::{Entity, EntityKind};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Volatile, process-lifetime record store.
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: Mutex<BTreeMap<String, Entity>>,
}

impl EntityStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A panicking holder cannot leave a half-written entry behind (every
    /// write is a single map call), so a poisoned lock is still usable.
    fn entities(&self) -> MutexGuard<'_, BTreeMap<String, Entity>> {
        self.entities.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a copy of the record stored under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Entity> {
        self.entities().get(id).cloned()
    }

    /// Insert or replace a record under its own id.
    ///
    /// Returns the record it replaced, if any.
    pub fn put(&self, entity: Entity) -> Option<Entity> {
        let id = entity.id().to_string();
        self.entities().insert(id, entity)
    }

    /// Remove the record stored under `id`.
    ///
    /// `None` means nothing was stored under that id.
    pub fn remove(&self, id: &str) -> Option<Entity> {
        self.entities().remove(id)
    }

    /// Check whether a record is stored under `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entities().contains_key(id)
    }

    /// All records matching `predicate`, ordered by id.
    pub fn list<F>(&self, predicate: F) -> Vec<Entity>
    where
        F: Fn(&Entity) -> bool,
    {
        self.entities()
            .values()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }

    /// All records of one kind, ordered by id.
    #[must_use]
    pub fn list_kind(&self, kind: EntityKind) -> Vec<Entity> {
        self.list(|e| e.kind() == kind)
    }

    /// Number of records of one kind.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities().values().filter(|e| e.kind() == kind).count()
    }

    /// Total number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities().is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChildRecord, RoadType, SignFields, Street, StreetPatch, StreetSign};

    fn street(id: &str) -> Entity {
        Entity::Street(Street::create(
            id.to_string(),
            "01824".to_string(),
            RoadType::Street,
            format!("{} St", id),
            StreetPatch::default(),
            None,
        ))
    }

    fn sign(id: &str) -> Entity {
        Entity::Sign(StreetSign::create(
            id.to_string(),
            "s".to_string(),
            SignFields::default(),
        ))
    }

    #[test]
    fn get_missing_is_none() {
        let store = EntityStore::new();
        assert!(store.get("nope").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn put_then_get() {
        let store = EntityStore::new();
        assert!(store.put(street("a")).is_none());

        let got = store.get("a").expect("stored");
        assert_eq!(got.id(), "a");
        assert!(store.contains("a"));
    }

    #[test]
    fn put_replaces_existing() {
        let store = EntityStore::new();
        store.put(street("a"));
        let replaced = store.put(street("a"));

        assert!(replaced.is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_distinguishes_missing_from_removed() {
        let store = EntityStore::new();
        store.put(sign("x"));

        assert!(store.remove("x").is_some());
        assert!(store.remove("x").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn list_is_ordered_by_id_and_filtered_by_kind() {
        let store = EntityStore::new();
        store.put(street("c"));
        store.put(sign("b"));
        store.put(street("a"));

        let ids: Vec<String> = store
            .list_kind(EntityKind::Street)
            .iter()
            .map(|e| e.id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(store.count(EntityKind::Sign), 1);
        assert_eq!(store.list(|_| true).len(), 3);
    }
}
