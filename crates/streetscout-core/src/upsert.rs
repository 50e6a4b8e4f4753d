//! # Upsert & Relationship Engine
//!
//! Resolves the identity of incoming candidates, merges them into stored
//! records or inserts them, and keeps each street's sign/intersection id
//! sets current.
//!
//! ## Locking
//!
//! Every operation that writes holds the engine's write gate for its whole
//! read-modify-write sequence, so two submissions for the same street can
//! not interleave and drop an update. The store's map lock is taken inside,
//! once per access. Order is always gate, then map. Reads (fetch, list)
//! take only the map lock.

use crate::identity::{random_id, road_type_from_name, street_id};
use crate::location::{FixedRegionLookup, ZipLookup};
use crate::page::{Page, paginate};
use crate::store::EntityStore;
use crate::{
    ChildFields, ChildKind, ChildRecord, Entity, EntityKind, Intersection, IntersectionFields,
    ScoutError, SignFields, Street, StreetFields, StreetPatch, StreetSign,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

// =============================================================================
// OUTCOMES
// =============================================================================

/// How a successful submission was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpsertStatus {
    /// No record existed; a new one was inserted.
    Created,
    /// A submission matched a stored record and was merged into it.
    UpdatedExisting,
    /// An edit of a stored record was applied.
    Updated,
}

/// Result of a successful submission or edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub id: String,
    pub kind: EntityKind,
    pub status: UpsertStatus,
}

impl UpsertOutcome {
    fn new(id: impl Into<String>, kind: EntityKind, status: UpsertStatus) -> Self {
        Self {
            id: id.into(),
            kind,
            status,
        }
    }

    /// Human-readable summary for callers.
    #[must_use]
    pub fn message(&self) -> String {
        match self.status {
            UpsertStatus::Created => format!("{} submitted for processing: {}", self.kind, self.id),
            UpsertStatus::UpdatedExisting => format!(
                "{} {} already exists. Updating with new instance.",
                self.kind, self.id
            ),
            UpsertStatus::Updated => format!("{} {} updated.", self.kind, self.id),
        }
    }
}

/// Number of stored records per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCounts {
    pub streets: usize,
    pub signs: usize,
    pub intersections: usize,
}

// =============================================================================
// ENGINE
// =============================================================================

/// Owns the entity store and every composite operation on it.
pub struct UpsertEngine {
    store: EntityStore,
    writes: Mutex<()>,
    lookup: Box<dyn ZipLookup>,
}

impl fmt::Debug for UpsertEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpsertEngine")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl Default for UpsertEngine {
    fn default() -> Self {
        Self::with_lookup(FixedRegionLookup::default())
    }
}

/// Keep only values with visible content.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl UpsertEngine {
    /// Create an engine over an empty store with the stub zip lookup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine over an empty store with a custom zip lookup.
    pub fn with_lookup(lookup: impl ZipLookup + 'static) -> Self {
        Self {
            store: EntityStore::new(),
            writes: Mutex::new(()),
            lookup: Box::new(lookup),
        }
    }

    /// The gate guards `()`; poisoning carries no broken state.
    fn write_gate(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn street(&self, id: &str) -> Option<Street> {
        self.store.get(id).and_then(Entity::into_street)
    }

    // -------------------------------------------------------------------------
    // Streets
    // -------------------------------------------------------------------------

    /// Submit a street: merge into the record with the same derived id, or
    /// insert it.
    ///
    /// Fails with `IdentificationFailed` when `zip` or `name` is blank.
    pub fn upsert_street(&self, fields: StreetFields) -> Result<UpsertOutcome, ScoutError> {
        let zip = non_blank(fields.zip).ok_or(ScoutError::IdentificationFailed("zip"))?;
        let name = non_blank(fields.name).ok_or(ScoutError::IdentificationFailed("name"))?;
        let road_type = fields
            .road_type
            .unwrap_or_else(|| road_type_from_name(&name));
        let id = street_id(&zip, road_type, &name);

        let _gate = self.write_gate();
        if let Some(mut existing) = self.street(&id) {
            existing.merge(fields.details);
            self.store.put(existing.into());
            return Ok(UpsertOutcome::new(
                id,
                EntityKind::Street,
                UpsertStatus::UpdatedExisting,
            ));
        }

        let region = self.lookup.locate(&zip);
        let street = Street::create(id.clone(), zip, road_type, name, fields.details, region);
        self.store.put(street.into());
        Ok(UpsertOutcome::new(id, EntityKind::Street, UpsertStatus::Created))
    }

    /// Merge a patch into the street stored under `id`.
    ///
    /// Never creates: an unknown id fails with `NotFound`.
    pub fn edit_street(&self, id: &str, patch: StreetPatch) -> Result<UpsertOutcome, ScoutError> {
        let _gate = self.write_gate();
        let mut street = self
            .street(id)
            .ok_or_else(|| ScoutError::NotFound(id.to_string()))?;
        street.merge(patch);
        self.store.put(street.into());
        Ok(UpsertOutcome::new(id, EntityKind::Street, UpsertStatus::Updated))
    }

    // -------------------------------------------------------------------------
    // Signs and intersections
    // -------------------------------------------------------------------------

    /// Submit a sign or intersection.
    ///
    /// If `id` names a stored record of `kind`, the candidate is merged into
    /// it. Otherwise a record with a fresh id is filed under the candidate's
    /// street. A candidate of the other kind counts as missing.
    pub fn upsert_child(
        &self,
        kind: ChildKind,
        id: Option<&str>,
        candidate: Option<ChildFields>,
    ) -> Result<UpsertOutcome, ScoutError> {
        match kind {
            ChildKind::Sign => self.upsert_sign(id, candidate.and_then(StreetSign::fields_from)),
            ChildKind::Intersection => {
                self.upsert_intersection(id, candidate.and_then(Intersection::fields_from))
            }
        }
    }

    pub fn upsert_sign(
        &self,
        id: Option<&str>,
        fields: Option<SignFields>,
    ) -> Result<UpsertOutcome, ScoutError> {
        self.upsert_child_record::<StreetSign>(id, fields)
    }

    pub fn upsert_intersection(
        &self,
        id: Option<&str>,
        fields: Option<IntersectionFields>,
    ) -> Result<UpsertOutcome, ScoutError> {
        self.upsert_child_record::<Intersection>(id, fields)
    }

    /// Merge a patch into the sign or intersection stored under `id`.
    ///
    /// Never creates: an unknown id fails with `NotFound`.
    pub fn edit_child(
        &self,
        kind: ChildKind,
        id: &str,
        candidate: Option<ChildFields>,
    ) -> Result<UpsertOutcome, ScoutError> {
        match kind {
            ChildKind::Sign => {
                self.edit_child_record::<StreetSign>(id, candidate.and_then(StreetSign::fields_from))
            }
            ChildKind::Intersection => self.edit_child_record::<Intersection>(
                id,
                candidate.and_then(Intersection::fields_from),
            ),
        }
    }

    fn upsert_child_record<C: ChildRecord>(
        &self,
        id: Option<&str>,
        fields: Option<C::Fields>,
    ) -> Result<UpsertOutcome, ScoutError> {
        let fields = fields.ok_or(ScoutError::MissingInput)?;

        let _gate = self.write_gate();
        let existing = id
            .and_then(|id| self.store.get(id))
            .and_then(C::from_entity);
        if let Some(existing) = existing {
            return self.merge_child(existing, fields, UpsertStatus::UpdatedExisting);
        }

        let parent_id = C::requested_parent(&fields).unwrap_or_default().to_string();
        let mut street = self
            .street(&parent_id)
            .ok_or_else(|| ScoutError::MissingParent(parent_id.clone()))?;

        let child = C::create(random_id(), parent_id, fields);
        let child_id = child.id().to_string();
        street.register_child(C::KIND, &child_id);
        self.store.put(street.into());
        self.store.put(child.into_entity());
        Ok(UpsertOutcome::new(
            child_id,
            C::KIND.into(),
            UpsertStatus::Created,
        ))
    }

    fn edit_child_record<C: ChildRecord>(
        &self,
        id: &str,
        fields: Option<C::Fields>,
    ) -> Result<UpsertOutcome, ScoutError> {
        let fields = fields.ok_or(ScoutError::MissingInput)?;

        let _gate = self.write_gate();
        let existing = self
            .store
            .get(id)
            .and_then(C::from_entity)
            .ok_or_else(|| ScoutError::NotFound(id.to_string()))?;
        self.merge_child(existing, fields, UpsertStatus::Updated)
    }

    /// Merge into a stored child and re-register it with its street.
    ///
    /// Caller holds the write gate. The parent is the one the child was
    /// filed under; if that street is gone nothing is written.
    fn merge_child<C: ChildRecord>(
        &self,
        mut existing: C,
        fields: C::Fields,
        status: UpsertStatus,
    ) -> Result<UpsertOutcome, ScoutError> {
        let parent_id = existing.street_id().to_string();
        let mut street = self
            .street(&parent_id)
            .ok_or(ScoutError::MissingParent(parent_id))?;

        existing.merge(fields);
        let child_id = existing.id().to_string();
        street.register_child(C::KIND, &child_id);
        self.store.put(street.into());
        self.store.put(existing.into_entity());
        Ok(UpsertOutcome::new(child_id, C::KIND.into(), status))
    }

    // -------------------------------------------------------------------------
    // Fetch / delete / list
    // -------------------------------------------------------------------------

    /// Fetch any record by id.
    pub fn fetch(&self, id: &str) -> Result<Entity, ScoutError> {
        self.store
            .get(id)
            .ok_or_else(|| ScoutError::NotFound(id.to_string()))
    }

    /// Fetch a record by id, treating a record of another kind as absent.
    pub fn fetch_as(&self, kind: EntityKind, id: &str) -> Result<Entity, ScoutError> {
        self.store
            .get(id)
            .filter(|e| e.kind() == kind)
            .ok_or_else(|| ScoutError::NotFound(id.to_string()))
    }

    pub fn fetch_street(&self, id: &str) -> Result<Street, ScoutError> {
        self.street(id)
            .ok_or_else(|| ScoutError::NotFound(id.to_string()))
    }

    pub fn fetch_sign(&self, id: &str) -> Result<StreetSign, ScoutError> {
        self.fetch_child(id)
    }

    pub fn fetch_intersection(&self, id: &str) -> Result<Intersection, ScoutError> {
        self.fetch_child(id)
    }

    fn fetch_child<C: ChildRecord>(&self, id: &str) -> Result<C, ScoutError> {
        self.store
            .get(id)
            .and_then(C::from_entity)
            .ok_or_else(|| ScoutError::NotFound(id.to_string()))
    }

    /// Remove any record by id.
    ///
    /// Does not touch the relationship sets of the removed record's street:
    /// a street keeps listing the ids of deleted signs and intersections.
    pub fn delete(&self, id: &str) -> Result<Entity, ScoutError> {
        let _gate = self.write_gate();
        self.store
            .remove(id)
            .ok_or_else(|| ScoutError::NotFound(id.to_string()))
    }

    /// Remove a record by id only if it is of `kind`.
    pub fn delete_as(&self, kind: EntityKind, id: &str) -> Result<Entity, ScoutError> {
        let _gate = self.write_gate();
        if self.store.get(id).is_none_or(|e| e.kind() != kind) {
            return Err(ScoutError::NotFound(id.to_string()));
        }
        self.store
            .remove(id)
            .ok_or_else(|| ScoutError::NotFound(id.to_string()))
    }

    /// One page of the records of `kind`, ordered by id.
    ///
    /// Page and size are clamped, never rejected.
    #[must_use]
    pub fn list(&self, kind: EntityKind, page: i64, size: i64) -> Page<Entity> {
        paginate(self.store.list_kind(kind), page, size)
    }

    /// Number of stored records per kind.
    #[must_use]
    pub fn counts(&self) -> StoreCounts {
        StoreCounts {
            streets: self.store.count(EntityKind::Street),
            signs: self.store.count(EntityKind::Sign),
            intersections: self.store.count(EntityKind::Intersection),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
