//! # streetscout-core
//!
//! The in-memory entity store for StreetScout - THE LOGIC.
//!
//! Road infrastructure is recorded as three kinds of mutable records:
//! streets, street signs and intersections. This crate decides whether an
//! incoming record is new or an update of a stored one, derives or issues
//! identifiers, merges partial updates, and keeps the street → child id
//! sets consistent under concurrent callers.
//!
//! ## Flow
//!
//! ```text
//! candidate ──► identity ──► EntityStore::get ──► merge | insert ──► put
//!                                                         │
//!                                   parent street's id set ◄┘
//! ```
//!
//! ## Architectural Constraints
//!
//! - No async, no network, no wire formats: callers hand over decoded
//!   candidates and map records to their own views
//! - The store is volatile and lives as long as the process
//! - Street ids are content hashes; sign and intersection ids are random

// =============================================================================
// MODULES
// =============================================================================

pub mod entity;
pub mod identity;
pub mod location;
pub mod page;
pub mod primitives;
pub mod store;
pub mod types;
pub mod upsert;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    ChildKind, Condition, EntityKind, IntersectionType, Region, RoadType, ScoutError, SegmentKey,
    SignType, StreetAttributes, Surface, Width,
};

// =============================================================================
// RE-EXPORTS: Entities, Store, Engine
// =============================================================================

pub use entity::{
    ChildFields, ChildRecord, Entity, Intersection, IntersectionFields, SignFields, Street,
    StreetFields, StreetPatch, StreetSign,
};
pub use identity::{random_id, road_type_from_name, street_id};
pub use location::{FixedRegionLookup, ZipLookup};
pub use page::{Page, paginate};
pub use store::EntityStore;
pub use upsert::{StoreCounts, UpsertEngine, UpsertOutcome, UpsertStatus};
