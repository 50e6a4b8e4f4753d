//! # Core Type Definitions
//!
//! Value types shared by every record kind in the store:
//! - Enumerated road properties (`RoadType`, `Surface`, `Condition`, `Width`)
//! - Child record classifications (`SignType`, `IntersectionType`)
//! - The per-segment attribute snapshot (`StreetAttributes`) and its key
//! - Record kind tags (`EntityKind`, `ChildKind`)
//! - Error types (`ScoutError`)
//!
//! Enum variants serialize under their exact names (`"Boulevard"`,
//! `"NewlyPaved"`) so that submitted payloads and views agree.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// ROAD PROPERTIES
// =============================================================================

/// Classification of a street, part of its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoadType {
    Boulevard,
    Avenue,
    Road,
    Street,
    Lane,
    Way,
    Drive,
    Circle,
    Highway,
    Freeway,
    Interstate,
    Unknown,
}

impl RoadType {
    /// Every road type, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Boulevard,
        Self::Avenue,
        Self::Road,
        Self::Street,
        Self::Lane,
        Self::Way,
        Self::Drive,
        Self::Circle,
        Self::Highway,
        Self::Freeway,
        Self::Interstate,
        Self::Unknown,
    ];

    /// The variant name, as hashed into street identifiers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boulevard => "Boulevard",
            Self::Avenue => "Avenue",
            Self::Road => "Road",
            Self::Street => "Street",
            Self::Lane => "Lane",
            Self::Way => "Way",
            Self::Drive => "Drive",
            Self::Circle => "Circle",
            Self::Highway => "Highway",
            Self::Freeway => "Freeway",
            Self::Interstate => "Interstate",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for RoadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoadType {
    type Err = ScoutError;

    /// Parse a variant name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ScoutError::InvalidField(format!("unknown road type '{}'", s)))
    }
}

/// Road surface material.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Surface {
    Dirt,
    Gravel,
    Asphalt,
    Concrete,
    #[default]
    Unknown,
}

/// Observed road condition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Condition {
    Poor,
    Potholes,
    Bumpy,
    Icy,
    Smooth,
    NewlyPaved,
    #[default]
    Unknown,
}

/// Road width class.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Width {
    Narrow,
    Regular,
    Wide,
    #[default]
    Unknown,
}

/// Kind of street sign.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum SignType {
    Exit,
    SpeedLimit,
    Stop,
    Signal,
    MilePost,
    Railroad,
    Pedestrian,
    Bicycle,
    Animal,
    Direction,
    #[default]
    Unknown,
}

/// Kind of intersection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum IntersectionType {
    FreewayExit,
    HighwayExit,
    SurfaceStreet,
    #[default]
    Unknown,
}

// =============================================================================
// SEGMENTS
// =============================================================================

/// Snapshot of the physical attributes of a street at one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreetAttributes {
    pub surface: Surface,
    pub condition: Condition,
    pub width: Width,
    pub lanes: i32,
}

/// Coarse positional key of a segment: `lat² + lon² + alt²`.
///
/// Not a geodesic key; distinct positions can collide. Ordered with
/// `f64::total_cmp` so it can key a `BTreeMap`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentKey(pub f64);

impl SegmentKey {
    /// Derive the key for a position.
    #[must_use]
    pub fn from_position(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self(latitude * latitude + longitude * longitude + altitude * altitude)
    }

    /// Get the raw key value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for SegmentKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SegmentKey {}

impl PartialOrd for SegmentKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SegmentKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

// =============================================================================
// REGION
// =============================================================================

/// Administrative region a zip code resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub state: String,
    pub county: String,
    pub town: String,
}

impl Region {
    pub fn new(state: impl Into<String>, county: impl Into<String>, town: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            county: county.into(),
            town: town.into(),
        }
    }
}

// =============================================================================
// KIND TAGS
// =============================================================================

/// Tag for the closed set of record kinds held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Street,
    Sign,
    Intersection,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Street => "Street",
            Self::Sign => "Street Sign",
            Self::Intersection => "Intersection",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The record kinds a street owns by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChildKind {
    Sign,
    Intersection,
}

impl From<ChildKind> for EntityKind {
    fn from(kind: ChildKind) -> Self {
        match kind {
            ChildKind::Sign => Self::Sign,
            ChildKind::Intersection => Self::Intersection,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors reported by the store and the upsert engine.
///
/// Every failed operation leaves the store as it was before the call.
/// Nothing here is retried internally.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// A street submission lacks a field needed to derive its id.
    #[error("Cannot identify street: missing {0}")]
    IdentificationFailed(&'static str),

    /// No record with this id (of the requested kind) is stored.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A sign or intersection references a street that is not stored.
    #[error("Missing parent street: {0}")]
    MissingParent(String),

    /// No candidate record was supplied.
    #[error("Missing new instance in request")]
    MissingInput,

    /// A supplied field is malformed or out of bounds.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn road_type_display_is_variant_name() {
        assert_eq!(RoadType::Street.to_string(), "Street");
        assert_eq!(RoadType::Interstate.to_string(), "Interstate");
    }

    #[test]
    fn road_type_parses_case_insensitively() {
        assert_eq!("avenue".parse::<RoadType>().expect("parse"), RoadType::Avenue);
        assert_eq!(" HIGHWAY ".parse::<RoadType>().expect("parse"), RoadType::Highway);
        assert!(matches!(
            "alley".parse::<RoadType>(),
            Err(ScoutError::InvalidField(_))
        ));
    }

    #[test]
    fn attribute_enums_default_to_unknown() {
        assert_eq!(Surface::default(), Surface::Unknown);
        assert_eq!(Condition::default(), Condition::Unknown);
        assert_eq!(Width::default(), Width::Unknown);
        assert_eq!(SignType::default(), SignType::Unknown);
        assert_eq!(IntersectionType::default(), IntersectionType::Unknown);
    }

    #[test]
    fn segment_key_is_sum_of_squares() {
        let key = SegmentKey::from_position(3.0, 4.0, 0.0);
        assert_eq!(key.value(), 25.0);
    }

    #[test]
    fn segment_keys_order_in_btreemap() {
        let mut map = BTreeMap::new();
        map.insert(SegmentKey(9.0), "c");
        map.insert(SegmentKey(1.0), "a");
        map.insert(SegmentKey(4.0), "b");
        map.insert(SegmentKey(1.0), "a2");

        let values: Vec<_> = map.values().copied().collect();
        assert_eq!(values, vec!["a2", "b", "c"]);
    }

    #[test]
    fn child_kind_maps_to_entity_kind() {
        assert_eq!(EntityKind::from(ChildKind::Sign), EntityKind::Sign);
        assert_eq!(
            EntityKind::from(ChildKind::Intersection),
            EntityKind::Intersection
        );
    }
}
