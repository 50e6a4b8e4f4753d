//! # Entity Model
//!
//! The three record kinds held by the store: `Street`, `StreetSign` and
//! `Intersection`, joined in the closed `Entity` enum.
//!
//! ## Relationships
//!
//! A street keeps the ids of its signs and intersections; each child keeps
//! the id of its street. Neither side owns the other's lifetime. The
//! street-side sets only ever grow.
//!
//! ## Segments
//!
//! Every street mutation records the current physical attributes under the
//! `SegmentKey` of the current coordinates. New coordinates add an entry;
//! the same coordinates replace the entry at that key.

use crate::primitives::DEFAULT_LANES;
use crate::{
    ChildKind, Condition, EntityKind, IntersectionType, Region, RoadType, SegmentKey, SignType,
    StreetAttributes, Surface, Width,
};
use std::collections::{BTreeMap, BTreeSet};

/// Milliseconds since the Unix epoch, used as creation time.
fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// =============================================================================
// MERGE FILTERS
// =============================================================================
//
// A merge overwrites a stored field only with a value that carries
// information. `None`, the `Unknown` variants, blank text, zero counts and
// zero or non-finite coordinates all leave the stored value in place.

/// Supplied and different from the no-information value `default`.
fn informative<T: PartialEq>(value: Option<T>, default: T) -> Option<T> {
    value.filter(|v| *v != default)
}

fn informative_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Lane counts below one and the creation default are not informative.
fn informative_lanes(value: Option<i32>) -> Option<i32> {
    value.filter(|v| *v > 0 && *v != DEFAULT_LANES)
}

fn informative_float(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

// =============================================================================
// CANDIDATE FIELDS
// =============================================================================

/// Mergeable street fields. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreetPatch {
    pub route_number: Option<String>,
    pub town: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub surface: Option<Surface>,
    pub condition: Option<Condition>,
    pub width: Option<Width>,
    pub lanes: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
}

/// A submitted street: identity fields plus mergeable details.
///
/// `zip` and `name` are required to derive the id. Without `road_type` the
/// type is inferred from the name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreetFields {
    pub zip: Option<String>,
    pub name: Option<String>,
    pub road_type: Option<RoadType>,
    pub details: StreetPatch,
}

/// A submitted or patched street sign. `None` keeps the stored value.
///
/// `street_id` is only read when the sign is created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignFields {
    pub street_id: Option<String>,
    pub sign_type: Option<SignType>,
    pub text: Option<String>,
    pub speed_limit: Option<i32>,
    pub mile_post: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
}

/// A submitted or patched intersection. `None` keeps the stored value.
///
/// `street_id` is only read when the intersection is created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntersectionFields {
    pub street_id: Option<String>,
    pub intersection_type: Option<IntersectionType>,
    pub cross_street: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
}

/// Candidate for either child kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildFields {
    Sign(SignFields),
    Intersection(IntersectionFields),
}

impl ChildFields {
    #[must_use]
    pub const fn kind(&self) -> ChildKind {
        match self {
            Self::Sign(_) => ChildKind::Sign,
            Self::Intersection(_) => ChildKind::Intersection,
        }
    }
}

// =============================================================================
// STREET
// =============================================================================

/// A physical road, identified by `(zip, road_type, name)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Street {
    id: String,
    timestamp: i64,
    name: String,
    road_type: RoadType,
    zip: String,
    route_number: Option<String>,
    town: Option<String>,
    county: Option<String>,
    state: Option<String>,
    surface: Surface,
    condition: Condition,
    width: Width,
    lanes: i32,
    latitude: f64,
    longitude: f64,
    altitude: f64,
    segments: BTreeMap<SegmentKey, StreetAttributes>,
    signs: BTreeSet<String>,
    intersections: BTreeSet<String>,
}

impl Street {
    /// Build a new street under an already derived id.
    ///
    /// Town, county and state supplied in `details` win over `region`.
    /// The first segment is recorded at the initial coordinates.
    #[must_use]
    pub fn create(
        id: String,
        zip: String,
        road_type: RoadType,
        name: String,
        details: StreetPatch,
        region: Option<Region>,
    ) -> Self {
        let (region_state, region_county, region_town) = match region {
            Some(r) => (Some(r.state), Some(r.county), Some(r.town)),
            None => (None, None, None),
        };

        let mut street = Self {
            id,
            timestamp: now_millis(),
            name,
            road_type,
            zip,
            route_number: details.route_number,
            town: details.town.or(region_town),
            county: details.county.or(region_county),
            state: details.state.or(region_state),
            surface: details.surface.unwrap_or_default(),
            condition: details.condition.unwrap_or_default(),
            width: details.width.unwrap_or_default(),
            lanes: details.lanes.unwrap_or(DEFAULT_LANES),
            latitude: details.latitude.unwrap_or(0.0),
            longitude: details.longitude.unwrap_or(0.0),
            altitude: details.altitude.unwrap_or(0.0),
            segments: BTreeMap::new(),
            signs: BTreeSet::new(),
            intersections: BTreeSet::new(),
        };
        street.record_segment();
        street
    }

    /// Merge informative fields, then record a segment at the current
    /// position.
    pub fn merge(&mut self, patch: StreetPatch) {
        if let Some(v) = informative_text(patch.route_number) {
            self.route_number = Some(v);
        }
        if let Some(v) = informative_text(patch.town) {
            self.town = Some(v);
        }
        if let Some(v) = informative_text(patch.county) {
            self.county = Some(v);
        }
        if let Some(v) = informative_text(patch.state) {
            self.state = Some(v);
        }
        if let Some(v) = informative(patch.surface, Surface::Unknown) {
            self.surface = v;
        }
        if let Some(v) = informative(patch.condition, Condition::Unknown) {
            self.condition = v;
        }
        if let Some(v) = informative(patch.width, Width::Unknown) {
            self.width = v;
        }
        if let Some(v) = informative_lanes(patch.lanes) {
            self.lanes = v;
        }
        if let Some(v) = informative_float(patch.latitude) {
            self.latitude = v;
        }
        if let Some(v) = informative_float(patch.longitude) {
            self.longitude = v;
        }
        if let Some(v) = informative_float(patch.altitude) {
            self.altitude = v;
        }
        self.record_segment();
    }

    /// Add a child id to the matching relationship set.
    ///
    /// Returns `false` if the id was already registered.
    pub fn register_child(&mut self, kind: ChildKind, child_id: &str) -> bool {
        let set = match kind {
            ChildKind::Sign => &mut self.signs,
            ChildKind::Intersection => &mut self.intersections,
        };
        set.insert(child_id.to_string())
    }

    fn record_segment(&mut self) {
        let key = self.segment_key();
        self.segments.insert(key, self.attributes());
    }

    /// The current physical attributes.
    #[must_use]
    pub fn attributes(&self) -> StreetAttributes {
        StreetAttributes {
            surface: self.surface,
            condition: self.condition,
            width: self.width,
            lanes: self.lanes,
        }
    }

    /// The segment key of the current coordinates.
    #[must_use]
    pub fn segment_key(&self) -> SegmentKey {
        SegmentKey::from_position(self.latitude, self.longitude, self.altitude)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn road_type(&self) -> RoadType {
        self.road_type
    }

    #[must_use]
    pub fn zip(&self) -> &str {
        &self.zip
    }

    #[must_use]
    pub fn route_number(&self) -> Option<&str> {
        self.route_number.as_deref()
    }

    #[must_use]
    pub fn town(&self) -> Option<&str> {
        self.town.as_deref()
    }

    #[must_use]
    pub fn county(&self) -> Option<&str> {
        self.county.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    #[must_use]
    pub fn surface(&self) -> Surface {
        self.surface
    }

    #[must_use]
    pub fn condition(&self) -> Condition {
        self.condition
    }

    #[must_use]
    pub fn width(&self) -> Width {
        self.width
    }

    #[must_use]
    pub fn lanes(&self) -> i32 {
        self.lanes
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    #[must_use]
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Attribute timeline, ordered by segment key.
    #[must_use]
    pub fn segments(&self) -> &BTreeMap<SegmentKey, StreetAttributes> {
        &self.segments
    }

    #[must_use]
    pub fn signs(&self) -> &BTreeSet<String> {
        &self.signs
    }

    #[must_use]
    pub fn intersections(&self) -> &BTreeSet<String> {
        &self.intersections
    }
}

// =============================================================================
// STREET SIGN
// =============================================================================

/// A sign posted along a street.
#[derive(Debug, Clone, PartialEq)]
pub struct StreetSign {
    id: String,
    timestamp: i64,
    street_id: String,
    sign_type: SignType,
    text: Option<String>,
    speed_limit: i32,
    mile_post: f64,
    latitude: f64,
    longitude: f64,
    altitude: f64,
}

impl StreetSign {
    #[must_use]
    pub fn sign_type(&self) -> SignType {
        self.sign_type
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    #[must_use]
    pub fn speed_limit(&self) -> i32 {
        self.speed_limit
    }

    #[must_use]
    pub fn mile_post(&self) -> f64 {
        self.mile_post
    }

    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    #[must_use]
    pub fn altitude(&self) -> f64 {
        self.altitude
    }
}

// =============================================================================
// INTERSECTION
// =============================================================================

/// A junction between a street and a cross street.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    id: String,
    timestamp: i64,
    street_id: String,
    intersection_type: IntersectionType,
    cross_street: Option<String>,
    latitude: f64,
    longitude: f64,
    altitude: f64,
}

impl Intersection {
    #[must_use]
    pub fn intersection_type(&self) -> IntersectionType {
        self.intersection_type
    }

    #[must_use]
    pub fn cross_street(&self) -> Option<&str> {
        self.cross_street.as_deref()
    }

    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    #[must_use]
    pub fn altitude(&self) -> f64 {
        self.altitude
    }
}

// =============================================================================
// CHILD RECORD TRAIT
// =============================================================================

/// Behaviour shared by records that hang off a street.
///
/// The upsert engine resolves, merges and registers signs and
/// intersections through this trait.
pub trait ChildRecord: Sized {
    /// Candidate fields for this kind.
    type Fields;

    /// Which street relationship set holds this kind.
    const KIND: ChildKind;

    /// Build a new record with a freshly issued id.
    fn create(id: String, street_id: String, fields: Self::Fields) -> Self;

    /// The parent street a candidate asks to be filed under.
    fn requested_parent(fields: &Self::Fields) -> Option<&str>;

    /// Merge informative fields; the parent reference is left untouched.
    fn merge(&mut self, fields: Self::Fields);

    fn id(&self) -> &str;

    fn street_id(&self) -> &str;

    /// Unwrap the matching variant of a type-erased candidate.
    fn fields_from(candidate: ChildFields) -> Option<Self::Fields>;

    fn from_entity(entity: Entity) -> Option<Self>;

    fn into_entity(self) -> Entity;
}

impl ChildRecord for StreetSign {
    type Fields = SignFields;
    const KIND: ChildKind = ChildKind::Sign;

    fn create(id: String, street_id: String, fields: SignFields) -> Self {
        Self {
            id,
            timestamp: now_millis(),
            street_id,
            sign_type: fields.sign_type.unwrap_or_default(),
            text: fields.text,
            speed_limit: fields.speed_limit.unwrap_or(0),
            mile_post: fields.mile_post.unwrap_or(0.0),
            latitude: fields.latitude.unwrap_or(0.0),
            longitude: fields.longitude.unwrap_or(0.0),
            altitude: fields.altitude.unwrap_or(0.0),
        }
    }

    fn requested_parent(fields: &SignFields) -> Option<&str> {
        fields.street_id.as_deref()
    }

    fn merge(&mut self, fields: SignFields) {
        if let Some(v) = informative(fields.sign_type, SignType::Unknown) {
            self.sign_type = v;
        }
        if let Some(v) = informative_text(fields.text) {
            self.text = Some(v);
        }
        if let Some(v) = informative(fields.speed_limit, 0) {
            self.speed_limit = v;
        }
        if let Some(v) = informative_float(fields.mile_post) {
            self.mile_post = v;
        }
        if let Some(v) = informative_float(fields.latitude) {
            self.latitude = v;
        }
        if let Some(v) = informative_float(fields.longitude) {
            self.longitude = v;
        }
        if let Some(v) = informative_float(fields.altitude) {
            self.altitude = v;
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn street_id(&self) -> &str {
        &self.street_id
    }

    fn fields_from(candidate: ChildFields) -> Option<SignFields> {
        match candidate {
            ChildFields::Sign(fields) => Some(fields),
            ChildFields::Intersection(_) => None,
        }
    }

    fn from_entity(entity: Entity) -> Option<Self> {
        match entity {
            Entity::Sign(sign) => Some(sign),
            _ => None,
        }
    }

    fn into_entity(self) -> Entity {
        Entity::Sign(self)
    }
}

impl ChildRecord for Intersection {
    type Fields = IntersectionFields;
    const KIND: ChildKind = ChildKind::Intersection;

    fn create(id: String, street_id: String, fields: IntersectionFields) -> Self {
        Self {
            id,
            timestamp: now_millis(),
            street_id,
            intersection_type: fields.intersection_type.unwrap_or_default(),
            cross_street: fields.cross_street,
            latitude: fields.latitude.unwrap_or(0.0),
            longitude: fields.longitude.unwrap_or(0.0),
            altitude: fields.altitude.unwrap_or(0.0),
        }
    }

    fn requested_parent(fields: &IntersectionFields) -> Option<&str> {
        fields.street_id.as_deref()
    }

    fn merge(&mut self, fields: IntersectionFields) {
        if let Some(v) = informative(fields.intersection_type, IntersectionType::Unknown)
        {
            self.intersection_type = v;
        }
        if let Some(v) = informative_text(fields.cross_street) {
            self.cross_street = Some(v);
        }
        if let Some(v) = informative_float(fields.latitude) {
            self.latitude = v;
        }
        if let Some(v) = informative_float(fields.longitude) {
            self.longitude = v;
        }
        if let Some(v) = informative_float(fields.altitude) {
            self.altitude = v;
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn street_id(&self) -> &str {
        &self.street_id
    }

    fn fields_from(candidate: ChildFields) -> Option<IntersectionFields> {
        match candidate {
            ChildFields::Intersection(fields) => Some(fields),
            ChildFields::Sign(_) => None,
        }
    }

    fn from_entity(entity: Entity) -> Option<Self> {
        match entity {
            Entity::Intersection(intersection) => Some(intersection),
            _ => None,
        }
    }

    fn into_entity(self) -> Entity {
        Entity::Intersection(self)
    }
}

// =============================================================================
// ENTITY
// =============================================================================

/// Any record held by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Street(Street),
    Sign(StreetSign),
    Intersection(Intersection),
}

impl Entity {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Street(s) => s.id(),
            Self::Sign(s) => s.id(),
            Self::Intersection(i) => i.id(),
        }
    }

    /// Creation time in milliseconds since the Unix epoch.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        match self {
            Self::Street(s) => s.timestamp(),
            Self::Sign(s) => s.timestamp(),
            Self::Intersection(i) => i.timestamp(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Street(_) => EntityKind::Street,
            Self::Sign(_) => EntityKind::Sign,
            Self::Intersection(_) => EntityKind::Intersection,
        }
    }

    #[must_use]
    pub fn into_street(self) -> Option<Street> {
        match self {
            Self::Street(street) => Some(street),
            _ => None,
        }
    }
}

impl From<Street> for Entity {
    fn from(street: Street) -> Self {
        Self::Street(street)
    }
}

impl From<StreetSign> for Entity {
    fn from(sign: StreetSign) -> Self {
        Self::Sign(sign)
    }
}

impl From<Intersection> for Entity {
    fn from(intersection: Intersection) -> Self {
        Self::Intersection(intersection)
    }
}

// =============================================================================
// TESTS
// =============================================================================
