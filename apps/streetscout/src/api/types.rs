//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Requests are decoded into the DTOs below and converted into core
//! candidates by `into_fields` / `into_patch`, which check string lengths
//! before anything reaches the engine. Views are built from stored records
//! and never flow back in.

use serde::{Deserialize, Serialize};
use streetscout_core::{
    ChildRecord, Condition, Entity, Intersection, IntersectionFields, IntersectionType, Page,
    RoadType, ScoutError, SignFields, SignType, StoreCounts, Street, StreetFields, StreetSign,
    Surface, UpsertOutcome, UpsertStatus, Width,
    primitives::{MAX_NAME_LENGTH, MAX_TEXT_LENGTH, MAX_ZIP_LENGTH},
};

/// Reject `value` if longer than `max` bytes.
fn check_length(field: &str, value: Option<&str>, max: usize) -> Result<(), ScoutError> {
    match value {
        Some(v) if v.len() > max => Err(ScoutError::InvalidField(format!(
            "{} length {} exceeds maximum {} bytes",
            field,
            v.len(),
            max
        ))),
        _ => Ok(()),
    }
}

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Store status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub streets: usize,
    pub signs: usize,
    pub intersections: usize,
    pub total: usize,
}

impl From<StoreCounts> for StatusResponse {
    fn from(counts: StoreCounts) -> Self {
        Self {
            streets: counts.streets,
            signs: counts.signs,
            intersections: counts.intersections,
            total: counts.streets + counts.signs + counts.intersections,
        }
    }
}

// =============================================================================
// LIST QUERY
// =============================================================================

/// `?page=&size=` on list routes.
///
/// Kept as strings so that garbage falls back to the defaults instead of
/// failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub size: Option<String>,
}

impl ListParams {
    /// Resolve to `(page, size)`; the engine clamps both.
    #[must_use]
    pub fn resolve(&self, default_size: i64) -> (i64, i64) {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
        (
            parse(&self.page).unwrap_or(1),
            parse(&self.size).unwrap_or(default_size),
        )
    }
}

/// `?id=` on child submit routes: merge into this record if it exists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitParams {
    pub id: Option<String>,
}

// =============================================================================
// STREET REQUESTS
// =============================================================================

/// New street submission.
///
/// `zip` and `name` identify the street; without `roadType` it is inferred
/// from the last word of the name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetCreate {
    pub zip: Option<String>,
    pub name: Option<String>,
    pub road_type: Option<RoadType>,
    #[serde(flatten)]
    pub details: StreetPatch,
}

impl StreetCreate {
    pub fn into_fields(self) -> Result<StreetFields, ScoutError> {
        check_length("zip", self.zip.as_deref(), MAX_ZIP_LENGTH)?;
        check_length("name", self.name.as_deref(), MAX_NAME_LENGTH)?;
        Ok(StreetFields {
            zip: self.zip,
            name: self.name,
            road_type: self.road_type,
            details: self.details.into_patch()?,
        })
    }
}

/// Street edit. Identity fields are not editable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
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

impl StreetPatch {
    pub fn into_patch(self) -> Result<streetscout_core::StreetPatch, ScoutError> {
        check_length("routeNumber", self.route_number.as_deref(), MAX_NAME_LENGTH)?;
        check_length("town", self.town.as_deref(), MAX_NAME_LENGTH)?;
        check_length("county", self.county.as_deref(), MAX_NAME_LENGTH)?;
        check_length("state", self.state.as_deref(), MAX_NAME_LENGTH)?;
        Ok(streetscout_core::StreetPatch {
            route_number: self.route_number,
            town: self.town,
            county: self.county,
            state: self.state,
            surface: self.surface,
            condition: self.condition,
            width: self.width,
            lanes: self.lanes,
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
        })
    }
}

// =============================================================================
// SIGN REQUESTS
// =============================================================================

/// New sign submission; `streetId` must name a stored street.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetSignCreate {
    pub street_id: Option<String>,
    #[serde(flatten)]
    pub details: StreetSignPatch,
}

impl StreetSignCreate {
    pub fn into_fields(self) -> Result<SignFields, ScoutError> {
        check_length("streetId", self.street_id.as_deref(), MAX_NAME_LENGTH)?;
        let mut fields = self.details.into_fields()?;
        fields.street_id = self.street_id;
        Ok(fields)
    }
}

/// Sign edit. The parent street cannot be changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetSignPatch {
    pub sign_type: Option<SignType>,
    pub text: Option<String>,
    pub speed_limit: Option<i32>,
    pub mile_post: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
}

impl StreetSignPatch {
    pub fn into_fields(self) -> Result<SignFields, ScoutError> {
        check_length("text", self.text.as_deref(), MAX_TEXT_LENGTH)?;
        Ok(SignFields {
            street_id: None,
            sign_type: self.sign_type,
            text: self.text,
            speed_limit: self.speed_limit,
            mile_post: self.mile_post,
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
        })
    }
}

// =============================================================================
// INTERSECTION REQUESTS
// =============================================================================

/// New intersection submission; `streetId` must name a stored street.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntersectionCreate {
    pub street_id: Option<String>,
    #[serde(flatten)]
    pub details: IntersectionPatch,
}

impl IntersectionCreate {
    pub fn into_fields(self) -> Result<IntersectionFields, ScoutError> {
        check_length("streetId", self.street_id.as_deref(), MAX_NAME_LENGTH)?;
        let mut fields = self.details.into_fields()?;
        fields.street_id = self.street_id;
        Ok(fields)
    }
}

/// Intersection edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntersectionPatch {
    pub intersection_type: Option<IntersectionType>,
    pub cross_street: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
}

impl IntersectionPatch {
    pub fn into_fields(self) -> Result<IntersectionFields, ScoutError> {
        check_length("crossStreet", self.cross_street.as_deref(), MAX_NAME_LENGTH)?;
        Ok(IntersectionFields {
            street_id: None,
            intersection_type: self.intersection_type,
            cross_street: self.cross_street,
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
        })
    }
}

// =============================================================================
// VIEWS
// =============================================================================

/// Attributes recorded at one point along a street.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentView {
    pub key: f64,
    pub surface: Surface,
    pub condition: Condition,
    pub width: Width,
    pub lanes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetView {
    pub id: String,
    pub timestamp: i64,
    pub name: String,
    pub road_type: RoadType,
    pub zip: String,
    pub route_number: Option<String>,
    pub town: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub surface: Surface,
    pub condition: Condition,
    pub width: Width,
    pub lanes: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    /// Ordered by key, ascending. Non-finite keys are left out.
    pub segments: Vec<SegmentView>,
    pub signs: Vec<String>,
    pub intersections: Vec<String>,
}

impl From<&Street> for StreetView {
    fn from(street: &Street) -> Self {
        let segments = street
            .segments()
            .iter()
            .filter(|(key, _)| key.value().is_finite())
            .map(|(key, attrs)| SegmentView {
                key: key.value(),
                surface: attrs.surface,
                condition: attrs.condition,
                width: attrs.width,
                lanes: attrs.lanes,
            })
            .collect();

        Self {
            id: street.id().to_string(),
            timestamp: street.timestamp(),
            name: street.name().to_string(),
            road_type: street.road_type(),
            zip: street.zip().to_string(),
            route_number: street.route_number().map(str::to_string),
            town: street.town().map(str::to_string),
            county: street.county().map(str::to_string),
            state: street.state().map(str::to_string),
            surface: street.surface(),
            condition: street.condition(),
            width: street.width(),
            lanes: street.lanes(),
            latitude: street.latitude(),
            longitude: street.longitude(),
            altitude: street.altitude(),
            segments,
            signs: street.signs().iter().cloned().collect(),
            intersections: street.intersections().iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetSignView {
    pub id: String,
    pub street_id: String,
    pub timestamp: i64,
    pub sign_type: SignType,
    pub text: Option<String>,
    pub speed_limit: i32,
    pub mile_post: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl From<&StreetSign> for StreetSignView {
    fn from(sign: &StreetSign) -> Self {
        Self {
            id: sign.id().to_string(),
            street_id: sign.street_id().to_string(),
            timestamp: sign.timestamp(),
            sign_type: sign.sign_type(),
            text: sign.text().map(str::to_string),
            speed_limit: sign.speed_limit(),
            mile_post: sign.mile_post(),
            latitude: sign.latitude(),
            longitude: sign.longitude(),
            altitude: sign.altitude(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntersectionView {
    pub id: String,
    pub street_id: String,
    pub timestamp: i64,
    pub intersection_type: IntersectionType,
    pub cross_street: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl From<&Intersection> for IntersectionView {
    fn from(intersection: &Intersection) -> Self {
        Self {
            id: intersection.id().to_string(),
            street_id: intersection.street_id().to_string(),
            timestamp: intersection.timestamp(),
            intersection_type: intersection.intersection_type(),
            cross_street: intersection.cross_street().map(str::to_string),
            latitude: intersection.latitude(),
            longitude: intersection.longitude(),
            altitude: intersection.altitude(),
        }
    }
}

/// Convert a page of one kind into views, dropping records of other kinds.
pub fn view_page<T, F>(page: Page<Entity>, view: F) -> Page<T>
where
    F: Fn(&Entity) -> Option<T>,
{
    Page {
        items: page.items.iter().filter_map(view).collect(),
        page: page.page,
        size: page.size,
        total: page.total,
    }
}

// =============================================================================
// SUBMIT / DELETE RESPONSES
// =============================================================================

/// Response to a submit or edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub id: Option<String>,
    pub status: Option<UpsertStatus>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl SubmitResponse {
    pub fn success(outcome: &UpsertOutcome) -> Self {
        Self {
            success: true,
            id: Some(outcome.id.clone()),
            status: Some(outcome.status),
            message: Some(outcome.message()),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            status: None,
            message: None,
            error: Some(msg.into()),
        }
    }
}

/// Response to a delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub id: String,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl DeleteResponse {
    pub fn success(id: &str, kind: impl std::fmt::Display) -> Self {
        Self {
            success: true,
            id: id.to_string(),
            message: Some(format!("{} {} deleted successfully", kind, id)),
            error: None,
        }
    }

    pub fn error(id: &str, msg: impl Into<String>) -> Self {
        Self {
            success: false,
            id: id.to_string(),
            message: None,
            error: Some(msg.into()),
        }
    }
}

/// Error body for fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

// =============================================================================
// VIEW HELPERS
// =============================================================================

/// Street view of an entity, if it is a street.
pub fn street_view(entity: &Entity) -> Option<StreetView> {
    match entity {
        Entity::Street(street) => Some(street.into()),
        _ => None,
    }
}

/// Sign view of an entity, if it is a sign.
pub fn sign_view(entity: &Entity) -> Option<StreetSignView> {
    match entity {
        Entity::Sign(sign) => Some(sign.into()),
        _ => None,
    }
}

/// Intersection view of an entity, if it is an intersection.
pub fn intersection_view(entity: &Entity) -> Option<IntersectionView> {
    match entity {
        Entity::Intersection(intersection) => Some(intersection.into()),
        _ => None,
    }
}
