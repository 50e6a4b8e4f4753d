//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Every kind exposes the same five routes. The per-kind handlers are thin
//! wrappers that pick the DTO and view; the shared work lives in the
//! `*_entity` helpers below.

use super::{
    AppState,
    types::{
        DeleteResponse, ErrorResponse, HealthResponse, IntersectionCreate, IntersectionPatch,
        ListParams, StatusResponse, StreetCreate, StreetPatch, StreetSignCreate, StreetSignPatch,
        SubmitParams, SubmitResponse, intersection_view, sign_view, street_view, view_page,
    },
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use streetscout_core::{ChildFields, ChildKind, EntityKind, ScoutError, UpsertOutcome, UpsertStatus};

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// HTTP status for a core error.
#[must_use]
pub fn status_for(error: &ScoutError) -> StatusCode {
    match error {
        ScoutError::NotFound(_) => StatusCode::NOT_FOUND,
        ScoutError::IdentificationFailed(_)
        | ScoutError::MissingParent(_)
        | ScoutError::MissingInput
        | ScoutError::InvalidField(_)
        | ScoutError::SerializationError(_) => StatusCode::BAD_REQUEST,
        ScoutError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Decode a JSON body. An empty body or a bare `null` is `None`, not an
/// error.
fn decode_body<T: DeserializeOwned>(body: &Bytes) -> Result<Option<T>, ScoutError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<Option<T>>(body)
        .map_err(|e| ScoutError::SerializationError(e.to_string()))
}

/// Path ids are trimmed; a blank id never reaches the engine.
fn path_id(id: &str) -> Result<&str, ScoutError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ScoutError::InvalidField(
            "Missing or blank path param: id".to_string(),
        ));
    }
    Ok(id)
}

fn submit_reply(
    kind: EntityKind,
    result: Result<UpsertOutcome, ScoutError>,
) -> (StatusCode, Json<SubmitResponse>) {
    match result {
        Ok(outcome) => {
            let event = match (outcome.kind, outcome.status) {
                (EntityKind::Street, UpsertStatus::Created) => "street_created",
                (EntityKind::Street, UpsertStatus::UpdatedExisting) => "street_merged",
                (EntityKind::Street, UpsertStatus::Updated) => "street_updated",
                (EntityKind::Sign, UpsertStatus::Created) => "sign_created",
                (EntityKind::Sign, _) => "sign_updated",
                (EntityKind::Intersection, UpsertStatus::Created) => "intersection_created",
                (EntityKind::Intersection, _) => "intersection_updated",
            };
            tracing::info!(event, id = %outcome.id, "{}", outcome.message());
            (StatusCode::OK, Json(SubmitResponse::success(&outcome)))
        }
        Err(e) => {
            tracing::warn!(event = "submission_rejected", kind = %kind, error = %e);
            (status_for(&e), Json(SubmitResponse::error(e.to_string())))
        }
    }
}

// =============================================================================
// HEALTH / STATUS HANDLERS
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Record counts per kind.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(StatusResponse::from(state.engine.counts())),
    )
}

// =============================================================================
// SHARED HANDLERS
// =============================================================================

fn get_entity<T, F>(state: &AppState, kind: EntityKind, id: &str, view: F) -> Response
where
    T: serde::Serialize,
    F: Fn(&streetscout_core::Entity) -> Option<T>,
{
    let found = path_id(id).and_then(|id| state.engine.fetch_as(kind, id));
    match found.map(|entity| view(&entity)) {
        Ok(Some(body)) => (StatusCode::OK, Json(body)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("{} not found: {}", kind, id))),
        )
            .into_response(),
        Err(e) => (status_for(&e), Json(ErrorResponse::new(e.to_string()))).into_response(),
    }
}

fn list_entities<T, F>(state: &AppState, kind: EntityKind, params: &ListParams, view: F) -> Response
where
    T: serde::Serialize,
    F: Fn(&streetscout_core::Entity) -> Option<T>,
{
    let (page, size) = params.resolve(state.default_page_size);
    let listing = view_page(state.engine.list(kind, page, size), view);
    (StatusCode::OK, Json(listing)).into_response()
}

fn delete_entity(state: &AppState, kind: EntityKind, id: &str) -> (StatusCode, Json<DeleteResponse>) {
    match path_id(id).and_then(|id| state.engine.delete_as(kind, id)) {
        Ok(removed) => {
            tracing::info!(event = "entity_deleted", kind = %kind, id = %removed.id());
            (
                StatusCode::OK,
                Json(DeleteResponse::success(removed.id(), kind)),
            )
        }
        Err(e) => (status_for(&e), Json(DeleteResponse::error(id, e.to_string()))),
    }
}

fn submit_child(
    state: &AppState,
    kind: ChildKind,
    id: Option<&str>,
    candidate: Result<Option<ChildFields>, ScoutError>,
) -> (StatusCode, Json<SubmitResponse>) {
    let id = id.map(str::trim).filter(|id| !id.is_empty());
    let result = candidate.and_then(|c| state.engine.upsert_child(kind, id, c));
    submit_reply(kind.into(), result)
}

fn edit_child(
    state: &AppState,
    kind: ChildKind,
    id: &str,
    candidate: Result<Option<ChildFields>, ScoutError>,
) -> (StatusCode, Json<SubmitResponse>) {
    let result = path_id(id).and_then(|id| {
        let candidate = candidate?.ok_or(ScoutError::MissingInput)?;
        state.engine.edit_child(kind, id, Some(candidate))
    });
    submit_reply(kind.into(), result)
}

// =============================================================================
// STREET HANDLERS
// =============================================================================

pub async fn list_streets(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Response {
    list_entities(&state, EntityKind::Street, &params, street_view)
}

pub async fn get_street(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    get_entity(&state, EntityKind::Street, &id, street_view)
}

/// Create a street, or merge into the stored one with the same identity.
pub async fn submit_street(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let result = decode_body::<StreetCreate>(&body)
        .and_then(|dto| dto.ok_or(ScoutError::MissingInput))
        .and_then(StreetCreate::into_fields)
        .and_then(|fields| state.engine.upsert_street(fields));
    submit_reply(EntityKind::Street, result)
}

pub async fn edit_street(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    let result = path_id(&id).and_then(|id| {
        let patch = decode_body::<StreetPatch>(&body)?
            .ok_or(ScoutError::MissingInput)?
            .into_patch()?;
        state.engine.edit_street(id, patch)
    });
    submit_reply(EntityKind::Street, result)
}

pub async fn delete_street(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    delete_entity(&state, EntityKind::Street, &id)
}

// =============================================================================
// SIGN HANDLERS
// =============================================================================

pub async fn list_signs(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Response {
    list_entities(&state, EntityKind::Sign, &params, sign_view)
}

pub async fn get_sign(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    get_entity(&state, EntityKind::Sign, &id, sign_view)
}

/// File a new sign under its street, or merge into `?id=` if stored.
pub async fn submit_sign(
    State(state): State<AppState>,
    Query(params): Query<SubmitParams>,
    body: Bytes,
) -> impl IntoResponse {
    let candidate = decode_body::<StreetSignCreate>(&body).and_then(|dto| {
        dto.map(|d| d.into_fields().map(ChildFields::Sign))
            .transpose()
    });
    submit_child(&state, ChildKind::Sign, params.id.as_deref(), candidate)
}

pub async fn edit_sign(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    let candidate = decode_body::<StreetSignPatch>(&body).and_then(|dto| {
        dto.map(|d| d.into_fields().map(ChildFields::Sign))
            .transpose()
    });
    edit_child(&state, ChildKind::Sign, &id, candidate)
}

pub async fn delete_sign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    delete_entity(&state, EntityKind::Sign, &id)
}

// =============================================================================
// INTERSECTION HANDLERS
// =============================================================================

pub async fn list_intersections(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Response {
    list_entities(&state, EntityKind::Intersection, &params, intersection_view)
}

pub async fn get_intersection(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    get_entity(&state, EntityKind::Intersection, &id, intersection_view)
}

pub async fn submit_intersection(
    State(state): State<AppState>,
    Query(params): Query<SubmitParams>,
    body: Bytes,
) -> impl IntoResponse {
    let candidate = decode_body::<IntersectionCreate>(&body).and_then(|dto| {
        dto.map(|d| d.into_fields().map(ChildFields::Intersection))
            .transpose()
    });
    submit_child(&state, ChildKind::Intersection, params.id.as_deref(), candidate)
}

pub async fn edit_intersection(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    let candidate = decode_body::<IntersectionPatch>(&body).and_then(|dto| {
        dto.map(|d| d.into_fields().map(ChildFields::Intersection))
            .transpose()
    });
    edit_child(&state, ChildKind::Intersection, &id, candidate)
}

pub async fn delete_intersection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    delete_entity(&state, EntityKind::Intersection, &id)
}

// =============================================================================
// TESTS
// =============================================================================
