//! HTTP API and file helpers for the Eventide server.
//!
//! Maps REST requests onto a [`SharedRepository`] and repository outcomes
//! onto status codes. The store itself knows nothing about HTTP.

mod files;

pub use files::{initial_event_log, load_event_log, load_schema, write_event_log};

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use eventide_store::{Projection, SharedRepository, StoreError};
use eventide_types::{EntityKey, Event, HybridTimestamp, Record, TimeSelector};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::{debug, warn};

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub repository: SharedRepository,
}

impl AppState {
    pub fn new(repository: SharedRepository) -> Self {
        Self { repository }
    }
}

/// Optional `?at=` point-in-time selector.
#[derive(Debug, Default, Deserialize)]
pub struct AtQuery {
    pub at: Option<String>,
}

impl AtQuery {
    fn selector(&self) -> Result<TimeSelector, ApiError> {
        match &self.at {
            None => Ok(TimeSelector::Latest),
            Some(raw) => raw
                .parse()
                .map_err(|e: eventide_types::Error| ApiError::query(StoreError::from(e))),
        }
    }
}

/// Body returned by successful mutations.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MutationResponse {
    /// Timestamp of the recorded event; usable as `?at=` afterwards.
    pub timestamp: HybridTimestamp,
    pub at: String,
}

impl MutationResponse {
    fn new(timestamp: HybridTimestamp) -> Self {
        Self {
            timestamp,
            at: timestamp.to_string(),
        }
    }
}

/// Body returned with every error status.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

/// A store error paired with the status code the endpoint maps it to.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: StoreError,
}

impl ApiError {
    /// Read endpoints: malformed input is the client's fault.
    fn query(error: StoreError) -> Self {
        let status = match error {
            StoreError::InvalidTimeSelector(_) | StoreError::MissingIdentifier { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self { status, error }
    }

    /// Write endpoints: a rejected event maps to `rejected`.
    fn mutation(error: StoreError, rejected: StatusCode) -> Self {
        let status = if error.is_recoverable() {
            rejected
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self { status, error }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!("Request failed: {}", self.error);
        } else {
            debug!("Request rejected ({}): {}", self.status, self.error);
        }
        let body = ErrorResponse {
            error: self.error.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<AtQuery>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let at = query.selector()?;
    let projection = state.repository.find_all(at).map_err(ApiError::query)?;
    Ok(Json(projection.to_records()))
}

/// Keys a `{id}` path segment can name: the string itself, then the number
/// it spells, if any.
fn path_keys(segment: &str) -> Vec<EntityKey> {
    let mut keys = vec![EntityKey::new(segment)];
    if let Ok(number) = segment.parse::<Number>() {
        keys.extend(EntityKey::from_value(&Value::Number(number)));
    }
    keys
}

/// The first of `keys` present in `projection`.
fn resolve_key<'a>(projection: &Projection, keys: &'a [EntityKey]) -> Option<&'a EntityKey> {
    keys.iter().find(|key| projection.contains(key))
}

async fn get_one_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AtQuery>,
) -> Result<Response, ApiError> {
    let at = query.selector()?;
    let projection = state.repository.find_all(at).map_err(ApiError::query)?;
    let keys = path_keys(&id);
    match resolve_key(&projection, &keys).and_then(|key| projection.get(key)) {
        Some(entity) => Ok(Json(entity).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

async fn create_handler(
    State(state): State<AppState>,
    Json(entity): Json<Record>,
) -> Result<(StatusCode, Json<MutationResponse>), ApiError> {
    let timestamp = state
        .repository
        .create(entity)
        .map_err(|e| ApiError::mutation(e, StatusCode::CONFLICT))?;
    Ok((StatusCode::CREATED, Json(MutationResponse::new(timestamp))))
}

async fn update_handler(
    State(state): State<AppState>,
    Json(partial): Json<Record>,
) -> Result<Json<MutationResponse>, ApiError> {
    let timestamp = state
        .repository
        .update(partial)
        .map_err(|e| ApiError::mutation(e, StatusCode::CONFLICT))?;
    Ok(Json(MutationResponse::new(timestamp)))
}

async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MutationResponse>, ApiError> {
    let projection = state
        .repository
        .find_all(TimeSelector::Latest)
        .map_err(ApiError::query)?;
    let keys = path_keys(&id);
    let fallback = EntityKey::new(id.as_str());
    let key = resolve_key(&projection, &keys).unwrap_or(&fallback);
    let target = state.repository.schema().identifier_record(key);
    let timestamp = state
        .repository
        .delete(target)
        .map_err(|e| ApiError::mutation(e, StatusCode::BAD_REQUEST))?;
    Ok(Json(MutationResponse::new(timestamp)))
}

async fn events_handler(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state.repository.event_log().map_err(ApiError::query)?;
    Ok(Json(events))
}

/// `GET /` lists entities, `GET /{id}` fetches one. Both accept `?at=`.
pub fn query_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_handler))
        .route("/{id}", get(get_one_handler))
        .with_state(state)
}

/// `POST /` creates, `PUT /` updates, `DELETE /{id}` deletes.
pub fn mutation_router(state: AppState) -> Router {
    Router::new()
        .route("/", axum::routing::post(create_handler).put(update_handler))
        .route("/{id}", axum::routing::delete(delete_handler))
        .with_state(state)
}

/// Query and mutation routes together.
pub fn restful_router(state: AppState) -> Router {
    query_router(state.clone()).merge(mutation_router(state))
}

/// Build the HTTP API router, mounted at `/api/v1/{entity_type}`.
///
/// Adds `GET /api/v1/{entity_type}/_events` returning the raw event log.
pub fn build_router(state: AppState) -> Router {
    let base = format!("/api/v1/{}", state.repository.schema().entity_type());
    let events = Router::new()
        .route("/_events", get(events_handler))
        .with_state(state.clone());
    Router::new().nest(&base, restful_router(state).merge(events))
}
