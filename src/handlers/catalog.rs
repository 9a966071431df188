//! Handlers for the two label vocabularies. Each handler is generic over
//! the vocabulary so one set of functions serves `/event-types` and
//! `/event-categories`.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::models::{CatalogKind, LabelRequest};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::{created, no_content};

/// Picks the vocabulary a route serves.
pub trait Vocabulary {
    const KIND: CatalogKind;
}

pub struct EventTypes;
pub struct EventCategories;

impl Vocabulary for EventTypes {
    const KIND: CatalogKind = CatalogKind::EventType;
}

impl Vocabulary for EventCategories {
    const KIND: CatalogKind = CatalogKind::EventCategory;
}

pub async fn list_entries<V: Vocabulary>(State(state): State<AppState>) -> AppResult<Response> {
    let entries = state.catalog.list(V::KIND).await?;
    Ok(Json(entries).into_response())
}

pub async fn get_entry<V: Vocabulary>(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Response> {
    let Path(id) = id?;
    let entry = state.catalog.get(V::KIND, id).await?;
    Ok(Json(entry).into_response())
}

pub async fn create_entry<V: Vocabulary>(
    State(state): State<AppState>,
    _admin: AdminUser,
    payload: Result<Json<LabelRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload?;
    let entry = state.catalog.create(V::KIND, request).await?;
    Ok(created(entry))
}

pub async fn update_entry<V: Vocabulary>(
    State(state): State<AppState>,
    _admin: AdminUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<LabelRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let entry = state.catalog.update(V::KIND, id, request).await?;
    Ok(Json(entry).into_response())
}

pub async fn delete_entry<V: Vocabulary>(
    State(state): State<AppState>,
    _admin: AdminUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Response> {
    let Path(id) = id?;
    state.catalog.delete(V::KIND, id).await?;
    Ok(no_content())
}
