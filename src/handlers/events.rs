use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::models::{EventRequest, EventSearch, EventStatus, KeywordQuery, StatusQuery};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::{created, no_content};

/// `GET /events`: active events filtered by `search`, `location` and `categoryId`.
pub async fn list_available(
    State(state): State<AppState>,
    query: Result<Query<EventSearch>, QueryRejection>,
) -> AppResult<Response> {
    let Query(search) = query?;
    let events = state.events.search_available(search).await?;
    Ok(Json(events).into_response())
}

pub async fn list_all(State(state): State<AppState>) -> AppResult<Response> {
    let events = state.events.list_all().await?;
    Ok(Json(events).into_response())
}

pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<KeywordQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(KeywordQuery { keyword }) = query?;
    let events = state.events.search_by_keyword(keyword).await?;
    Ok(Json(events).into_response())
}

pub async fn get_event(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Response> {
    let Path(id) = id?;
    let event = state.events.get_event(id).await?;
    Ok(Json(event).into_response())
}

pub async fn list_by_status(
    State(state): State<AppState>,
    status: Result<Path<String>, PathRejection>,
) -> AppResult<Response> {
    let Path(status) = status?;
    let status = EventStatus::parse_token(&status)?;
    let events = state.events.list_by_status(status).await?;
    Ok(Json(events).into_response())
}

pub async fn list_by_creator(
    State(state): State<AppState>,
    creator_id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Response> {
    let Path(creator_id) = creator_id?;
    let events = state.events.list_by_creator(creator_id).await?;
    Ok(Json(events).into_response())
}

pub async fn list_upcoming(State(state): State<AppState>) -> AppResult<Response> {
    let events = state.events.list_upcoming().await?;
    Ok(Json(events).into_response())
}

/// `creatorId` in the body wins; otherwise the admin's own subject is used.
pub async fn create_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload?;
    let creator_id = match request.creator_id {
        Some(id) => id,
        None => admin.user_id()?,
    };

    let event = state.events.create_event(request, creator_id).await?;
    Ok(created(event))
}

pub async fn update_event(
    State(state): State<AppState>,
    _admin: AdminUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Path(id) = id?;
    let Json(request) = payload?;

    let event = state.events.update_event(id, request).await?;
    Ok(Json(event).into_response())
}

/// `PATCH /events/{id}/status?status=<token>`
pub async fn update_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Path(id) = id?;
    let Query(StatusQuery { status }) = query?;
    let status = EventStatus::parse_token(&status)?;

    let event = state.events.update_status(id, status).await?;
    Ok(Json(event).into_response())
}

pub async fn delete_event(
    State(state): State<AppState>,
    _admin: AdminUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Response> {
    let Path(id) = id?;
    state.events.delete_event(id).await?;
    Ok(no_content())
}
