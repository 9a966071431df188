use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::{FavoriteAdded, FavoriteRequest};
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::response::{created, no_content};

pub async fn list_by_user(
    State(state): State<AppState>,
    _user: AuthUser,
    user_id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Response> {
    let Path(user_id) = user_id?;
    let favorites = state.favorites.list_by_user(user_id).await?;
    Ok(Json(favorites).into_response())
}

pub async fn get_favorite(
    State(state): State<AppState>,
    _user: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Response> {
    let Path(id) = id?;
    let favorite = state.favorites.get(id).await?;
    Ok(Json(favorite).into_response())
}

/// 201 for a new favorite, 200 with the stored one when the pair already exists.
pub async fn add_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<FavoriteRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(request) = payload?;

    let response = match state.favorites.add(request, &user).await? {
        FavoriteAdded::Created(favorite) => created(favorite),
        FavoriteAdded::Existing(favorite) => Json(favorite).into_response(),
    };
    Ok(response)
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    _user: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Response> {
    let Path(id) = id?;
    state.favorites.remove(id).await?;
    Ok(no_content())
}

pub async fn remove_by_user_and_event(
    State(state): State<AppState>,
    _user: AuthUser,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> AppResult<Response> {
    let Path((user_id, event_id)) = ids?;
    state
        .favorites
        .remove_by_user_and_event(user_id, event_id)
        .await?;
    Ok(no_content())
}
