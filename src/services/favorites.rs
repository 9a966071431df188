use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::{Favorite, FavoriteAdded, FavoriteRequest};
use crate::repository::Store;
use crate::utils::error::{AppError, AppResult};

#[derive(Clone)]
pub struct FavoriteService {
    store: Arc<dyn Store>,
}

impl FavoriteService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Records `(user, event)`. When the pair is already stored the existing
    /// favorite comes back unchanged. Without a `userId` the caller's token
    /// subject is used.
    pub async fn add(&self, request: FavoriteRequest, caller: &AuthUser) -> AppResult<FavoriteAdded> {
        let user_id = match request.user_id {
            Some(id) => id,
            None => caller.user_id()?,
        };

        if self.store.find_event(request.event_id).await?.is_none() {
            return Err(AppError::not_found("Event", request.event_id));
        }

        let added = self
            .store
            .add_favorite(Favorite::new(user_id, request.event_id, request.added_date))
            .await?;

        match &added {
            FavoriteAdded::Created(f) => {
                tracing::info!(favorite_id = %f.id, user_id = %user_id, event_id = %f.event_id, "Added favorite")
            }
            FavoriteAdded::Existing(f) => {
                tracing::debug!(favorite_id = %f.id, "Favorite already present")
            }
        }
        Ok(added)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Favorite> {
        self.store
            .find_favorite(id)
            .await?
            .ok_or_else(|| AppError::not_found("Favorite", id))
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Favorite>> {
        self.store.list_favorites_by_user(user_id).await
    }

    pub async fn remove(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete_favorite(id).await? {
            return Err(AppError::not_found("Favorite", id));
        }
        tracing::info!(favorite_id = %id, "Removed favorite");
        Ok(())
    }

    /// Succeeds whether or not the pair was stored.
    pub async fn remove_by_user_and_event(&self, user_id: Uuid, event_id: Uuid) -> AppResult<()> {
        let removed = self
            .store
            .delete_favorite_by_user_and_event(user_id, event_id)
            .await?;
        tracing::debug!(user_id = %user_id, event_id = %event_id, removed, "Removed favorite by pair");
        Ok(())
    }
}
