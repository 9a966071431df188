use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub added_date: NaiveDate,
}

impl Favorite {
    pub fn new(user_id: Uuid, event_id: Uuid, added_date: Option<NaiveDate>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            event_id,
            added_date: added_date.unwrap_or_else(|| Utc::now().date_naive()),
        }
    }
}

/// `userId` falls back to the caller's identity when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub user_id: Option<Uuid>,
    pub event_id: Uuid,
    pub added_date: Option<NaiveDate>,
}

/// Result of an add: either a fresh row or the one already stored for the pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteAdded {
    Created(Favorite),
    Existing(Favorite),
}

impl FavoriteAdded {
    pub fn favorite(&self) -> &Favorite {
        match self {
            FavoriteAdded::Created(f) | FavoriteAdded::Existing(f) => f,
        }
    }

    pub fn into_favorite(self) -> Favorite {
        match self {
            FavoriteAdded::Created(f) | FavoriteAdded::Existing(f) => f,
        }
    }
}
