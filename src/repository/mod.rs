//! Persistence for events, catalog entries and favorites.
//!
//! The traits describe what the services need from a store; `PgStore` is the
//! production implementation and `InMemoryStore` mirrors its referential
//! behaviour (unique labels, nullable references, cascading favorites) for
//! tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    CatalogEntry, CatalogKind, Event, EventRecord, EventSearch, EventStatus, Favorite,
    FavoriteAdded,
};
use crate::utils::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Which events a listing should return. Every listing is ordered by start
/// date, then id.
#[derive(Debug, Clone, PartialEq)]
pub enum EventFilter {
    All,
    /// Active events matching keyword, location and category.
    Available(EventSearch),
    /// Keyword on name or description, any status.
    Keyword(String),
    Status(EventStatus),
    Creator(Uuid),
    StartingAfter(DateTime<Utc>),
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Fails with `NotFound` when a referenced type or category is missing.
    async fn insert_event(&self, event: Event) -> AppResult<EventRecord>;

    async fn find_event(&self, id: Uuid) -> AppResult<Option<EventRecord>>;

    /// Writes the mutable fields only; id, creator, status and creation
    /// date stay as stored. Returns `None` when no event has this id.
    async fn update_event(&self, event: Event) -> AppResult<Option<EventRecord>>;

    async fn set_event_status(
        &self,
        id: Uuid,
        status: EventStatus,
    ) -> AppResult<Option<EventRecord>>;

    /// Removes the event and every favorite pointing at it.
    async fn delete_event(&self, id: Uuid) -> AppResult<bool>;

    async fn list_events(&self, filter: EventFilter) -> AppResult<Vec<EventRecord>>;
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_entries(&self, kind: CatalogKind) -> AppResult<Vec<CatalogEntry>>;

    async fn find_entry(&self, kind: CatalogKind, id: Uuid) -> AppResult<Option<CatalogEntry>>;

    /// Fails with `Conflict` when the label is taken.
    async fn insert_entry(&self, kind: CatalogKind, label: String) -> AppResult<CatalogEntry>;

    async fn update_entry(
        &self,
        kind: CatalogKind,
        id: Uuid,
        label: String,
    ) -> AppResult<Option<CatalogEntry>>;

    /// Events referencing the entry keep existing with the reference cleared.
    async fn delete_entry(&self, kind: CatalogKind, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Inserts unless the (user, event) pair is already stored, in which case
    /// the stored favorite is returned untouched.
    async fn add_favorite(&self, favorite: Favorite) -> AppResult<FavoriteAdded>;

    async fn find_favorite(&self, id: Uuid) -> AppResult<Option<Favorite>>;

    async fn list_favorites_by_user(&self, user_id: Uuid) -> AppResult<Vec<Favorite>>;

    async fn delete_favorite(&self, id: Uuid) -> AppResult<bool>;

    async fn delete_favorite_by_user_and_event(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> AppResult<bool>;
}

/// Everything the services need, behind one object.
pub trait Store: EventRepository + CatalogRepository + FavoriteRepository {}

impl<T> Store for T where T: EventRepository + CatalogRepository + FavoriteRepository {}
