use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CatalogRepository, EventFilter, EventRepository, FavoriteRepository};
use crate::models::{
    CatalogEntry, CatalogKind, Event, EventRecord, EventStatus, Favorite, FavoriteAdded,
};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Default)]
struct State {
    events: HashMap<Uuid, Event>,
    event_types: HashMap<Uuid, CatalogEntry>,
    event_categories: HashMap<Uuid, CatalogEntry>,
    favorites: HashMap<Uuid, Favorite>,
}

impl State {
    fn catalog(&self, kind: CatalogKind) -> &HashMap<Uuid, CatalogEntry> {
        match kind {
            CatalogKind::EventType => &self.event_types,
            CatalogKind::EventCategory => &self.event_categories,
        }
    }

    fn catalog_mut(&mut self, kind: CatalogKind) -> &mut HashMap<Uuid, CatalogEntry> {
        match kind {
            CatalogKind::EventType => &mut self.event_types,
            CatalogKind::EventCategory => &mut self.event_categories,
        }
    }

    fn label_taken(&self, kind: CatalogKind, label: &str, except: Option<Uuid>) -> bool {
        self.catalog(kind)
            .values()
            .any(|e| e.label == label && Some(e.id) != except)
    }

    /// Same guarantee as the foreign keys on the `event` table.
    fn check_references(&self, event: &Event) -> AppResult<()> {
        if let Some(id) = event.event_type_id {
            if !self.event_types.contains_key(&id) {
                return Err(AppError::not_found("Event type", id));
            }
        }
        if let Some(id) = event.category_id {
            if !self.event_categories.contains_key(&id) {
                return Err(AppError::not_found("Event category", id));
            }
        }
        Ok(())
    }

    fn record(&self, event: &Event) -> EventRecord {
        let label = |map: &HashMap<Uuid, CatalogEntry>, id: Option<Uuid>| {
            id.and_then(|id| map.get(&id)).map(|e| e.label.clone())
        };

        EventRecord {
            event: event.clone(),
            type_label: label(&self.event_types, event.event_type_id),
            category_label: label(&self.event_categories, event.category_id),
        }
    }
}

/// In-memory store (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn insert_event(&self, event: Event) -> AppResult<EventRecord> {
        let mut state = self.state.write().await;
        state.check_references(&event)?;

        let record = state.record(&event);
        state.events.insert(event.id, event);
        Ok(record)
    }

    async fn find_event(&self, id: Uuid) -> AppResult<Option<EventRecord>> {
        let state = self.state.read().await;
        Ok(state.events.get(&id).map(|e| state.record(e)))
    }

    /// Same columns as the SQL update: identity, creator, status and
    /// creation date of the stored row are kept.
    async fn update_event(&self, event: Event) -> AppResult<Option<EventRecord>> {
        let mut state = self.state.write().await;
        state.check_references(&event)?;
        let Some(stored) = state.events.get_mut(&event.id) else {
            return Ok(None);
        };

        stored.name = event.name;
        stored.description = event.description;
        stored.start_date = event.start_date;
        stored.end_date = event.end_date;
        stored.location = event.location;
        stored.full_address = event.full_address;
        stored.image_url = event.image_url;
        stored.event_type_id = event.event_type_id;
        stored.category_id = event.category_id;

        let stored = stored.clone();
        Ok(Some(state.record(&stored)))
    }

    async fn set_event_status(
        &self,
        id: Uuid,
        status: EventStatus,
    ) -> AppResult<Option<EventRecord>> {
        let mut state = self.state.write().await;
        let Some(event) = state.events.get_mut(&id) else {
            return Ok(None);
        };
        event.status = status;

        let event = event.clone();
        Ok(Some(state.record(&event)))
    }

    async fn delete_event(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.events.remove(&id).is_none() {
            return Ok(false);
        }
        state.favorites.retain(|_, f| f.event_id != id);
        Ok(true)
    }

    async fn list_events(&self, filter: EventFilter) -> AppResult<Vec<EventRecord>> {
        let state = self.state.read().await;

        let mut events: Vec<&Event> = state
            .events
            .values()
            .filter(|e| match &filter {
                EventFilter::All => true,
                EventFilter::Available(search) => e.matches_search(search),
                EventFilter::Keyword(keyword) => e.matches_keyword(keyword),
                EventFilter::Status(status) => e.status == *status,
                EventFilter::Creator(creator_id) => e.creator_id == *creator_id,
                EventFilter::StartingAfter(instant) => e.start_date > *instant,
            })
            .collect();

        events.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));

        Ok(events.into_iter().map(|e| state.record(e)).collect())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn list_entries(&self, kind: CatalogKind) -> AppResult<Vec<CatalogEntry>> {
        let state = self.state.read().await;
        let mut entries: Vec<CatalogEntry> = state.catalog(kind).values().cloned().collect();
        entries.sort_by(|a, b| a.label.cmp(&b.label).then(a.id.cmp(&b.id)));
        Ok(entries)
    }

    async fn find_entry(&self, kind: CatalogKind, id: Uuid) -> AppResult<Option<CatalogEntry>> {
        let state = self.state.read().await;
        Ok(state.catalog(kind).get(&id).cloned())
    }

    async fn insert_entry(&self, kind: CatalogKind, label: String) -> AppResult<CatalogEntry> {
        let mut state = self.state.write().await;
        if state.label_taken(kind, &label, None) {
            return Err(AppError::Conflict(format!(
                "{} '{}' already exists",
                kind.display_name(),
                label
            )));
        }

        let entry = CatalogEntry {
            id: Uuid::new_v4(),
            label,
        };
        state.catalog_mut(kind).insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn update_entry(
        &self,
        kind: CatalogKind,
        id: Uuid,
        label: String,
    ) -> AppResult<Option<CatalogEntry>> {
        let mut state = self.state.write().await;
        if !state.catalog(kind).contains_key(&id) {
            return Ok(None);
        }
        if state.label_taken(kind, &label, Some(id)) {
            return Err(AppError::Conflict(format!(
                "{} '{}' already exists",
                kind.display_name(),
                label
            )));
        }

        let entry = CatalogEntry { id, label };
        state.catalog_mut(kind).insert(id, entry.clone());
        Ok(Some(entry))
    }

    async fn delete_entry(&self, kind: CatalogKind, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.catalog_mut(kind).remove(&id).is_none() {
            return Ok(false);
        }

        for event in state.events.values_mut() {
            let reference = match kind {
                CatalogKind::EventType => &mut event.event_type_id,
                CatalogKind::EventCategory => &mut event.category_id,
            };
            if *reference == Some(id) {
                *reference = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl FavoriteRepository for InMemoryStore {
    async fn add_favorite(&self, favorite: Favorite) -> AppResult<FavoriteAdded> {
        let mut state = self.state.write().await;
        if !state.events.contains_key(&favorite.event_id) {
            return Err(AppError::not_found("Event", favorite.event_id));
        }

        let existing = state
            .favorites
            .values()
            .find(|f| f.user_id == favorite.user_id && f.event_id == favorite.event_id);
        if let Some(existing) = existing {
            return Ok(FavoriteAdded::Existing(existing.clone()));
        }

        state.favorites.insert(favorite.id, favorite.clone());
        Ok(FavoriteAdded::Created(favorite))
    }

    async fn find_favorite(&self, id: Uuid) -> AppResult<Option<Favorite>> {
        let state = self.state.read().await;
        Ok(state.favorites.get(&id).cloned())
    }

    async fn list_favorites_by_user(&self, user_id: Uuid) -> AppResult<Vec<Favorite>> {
        let state = self.state.read().await;
        let mut favorites: Vec<Favorite> = state
            .favorites
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        favorites.sort_by(|a, b| a.added_date.cmp(&b.added_date).then(a.id.cmp(&b.id)));
        Ok(favorites)
    }

    async fn delete_favorite(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.favorites.remove(&id).is_some())
    }

    async fn delete_favorite_by_user_and_event(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let before = state.favorites.len();
        state
            .favorites
            .retain(|_, f| !(f.user_id == user_id && f.event_id == event_id));
        Ok(state.favorites.len() != before)
    }
}
