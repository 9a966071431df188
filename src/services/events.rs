use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::catalog::resolve_entry;
use crate::models::{CatalogKind, Event, EventRequest, EventResponse, EventSearch, EventStatus};
use crate::repository::{EventFilter, Store};
use crate::utils::error::{AppError, AppResult};

/// Event lifecycle and queries.
#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn Store>,
    enforce_date_order: bool,
}

impl EventService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            enforce_date_order: false,
        }
    }

    /// Opt-in rejection of events ending before they start.
    pub fn with_date_order_check(mut self, enforce: bool) -> Self {
        self.enforce_date_order = enforce;
        self
    }

    fn check_request(&self, request: &EventRequest) -> AppResult<()> {
        request.validate()?;
        if self.enforce_date_order {
            request.check_date_order()?;
        }
        Ok(())
    }

    /// Every supplied reference must exist before the event is built.
    async fn resolve_references(&self, request: &EventRequest) -> AppResult<()> {
        if let Some(id) = request.event_type_id {
            resolve_entry(self.store.as_ref(), CatalogKind::EventType, id).await?;
        }
        if let Some(id) = request.category_id {
            resolve_entry(self.store.as_ref(), CatalogKind::EventCategory, id).await?;
        }
        Ok(())
    }

    /// Creates an active event stamped with today's date. Any status or
    /// creation date in the payload is ignored.
    pub async fn create_event(
        &self,
        request: EventRequest,
        creator_id: Uuid,
    ) -> AppResult<EventResponse> {
        self.check_request(&request)?;
        self.resolve_references(&request).await?;

        let record = self
            .store
            .insert_event(Event::create(request, creator_id))
            .await?;

        tracing::info!(event_id = %record.event.id, creator_id = %creator_id, "Created event");
        Ok(record.into())
    }

    pub async fn get_event(&self, id: Uuid) -> AppResult<EventResponse> {
        self.store
            .find_event(id)
            .await?
            .map(EventResponse::from)
            .ok_or_else(|| AppError::not_found("Event", id))
    }

    /// Full replace of the mutable fields; status and creation date are untouched.
    pub async fn update_event(&self, id: Uuid, request: EventRequest) -> AppResult<EventResponse> {
        let mut event = self
            .store
            .find_event(id)
            .await?
            .ok_or_else(|| AppError::not_found("Event", id))?
            .event;

        self.check_request(&request)?;
        self.resolve_references(&request).await?;
        event.apply_update(request);

        let record = self
            .store
            .update_event(event)
            .await?
            .ok_or_else(|| AppError::not_found("Event", id))?;

        tracing::info!(event_id = %id, "Updated event");
        Ok(record.into())
    }

    /// Any status may be assigned from any other, itself included.
    pub async fn update_status(&self, id: Uuid, status: EventStatus) -> AppResult<EventResponse> {
        let record = self
            .store
            .set_event_status(id, status)
            .await?
            .ok_or_else(|| AppError::not_found("Event", id))?;

        tracing::info!(event_id = %id, status = %status, "Updated event status");
        Ok(record.into())
    }

    pub async fn delete_event(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete_event(id).await? {
            return Err(AppError::not_found("Event", id));
        }
        tracing::info!(event_id = %id, "Deleted event and its favorites");
        Ok(())
    }

    async fn list(&self, filter: EventFilter) -> AppResult<Vec<EventResponse>> {
        let records = self.store.list_events(filter).await?;
        Ok(records.into_iter().map(EventResponse::from).collect())
    }

    pub async fn list_all(&self) -> AppResult<Vec<EventResponse>> {
        self.list(EventFilter::All).await
    }

    /// Active events matching every supplied criterion.
    pub async fn search_available(&self, search: EventSearch) -> AppResult<Vec<EventResponse>> {
        self.list(EventFilter::Available(search.normalized())).await
    }

    /// Keyword search across all statuses; no keyword lists everything.
    pub async fn search_by_keyword(&self, keyword: Option<String>) -> AppResult<Vec<EventResponse>> {
        match keyword.filter(|k| !k.trim().is_empty()) {
            Some(keyword) => self.list(EventFilter::Keyword(keyword)).await,
            None => self.list_all().await,
        }
    }

    pub async fn list_by_status(&self, status: EventStatus) -> AppResult<Vec<EventResponse>> {
        self.list(EventFilter::Status(status)).await
    }

    pub async fn list_by_creator(&self, creator_id: Uuid) -> AppResult<Vec<EventResponse>> {
        self.list(EventFilter::Creator(creator_id)).await
    }

    pub async fn list_upcoming(&self) -> AppResult<Vec<EventResponse>> {
        self.list(EventFilter::StartingAfter(Utc::now())).await
    }
}
