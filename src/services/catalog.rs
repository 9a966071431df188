use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::models::{CatalogEntry, CatalogKind, LabelRequest};
use crate::repository::Store;
use crate::utils::error::{AppError, AppResult};

/// Looks up a catalog entry that a write is about to reference.
pub async fn resolve_entry(
    store: &dyn Store,
    kind: CatalogKind,
    id: Uuid,
) -> AppResult<CatalogEntry> {
    store
        .find_entry(kind, id)
        .await?
        .ok_or_else(|| AppError::not_found(kind.display_name(), id))
}

/// Event types and event categories share this service; the kind picks the table.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, kind: CatalogKind) -> AppResult<Vec<CatalogEntry>> {
        self.store.list_entries(kind).await
    }

    pub async fn get(&self, kind: CatalogKind, id: Uuid) -> AppResult<CatalogEntry> {
        resolve_entry(self.store.as_ref(), kind, id).await
    }

    pub async fn create(&self, kind: CatalogKind, request: LabelRequest) -> AppResult<CatalogEntry> {
        request.validate()?;

        let entry = self.store.insert_entry(kind, request.trimmed_label()).await?;
        tracing::info!(kind = kind.table(), id = %entry.id, label = %entry.label, "Created catalog entry");
        Ok(entry)
    }

    pub async fn update(
        &self,
        kind: CatalogKind,
        id: Uuid,
        request: LabelRequest,
    ) -> AppResult<CatalogEntry> {
        request.validate()?;

        let entry = self
            .store
            .update_entry(kind, id, request.trimmed_label())
            .await?
            .ok_or_else(|| AppError::not_found(kind.display_name(), id))?;
        tracing::info!(kind = kind.table(), id = %id, "Updated catalog entry");
        Ok(entry)
    }

    pub async fn delete(&self, kind: CatalogKind, id: Uuid) -> AppResult<()> {
        if !self.store.delete_entry(kind, id).await? {
            return Err(AppError::not_found(kind.display_name(), id));
        }
        tracing::info!(kind = kind.table(), id = %id, "Deleted catalog entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(InMemoryStore::new()))
    }

    fn label(value: &str) -> LabelRequest {
        LabelRequest {
            label: value.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = service();
        let created = service
            .create(CatalogKind::EventType, label(" Concert "))
            .await
            .unwrap();
        assert_eq!(created.label, "Concert");

        let fetched = service.get(CatalogKind::EventType, created.id).await.unwrap();
        assert_eq!(fetched, created);

        // Same id is unknown in the other vocabulary.
        assert!(matches!(
            service.get(CatalogKind::EventCategory, created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_label_rejected() {
        let result = service().create(CatalogKind::EventCategory, label("")).await;
        assert!(matches!(result, Err(AppError::InvalidPayload(_))));
    }

    #[tokio::test]
    async fn test_update_conflict_and_missing() {
        let service = service();
        let music = service
            .create(CatalogKind::EventCategory, label("Music"))
            .await
            .unwrap();
        service
            .create(CatalogKind::EventCategory, label("Sport"))
            .await
            .unwrap();

        let conflict = service
            .update(CatalogKind::EventCategory, music.id, label("Sport"))
            .await;
        assert!(matches!(conflict, Err(AppError::Conflict(_))));

        // Renaming to its own label is fine.
        assert!(service
            .update(CatalogKind::EventCategory, music.id, label("Music"))
            .await
            .is_ok());

        let missing = service
            .update(CatalogKind::EventCategory, Uuid::new_v4(), label("Art"))
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let service = service();
        let entry = service
            .create(CatalogKind::EventType, label("Workshop"))
            .await
            .unwrap();

        service.delete(CatalogKind::EventType, entry.id).await.unwrap();
        assert!(matches!(
            service.delete(CatalogKind::EventType, entry.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
