use axum::extract::FromRef;
use std::sync::Arc;

use crate::auth::JwtVerifier;
use crate::repository::Store;
use crate::services::{CatalogService, EventService, FavoriteService};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub events: EventService,
    pub favorites: FavoriteService,
    pub catalog: CatalogService,
    pub verifier: Arc<JwtVerifier>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, verifier: JwtVerifier, enforce_date_order: bool) -> Self {
        Self {
            events: EventService::new(store.clone()).with_date_order_check(enforce_date_order),
            favorites: FavoriteService::new(store.clone()),
            catalog: CatalogService::new(store),
            verifier: Arc::new(verifier),
        }
    }
}

impl FromRef<AppState> for Arc<JwtVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}
