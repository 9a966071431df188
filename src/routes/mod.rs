use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::catalog::{self, EventCategories, EventTypes, Vocabulary};
use crate::handlers::{events, favorites, health_check};
use crate::state::AppState;

/// Options for the outer middleware stack.
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    pub cors_allowed_origins: Option<String>,
    pub production: bool,
}

pub fn create_routes(state: AppState, options: &RouterOptions) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/events", event_routes())
        .nest("/favorites", favorite_routes())
        .nest("/event-types", catalog_routes::<EventTypes>())
        .nest("/event-categories", catalog_routes::<EventCategories>())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(options.production))
        .layer(create_cors_layer(options.cors_allowed_origins.as_deref()))
}

fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list_available).post(events::create_event))
        .route("/all", get(events::list_all))
        .route("/search", get(events::search))
        .route("/upcoming", get(events::list_upcoming))
        .route("/status/:status", get(events::list_by_status))
        .route("/creator/:creator_id", get(events::list_by_creator))
        .route(
            "/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/:id/status", patch(events::update_status))
}

fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(favorites::add_favorite))
        .route("/user/:user_id", get(favorites::list_by_user))
        .route(
            "/user/:user_id/event/:event_id",
            delete(favorites::remove_by_user_and_event),
        )
        .route(
            "/:id",
            get(favorites::get_favorite).delete(favorites::remove_favorite),
        )
}

fn catalog_routes<V: Vocabulary + Send + 'static>() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(catalog::list_entries::<V>).post(catalog::create_entry::<V>),
        )
        .route(
            "/:id",
            get(catalog::get_entry::<V>)
                .put(catalog::update_entry::<V>)
                .delete(catalog::delete_entry::<V>),
        )
}
