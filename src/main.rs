use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use eventy_server::auth::JwtVerifier;
use eventy_server::config::{Config, StoreBackend};
use eventy_server::repository::{InMemoryStore, PgStore, Store};
use eventy_server::routes::{create_routes, RouterOptions};
use eventy_server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn Store> = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(&config.database_url)
                .await?;

            tracing::info!("Successfully connected to database");

            sqlx::migrate!().run(&pool).await?;

            tracing::info!("Migrations run successfully");
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            Arc::new(InMemoryStore::new())
        }
    };

    let verifier = JwtVerifier::from_settings(&config.jwt)?;
    let state = AppState::new(store, verifier, config.enforce_date_order);

    let app: Router = create_routes(
        state,
        &RouterOptions {
            cors_allowed_origins: config.cors_allowed_origins.clone(),
            production: config.production,
        },
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("Server running at http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
