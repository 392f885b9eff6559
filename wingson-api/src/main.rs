use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wingson_api::{app, AppState};
use wingson_store::app_config::{Config, StorageBackend};
use wingson_store::{DbClient, PgBookingRepository, PgFlightRepository, PgPersonRepository, SeedData};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wingson_api=debug,wingson_booking=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting WingsOn API on port {}", config.server.port);

    let app_state = build_state(&config).await?;
    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    match config.storage.backend {
        StorageBackend::Memory => {
            let seed = match &config.storage.seed_path {
                Some(path) => SeedData::load(path)?,
                None => {
                    tracing::warn!("No seed_path configured, starting with empty storage");
                    SeedData::default()
                }
            };
            let stores = seed.into_memory_stores();
            Ok(AppState::new(stores.persons, stores.bookings, stores.flights))
        }
        StorageBackend::Postgres => {
            let database = config
                .database
                .as_ref()
                .context("storage.backend = \"postgres\" requires a [database] section")?;

            let db = DbClient::new(&database.url, database.max_connections)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await?;

            Ok(AppState::new(
                Arc::new(PgPersonRepository::new(db.pool.clone())),
                Arc::new(PgBookingRepository::new(db.pool.clone())),
                Arc::new(PgFlightRepository::new(db.pool.clone())),
            ))
        }
    }
}
