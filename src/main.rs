//! tunedex - Music-file catalog microservice
//!
//! Clients upload audio files and manage song records referencing them.
//! REST API over SQLite, with uploaded bytes stored under the root
//! folder's uploads directory.

use anyhow::Result;
use tracing::info;
use tunedex::{build_router, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting tunedex v{}", env!("CARGO_PKG_VERSION"));

    // Resolve root folder and create the directories it implies
    let config = AppConfig::resolve();
    config.ensure_directories()?;
    info!("Root folder: {}", config.root_folder.display());

    // Open or create database
    let db_path = config.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = tunedex::db::init_database_pool(&db_path).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(db_pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
