//! Timetable store HTTP server.
//!
//! Serves a timetable store over the REST API consumed by `RemoteRepository`.
//!
//! # Usage
//!
//! ```bash
//! # Serve the built-in campus from an in-memory store (default)
//! cargo run --bin timetabler-server
//!
//! # Seed the in-memory store from a catalog file
//! printf '[catalog]\npath = "campus.json"\n' > timetabler.toml
//! cargo run --bin timetabler-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `REPOSITORY_TYPE`: `local` or `remote`
//! - `TIMETABLE_STORE_URL`: proxy another store instead of serving a local one
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use timetabler::db::{CatalogRepository, RepositoryConfig, RepositoryFactory};
use timetabler::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting timetable store server");

    let config = match RepositoryConfig::from_default_location() {
        Ok(config) => config,
        Err(e) => {
            info!("{}; using defaults", e);
            RepositoryConfig::default()
        }
    }
    .with_env_overrides();

    let repository = RepositoryFactory::from_repository_config(&config)?;
    if !repository.health_check().await? {
        anyhow::bail!("Timetable store is not healthy");
    }
    info!("Repository initialized successfully");

    // Create application state
    let state = AppState::new(repository);

    // Create router with all endpoints
    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
