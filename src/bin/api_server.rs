// API Server Binary Entry Point
//
// Purpose: Serve the school statistics engine over HTTP
// Usage: cargo run --features api --bin api_server

use school_stats::{create_router, AppState, ServiceConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "school_stats=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    let config = ServiceConfig::from_env();
    tracing::info!("Configuration:");
    match &config.data_path {
        Some(path) => tracing::info!("  SCHOOLS_DATA_PATH: {:?}", path),
        None => tracing::info!("  SCHOOLS_DATA_PATH: (bundled sample)"),
    }
    tracing::info!("  PORT: {}", config.port);

    // Records are loaded once and shared read-only by every request
    let repo = config.load_repository()?;
    let state = AppState::new(repo);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
