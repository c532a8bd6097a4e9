//! jejak-ui - Receipt Upload & Carbon Footprint Service
//!
//! Serves the upload UI and orchestrates the upload-and-compute workflow:
//! receipt image → product detection → user quantities → emission
//! calculation → backend persistence.

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use jejak_common::events::EventBus;
use jejak_ui::config::UiConfig;
use jejak_ui::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting jejak-ui (Receipt Upload) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve configuration (ENV → TOML → defaults)
    let config = UiConfig::resolve()
        .map_err(|e| anyhow::anyhow!("Failed to resolve configuration: {}", e))?;
    let bind_address = config.bind_address.clone();

    // Event bus for SSE broadcasting
    let event_bus = EventBus::new(100);

    // Application state (builds the external service clients)
    let state = AppState::new(config, event_bus)?;

    // Build router
    let app = jejak_ui::build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{}", bind_address);
    info!("Upload page: http://{}/upload", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
