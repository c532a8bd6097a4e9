//! jejak-ui library interface
//!
//! Exposes the application state, router and all workflow modules for
//! integration testing.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::UiConfig;
use crate::models::UploadSession;
use crate::services::{CalculatorClient, PersistenceClient, RecognitionClient, TokenStore};
use jejak_common::events::EventBus;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Active upload sessions, owned exclusively by this table
    pub sessions: Arc<RwLock<HashMap<Uuid, UploadSession>>>,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Receipt recognition service client
    pub recognition: Arc<RecognitionClient>,
    /// Emission calculation service client
    pub calculator: Arc<CalculatorClient>,
    /// Application backend client
    pub persistence: Arc<PersistenceClient>,
    /// Bearer credential ownership point
    pub tokens: Arc<TokenStore>,
    pub config: Arc<UiConfig>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: UiConfig, event_bus: EventBus) -> anyhow::Result<Self> {
        let recognition = RecognitionClient::new(config.ocr_base_url.clone())?;
        let calculator = CalculatorClient::new(config.ocr_base_url.clone())?;
        let persistence = PersistenceClient::new(config.backend_base_url.clone())?;

        Ok(Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            event_bus,
            recognition: Arc::new(recognition),
            calculator: Arc::new(calculator),
            persistence: Arc::new(persistence),
            tokens: Arc::new(TokenStore::new()),
            config: Arc::new(config),
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        // UI routes (HTML pages)
        .merge(api::ui_routes())
        // API routes
        .merge(api::upload_routes())
        .merge(api::auth_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
