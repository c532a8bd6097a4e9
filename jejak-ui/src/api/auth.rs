//! Session token endpoints
//!
//! The backend issues the bearer credential at login; this service only
//! holds it for the active session. Storing and clearing both go through
//! the single TokenStore ownership point.

use axum::{extract::State, routing::put, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{ApiError, ApiResult},
    AppState,
};

/// PUT /auth/token request
#[derive(Debug, Deserialize)]
pub struct SetTokenRequest {
    pub token: String,
}

/// PUT /auth/token
///
/// Store the backend-issued bearer credential for the active session.
pub async fn set_token(
    State(state): State<AppState>,
    Json(request): Json<SetTokenRequest>,
) -> ApiResult<Json<Value>> {
    if request.token.trim().is_empty() {
        return Err(ApiError::BadRequest("token must not be empty".to_string()));
    }
    state.tokens.set(request.token).await;
    tracing::info!("Session token stored");
    Ok(Json(json!({ "status": "ok" })))
}

/// DELETE /auth/token
///
/// Logout: discard the stored credential.
pub async fn clear_token(State(state): State<AppState>) -> Json<Value> {
    state.tokens.clear().await;
    tracing::info!("Session token cleared");
    Json(json!({ "status": "ok" }))
}

/// Build auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/token", put(set_token).delete(clear_token))
}
