//! Backend persistence client
//!
//! Sends the computed result to the application backend for storage,
//! associated with the authenticated user. Fire-and-forget relative to
//! the workflow: the result is already displayed before this call
//! resolves, and failure never reverts it.

use thiserror::Error;
use uuid::Uuid;

use crate::models::EmissionResult;

const USER_AGENT: &str = concat!("jejak/", env!("CARGO_PKG_VERSION"));

/// Persistence client errors
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Network error: {0}")]
    Network(String),

    /// Backend rejected the credential; the stored token must be cleared
    #[error("Backend rejected credential ({0})")]
    Unauthorized(u16),

    #[error("Backend error {0}: {1}")]
    Status(u16, String),
}

/// Backend API client
pub struct PersistenceClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl PersistenceClient {
    pub fn new(base_url: String) -> Result<Self, PersistError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PersistError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST the computed result to the backend
    ///
    /// The idempotency key is minted once per computed result; a manual
    /// retry resends the same key so the backend can deduplicate.
    pub async fn save_emission(
        &self,
        result: &EmissionResult,
        token: &str,
        idempotency_key: Uuid,
    ) -> Result<(), PersistError> {
        let response = self
            .http_client
            .post(format!("{}/api/emission", self.base_url))
            .bearer_auth(token)
            .header("Idempotency-Key", idempotency_key.to_string())
            .json(result)
            .send()
            .await
            .map_err(|e| PersistError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(PersistError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PersistError::Status(status.as_u16(), error_text));
        }

        tracing::info!(total_kg = result.total_kg, "Emission record saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_strips_trailing_slash() {
        let client = PersistenceClient::new("http://localhost:4000/".to_string()).unwrap();
        assert_eq!(client.base_url, "http://localhost:4000");
    }
}
