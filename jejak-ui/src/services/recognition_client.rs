//! Receipt recognition service client
//!
//! Submits the normalized receipt image to the external OCR / product
//! detection endpoint and parses the candidate product list. Either the
//! full candidate list is produced or none is; there is no partial-result
//! handling and no automatic retry.

use serde::Deserialize;
use thiserror::Error;

const USER_AGENT: &str = concat!("jejak/", env!("CARGO_PKG_VERSION"));

/// Recognition client errors
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Recognition service error {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// `POST /predict-carbon` response
#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    detected_products: Vec<DetectedProduct>,
}

/// The service emits either `{ "produk": "..." }` objects or bare strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DetectedProduct {
    Named { produk: String },
    Bare(String),
}

impl DetectedProduct {
    fn into_name(self) -> String {
        match self {
            DetectedProduct::Named { produk } => produk.trim().to_string(),
            DetectedProduct::Bare(name) => name.trim().to_string(),
        }
    }
}

/// Recognition service API client
pub struct RecognitionClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl RecognitionClient {
    /// No explicit request timeout is configured; the transport default
    /// applies and every retry is a manual user action.
    pub fn new(base_url: String) -> Result<Self, RecognitionError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RecognitionError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Detect candidate products on a normalized receipt image
    ///
    /// Order from the service is preserved; duplicates are preserved.
    pub async fn detect_products(&self, jpeg: Vec<u8>) -> Result<Vec<String>, RecognitionError> {
        let part = reqwest::multipart::Part::bytes(jpeg)
            .file_name("receipt.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| RecognitionError::Network(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        tracing::debug!(base_url = %self.base_url, "Submitting receipt for recognition");

        let response = self
            .http_client
            .post(format!("{}/predict-carbon", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| RecognitionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RecognitionError::Status(status.as_u16(), error_text));
        }

        let parsed: PredictResponse = response
            .json()
            .await
            .map_err(|e| RecognitionError::Parse(e.to_string()))?;

        let products: Vec<String> = parsed
            .detected_products
            .into_iter()
            .map(DetectedProduct::into_name)
            .collect();

        tracing::info!(count = products.len(), "Recognition completed");

        Ok(products)
    }
}
