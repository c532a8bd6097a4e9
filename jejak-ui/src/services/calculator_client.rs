//! Emission calculator service client
//!
//! Sends a single batch request with all line items converted to
//! kilograms and parses the per-item emission results. The response is
//! handled leniently: a malformed but present payload degrades to zeroes
//! and empty lists instead of failing the workflow.

use serde_json::Value;
use thiserror::Error;

use crate::models::{EmissionDetail, EmissionResult, NormalizedLineItem};

const USER_AGENT: &str = concat!("jejak/", env!("CARGO_PKG_VERSION"));

/// Calculator client errors
#[derive(Debug, Error)]
pub enum CalculationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Calculation service error {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Calculation service API client
pub struct CalculatorClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl CalculatorClient {
    /// No explicit request timeout is configured; the transport default
    /// applies and every retry is a manual user action.
    pub fn new(base_url: String) -> Result<Self, CalculationError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CalculationError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Compute emission totals for a batch of normalized line items
    pub async fn calculate(
        &self,
        items: &[NormalizedLineItem],
    ) -> Result<EmissionResult, CalculationError> {
        tracing::debug!(
            base_url = %self.base_url,
            items = items.len(),
            "Submitting items for emission calculation"
        );

        let response = self
            .http_client
            .post(format!("{}/calculate-carbon", self.base_url))
            .json(&serde_json::json!({ "items": items }))
            .send()
            .await
            .map_err(|e| CalculationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CalculationError::Status(status.as_u16(), error_text));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| CalculationError::Parse(e.to_string()))?;

        let result = parse_calculation_response(payload);

        tracing::info!(
            total_kg = result.total_kg,
            details = result.details.len(),
            "Calculation completed"
        );

        Ok(result)
    }
}

/// Coerce the calculator payload into an [`EmissionResult`]
///
/// Missing or non-numeric `total_karbon` defaults to 0; a missing or
/// non-array `detail` defaults to an empty list. The declared total is
/// kept as-is and never reconciled with the per-item sum.
pub fn parse_calculation_response(payload: Value) -> EmissionResult {
    let total_kg = payload
        .get("total_karbon")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    let details = payload
        .get("detail")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| EmissionDetail {
                    product: item
                        .get("produk")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    emission_kg: item.get("emisi").and_then(Value::as_f64).unwrap_or(0.0),
                    category: item
                        .get("kategori")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    EmissionResult { total_kg, details }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_response_parses() {
        let result = parse_calculation_response(json!({
            "total_karbon": 12.34,
            "detail": [
                {"produk": "Beras", "emisi": 9.0, "kategori": "Sembako"},
                {"produk": "Telur", "emisi": 3.34, "kategori": "Protein"},
            ]
        }));
        assert_eq!(result.total_kg, 12.34);
        assert_eq!(result.details.len(), 2);
        assert_eq!(result.details[0].product, "Beras");
        assert_eq!(result.details[1].category, "Protein");
    }

    #[test]
    fn missing_detail_defaults_to_empty_list() {
        let result = parse_calculation_response(json!({"total_karbon": 5.5}));
        assert_eq!(result.total_kg, 5.5);
        assert!(result.details.is_empty());
    }

    #[test]
    fn non_numeric_total_defaults_to_zero() {
        let result = parse_calculation_response(json!({
            "total_karbon": "lots",
            "detail": []
        }));
        assert_eq!(result.total_kg, 0.0);
    }

    #[test]
    fn absent_total_defaults_to_zero() {
        let result = parse_calculation_response(json!({}));
        assert_eq!(result.total_kg, 0.0);
        assert!(result.details.is_empty());
    }

    #[test]
    fn non_array_detail_defaults_to_empty_list() {
        let result = parse_calculation_response(json!({
            "total_karbon": 3.0,
            "detail": "oops"
        }));
        assert_eq!(result.total_kg, 3.0);
        assert!(result.details.is_empty());
    }

    #[test]
    fn partial_detail_items_are_coerced() {
        let result = parse_calculation_response(json!({
            "total_karbon": 1.0,
            "detail": [{"produk": "Beras"}, {"emisi": 2.5}]
        }));
        assert_eq!(result.details[0].emission_kg, 0.0);
        assert_eq!(result.details[0].category, "");
        assert_eq!(result.details[1].product, "");
        assert_eq!(result.details[1].emission_kg, 2.5);
    }

    #[test]
    fn declared_total_is_not_reconciled_with_item_sum() {
        let result = parse_calculation_response(json!({
            "total_karbon": 100.0,
            "detail": [{"produk": "Beras", "emisi": 1.0, "kategori": "Sembako"}]
        }));
        // The divergence is upstream's to own
        assert_eq!(result.total_kg, 100.0);
        assert_eq!(result.details[0].emission_kg, 1.0);
    }
}
