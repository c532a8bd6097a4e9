//! Computed emission results
//!
//! Field names follow the calculator and backend wire format, so these
//! types serialize directly into the persistence request body.

use serde::{Deserialize, Serialize};

/// Per-product emission as returned by the calculator; read-only once received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionDetail {
    #[serde(rename = "produk")]
    pub product: String,
    /// kg CO2-equivalent attributed to this product
    #[serde(rename = "emisi")]
    pub emission_kg: f64,
    #[serde(rename = "kategori")]
    pub category: String,
}

/// Full calculator output
///
/// The declared total and the sum of per-item emissions are produced
/// independently upstream and are intentionally not reconciled here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionResult {
    #[serde(rename = "total_karbon")]
    pub total_kg: f64,
    #[serde(rename = "detail")]
    pub details: Vec<EmissionDetail>,
}
