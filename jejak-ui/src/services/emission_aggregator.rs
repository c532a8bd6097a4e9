//! Aggregation and classification of computed emission results
//!
//! Pure functions of an [`EmissionResult`]: category percentage shares,
//! a three-tier severity label, and the offset cost estimate. Shares are
//! recomputed fresh from the result on every change, never mutated in
//! place.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::EmissionResult;

/// Three-tier severity classification of a total emission figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

/// Derived view model over a computed result
#[derive(Debug, Clone, Serialize)]
pub struct EmissionSummary {
    /// Category name → rounded percentage of the declared total.
    /// Independent rounding means the shares need not sum to 100.
    pub category_shares: BTreeMap<String, i64>,
    pub severity: Severity,
    /// Offset cost estimate, local currency; displayed, never persisted
    pub offset_cost: f64,
}

impl EmissionSummary {
    /// Derive the full summary from a result and the configured offset price
    pub fn from_result(result: &EmissionResult, offset_price_per_kg: f64) -> Self {
        Self {
            category_shares: category_shares(result),
            severity: classify_severity(result.total_kg),
            offset_cost: offset_cost(result.total_kg, offset_price_per_kg),
        }
    }
}

/// Group details by category and express each group as a rounded
/// percentage of the declared total
///
/// A zero total is treated as divisor 1, so every share resolves to 0
/// instead of raising a division error.
pub fn category_shares(result: &EmissionResult) -> BTreeMap<String, i64> {
    let divisor = if result.total_kg == 0.0 {
        1.0
    } else {
        result.total_kg
    };

    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for detail in &result.details {
        *sums.entry(detail.category.clone()).or_insert(0.0) += detail.emission_kg;
    }

    sums.into_iter()
        .map(|(category, sum)| (category, ((sum / divisor) * 100.0).round() as i64))
        .collect()
}

/// Step-function severity label: > 70 High, > 40 Medium, otherwise Low
pub fn classify_severity(total_kg: f64) -> Severity {
    if total_kg > 70.0 {
        Severity::High
    } else if total_kg > 40.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Offset cost estimate: total × price per kg
pub fn offset_cost(total_kg: f64, price_per_kg: f64) -> f64 {
    total_kg * price_per_kg
}
