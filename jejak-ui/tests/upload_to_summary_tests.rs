//! End-to-end data-flow tests: quantity table → normalized items →
//! calculator payload parsing → aggregated summary
//!
//! Exercises the whole derivation chain on fixed payloads, without the
//! external services.

use jejak_ui::models::{QuantityTable, Unit};
use jejak_ui::services::calculator_client::parse_calculation_response;
use jejak_ui::services::emission_aggregator::{classify_severity, EmissionSummary, Severity};
use serde_json::json;

#[test]
fn receipt_with_two_products_flows_through_to_shares_and_severity() {
    // Two detected products, quantities entered as 2 kg and 500 gram
    let mut table = QuantityTable::from_candidates(vec![
        "Beras".to_string(),
        "Telur".to_string(),
    ]);
    table.set_quantity_text(0, "2".to_string()).unwrap();
    table.set_quantity_text(1, "500".to_string()).unwrap();
    table.set_unit(1, Unit::Gram).unwrap();

    // Conversion to the calculator request shape
    let items = table.normalized().unwrap();
    let request = serde_json::to_value(&items).unwrap();
    assert_eq!(
        request,
        json!([
            {"produk": "Beras", "berat_kg": 2.0},
            {"produk": "Telur", "berat_kg": 0.5},
        ])
    );

    // Calculator response
    let result = parse_calculation_response(json!({
        "total_karbon": 12.34,
        "detail": [
            {"produk": "Beras", "emisi": 9.0, "kategori": "Sembako"},
            {"produk": "Telur", "emisi": 3.34, "kategori": "Protein"},
        ]
    }));

    // Aggregated view model
    let summary = EmissionSummary::from_result(&result, 1200.0);
    assert_eq!(summary.category_shares["Sembako"], 73);
    assert_eq!(summary.category_shares["Protein"], 27);
    assert_eq!(summary.severity, Severity::Low);
    assert_eq!(summary.offset_cost, 12.34 * 1200.0);
}

#[test]
fn piece_quantities_use_the_approximate_mass() {
    let mut table = QuantityTable::from_candidates(vec!["Telur".to_string()]);
    table.set_quantity_text(0, "10".to_string()).unwrap();
    table.set_unit(0, Unit::Piece).unwrap();

    let items = table.normalized().unwrap();
    assert_eq!(items[0].mass_kg, 0.5); // 10 pcs × 0.05 kg
}

#[test]
fn liquids_convert_at_water_density() {
    let mut table = QuantityTable::from_candidates(vec![
        "Minyak".to_string(),
        "Susu".to_string(),
    ]);
    table.set_quantity_text(0, "1.5".to_string()).unwrap();
    table.set_unit(0, Unit::Liter).unwrap();
    table.set_quantity_text(1, "250".to_string()).unwrap();
    table.set_unit(1, Unit::Milliliter).unwrap();

    let items = table.normalized().unwrap();
    assert_eq!(items[0].mass_kg, 1.5);
    assert_eq!(items[1].mass_kg, 0.25);
}

#[test]
fn malformed_calculator_payload_degrades_to_an_empty_result() {
    let result = parse_calculation_response(json!({"detail": {"not": "an array"}}));
    assert_eq!(result.total_kg, 0.0);
    assert!(result.details.is_empty());

    // Zero total still summarizes without a division error
    let summary = EmissionSummary::from_result(&result, 1200.0);
    assert!(summary.category_shares.is_empty());
    assert_eq!(summary.severity, Severity::Low);
    assert_eq!(summary.offset_cost, 0.0);
}

#[test]
fn severity_boundaries() {
    assert_eq!(classify_severity(40.0), Severity::Low);
    assert_eq!(classify_severity(40.01), Severity::Medium);
    assert_eq!(classify_severity(70.0), Severity::Medium);
    assert_eq!(classify_severity(70.01), Severity::High);
}
