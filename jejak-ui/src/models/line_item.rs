//! Editable quantity table and unit conversion
//!
//! One line item per detected product, keyed by list position. Positions
//! matter because duplicate product names are possible on a receipt.

use serde::{Deserialize, Serialize};

/// Quantity unit selectable per line item
///
/// Wire names match the inference service's vocabulary (`ml`, `pcs`);
/// the long forms are accepted as aliases. Anything else falls back to
/// [`Unit::Other`] with a 1:1 conversion factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Gram,
    Liter,
    #[serde(rename = "ml", alias = "milliliter")]
    Milliliter,
    #[serde(rename = "pcs", alias = "piece")]
    Piece,
    #[serde(other)]
    Other,
}

impl Unit {
    /// Conversion factor to kilograms
    ///
    /// Liquids are treated as water-density; a piece is approximated at
    /// 50 grams. Unknown units convert 1:1.
    pub fn factor_to_kg(self) -> f64 {
        match self {
            Unit::Kg => 1.0,
            Unit::Gram => 0.001,
            Unit::Liter => 1.0,
            Unit::Milliliter => 0.001,
            Unit::Piece => 0.05,
            Unit::Other => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Gram => "gram",
            Unit::Liter => "liter",
            Unit::Milliliter => "ml",
            Unit::Piece => "pcs",
            Unit::Other => "other",
        }
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::Kg
    }
}

/// One user-editable line of the quantity table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditableLineItem {
    /// Product name as detected (duplicates preserved)
    pub product: String,
    /// Raw quantity input; validated at submission time, not per keystroke
    pub quantity_text: String,
    pub unit: Unit,
}

impl EditableLineItem {
    pub fn new(product: String) -> Self {
        Self {
            product,
            quantity_text: String::new(),
            unit: Unit::default(),
        }
    }

    /// Parse the quantity text into a non-negative, finite number
    pub fn parsed_quantity(&self) -> Option<f64> {
        let value: f64 = self.quantity_text.trim().parse().ok()?;
        if value.is_finite() && value >= 0.0 {
            Some(value)
        } else {
            None
        }
    }
}

/// Line item converted to the common mass unit for the calculator request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLineItem {
    #[serde(rename = "produk")]
    pub product: String,
    #[serde(rename = "berat_kg")]
    pub mass_kg: f64,
}

/// Mutable in-memory table of line items, keyed by position
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuantityTable {
    items: Vec<EditableLineItem>,
}

impl QuantityTable {
    /// Initialize 1:1 from a candidate product list, clearing prior state
    pub fn from_candidates(products: Vec<String>) -> Self {
        Self {
            items: products.into_iter().map(EditableLineItem::new).collect(),
        }
    }

    pub fn items(&self) -> &[EditableLineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replace the quantity text at a position
    pub fn set_quantity_text(&mut self, position: usize, text: String) -> Result<(), String> {
        match self.items.get_mut(position) {
            Some(item) => {
                item.quantity_text = text;
                Ok(())
            }
            None => Err(format!("no line item at position {}", position)),
        }
    }

    /// Replace the unit at a position
    pub fn set_unit(&mut self, position: usize, unit: Unit) -> Result<(), String> {
        match self.items.get_mut(position) {
            Some(item) => {
                item.unit = unit;
                Ok(())
            }
            None => Err(format!("no line item at position {}", position)),
        }
    }

    /// Readiness predicate: every quantity parses to a non-negative number
    ///
    /// An empty table is not ready; there is nothing to calculate.
    pub fn is_ready(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|i| i.parsed_quantity().is_some())
    }

    /// Convert every line to kilograms via the fixed factor table
    ///
    /// Returns `None` when any quantity fails to parse; the calculator
    /// must not be invoked with a partially valid table.
    pub fn normalized(&self) -> Option<Vec<NormalizedLineItem>> {
        if !self.is_ready() {
            return None;
        }
        Some(
            self.items
                .iter()
                .map(|item| NormalizedLineItem {
                    product: item.product.clone(),
                    mass_kg: item.parsed_quantity().unwrap_or(0.0) * item.unit.factor_to_kg(),
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_factors_match_declared_table() {
        assert_eq!(Unit::Kg.factor_to_kg(), 1.0);
        assert_eq!(Unit::Gram.factor_to_kg(), 0.001);
        assert_eq!(Unit::Liter.factor_to_kg(), 1.0);
        assert_eq!(Unit::Milliliter.factor_to_kg(), 0.001);
        assert_eq!(Unit::Piece.factor_to_kg(), 0.05);
        assert_eq!(Unit::Other.factor_to_kg(), 1.0);
    }

    #[test]
    fn unit_wire_names_round_trip() {
        for unit in [Unit::Kg, Unit::Gram, Unit::Liter, Unit::Milliliter, Unit::Piece] {
            let json = serde_json::to_string(&unit).unwrap();
            let back: Unit = serde_json::from_str(&json).unwrap();
            assert_eq!(unit, back);
        }
        // Long-form aliases accepted on input
        assert_eq!(serde_json::from_str::<Unit>("\"milliliter\"").unwrap(), Unit::Milliliter);
        assert_eq!(serde_json::from_str::<Unit>("\"piece\"").unwrap(), Unit::Piece);
    }

    #[test]
    fn unknown_unit_falls_back_to_one_to_one() {
        let unit: Unit = serde_json::from_str("\"sachet\"").unwrap();
        assert_eq!(unit, Unit::Other);
        assert_eq!(unit.factor_to_kg(), 1.0);
    }

    #[test]
    fn quantity_parsing_rejects_bad_input() {
        let mut item = EditableLineItem::new("Beras".to_string());
        assert_eq!(item.parsed_quantity(), None); // empty

        item.quantity_text = "abc".to_string();
        assert_eq!(item.parsed_quantity(), None);

        item.quantity_text = "-1".to_string();
        assert_eq!(item.parsed_quantity(), None);

        item.quantity_text = " 2.5 ".to_string();
        assert_eq!(item.parsed_quantity(), Some(2.5));

        item.quantity_text = "0".to_string();
        assert_eq!(item.parsed_quantity(), Some(0.0));
    }

    #[test]
    fn table_initializes_with_empty_quantities_and_kg() {
        let table = QuantityTable::from_candidates(vec![
            "Beras".to_string(),
            "Beras".to_string(), // duplicates preserved
            "Telur".to_string(),
        ]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.items()[0].product, "Beras");
        assert_eq!(table.items()[1].product, "Beras");
        assert!(table.items().iter().all(|i| i.quantity_text.is_empty()));
        assert!(table.items().iter().all(|i| i.unit == Unit::Kg));
        assert!(!table.is_ready());
    }

    #[test]
    fn positional_updates_reject_out_of_range() {
        let mut table = QuantityTable::from_candidates(vec!["Telur".to_string()]);
        assert!(table.set_quantity_text(0, "3".to_string()).is_ok());
        assert!(table.set_quantity_text(1, "3".to_string()).is_err());
        assert!(table.set_unit(5, Unit::Gram).is_err());
    }

    #[test]
    fn normalization_requires_every_quantity() {
        let mut table = QuantityTable::from_candidates(vec![
            "Beras".to_string(),
            "Telur".to_string(),
        ]);
        table.set_quantity_text(0, "2".to_string()).unwrap();
        assert_eq!(table.normalized(), None); // Telur still empty

        table.set_quantity_text(1, "500".to_string()).unwrap();
        table.set_unit(1, Unit::Gram).unwrap();
        let normalized = table.normalized().unwrap();
        assert_eq!(
            normalized,
            vec![
                NormalizedLineItem { product: "Beras".to_string(), mass_kg: 2.0 },
                NormalizedLineItem { product: "Telur".to_string(), mass_kg: 0.5 },
            ]
        );
    }

    #[test]
    fn normalized_items_serialize_with_wire_names() {
        let item = NormalizedLineItem {
            product: "Beras".to_string(),
            mass_kg: 2.0,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["produk"], "Beras");
        assert_eq!(json["berat_kg"], 2.0);
    }
}
