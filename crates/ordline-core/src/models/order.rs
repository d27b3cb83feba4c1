//! Order line item models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single (name, quantity) pair recovered from the document, before
/// catalog matching and aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Item name reconstructed from one or more text lines.
    pub name: String,

    /// Ordered quantity.
    pub quantity: u32,

    /// Price per unit (the opening anchor), when the line parser saw it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    /// Line subtotal (the closing anchor), when the line parser saw it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_total: Option<Decimal>,

    /// Page the quantity was found on (1-indexed).
    pub page: u32,
}

impl Record {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price: None,
            line_total: None,
            page: 1,
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_amounts(mut self, unit_price: Option<Decimal>, line_total: Option<Decimal>) -> Self {
        self.unit_price = unit_price;
        self.line_total = line_total;
        self
    }

    /// Whether `unit_price * quantity` agrees with `line_total`.
    ///
    /// `None` when either amount is missing.
    pub fn amounts_consistent(&self) -> Option<bool> {
        let price = self.unit_price?;
        let total = self.line_total?;
        Some(price * Decimal::from(self.quantity) == total)
    }
}

/// A final output row: one distinct item with its summed quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Display name (the catalog name when matched, else the raw name).
    pub name: String,

    /// Summed quantity over every occurrence in the document.
    pub quantity: u32,

    /// Catalog article code, when the catalog provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,

    /// Whether the name was resolved against the catalog.
    pub matched: bool,
}

/// Which extraction strategy produced the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Money -> quantity -> money anchors over text lines.
    AnchorSequence,
    /// Column bands over positioned words.
    Coordinates,
    /// Neither strategy produced anything.
    #[default]
    None,
}

/// Counters describing one extraction run.
///
/// Returned alongside every result so an empty output can be told apart
/// from a document that was never read properly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub pages: usize,
    pub lines_scanned: usize,
    pub noise_lines: usize,
    pub header_lines: usize,
    pub totals_lines: usize,
    pub money_lines: usize,
    pub integer_lines: usize,
    pub dimension_lines: usize,
    pub plain_lines: usize,
    pub lines_after_totals: usize,
    pub anchors_opened: usize,
    pub anchors_completed: usize,
    pub anchors_folded: usize,
    pub words_scanned: usize,
    pub quantity_anchors: usize,
    pub records_emitted: usize,
    pub records_unmatched: usize,
    pub records_dropped: usize,
    pub strategy: Strategy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_amounts_consistent() {
        let record = Record::new("Widget", 3).with_amounts(
            Some(Decimal::from_str("25.00").unwrap()),
            Some(Decimal::from(75)),
        );
        assert_eq!(record.amounts_consistent(), Some(true));

        let record = Record::new("Widget", 2).with_amounts(
            Some(Decimal::from_str("25.00").unwrap()),
            Some(Decimal::from(75)),
        );
        assert_eq!(record.amounts_consistent(), Some(false));

        assert_eq!(Record::new("Widget", 2).amounts_consistent(), None);
    }

    #[test]
    fn test_strategy_serializes_snake_case() {
        let json = serde_json::to_string(&Strategy::AnchorSequence).unwrap();
        assert_eq!(json, "\"anchor_sequence\"");
    }
}
