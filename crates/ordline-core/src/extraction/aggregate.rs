//! Order-preserving quantity aggregation.

use indexmap::IndexMap;

use crate::catalog::normalize_name;
use crate::models::order::{LineItem, Record};

/// Sums quantities per item key, remembering the order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    entries: IndexMap<String, LineItem>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `item.quantity` under `key`.
    ///
    /// The first item seen for a key supplies its name, article and match flag.
    pub fn add(&mut self, key: impl Into<String>, item: LineItem) {
        self.entries
            .entry(key.into())
            .and_modify(|entry| entry.quantity = entry.quantity.saturating_add(item.quantity))
            .or_insert(item);
    }

    /// Add a raw record keyed by its normalized name.
    pub fn add_record(&mut self, record: &Record) {
        self.add(
            normalize_name(&record.name),
            LineItem {
                name: record.name.clone(),
                quantity: record.quantity,
                article: None,
                matched: false,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.entries.into_values().collect()
    }
}

/// Aggregate raw records without a catalog.
pub fn aggregate(records: &[Record]) -> Vec<LineItem> {
    let mut aggregator = Aggregator::new();
    for record in records {
        aggregator.add_record(record);
    }
    aggregator.into_items()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(items: &[LineItem]) -> Vec<(&str, u32)> {
        items.iter().map(|i| (i.name.as_str(), i.quantity)).collect()
    }

    #[test]
    fn test_sums_and_keeps_first_position() {
        let records = vec![
            Record::new("Widget Model A", 3),
            Record::new("Gadget", 1),
            Record::new("Widget Model A", 3).on_page(2),
        ];
        let items = aggregate(&records);
        assert_eq!(pairs(&items), vec![("Widget Model A", 6), ("Gadget", 1)]);
    }

    #[test]
    fn test_key_is_normalized_name() {
        let records = vec![Record::new("Widget  MODEL a", 2), Record::new("widget model A", 5)];
        let items = aggregate(&records);
        assert_eq!(pairs(&items), vec![("Widget  MODEL a", 7)]);
    }

    #[test]
    fn test_first_item_supplies_metadata() {
        let mut aggregator = Aggregator::new();
        aggregator.add(
            "LED120",
            LineItem {
                name: "Панель LED-120".to_string(),
                quantity: 2,
                article: Some("LED120".to_string()),
                matched: true,
            },
        );
        aggregator.add(
            "LED120",
            LineItem {
                name: "Panel LED 120".to_string(),
                quantity: 1,
                article: None,
                matched: true,
            },
        );

        assert_eq!(aggregator.len(), 1);
        let items = aggregator.into_items();
        assert_eq!(items[0].name, "Панель LED-120");
        assert_eq!(items[0].article.as_deref(), Some("LED120"));
        assert_eq!(items[0].quantity, 3);
    }

    #[test]
    fn test_empty() {
        assert!(aggregate(&[]).is_empty());
        assert!(Aggregator::new().is_empty());
    }
}
