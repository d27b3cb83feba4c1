//! Order extractor: strategies, catalog matching and aggregation in one pass.

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::aggregate::Aggregator;
use super::anchor::AnchorSequenceParser;
use super::coordinate::CoordinateParser;
use super::RecordExtractor;
use crate::catalog::{normalize_name, CatalogIndex, UnmatchedPolicy};
use crate::document::{load_document, Document};
use crate::error::Result;
use crate::models::config::OrdlineConfig;
use crate::models::order::{Diagnostics, LineItem, Record, Strategy};

/// Result of order extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Aggregated items in order of first appearance.
    pub items: Vec<LineItem>,
    /// Raw records before matching and aggregation.
    pub records: Vec<Record>,
    /// Counters describing the run.
    pub diagnostics: Diagnostics,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all item quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

/// Runs the line parser, falls back to coordinates, then resolves and
/// aggregates the records.
#[derive(Debug, Clone)]
pub struct OrderExtractor {
    anchor: AnchorSequenceParser,
    coordinates: CoordinateParser,
    coordinate_fallback: bool,
    catalog: CatalogIndex,
    unmatched: UnmatchedPolicy,
}

impl OrderExtractor {
    /// Create an extractor with default settings and no catalog.
    pub fn new() -> Self {
        Self {
            anchor: AnchorSequenceParser::new(),
            coordinates: CoordinateParser::new(),
            coordinate_fallback: true,
            catalog: CatalogIndex::empty(),
            unmatched: UnmatchedPolicy::Keep,
        }
    }

    /// Create an extractor from configuration, loading the configured catalog.
    ///
    /// A catalog that cannot be loaded is logged and replaced by an empty one.
    pub fn from_config(config: &OrdlineConfig) -> Self {
        Self {
            anchor: AnchorSequenceParser::from_config(&config.extraction),
            coordinates: CoordinateParser::from_config(&config.extraction, &config.coordinates),
            coordinate_fallback: config.extraction.coordinate_fallback,
            catalog: CatalogIndex::load_or_empty(&config.catalog),
            unmatched: config.catalog.unmatched,
        }
    }

    /// Set the catalog used to resolve names.
    pub fn with_catalog(mut self, catalog: CatalogIndex) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set what happens to names the catalog does not know.
    pub fn with_unmatched(mut self, policy: UnmatchedPolicy) -> Self {
        self.unmatched = policy;
        self
    }

    /// Enable or disable the coordinate fallback.
    pub fn with_coordinate_fallback(mut self, enabled: bool) -> Self {
        self.coordinate_fallback = enabled;
        self
    }

    /// Replace the line parser.
    pub fn with_anchor_parser(mut self, parser: AnchorSequenceParser) -> Self {
        self.anchor = parser;
        self
    }

    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }

    /// Read a document from disk and extract its items.
    ///
    /// Fails only when the file itself cannot be read.
    pub fn extract_file(&self, path: &Path) -> Result<ExtractionResult> {
        let document = load_document(path)?;
        Ok(self.extract(&document))
    }

    /// Extract the ordered, aggregated item list from a document.
    pub fn extract(&self, document: &Document) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();
        let mut diagnostics = Diagnostics {
            pages: document.pages.len(),
            ..Diagnostics::default()
        };

        info!(
            "Extracting order items from {} ({} pages, {} lines)",
            if document.source.is_empty() { "<memory>" } else { document.source.as_str() },
            document.pages.len(),
            document.line_count()
        );

        let records = self.run_strategies(document, &mut diagnostics);
        diagnostics.records_emitted = records.len();

        if records.is_empty() {
            warnings.push(if document.has_lines() || document.has_words() {
                "No line items recognized in document".to_string()
            } else {
                "Document contains no text".to_string()
            });
        }

        let items = self.resolve(&records, &mut diagnostics);

        if diagnostics.records_unmatched > 0 && !self.catalog.is_empty() {
            warnings.push(format!(
                "{} record(s) not found in catalog",
                diagnostics.records_unmatched
            ));
        }

        let inconsistent = records
            .iter()
            .filter(|r| r.amounts_consistent() == Some(false))
            .count();
        if inconsistent > 0 {
            debug!("{} record(s) where price x quantity != line total", inconsistent);
        }

        info!(
            "Extracted {} items from {} records via {:?}",
            items.len(),
            records.len(),
            diagnostics.strategy
        );

        ExtractionResult {
            items,
            records,
            diagnostics,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn run_strategies(&self, document: &Document, diagnostics: &mut Diagnostics) -> Vec<Record> {
        let mut strategies: Vec<&dyn RecordExtractor> = vec![&self.anchor];
        if self.coordinate_fallback {
            strategies.push(&self.coordinates);
        }

        for strategy in strategies {
            let records = strategy.extract(document, diagnostics);
            if !records.is_empty() {
                diagnostics.strategy = strategy.strategy();
                return records;
            }
            debug!("{:?} produced no records", strategy.strategy());
        }

        diagnostics.strategy = Strategy::None;
        Vec::new()
    }

    /// Resolve records against the catalog and aggregate them.
    fn resolve(&self, records: &[Record], diagnostics: &mut Diagnostics) -> Vec<LineItem> {
        let drop_unmatched = self.unmatched == UnmatchedPolicy::Drop && !self.catalog.is_empty();
        let mut aggregator = Aggregator::new();

        for record in records {
            match self.catalog.lookup(&record.name) {
                Some(entry) => aggregator.add(
                    entry.key.clone(),
                    LineItem {
                        name: entry.display_name.clone(),
                        quantity: record.quantity,
                        article: entry.article.clone(),
                        matched: true,
                    },
                ),
                None => {
                    diagnostics.records_unmatched += 1;
                    if drop_unmatched {
                        debug!("Dropping {:?}: not in catalog", record.name);
                        diagnostics.records_dropped += 1;
                        continue;
                    }
                    aggregator.add(
                        normalize_name(&record.name),
                        LineItem {
                            name: record.name.clone(),
                            quantity: record.quantity,
                            article: None,
                            matched: false,
                        },
                    );
                }
            }
        }

        aggregator.into_items()
    }
}

impl Default for OrderExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::CatalogConfig;
    use pretty_assertions::assert_eq;

    fn catalog(names: &[&str]) -> CatalogIndex {
        CatalogIndex::from_rows(
            names.iter().map(|n| (n.to_string(), None)),
            &CatalogConfig::default(),
        )
    }

    fn pairs(result: &ExtractionResult) -> Vec<(&str, u32)> {
        result.items.iter().map(|i| (i.name.as_str(), i.quantity)).collect()
    }

    const BLOCK: [&str; 5] = ["Widget Model A", "24x10x5 mm", "25.00 ₽", "3", "75 ₽"];

    #[test]
    fn test_extract_aggregates_across_pages() {
        let doc = Document::from_pages([BLOCK.to_vec(), BLOCK.to_vec()]);
        let result = OrderExtractor::new().extract(&doc);

        assert_eq!(pairs(&result), vec![("Widget Model A", 6)]);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.diagnostics.strategy, Strategy::AnchorSequence);
        assert_eq!(result.diagnostics.pages, 2);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_catalog_name_replaces_raw_name() {
        let doc = Document::from_pages([BLOCK]);
        let result = OrderExtractor::new()
            .with_catalog(catalog(&["WIDGET MODEL A"]))
            .extract(&doc);

        assert_eq!(pairs(&result), vec![("WIDGET MODEL A", 3)]);
        assert!(result.items[0].matched);
    }

    #[test]
    fn test_drop_unmatched_needs_catalog() {
        let doc = Document::from_pages([BLOCK]);

        let result = OrderExtractor::new()
            .with_unmatched(UnmatchedPolicy::Drop)
            .extract(&doc);
        assert_eq!(pairs(&result), vec![("Widget Model A", 3)]);

        let result = OrderExtractor::new()
            .with_catalog(catalog(&["Gadget"]))
            .with_unmatched(UnmatchedPolicy::Drop)
            .extract(&doc);
        assert!(result.is_empty());
        assert_eq!(result.diagnostics.records_dropped, 1);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_empty_document_warns() {
        let result = OrderExtractor::new().extract(&Document::default());
        assert!(result.is_empty());
        assert_eq!(result.diagnostics.strategy, Strategy::None);
        assert_eq!(result.warnings, vec!["Document contains no text".to_string()]);
    }

    #[test]
    fn test_total_quantity() {
        let doc = Document::from_pages([vec![
            "Widget", "25.00 ₽", "3", "75 ₽", "Gadget", "10.00 ₽", "2", "20 ₽",
        ]]);
        let result = OrderExtractor::new().extract(&doc);
        assert_eq!(result.total_quantity(), 5);
    }

    #[test]
    fn test_extract_file() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        std::io::Write::write_all(&mut file, "Widget\n25.00 ₽\n3\n75 ₽\n".as_bytes()).unwrap();

        let result = OrderExtractor::new().extract_file(file.path()).unwrap();
        assert_eq!(result.total_quantity(), 3);

        let missing = OrderExtractor::new().extract_file(Path::new("/nonexistent/order.txt"));
        assert!(matches!(missing, Err(crate::error::OrdlineError::Document(_))));
    }
}
