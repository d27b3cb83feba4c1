//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::catalog::UnmatchedPolicy;
use crate::error::{OrdlineError, Result};

/// Main configuration for the ordline pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdlineConfig {
    /// Line-based extraction configuration.
    pub extraction: ExtractionConfig,

    /// Coordinate fallback configuration.
    pub coordinates: CoordinateConfig,

    /// Catalog matching configuration.
    pub catalog: CatalogConfig,

    /// Output serialization configuration (used by the CLI).
    pub output: OutputConfig,
}

/// Anchor sequence parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Smallest integer accepted as a quantity.
    pub min_quantity: u32,

    /// Largest integer accepted as a quantity. Order totals and SKUs sit above it.
    pub max_quantity: u32,

    /// How many lines after an opening money line are searched for the
    /// quantity and the closing amount.
    pub lookahead: usize,

    /// Reject anchors whose quantity is not followed by a closing amount.
    pub require_closing_anchor: bool,

    /// Leave the totals block when a fresh column header shows up.
    pub rearm_on_header: bool,

    /// Run the coordinate parser when the line parser finds nothing.
    pub coordinate_fallback: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_quantity: 1,
            max_quantity: 500,
            lookahead: 10,
            require_closing_anchor: true,
            rearm_on_header: false,
            coordinate_fallback: true,
        }
    }
}

impl ExtractionConfig {
    /// Plausible quantity range.
    pub fn quantity_range(&self) -> RangeInclusive<u32> {
        self.min_quantity..=self.max_quantity
    }
}

/// Coordinate fallback parser configuration. All distances are in PDF points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinateConfig {
    /// Gap subtracted from header x positions when deriving column bounds.
    pub column_padding: f32,

    /// Width of the quantity column when no total header is present.
    pub quantity_column_width: f32,

    /// Vertical margin above the first and below the last quantity anchor.
    pub band_margin: f32,

    /// Slack added to both edges of a vertical band.
    pub band_slack: f32,

    /// Maximum top difference for two words to share a visual row.
    pub row_tolerance: f32,
}

impl Default for CoordinateConfig {
    fn default() -> Self {
        Self {
            column_padding: 5.0,
            quantity_column_width: 60.0,
            band_margin: 60.0,
            band_slack: 1.0,
            row_tolerance: 2.5,
        }
    }
}

/// Catalog matching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog source (xlsx, xls, ods, csv or txt).
    pub path: Option<PathBuf>,

    /// What to do with items the catalog does not know.
    pub unmatched: UnmatchedPolicy,

    /// Size operands above this are structural dimensions, not variant sizes.
    pub large_dimension_threshold: u32,

    /// Code prefixes whose products vary by size and color.
    pub size_variant_families: Vec<String>,

    /// First-row labels that mark a header row in the catalog sheet.
    pub header_labels: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            unmatched: UnmatchedPolicy::Keep,
            large_dimension_threshold: 200,
            size_variant_families: Vec::new(),
            header_labels: vec![
                "наименование".to_string(),
                "название".to_string(),
                "товар".to_string(),
                "name".to_string(),
                "item".to_string(),
            ],
        }
    }
}

/// Output serialization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Field delimiter for CSV output.
    pub delimiter: String,

    /// Write a header row.
    pub include_header: bool,

    /// Header label of the name column.
    pub name_header: String,

    /// Header label of the quantity column.
    pub quantity_header: String,

    /// Prefix CSV output with a UTF-8 byte order mark for spreadsheet apps.
    pub bom: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            delimiter: ";".to_string(),
            include_header: true,
            name_header: "Наименование".to_string(),
            quantity_header: "Количество".to_string(),
            bom: true,
        }
    }
}

impl OrdlineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check settings that would make extraction meaningless.
    pub fn validate(&self) -> Result<()> {
        let ex = &self.extraction;
        if ex.min_quantity == 0 {
            return Err(OrdlineError::Config(
                "extraction.min_quantity must be at least 1".to_string(),
            ));
        }
        if ex.min_quantity > ex.max_quantity {
            return Err(OrdlineError::Config(format!(
                "extraction.min_quantity ({}) exceeds max_quantity ({})",
                ex.min_quantity, ex.max_quantity
            )));
        }
        if ex.lookahead < 2 {
            return Err(OrdlineError::Config(
                "extraction.lookahead must cover at least the quantity and closing amount"
                    .to_string(),
            ));
        }
        if self.output.delimiter.chars().count() != 1 {
            return Err(OrdlineError::Config(format!(
                "output.delimiter must be a single character, got {:?}",
                self.output.delimiter
            )));
        }
        Ok(())
    }
}
