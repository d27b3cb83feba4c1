//! Data models for the extraction pipeline.

pub mod config;
pub mod order;

pub use config::{CatalogConfig, CoordinateConfig, ExtractionConfig, OrdlineConfig, OutputConfig};
pub use order::{Diagnostics, LineItem, Record, Strategy};
