//! Core library for order-summary line item extraction.
//!
//! This crate provides:
//! - Document input (PDF text per page, plain text, JSON page dumps)
//! - Rule-based line classification for order summaries
//! - Record extraction from money/quantity/money anchors, with a
//!   coordinate-based fallback over positioned words
//! - Catalog matching by normalized name or product code
//! - Order-preserving aggregation of quantities

pub mod catalog;
pub mod document;
pub mod error;
pub mod extraction;
pub mod models;

pub use catalog::{CatalogEntry, CatalogIndex, UnmatchedPolicy};
pub use document::{load_document, Document, Page, WordToken};
#[cfg(feature = "pdf")]
pub use document::PdfExtractor;
pub use error::{CatalogError, DocumentError, OrdlineError, Result};
pub use extraction::{
    AnchorSequenceParser, CoordinateParser, ExtractionResult, OrderExtractor, RecordExtractor,
};
pub use models::config::OrdlineConfig;
pub use models::order::{Diagnostics, LineItem, Record, Strategy};
