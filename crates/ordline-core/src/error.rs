//! Error types for the ordline-core library.

use thiserror::Error;

/// Main error type for the ordline library.
#[derive(Error, Debug)]
pub enum OrdlineError {
    /// The input document could not be read.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file is not valid JSON for [`crate::OrdlineConfig`].
    #[error("invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning an input file into pages of lines or words.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from the PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The document has no pages.
    #[error("document has no pages")]
    NoPages,

    /// JSON page dump could not be decoded.
    #[error("malformed document JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension is not one we know how to read.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Support for this format was compiled out.
    #[error("{0} support is not enabled in this build")]
    FeatureDisabled(&'static str),

    /// I/O error while reading the document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading the product catalog.
///
/// These never abort extraction: callers fall back to an empty catalog.
/// They only surface through [`crate::CatalogIndex::load`].
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog file does not exist.
    #[error("catalog not found: {0}")]
    NotFound(String),

    /// The workbook could not be opened or read.
    #[error("failed to read workbook: {0}")]
    Workbook(String),

    /// The workbook has no sheets.
    #[error("workbook has no sheets")]
    NoSheets,

    /// CSV catalog could not be parsed.
    #[error("failed to read CSV catalog: {0}")]
    Csv(#[from] csv::Error),

    /// The file extension is not one we know how to read.
    #[error("unsupported catalog format: {0}")]
    UnsupportedFormat(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the ordline library.
pub type Result<T> = std::result::Result<T, OrdlineError>;
