//! Load a document from disk, dispatching on the file extension.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::{Document, Result};
use crate::error::DocumentError;

/// Read `path` into a [`Document`].
///
/// Supported formats:
/// - `.pdf`: text per page (requires the `pdf` feature)
/// - `.txt`: plain text, pages separated by form feeds
/// - `.json`: page dump with `lines` and/or positioned `words`
pub fn load_document(path: &Path) -> Result<Document> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    info!("Loading document: {}", path.display());

    let doc = match extension.as_str() {
        "pdf" => load_pdf(path)?,
        "txt" | "text" => Document::from_text(&fs::read_to_string(path)?),
        "json" => Document::from_json(&fs::read_to_string(path)?)?,
        _ => return Err(DocumentError::UnsupportedFormat(extension)),
    };

    if doc.pages.is_empty() {
        return Err(DocumentError::NoPages);
    }

    let source = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    debug!(
        "Document {} has {} pages, {} lines, words: {}",
        source,
        doc.pages.len(),
        doc.line_count(),
        doc.has_words()
    );

    Ok(doc.with_source(source))
}

#[cfg(feature = "pdf")]
fn load_pdf(path: &Path) -> Result<Document> {
    use super::{DocumentSource, PdfExtractor};

    let data = fs::read(path)?;
    let mut extractor = PdfExtractor::new();
    extractor.load(&data)?;
    extractor.extract_document()
}

#[cfg(not(feature = "pdf"))]
fn load_pdf(_path: &Path) -> Result<Document> {
    Err(DocumentError::FeatureDisabled("PDF"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_text_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.txt");
        fs::write(&path, "Widget Model A\n25.00 ₽\n3\n75 ₽\n").unwrap();

        let doc = load_document(&path).unwrap();
        assert_eq!(doc.source, "order.txt");
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.line_count(), 4);
    }

    #[test]
    fn test_load_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.docx");
        fs::write(&path, "x").unwrap();

        assert!(matches!(
            load_document(&path),
            Err(DocumentError::UnsupportedFormat(ext)) if ext == "docx"
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_document(Path::new("/nonexistent/order.txt"));
        assert!(matches!(result, Err(DocumentError::Io(_))));
    }
}
