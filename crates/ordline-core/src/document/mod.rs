//! Document input: pages of normalized text lines and positioned words.
//!
//! Text and word extraction itself is done by external libraries (or by
//! whoever produced a JSON page dump); this module only holds the result in
//! the shape the extraction engine consumes.

mod loader;
#[cfg(feature = "pdf")]
mod pdf;

pub use loader::load_document;
#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Page separator used by plain-text page dumps.
pub const PAGE_BREAK: char = '\u{000c}';

/// Trait for binary document readers.
pub trait DocumentSource {
    /// Load a document from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the loaded document.
    fn page_count(&self) -> u32;

    /// Extract every page as normalized lines (and words, if available).
    fn extract_document(&self) -> Result<Document>;
}

/// A positioned word token on a page.
///
/// Coordinates are in PDF points with the origin at the top-left corner,
/// so `y0 < y1` and larger `y` means further down the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordToken {
    pub text: String,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl WordToken {
    pub fn new(text: impl Into<String>, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            text: text.into(),
            x0,
            y0,
            x1,
            y1,
        }
    }

    /// Parse the token as a bare unsigned integer.
    pub fn as_integer(&self) -> Option<u32> {
        let text = self.text.trim();
        if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        text.parse().ok()
    }

    /// Vertical center of the token.
    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }
}

/// Content from a single page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    /// Page number (1-indexed).
    pub number: u32,
    /// Normalized text lines in reading order.
    pub lines: Vec<String>,
    /// Positioned word tokens, if the extractor provided them.
    pub words: Vec<WordToken>,
}

impl Page {
    /// Build a page from raw lines, normalizing each one.
    pub fn from_lines<I, S>(number: u32, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            number,
            lines: lines.into_iter().map(|l| normalize_line(l.as_ref())).collect(),
            words: Vec::new(),
        }
    }

    /// Build a page from positioned words only.
    pub fn from_words(number: u32, words: Vec<WordToken>) -> Self {
        Self {
            number,
            lines: Vec::new(),
            words,
        }
    }
}

/// An order document: pages in reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    /// Where the document came from (file name or label).
    pub source: String,
    /// Pages in document order.
    pub pages: Vec<Page>,
}

impl Document {
    /// Build a document from per-page raw lines.
    pub fn from_pages<P, I, S>(pages: P) -> Self
    where
        P: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, lines)| Page::from_lines(i as u32 + 1, lines))
            .collect();
        Self {
            source: String::new(),
            pages,
        }
    }

    /// Build a document from plain text, pages separated by form feeds.
    pub fn from_text(text: &str) -> Self {
        Self::from_pages(text.split(PAGE_BREAK).map(|page| page.lines()))
    }

    /// Decode a JSON page dump (`{"pages": [{"lines": [...], "words": [...]}]}`).
    ///
    /// Lines are normalized and missing page numbers are filled in.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut doc: Document = serde_json::from_str(json)?;
        for (i, page) in doc.pages.iter_mut().enumerate() {
            if page.number == 0 {
                page.number = i as u32 + 1;
            }
            page.lines = page.lines.iter().map(|l| normalize_line(l)).collect();
        }
        Ok(doc)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Whether any page carries text lines.
    pub fn has_lines(&self) -> bool {
        self.pages.iter().any(|p| p.lines.iter().any(|l| !l.is_empty()))
    }

    /// Whether any page carries positioned words.
    pub fn has_words(&self) -> bool {
        self.pages.iter().any(|p| !p.words.is_empty())
    }

    /// Total number of lines over all pages.
    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|p| p.lines.len()).sum()
    }
}

/// Normalize one extracted line: fold no-break spaces, collapse runs of
/// whitespace into one space, trim.
pub fn normalize_line(line: &str) -> String {
    line.split(|c: char| c.is_whitespace() || c == '\u{00a0}' || c == '\u{202f}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_line() {
        assert_eq!(normalize_line("  1\u{00a0}250,00\u{202f}₽ "), "1 250,00 ₽");
        assert_eq!(normalize_line("Widget\t\tModel   A"), "Widget Model A");
        assert_eq!(normalize_line("   "), "");
    }

    #[test]
    fn test_from_text_splits_pages() {
        let doc = Document::from_text("Widget\n25.00 ₽\u{000c}3\n75 ₽\n");
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[0].lines, vec!["Widget", "25.00 ₽"]);
        assert_eq!(doc.pages[1].number, 2);
        assert_eq!(doc.pages[1].lines, vec!["3", "75 ₽"]);
        assert_eq!(doc.line_count(), 4);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "source": "order.pdf",
            "pages": [
                {"lines": ["Widget  Model A", "3"]},
                {"words": [{"text": "12", "x0": 450.0, "y0": 100.0, "x1": 460.0, "y1": 110.0}]}
            ]
        }"#;
        let doc = Document::from_json(json).unwrap();

        assert_eq!(doc.source, "order.pdf");
        assert_eq!(doc.pages[0].number, 1);
        assert_eq!(doc.pages[0].lines[0], "Widget Model A");
        assert_eq!(doc.pages[1].number, 2);
        assert!(doc.has_lines());
        assert!(doc.has_words());
        assert_eq!(doc.pages[1].words[0].as_integer(), Some(12));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            Document::from_json("{not json"),
            Err(DocumentError::Json(_))
        ));
    }

    #[test]
    fn test_word_as_integer() {
        assert_eq!(WordToken::new("42", 0.0, 0.0, 1.0, 1.0).as_integer(), Some(42));
        assert_eq!(WordToken::new("4.2", 0.0, 0.0, 1.0, 1.0).as_integer(), None);
        assert_eq!(WordToken::new("", 0.0, 0.0, 1.0, 1.0).as_integer(), None);
        assert_eq!(WordToken::new("₽", 0.0, 0.0, 1.0, 1.0).as_integer(), None);
    }
}
