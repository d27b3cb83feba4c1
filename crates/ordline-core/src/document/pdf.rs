//! PDF extraction using lopdf, pdf-extract and pdfplumber.

use lopdf::Document as LoDocument;
use pdfplumber::{Pdf, WordOptions};
use tracing::{debug, warn};

use super::{Document, DocumentSource, Page, Result, WordToken};
use crate::error::DocumentError;

/// PDF page extractor.
///
/// lopdf opens (and if needed decrypts) the file. pdf-extract produces the
/// text of each page, which is split into normalized lines; pdfplumber
/// produces the positioned words used by the coordinate parser.
pub struct PdfExtractor {
    document: Option<LoDocument>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Text of every page, in page order.
    pub fn extract_page_texts(&self) -> Result<Vec<String>> {
        self.loaded()?;
        pdf_extract::extract_text_from_mem_by_pages(&self.raw_data)
            .map_err(|e| DocumentError::TextExtraction(e.to_string()))
    }

    /// Positioned words of every page, in page order, top-left origin.
    pub fn extract_page_words(&self) -> Result<Vec<Vec<WordToken>>> {
        self.loaded()?;
        let pdf = Pdf::open(&self.raw_data, None)
            .map_err(|e| DocumentError::TextExtraction(e.to_string()))?;
        let options = WordOptions::default();

        (0..pdf.page_count())
            .map(|index| {
                let page = pdf
                    .page(index)
                    .map_err(|e| DocumentError::TextExtraction(e.to_string()))?;
                Ok(page
                    .extract_words(&options)
                    .into_iter()
                    .map(|w| {
                        WordToken::new(
                            w.text,
                            w.bbox.x0 as f32,
                            w.bbox.top as f32,
                            w.bbox.x1 as f32,
                            w.bbox.bottom as f32,
                        )
                    })
                    .collect())
            })
            .collect()
    }

    fn loaded(&self) -> Result<()> {
        match self.document {
            Some(_) => Ok(()),
            None => Err(DocumentError::Parse("No document loaded".to_string())),
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSource for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = LoDocument::load_mem(data).map_err(|e| DocumentError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(DocumentError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // Both text extractors read the decrypted bytes
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| DocumentError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(DocumentError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map_or(0, |doc| doc.get_pages().len() as u32)
    }

    /// Lines and words per page. Either layer alone is enough; the
    /// document fails only when neither can be read.
    fn extract_document(&self) -> Result<Document> {
        self.loaded()?;

        let texts = self.extract_page_texts();
        let words = self.extract_page_words().unwrap_or_else(|e| {
            warn!("No word positions for PDF, coordinate fallback disabled: {}", e);
            Vec::new()
        });

        let texts = match texts {
            Ok(texts) => texts,
            Err(e) if !words.is_empty() => {
                warn!("PDF text layer unreadable, using word positions only: {}", e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let page_total = texts.len().max(words.len());
        if page_total == 0 {
            return Err(DocumentError::NoPages);
        }

        let mut words = words.into_iter();
        let pages: Vec<Page> = (0..page_total)
            .map(|i| {
                let mut page = match texts.get(i) {
                    Some(text) => Page::from_lines(i as u32 + 1, text.lines()),
                    None => Page::from_lines(i as u32 + 1, std::iter::empty::<&str>()),
                };
                page.words = words.next().unwrap_or_default();
                page
            })
            .collect();

        debug!(
            "Extracted {} lines and {} words from {} PDF pages",
            pages.iter().map(|p| p.lines.len()).sum::<usize>(),
            pages.iter().map(|p| p.words.len()).sum::<usize>(),
            pages.len()
        );

        Ok(Document {
            source: String::new(),
            pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::OrderExtractor;
    use crate::models::order::Strategy;
    use lopdf::{dictionary, Object, Stream};

    /// One-page Helvetica PDF with each `(x, y, text)` drawn at its own
    /// position (PDF coordinates, origin bottom-left).
    fn pdf_with_text(runs: &[(i64, i64, &str)]) -> Vec<u8> {
        let mut doc = LoDocument::with_version("1.5");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let content: String = runs
            .iter()
            .map(|(x, y, text)| format!("BT /F1 12 Tf {} {} Td ({}) Tj ET\n", x, y, text))
            .collect();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(612), Object::Integer(792)],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    fn load(data: &[u8]) -> Document {
        let mut extractor = PdfExtractor::new();
        extractor.load(data).unwrap();
        extractor.extract_document().unwrap()
    }

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
    }

    #[test]
    fn test_extract_without_load_fails() {
        let extractor = PdfExtractor::new();
        assert!(matches!(
            extractor.extract_document(),
            Err(DocumentError::Parse(_))
        ));
        assert!(extractor.extract_page_words().is_err());
    }

    #[test]
    fn test_load_rejects_non_pdf() {
        let mut extractor = PdfExtractor::new();
        assert!(extractor.load(b"definitely not a pdf").is_err());
    }

    #[test]
    fn test_pages_carry_word_positions() {
        let doc = load(&pdf_with_text(&[(72, 700, "Widget")]));

        assert_eq!(doc.pages.len(), 1);
        let widget = doc.pages[0]
            .words
            .iter()
            .find(|w| w.text == "Widget")
            .unwrap();
        assert!((widget.x0 - 72.0).abs() < 1.0);
        // Top-left origin: 700pt up from the bottom is about 92pt down
        assert!(widget.y0 > 70.0 && widget.y0 < 100.0);
        assert!(widget.y1 > widget.y0);
    }

    #[test]
    fn test_coordinate_fallback_runs_on_pdf() {
        let data = pdf_with_text(&[
            (72, 700, "Item"),
            (300, 700, "Quantity"),
            (400, 700, "Total"),
            (72, 670, "Widget"),
            (300, 670, "3"),
            (400, 670, "75"),
        ]);

        let result = OrderExtractor::new().extract(&load(&data));

        assert_eq!(result.diagnostics.strategy, Strategy::Coordinates);
        let items: Vec<(&str, u32)> = result
            .items
            .iter()
            .map(|i| (i.name.as_str(), i.quantity))
            .collect();
        assert_eq!(items, vec![("Widget", 3)]);
    }
}
