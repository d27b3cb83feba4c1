//! Coordinate fallback parser.
//!
//! Used when a document gives no usable line anchors. Quantities are found
//! as integers in the quantity column, and each one claims the words of the
//! name column in a vertical band around it.

use std::ops::RangeInclusive;

use tracing::{debug, trace};

use super::rules::patterns::{FOOTER_MARKER, LEADING_LABEL};
use super::rules::{fold_label, is_dimension_token, is_measurement_token, is_unit_token};
use super::RecordExtractor;
use crate::document::{Document, WordToken};
use crate::models::config::{CoordinateConfig, ExtractionConfig};
use crate::models::order::{Diagnostics, Record, Strategy};

/// Column header roles recognized on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderRole {
    Photo,
    Item,
    Dimensions,
    Quantity,
    Total,
}

impl HeaderRole {
    fn of(text: &str) -> Option<Self> {
        match fold_label(text).as_str() {
            "photo" | "фото" => Some(Self::Photo),
            "item" | "товар" | "наименование" => Some(Self::Item),
            "dimensions" | "габариты" => Some(Self::Dimensions),
            "quantity" | "qty" | "количество" | "кол во" => Some(Self::Quantity),
            "total" | "сумма" => Some(Self::Total),
            _ => None,
        }
    }
}

/// Horizontal column bounds derived from a header row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnLayout {
    /// Name words start at or right of this x.
    pub name_left: f32,
    /// Name words start left of this x, when a dimensions column exists.
    pub name_right: Option<f32>,
    /// Quantity tokens start inside `[start, end)`.
    pub quantity_band: (f32, f32),
}

impl ColumnLayout {
    fn in_name_column(&self, word: &WordToken) -> bool {
        word.x0 >= self.name_left
            && word.x0 < self.quantity_band.0
            && self.name_right.is_none_or(|right| word.x0 < right)
    }

    fn in_quantity_column(&self, word: &WordToken) -> bool {
        word.x0 >= self.quantity_band.0 && word.x0 < self.quantity_band.1
    }
}

/// Word-position record extractor.
#[derive(Debug, Clone)]
pub struct CoordinateParser {
    quantity_range: RangeInclusive<u32>,
    config: CoordinateConfig,
}

impl CoordinateParser {
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default(), &CoordinateConfig::default())
    }

    pub fn from_config(extraction: &ExtractionConfig, config: &CoordinateConfig) -> Self {
        Self {
            quantity_range: extraction.quantity_range(),
            config: config.clone(),
        }
    }

    pub fn with_quantity_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.quantity_range = range;
        self
    }

    /// Locate the column header on a page.
    ///
    /// Returns the layout and the bottom edge of the header row. A page
    /// without a quantity header, or without an item or photo header on the
    /// same row, has no layout.
    pub fn detect_layout(&self, words: &[WordToken]) -> Option<(ColumnLayout, f32)> {
        let quantity = topmost(words, HeaderRole::Quantity)?;
        let row_tolerance = (quantity.y1 - quantity.y0) + self.config.row_tolerance;

        let on_header_row = |role| {
            words
                .iter()
                .filter(|w| (w.center_y() - quantity.center_y()).abs() <= row_tolerance)
                .find(|w| HeaderRole::of(&w.text) == Some(role))
        };

        let photo = on_header_row(HeaderRole::Photo);
        let item = on_header_row(HeaderRole::Item);
        if photo.is_none() && item.is_none() {
            return None;
        }
        let dimensions = on_header_row(HeaderRole::Dimensions);
        let total = on_header_row(HeaderRole::Total);

        let padding = self.config.column_padding;
        let name_left = match (photo, item) {
            (Some(photo), _) => photo.x1,
            (None, Some(item)) => item.x0,
            (None, None) => return None,
        };
        let band_end = match total {
            Some(total) if total.x0 > quantity.x0 => total.x0 - padding,
            _ => quantity.x0 + self.config.quantity_column_width,
        };

        let header_bottom = [Some(quantity), photo, item, dimensions, total]
            .into_iter()
            .flatten()
            .map(|w| w.y1)
            .fold(quantity.y1, f32::max);

        let layout = ColumnLayout {
            name_left,
            name_right: dimensions.map(|d| d.x0 - padding),
            quantity_band: (quantity.x0 - padding, band_end),
        };
        Some((layout, header_bottom))
    }

    /// Extract records from one page of words with a known layout.
    pub fn parse_page(
        &self,
        page_number: u32,
        words: &[WordToken],
        layout: &ColumnLayout,
        header_bottom: Option<f32>,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Record> {
        let body: Vec<&WordToken> = words
            .iter()
            .filter(|w| header_bottom.is_none_or(|bottom| w.y0 > bottom))
            .collect();

        let mut anchors: Vec<(f32, u32)> = body
            .iter()
            .filter(|w| layout.in_quantity_column(w))
            .filter_map(|w| {
                let qty = w.as_integer()?;
                self.quantity_range.contains(&qty).then_some((w.y0, qty))
            })
            .collect();
        anchors.sort_by(|a, b| a.0.total_cmp(&b.0));
        anchors.dedup_by(|next, prev| next.0 - prev.0 <= self.config.row_tolerance);
        diagnostics.quantity_anchors += anchors.len();

        let mut records = Vec::new();
        for (i, &(y, quantity)) in anchors.iter().enumerate() {
            let prev = if i > 0 { anchors[i - 1].0 } else { y - self.config.band_margin };
            let next = anchors.get(i + 1).map_or(y + self.config.band_margin, |a| a.0);
            let top = (prev + y) / 2.0 - self.config.band_slack;
            let bottom = (y + next) / 2.0 + self.config.band_slack;

            let band: Vec<&WordToken> = body
                .iter()
                .copied()
                .filter(|w| w.y0 >= top && w.y0 <= bottom && layout.in_name_column(w))
                .collect();

            let name = band_name(band, self.config.row_tolerance);
            if name.is_empty() {
                trace!("Quantity {} at y={} on page {} has no name", quantity, y, page_number);
                continue;
            }
            records.push(Record::new(name, quantity).on_page(page_number));
        }

        records
    }
}

impl Default for CoordinateParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordExtractor for CoordinateParser {
    fn strategy(&self) -> Strategy {
        Strategy::Coordinates
    }

    fn extract(&self, document: &Document, diagnostics: &mut Diagnostics) -> Vec<Record> {
        let mut layout: Option<ColumnLayout> = None;
        let mut records = Vec::new();

        for page in &document.pages {
            if page.words.is_empty() {
                continue;
            }
            diagnostics.words_scanned += page.words.len();

            let header_bottom = match self.detect_layout(&page.words) {
                Some((found, bottom)) => {
                    debug!("Column header on page {}: {:?}", page.number, found);
                    layout = Some(found);
                    Some(bottom)
                }
                None => None,
            };

            let Some(current) = layout.as_ref() else {
                debug!("Page {} precedes any column header, skipping", page.number);
                continue;
            };

            records.extend(self.parse_page(
                page.number,
                &page.words,
                current,
                header_bottom,
                diagnostics,
            ));
        }

        debug!(
            "Coordinate parser: {} words, {} quantity anchors, {} records",
            diagnostics.words_scanned,
            diagnostics.quantity_anchors,
            records.len()
        );

        records
    }
}

fn topmost(words: &[WordToken], role: HeaderRole) -> Option<&WordToken> {
    words
        .iter()
        .filter(|w| HeaderRole::of(&w.text) == Some(role))
        .min_by(|a, b| a.y0.total_cmp(&b.y0))
}

/// Group words into visual rows.
///
/// A word joins the first row whose running mean top is within `tolerance`.
/// Rows come back top to bottom with words left to right.
pub fn group_rows<'a>(words: &[&'a WordToken], tolerance: f32) -> Vec<Vec<&'a WordToken>> {
    let mut sorted = words.to_vec();
    sorted.sort_by(|a, b| a.y0.total_cmp(&b.y0).then(a.x0.total_cmp(&b.x0)));

    let mut rows: Vec<(f32, Vec<&WordToken>)> = Vec::new();
    for word in sorted {
        match rows.iter_mut().find(|(y, _)| (y - word.y0).abs() <= tolerance) {
            Some((y, row)) => {
                row.push(word);
                let n = row.len() as f32;
                *y = (*y * (n - 1.0) + word.y0) / n;
            }
            None => rows.push((word.y0, vec![word])),
        }
    }

    rows.sort_by(|a, b| a.0.total_cmp(&b.0));
    rows.into_iter()
        .map(|(_, mut row)| {
            row.sort_by(|a, b| a.x0.total_cmp(&b.x0));
            row
        })
        .collect()
}

/// Build a name from the words of one band.
fn band_name(band: Vec<&WordToken>, tolerance: f32) -> String {
    let rows = group_rows(&band, tolerance);

    // Dimensions sit in a column of their own; drop it and everything right of it
    let cut_x = if band.iter().any(|w| is_unit_token(&w.text)) {
        rows.iter()
            .flat_map(|row| {
                row.iter().enumerate().filter_map(|(i, w)| {
                    let followed_by_unit = row.get(i + 1).is_some_and(|n| is_unit_token(&n.text));
                    (is_dimension_token(&w.text)
                        || (is_measurement_token(&w.text) && followed_by_unit))
                        .then_some(w.x0)
                })
            })
            .min_by(f32::total_cmp)
    } else {
        None
    };

    let tokens: Vec<&str> = rows
        .iter()
        .flatten()
        .filter(|w| cut_x.is_none_or(|x| w.x0 < x))
        .map(|w| w.text.as_str())
        .collect();

    let joined = tokens.join(" ");
    let mut name = joined.as_str();
    if let Some(m) = FOOTER_MARKER.find(name) {
        name = &name[..m.start()];
    }
    loop {
        let rest = LEADING_LABEL.find(name).map(|m| &name[m.end()..]);
        match rest {
            Some(rest) if rest.len() < name.len() => name = rest.trim_start(),
            _ => break,
        }
    }

    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '-' | '–' | '—'))
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Page;
    use pretty_assertions::assert_eq;

    fn word(text: &str, x0: f32, y0: f32) -> WordToken {
        let width = 6.0 * text.chars().count() as f32;
        WordToken::new(text, x0, y0, x0 + width, y0 + 10.0)
    }

    fn header(y: f32) -> Vec<WordToken> {
        vec![
            word("Фото", 20.0, y),
            word("Товар", 80.0, y),
            word("Габариты", 260.0, y),
            word("Количество", 440.0, y),
            word("Сумма", 510.0, y),
        ]
    }

    fn names(records: &[Record]) -> Vec<(&str, u32)> {
        records.iter().map(|r| (r.name.as_str(), r.quantity)).collect()
    }

    #[test]
    fn test_detect_layout() {
        let parser = CoordinateParser::new();
        let (layout, bottom) = parser.detect_layout(&header(100.0)).unwrap();

        assert_eq!(layout.name_left, 44.0);
        assert_eq!(layout.name_right, Some(255.0));
        assert_eq!(layout.quantity_band, (435.0, 505.0));
        assert_eq!(bottom, 110.0);
    }

    #[test]
    fn test_detect_layout_needs_quantity_header() {
        let words = vec![word("Товар", 80.0, 100.0), word("Сумма", 510.0, 100.0)];
        assert!(CoordinateParser::new().detect_layout(&words).is_none());
    }

    #[test]
    fn test_layout_without_total_uses_column_width() {
        let words = vec![word("Item", 80.0, 100.0), word("Quantity", 440.0, 100.0)];
        let (layout, _) = CoordinateParser::new().detect_layout(&words).unwrap();
        assert_eq!(layout.name_left, 80.0);
        assert_eq!(layout.name_right, None);
        assert_eq!(layout.quantity_band, (435.0, 500.0));
    }

    #[test]
    fn test_extract_rows_with_wrapped_names() {
        let mut words = header(100.0);
        words.extend([
            word("Панель", 80.0, 130.0),
            word("LED-120", 125.0, 130.0),
            word("белая", 80.0, 142.0),
            word("600x600", 260.0, 130.0),
            word("мм", 310.0, 130.0),
            word("2", 450.0, 130.0),
            word("2500", 515.0, 130.0),
            word("Widget", 80.0, 190.0),
            word("3", 450.0, 190.0),
            word("75", 515.0, 190.0),
        ]);
        let doc = Document {
            source: String::new(),
            pages: vec![Page::from_words(1, words)],
        };

        let mut diagnostics = Diagnostics::default();
        let records = CoordinateParser::new().extract(&doc, &mut diagnostics);

        assert_eq!(names(&records), vec![("Панель LED-120 белая", 2), ("Widget", 3)]);
        assert_eq!(diagnostics.quantity_anchors, 2);
    }

    #[test]
    fn test_layout_persists_to_next_page() {
        let mut first = header(100.0);
        first.extend([word("Widget", 80.0, 130.0), word("3", 450.0, 130.0)]);
        let second = vec![word("Gadget", 80.0, 40.0), word("5", 450.0, 40.0)];

        let doc = Document {
            source: String::new(),
            pages: vec![Page::from_words(1, first), Page::from_words(2, second)],
        };
        let records = CoordinateParser::new().extract(&doc, &mut Diagnostics::default());

        assert_eq!(names(&records), vec![("Widget", 3), ("Gadget", 5)]);
        assert_eq!(records[1].page, 2);
    }

    #[test]
    fn test_page_before_header_is_skipped() {
        let doc = Document {
            source: String::new(),
            pages: vec![Page::from_words(1, vec![word("Widget", 80.0, 130.0), word("3", 450.0, 130.0)])],
        };
        assert!(CoordinateParser::new().extract(&doc, &mut Diagnostics::default()).is_empty());
    }

    #[test]
    fn test_quantity_out_of_range_is_not_an_anchor() {
        let mut words = header(100.0);
        words.extend([word("Widget", 80.0, 130.0), word("900", 450.0, 130.0)]);
        let doc = Document {
            source: String::new(),
            pages: vec![Page::from_words(1, words)],
        };
        assert!(CoordinateParser::new().extract(&doc, &mut Diagnostics::default()).is_empty());
    }

    #[test]
    fn test_band_name_truncates_inline_dimensions() {
        let words = [
            word("Panel", 80.0, 130.0),
            word("600x600", 120.0, 130.0),
            word("mm", 170.0, 130.0),
        ];
        let band: Vec<&WordToken> = words.iter().collect();
        assert_eq!(band_name(band, 2.5), "Panel");
    }

    #[test]
    fn test_band_name_keeps_wrapped_row_left_of_dimensions() {
        let words = [
            word("Panel", 80.0, 130.0),
            word("600x600", 200.0, 130.0),
            word("mm", 250.0, 130.0),
            word("white", 80.0, 142.0),
        ];
        let band: Vec<&WordToken> = words.iter().collect();
        assert_eq!(band_name(band, 2.5), "Panel white");
    }

    #[test]
    fn test_wrapped_name_without_dimensions_header() {
        let mut words = vec![
            word("Товар", 80.0, 100.0),
            word("Количество", 440.0, 100.0),
            word("Сумма", 510.0, 100.0),
        ];
        words.extend([
            word("Panel", 80.0, 130.0),
            word("LED", 116.0, 130.0),
            word("600x600", 200.0, 130.0),
            word("mm", 250.0, 130.0),
            word("warm", 80.0, 142.0),
            word("white", 110.0, 142.0),
            word("3", 450.0, 136.0),
        ]);
        let doc = Document {
            source: String::new(),
            pages: vec![Page::from_words(1, words)],
        };

        let records = CoordinateParser::new().extract(&doc, &mut Diagnostics::default());
        assert_eq!(names(&records), vec![("Panel LED warm white", 3)]);
    }

    #[test]
    fn test_band_name_strips_label_and_footer() {
        let words = [
            word("Товар", 80.0, 130.0),
            word("Widget", 120.0, 130.0),
            word("Page:", 80.0, 150.0),
            word("2", 120.0, 150.0),
        ];
        let band: Vec<&WordToken> = words.iter().collect();
        assert_eq!(band_name(band, 2.5), "Widget");
    }

    #[test]
    fn test_group_rows() {
        let words = [
            word("b", 50.0, 101.0),
            word("c", 10.0, 120.0),
            word("a", 10.0, 100.0),
        ];
        let refs: Vec<&WordToken> = words.iter().collect();
        let rows = group_rows(&refs, 2.5);

        let texts: Vec<Vec<&str>> = rows
            .iter()
            .map(|r| r.iter().map(|w| w.text.as_str()).collect())
            .collect();
        assert_eq!(texts, vec![vec!["a", "b"], vec!["c"]]);
    }
}
