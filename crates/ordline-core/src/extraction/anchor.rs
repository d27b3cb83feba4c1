//! Anchor sequence parser.
//!
//! Item names have no fixed length and may contain numbers, so records are
//! found by their tail instead: a unit price, the quantity, then the line
//! subtotal. Everything before that triple since the previous record is the
//! name.

use std::ops::RangeInclusive;

use tracing::{debug, trace};

use super::name_buffer::NameBuffer;
use super::rules::{classify, contains_currency, parse_money, parse_quantity, LineClass};
use super::RecordExtractor;
use crate::document::Document;
use crate::models::config::ExtractionConfig;
use crate::models::order::{Diagnostics, Record, Strategy};

/// A normalized line tagged with its page and class.
#[derive(Debug, Clone)]
pub struct ClassifiedLine<'a> {
    pub page: u32,
    pub text: &'a str,
    pub class: LineClass,
}

impl<'a> ClassifiedLine<'a> {
    pub fn new(page: u32, text: &'a str) -> Self {
        Self {
            page,
            text,
            class: classify(text),
        }
    }
}

/// Parser state for one document.
///
/// Created once per document and carried over page boundaries untouched.
#[derive(Debug, Clone, Default)]
pub struct ParseState {
    pub name_buffer: NameBuffer,
    pub in_totals: bool,
}

impl ParseState {
    pub fn new() -> Self {
        Self::default()
    }

    fn enter_totals(&mut self) {
        self.in_totals = true;
        self.name_buffer.clear();
    }
}

/// Positions of a completed anchor triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Anchor {
    qty_index: usize,
    quantity: u32,
    sum_index: Option<usize>,
}

/// Line-based record extractor keyed on money -> quantity -> money triples.
#[derive(Debug, Clone)]
pub struct AnchorSequenceParser {
    quantity_range: RangeInclusive<u32>,
    lookahead: usize,
    require_closing_anchor: bool,
    rearm_on_header: bool,
}

impl AnchorSequenceParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            quantity_range: config.quantity_range(),
            lookahead: config.lookahead,
            require_closing_anchor: config.require_closing_anchor,
            rearm_on_header: config.rearm_on_header,
        }
    }

    /// Set the plausible quantity range.
    pub fn with_quantity_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.quantity_range = range;
        self
    }

    /// Set how many lines past an opening amount are searched.
    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    /// Accept a quantity with no closing amount after it.
    pub fn with_closing_anchor(mut self, required: bool) -> Self {
        self.require_closing_anchor = required;
        self
    }

    /// Leave the totals block when a new column header appears.
    pub fn with_rearm_on_header(mut self, rearm: bool) -> Self {
        self.rearm_on_header = rearm;
        self
    }

    /// Scan classified lines in order, emitting a record per anchor triple.
    pub fn parse_lines(
        &self,
        lines: &[ClassifiedLine<'_>],
        state: &mut ParseState,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Record> {
        let mut records = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = &lines[i];

            if state.in_totals {
                if self.rearm_on_header && line.class == LineClass::HeaderToken {
                    debug!("Column header on page {} re-arms the parser", line.page);
                    state.in_totals = false;
                } else {
                    diagnostics.lines_after_totals += 1;
                }
                i += 1;
                continue;
            }

            match line.class {
                LineClass::Noise | LineClass::HeaderToken => {}
                LineClass::TotalsStart => {
                    debug!("Totals block starts on page {}: {:?}", line.page, line.text);
                    state.enter_totals();
                }
                LineClass::BareTotal if !state.name_buffer.has_name_text() => {
                    debug!("Bare total on page {}: {:?}", line.page, line.text);
                    state.enter_totals();
                }
                LineClass::BareTotal | LineClass::MoneyLine => {
                    diagnostics.anchors_opened += 1;
                    if let Some(anchor) = self.find_anchor(lines, i) {
                        diagnostics.anchors_completed += 1;
                        let name = state.name_buffer.take_name();
                        if name.is_empty() {
                            debug!("Anchor on page {} has no name, skipping", line.page);
                        } else {
                            let line_total = anchor.sum_index.and_then(|s| parse_money(lines[s].text));
                            trace!("Record {:?} x{}", name, anchor.quantity);
                            records.push(
                                Record::new(name, anchor.quantity)
                                    .on_page(lines[anchor.qty_index].page)
                                    .with_amounts(parse_money(line.text), line_total),
                            );
                        }
                        i = anchor.sum_index.unwrap_or(anchor.qty_index) + 1;
                        continue;
                    }
                    if line.class == LineClass::BareTotal {
                        // Only a completed anchor makes it a price without kopecks
                        debug!("Bare total on page {}: {:?}", line.page, line.text);
                        state.enter_totals();
                    } else {
                        trace!("Unresolved amount {:?} folded into name", line.text);
                        diagnostics.anchors_folded += 1;
                        state.name_buffer.push_classified(line.text, line.class);
                    }
                }
                _ => {
                    state.name_buffer.push_classified(line.text, line.class);
                }
            }

            i += 1;
        }

        records
    }

    /// Look for the quantity and closing amount after the opening amount at `start`.
    fn find_anchor(&self, lines: &[ClassifiedLine<'_>], start: usize) -> Option<Anchor> {
        let last = (start + self.lookahead).min(lines.len().saturating_sub(1));
        let mut qty = None;

        for j in start + 1..=last {
            let line = &lines[j];
            if let Some(quantity) = parse_quantity(line.text, &self.quantity_range) {
                qty = Some((j, quantity));
                break;
            }
            // The quantity belongs to whichever amount is closest before it
            if matches!(
                line.class,
                LineClass::MoneyLine | LineClass::BareTotal | LineClass::TotalsStart
            ) {
                return None;
            }
        }

        let (qty_index, quantity) = qty?;

        let sum_index = (qty_index + 1..=last)
            .take_while(|&j| lines[j].class != LineClass::TotalsStart)
            .find(|&j| {
                matches!(lines[j].class, LineClass::MoneyLine | LineClass::BareTotal)
                    || contains_currency(lines[j].text)
            });

        if sum_index.is_none() && self.require_closing_anchor {
            return None;
        }

        Some(Anchor {
            qty_index,
            quantity,
            sum_index,
        })
    }
}

impl Default for AnchorSequenceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordExtractor for AnchorSequenceParser {
    fn strategy(&self) -> Strategy {
        Strategy::AnchorSequence
    }

    fn extract(&self, document: &Document, diagnostics: &mut Diagnostics) -> Vec<Record> {
        let lines: Vec<ClassifiedLine<'_>> = document
            .pages
            .iter()
            .flat_map(|page| page.lines.iter().map(move |l| ClassifiedLine::new(page.number, l)))
            .collect();

        count_classes(&lines, diagnostics);

        let mut state = ParseState::new();
        let records = self.parse_lines(&lines, &mut state, diagnostics);

        debug!(
            "Anchor parser: {} lines, {} anchors opened, {} completed, {} folded, {} records",
            lines.len(),
            diagnostics.anchors_opened,
            diagnostics.anchors_completed,
            diagnostics.anchors_folded,
            records.len()
        );

        records
    }
}

fn count_classes(lines: &[ClassifiedLine<'_>], diagnostics: &mut Diagnostics) {
    diagnostics.lines_scanned += lines.len();
    for line in lines {
        let counter = match line.class {
            LineClass::Noise => &mut diagnostics.noise_lines,
            LineClass::HeaderToken => &mut diagnostics.header_lines,
            LineClass::TotalsStart | LineClass::BareTotal => &mut diagnostics.totals_lines,
            LineClass::MoneyLine => &mut diagnostics.money_lines,
            LineClass::IntegerLine => &mut diagnostics.integer_lines,
            LineClass::DimensionLine => &mut diagnostics.dimension_lines,
            LineClass::PlainText => &mut diagnostics.plain_lines,
        };
        *counter += 1;
    }
}
