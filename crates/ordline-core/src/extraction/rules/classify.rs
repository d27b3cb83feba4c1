//! Line classification.
//!
//! Every normalized line gets exactly one [`LineClass`]. The predicates
//! overlap at the string level (a bare total is also a money line), so they
//! live in one ordered table and the first match wins.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::dimensions::is_dimension_line;
use super::patterns::{
    BARE_TOTAL, BOILERPLATE, CURRENCY_MARK, HEADER_LABELS, INTEGER_LINE, MONEY_LINE, PAGE_FOOTER,
    TOTALS_START,
};

/// Classification of a single normalized line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineClass {
    /// Empty lines, footers, cover boilerplate. Always discarded.
    Noise,
    /// A column header label on its own line.
    HeaderToken,
    /// First line of the trailing totals/contact block.
    TotalsStart,
    /// `<integer> <currency>` with nothing else; the grand total.
    BareTotal,
    /// A whole-line currency amount.
    MoneyLine,
    /// Digits only.
    IntegerLine,
    /// Contains a dimension or weight annotation.
    DimensionLine,
    /// Anything else; part of an item name.
    PlainText,
}

impl LineClass {
    /// Whether a line of this class may ever sit in the name buffer.
    pub fn is_name_admissible(self) -> bool {
        !matches!(self, Self::Noise | Self::HeaderToken | Self::TotalsStart)
    }

    /// Technical lines that leak into a name buffer and get trimmed off its tail.
    pub fn is_technical(self) -> bool {
        matches!(
            self,
            Self::DimensionLine | Self::MoneyLine | Self::BareTotal | Self::IntegerLine
        )
    }
}

type Predicate = fn(&str) -> bool;

/// Classification rules in priority order.
const RULES: &[(Predicate, LineClass)] = &[
    (is_noise, LineClass::Noise),
    (is_header_token, LineClass::HeaderToken),
    (is_totals_start, LineClass::TotalsStart),
    (is_bare_total, LineClass::BareTotal),
    (is_money_line, LineClass::MoneyLine),
    (is_integer_line, LineClass::IntegerLine),
    (is_dimension_line, LineClass::DimensionLine),
];

/// Classify a normalized line.
pub fn classify(line: &str) -> LineClass {
    RULES
        .iter()
        .find(|(predicate, _)| predicate(line))
        .map(|(_, class)| *class)
        .unwrap_or(LineClass::PlainText)
}

/// Empty lines, page footers, cover boilerplate, project-cost banners.
pub fn is_noise(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || PAGE_FOOTER.is_match(line) || BOILERPLATE.is_match(line)
}

/// A line that is exactly one of the column header labels.
pub fn is_header_token(line: &str) -> bool {
    let folded = fold_label(line);
    !folded.is_empty() && HEADER_LABELS.contains(&folded.as_str())
}

pub fn is_totals_start(line: &str) -> bool {
    TOTALS_START.is_match(line.trim())
}

pub fn is_bare_total(line: &str) -> bool {
    BARE_TOTAL.is_match(line.trim())
}

pub fn is_money_line(line: &str) -> bool {
    MONEY_LINE.is_match(line.trim())
}

pub fn is_integer_line(line: &str) -> bool {
    INTEGER_LINE.is_match(line.trim())
}

/// Whether the line mentions the currency anywhere.
pub fn contains_currency(line: &str) -> bool {
    CURRENCY_MARK.is_match(line)
}

/// Parse an integer line as a quantity within the plausible range.
pub fn parse_quantity(line: &str, range: &RangeInclusive<u32>) -> Option<u32> {
    let line = line.trim();
    if !INTEGER_LINE.is_match(line) {
        return None;
    }
    line.parse::<u32>().ok().filter(|q| range.contains(q))
}

/// Fold a label for header comparison: lowercase, dashes to spaces,
/// trailing punctuation dropped, whitespace collapsed.
pub fn fold_label(line: &str) -> String {
    let lowered = line
        .to_lowercase()
        .replace(['-', '–', '—'], " ");
    lowered
        .trim()
        .trim_end_matches(['.', ':', ','])
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
