//! Accumulator for the item name currently being assembled.

use super::rules::patterns::LEADING_LABEL;
use super::rules::{classify, strip_dimensions, LineClass};

/// Lines of the in-progress item name.
///
/// The buffer lives as long as the document parse, so a name that starts
/// at the bottom of one page and ends on the next is assembled in one piece.
/// Noise, header and totals lines are refused.
#[derive(Debug, Clone, Default)]
pub struct NameBuffer {
    lines: Vec<(String, LineClass)>,
}

impl NameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify and append a line. Returns `false` if the line was refused.
    pub fn push(&mut self, line: &str) -> bool {
        self.push_classified(line, classify(line))
    }

    /// Append a line whose class the caller already knows.
    pub fn push_classified(&mut self, line: &str, class: LineClass) -> bool {
        if !class.is_name_admissible() {
            return false;
        }
        self.lines.push((line.to_string(), class));
        true
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the buffer holds anything besides leaked technical lines.
    pub fn has_name_text(&self) -> bool {
        self.lines.iter().any(|(_, class)| !class.is_technical())
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|(line, _)| line.as_str())
    }

    /// Finalize the buffered lines into a name and clear the buffer.
    pub fn take_name(&mut self) -> String {
        let name = finalize_name(&self.lines);
        self.lines.clear();
        name
    }
}

/// Turn buffered name lines into a clean item name.
///
/// Technical lines trailing the name are dropped, a leading column label is
/// removed, dimension and weight fragments are cut out wherever they sit.
pub fn finalize_name(lines: &[(String, LineClass)]) -> String {
    let end = lines
        .iter()
        .rposition(|(_, class)| !class.is_technical())
        .map_or(0, |i| i + 1);

    let joined = lines[..end]
        .iter()
        .filter(|(_, class)| class.is_name_admissible())
        .map(|(line, _)| line.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let mut name = joined.trim();
    while let Some(m) = LEADING_LABEL.find(name) {
        if m.end() == 0 {
            break;
        }
        name = name[m.end()..].trim_start();
    }

    strip_dimensions(name)
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-' | '–' | '—'))
        .to_string()
}
