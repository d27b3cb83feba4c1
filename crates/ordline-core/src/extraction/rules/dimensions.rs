//! Dimension and weight annotations.

use super::patterns::{
    DECIMAL_TOKEN, DIMENSION, DIMENSION_FRAGMENT, DIMENSION_TOKEN, UNIT_TOKEN, WEIGHT,
};

/// Whether the line carries a dimension (`NxM[xK] <unit>`) or weight (`N kg`).
pub fn is_dimension_line(line: &str) -> bool {
    DIMENSION.is_match(line) || WEIGHT.is_match(line)
}

/// Remove every dimension/weight fragment from `text`, wherever it sits,
/// and collapse the whitespace left behind.
pub fn strip_dimensions(text: &str) -> String {
    let stripped = DIMENSION_FRAGMENT.replace_all(text, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a single word token looks like a dimension value (`24x10x5`) or
/// a bare measurement (`600`, `0,5`).
pub fn is_dimension_token(token: &str) -> bool {
    DIMENSION_TOKEN.is_match(token)
}

pub fn is_measurement_token(token: &str) -> bool {
    DIMENSION_TOKEN.is_match(token) || DECIMAL_TOKEN.is_match(token)
}

/// Length or weight unit token: `mm`, `мм`, `cm`, `kg`, `кг`.
pub fn is_unit_token(token: &str) -> bool {
    UNIT_TOKEN.is_match(token)
}

/// Rewrite every multiplication glyph between two numbers as a plain `x`,
/// dropping the spaces around it: `24 × 10х5` -> `24x10x5`.
pub fn unify_multiplication(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if is_times_glyph(c) && prev_is_digit(&out) {
            let mut next = i + 1;
            while next < chars.len() && chars[next] == ' ' {
                next += 1;
            }
            if next < chars.len() && chars[next].is_ascii_digit() {
                while out.ends_with(' ') {
                    out.pop();
                }
                out.push('x');
                i = next;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }

    out
}

fn is_times_glyph(c: char) -> bool {
    matches!(c, 'x' | 'X' | 'х' | 'Х' | '×' | '*')
}

fn prev_is_digit(out: &str) -> bool {
    out.trim_end_matches(' ')
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_digit())
}
