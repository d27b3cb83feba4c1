//! Catalog lookup keys.
//!
//! Names from documents and names from the catalog rarely agree byte for
//! byte. They are compared through a normalized form, and products that come
//! in size and color variants are compared through a composed
//! `code[:size][:color]` key.

use crate::extraction::rules::patterns::{COLOR_WORDS, PRODUCT_CODE, SIZE_RUN};
use crate::extraction::rules::{strip_dimensions, unify_multiplication};

/// A product code split into its parts, e.g. `LED-120W`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCode {
    /// Uppercase letter prefix (`LED`).
    pub prefix: String,
    pub number: String,
    /// Uppercase letter suffix, possibly empty (`W`).
    pub suffix: String,
}

impl ProductCode {
    /// Canonical form: uppercase, no separator (`LED120W`).
    pub fn canonical(&self) -> String {
        format!("{}{}{}", self.prefix, self.number, self.suffix)
    }
}

/// Normalize a name for comparison: lowercase, `ё` as `е`, multiplication
/// glyphs unified, dimension and weight fragments removed, whitespace collapsed.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase().replace('ё', "е");
    strip_dimensions(&unify_multiplication(&lowered))
}

/// Find the first product code in `text`.
pub fn extract_code(text: &str) -> Option<ProductCode> {
    let caps = PRODUCT_CODE.captures(text)?;
    Some(ProductCode {
        prefix: caps[1].to_uppercase(),
        number: caps[2].to_string(),
        suffix: caps[3].to_uppercase(),
    })
}

/// Find the first `AxB` size whose operands are both at most `threshold`.
///
/// Runs of three or more operands are product dimensions and never a size.
pub fn extract_size(text: &str, threshold: u32) -> Option<String> {
    let unified = unify_multiplication(&text.to_lowercase());
    SIZE_RUN.find_iter(&unified).find_map(|m| {
        let operands: Vec<u32> = m
            .as_str()
            .split('x')
            .map(|n| n.parse().ok())
            .collect::<Option<_>>()?;
        match operands.as_slice() {
            [a, b] if *a <= threshold && *b <= threshold => Some(format!("{a}x{b}")),
            _ => None,
        }
    })
}

/// Find the first color word in `text` and return its canonical slug.
pub fn extract_color(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .find_map(|token| {
            COLOR_WORDS
                .iter()
                .find(|(spelling, _)| *spelling == token)
                .map(|(_, slug)| *slug)
        })
}

/// Build the code key for `name`.
///
/// For prefixes listed in `size_variant_families` the size and color are
/// appended when present; any other code is its own key.
pub fn catalog_key(name: &str, size_variant_families: &[String], threshold: u32) -> Option<String> {
    let code = extract_code(name)?;
    let mut key = code.canonical();

    let is_variant_family = size_variant_families
        .iter()
        .any(|family| family.to_uppercase() == code.prefix);

    if is_variant_family {
        if let Some(size) = extract_size(name, threshold) {
            key.push(':');
            key.push_str(&size);
        }
        if let Some(color) = extract_color(name) {
            key.push(':');
            key.push_str(color);
        }
    }

    Some(key)
}
