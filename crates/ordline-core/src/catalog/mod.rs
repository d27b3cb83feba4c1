//! Product catalog: the list of known item names and their article codes.
//!
//! Extracted names are resolved against the catalog to get a canonical
//! display name. A missing or unreadable catalog is never fatal.

pub mod key;
mod loader;

pub use key::{catalog_key, extract_code, extract_color, extract_size, normalize_name, ProductCode};
pub use loader::load_catalog;

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::models::config::CatalogConfig;

/// What happens to an extracted item the catalog does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Output it under its raw name.
    #[default]
    Keep,
    /// Leave it out. Ignored when the catalog is empty.
    Drop,
}

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub display_name: String,
    pub article: Option<String>,
    /// Normalized display name, used as the aggregation key for matches.
    pub key: String,
}

/// Read-only lookup table over catalog rows.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
    by_name: HashMap<String, usize>,
    by_key: HashMap<String, usize>,
    by_code: HashMap<String, usize>,
    size_variant_families: Vec<String>,
    large_dimension_threshold: u32,
}

impl CatalogIndex {
    /// An index that matches nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an index from `(name, article)` rows.
    ///
    /// When two rows normalize to the same name or key, the first one wins.
    pub fn from_rows<I>(rows: I, config: &CatalogConfig) -> Self
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        let mut index = Self {
            size_variant_families: config.size_variant_families.clone(),
            large_dimension_threshold: config.large_dimension_threshold,
            ..Self::default()
        };

        for (name, article) in rows {
            let display_name = name.split_whitespace().collect::<Vec<_>>().join(" ");
            if display_name.is_empty() {
                continue;
            }
            let article = article
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty());

            let key = normalize_name(&display_name);
            let id = index.entries.len();

            index.by_name.entry(key.clone()).or_insert(id);
            if let Some(composed) = index.key_for(&display_name) {
                index.by_key.entry(composed).or_insert(id);
            }
            let code = article
                .as_deref()
                .and_then(extract_code)
                .or_else(|| extract_code(&display_name));
            if let Some(code) = code {
                index.by_code.entry(code.canonical()).or_insert(id);
            }

            index.entries.push(CatalogEntry {
                display_name,
                article,
                key,
            });
        }

        debug!(
            "Catalog index: {} entries, {} names, {} composed keys, {} codes",
            index.entries.len(),
            index.by_name.len(),
            index.by_key.len(),
            index.by_code.len()
        );

        index
    }

    /// Load a catalog file.
    pub fn load(path: &Path, config: &CatalogConfig) -> Result<Self, CatalogError> {
        load_catalog(path, config)
    }

    /// Load the configured catalog, or fall back to an empty one.
    pub fn load_or_empty(config: &CatalogConfig) -> Self {
        let Some(path) = config.path.as_deref() else {
            return Self::empty();
        };

        match load_catalog(path, config) {
            Ok(index) => index,
            Err(e) => {
                warn!("Catalog {} unavailable, keeping raw names: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    /// Resolve an extracted name.
    ///
    /// Tries the normalized name, then the composed variant key, then the
    /// bare product code. A name qualified by size or color only resolves
    /// through its composed key, so a missing variant stays unmatched.
    pub fn lookup(&self, name: &str) -> Option<&CatalogEntry> {
        if self.entries.is_empty() {
            return None;
        }

        if let Some(id) = self.by_name.get(&normalize_name(name)) {
            return self.entries.get(*id);
        }

        let key = self.key_for(name)?;
        if let Some(id) = self.by_key.get(&key) {
            return self.entries.get(*id);
        }
        if key.contains(':') {
            return None;
        }

        let code = extract_code(name)?;
        self.by_code
            .get(&code.canonical())
            .and_then(|id| self.entries.get(*id))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    fn key_for(&self, name: &str) -> Option<String> {
        catalog_key(name, &self.size_variant_families, self.large_dimension_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rows(names: &[(&str, Option<&str>)]) -> Vec<(String, Option<String>)> {
        names
            .iter()
            .map(|(n, a)| (n.to_string(), a.map(str::to_string)))
            .collect()
    }

    fn tile_config() -> CatalogConfig {
        CatalogConfig {
            size_variant_families: vec!["ПЛ".to_string()],
            ..CatalogConfig::default()
        }
    }

    #[test]
    fn test_lookup_by_normalized_name() {
        let index = CatalogIndex::from_rows(
            rows(&[("Widget Model A", Some("W-100")), ("Gadget", None)]),
            &CatalogConfig::default(),
        );

        let entry = index.lookup("widget  model a").unwrap();
        assert_eq!(entry.display_name, "Widget Model A");
        assert_eq!(entry.article.as_deref(), Some("W-100"));
        assert_eq!(index.lookup("Gadget 24x10x5 mm").unwrap().display_name, "Gadget");
        assert!(index.lookup("Gizmo").is_none());
    }

    #[test]
    fn test_lookup_by_code() {
        let index = CatalogIndex::from_rows(
            rows(&[("Светильник потолочный LED-120", None)]),
            &CatalogConfig::default(),
        );
        let entry = index.lookup("Светильник LED 120 белый").unwrap();
        assert_eq!(entry.display_name, "Светильник потолочный LED-120");
    }

    #[test]
    fn test_size_variants_resolve_separately() {
        let index = CatalogIndex::from_rows(
            rows(&[
                ("Плитка ПЛ-12 30х60 серая", None),
                ("Плитка ПЛ-12 60х60 белая", None),
            ]),
            &tile_config(),
        );

        assert_eq!(
            index.lookup("ПЛ12 60x60 белая плитка").unwrap().display_name,
            "Плитка ПЛ-12 60х60 белая"
        );
        assert_eq!(
            index.lookup("Плитка ПЛ 12 30*60 серая").unwrap().display_name,
            "Плитка ПЛ-12 30х60 серая"
        );
    }

    #[test]
    fn test_missing_variant_stays_unmatched() {
        let index = CatalogIndex::from_rows(rows(&[("Плитка ПЛ-12 30х60 серая", None)]), &tile_config());

        assert!(index.lookup("Плитка ПЛ-12 90х90 черная").is_none());
        assert!(index.lookup("Плитка ПЛ-12 30х60 черная").is_none());
        assert_eq!(
            index.lookup("Плитка ПЛ-12").unwrap().display_name,
            "Плитка ПЛ-12 30х60 серая"
        );
    }

    #[test]
    fn test_first_duplicate_wins() {
        let index = CatalogIndex::from_rows(
            rows(&[("Widget", Some("A1")), ("WIDGET", Some("B2"))]),
            &CatalogConfig::default(),
        );
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup("widget").unwrap().article.as_deref(), Some("A1"));
    }

    #[test]
    fn test_empty_catalog() {
        let index = CatalogIndex::empty();
        assert!(index.is_empty());
        assert!(index.lookup("Widget").is_none());
    }

    #[test]
    fn test_load_or_empty_on_missing_file() {
        let config = CatalogConfig {
            path: Some("/nonexistent/items.xlsx".into()),
            ..CatalogConfig::default()
        };
        assert!(CatalogIndex::load_or_empty(&config).is_empty());
        assert!(CatalogIndex::load_or_empty(&CatalogConfig::default()).is_empty());
    }

    #[test]
    fn test_unmatched_policy_serde() {
        let policy: UnmatchedPolicy = serde_json::from_str("\"drop\"").unwrap();
        assert_eq!(policy, UnmatchedPolicy::Drop);
        assert_eq!(UnmatchedPolicy::default(), UnmatchedPolicy::Keep);
    }
}
