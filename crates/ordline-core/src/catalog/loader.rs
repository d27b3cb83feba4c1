//! Catalog file readers.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::CatalogIndex;
use crate::error::CatalogError;
use crate::extraction::rules::fold_label;
use crate::models::config::CatalogConfig;

type Row = (String, Option<String>);

/// Load a catalog from a spreadsheet, CSV or plain-text file.
///
/// Only the first sheet and its first two columns (name, article) are read.
/// A first row whose name cell is one of `header_labels` is skipped.
pub fn load_catalog(path: &Path, config: &CatalogConfig) -> Result<CatalogIndex, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::NotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    debug!("Loading catalog {} as {:?}", path.display(), extension);

    let rows = match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path)?,
        "csv" => read_csv(&fs::read(path)?)?,
        "txt" => read_text(&fs::read_to_string(path)?),
        other => return Err(CatalogError::UnsupportedFormat(other.to_string())),
    };

    let rows = skip_header(rows, &config.header_labels);
    let index = CatalogIndex::from_rows(rows, config);
    info!("Loaded {} catalog entries from {}", index.len(), path.display());
    Ok(index)
}

#[cfg(feature = "spreadsheet")]
fn read_workbook(path: &Path) -> Result<Vec<Row>, CatalogError> {
    use calamine::{open_workbook_auto, Data, Reader};

    let mut workbook =
        open_workbook_auto(path).map_err(|e| CatalogError::Workbook(e.to_string()))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(CatalogError::NoSheets)?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| CatalogError::Workbook(e.to_string()))?;

    let cell_text = |cell: Option<&Data>| -> String {
        match cell {
            None | Some(Data::Empty) => String::new(),
            Some(Data::String(s)) => s.clone(),
            Some(Data::Float(f)) => f.to_string(),
            Some(Data::Int(i)) => i.to_string(),
            Some(other) => other.to_string(),
        }
    };

    Ok(range
        .rows()
        .map(|row| {
            let name = cell_text(row.first());
            let article = cell_text(row.get(1));
            (name, Some(article).filter(|a| !a.trim().is_empty()))
        })
        .collect())
}

#[cfg(not(feature = "spreadsheet"))]
fn read_workbook(path: &Path) -> Result<Vec<Row>, CatalogError> {
    Err(CatalogError::UnsupportedFormat(format!(
        "{} (spreadsheet support is not enabled in this build)",
        path.display()
    )))
}

fn read_csv(data: &[u8]) -> Result<Vec<Row>, CatalogError> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    let first_line = data.split(|b| *b == b'\n').next().unwrap_or_default();
    let delimiter = if first_line.contains(&b';') { b';' } else { b',' };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(data);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let name = record.get(0).unwrap_or_default().to_string();
        let article = record.get(1).map(str::to_string).filter(|a| !a.trim().is_empty());
        rows.push((name, article));
    }
    Ok(rows)
}

fn read_text(content: &str) -> Vec<Row> {
    content.lines().map(|line| (line.to_string(), None)).collect()
}

fn skip_header(rows: Vec<Row>, header_labels: &[String]) -> Vec<Row> {
    let is_header = rows.first().is_some_and(|(name, _)| {
        let folded = fold_label(name);
        header_labels.iter().any(|label| fold_label(label) == folded)
    });
    rows.into_iter().skip(usize::from(is_header)).collect()
}
