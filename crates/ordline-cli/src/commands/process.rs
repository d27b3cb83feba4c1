//! Process command - extract line items from a single order document.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use ordline_core::models::config::{OrdlineConfig, OutputConfig};
use ordline_core::{load_document, ExtractionResult, OrderExtractor, UnmatchedPolicy};

use super::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, TXT with form-feed page breaks, or JSON page dump)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    #[command(flatten)]
    options: ExtractionOptions,

    /// Print extraction diagnostics to stderr
    #[arg(long)]
    diagnostics: bool,
}

/// Settings shared by `process` and `batch` that override the config file.
#[derive(Args, Clone, Debug)]
pub struct ExtractionOptions {
    /// Catalog file (xlsx, xls, ods, csv or txt)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// What to do with items missing from the catalog
    #[arg(long, value_enum)]
    unmatched: Option<UnmatchedArg>,

    /// CSV field delimiter
    #[arg(long)]
    delimiter: Option<char>,

    /// Prefix CSV files with a UTF-8 byte order mark
    #[arg(long, conflicts_with = "no_bom")]
    bom: bool,

    /// Write CSV files without a byte order mark
    #[arg(long)]
    no_bom: bool,

    /// Omit the CSV header row
    #[arg(long)]
    no_header: bool,
}

impl ExtractionOptions {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut OrdlineConfig) {
        if let Some(catalog) = &self.catalog {
            config.catalog.path = Some(catalog.clone());
        }
        if let Some(unmatched) = self.unmatched {
            config.catalog.unmatched = unmatched.into();
        }
        if let Some(delimiter) = self.delimiter {
            config.output.delimiter = delimiter.to_string();
        }
        if self.bom {
            config.output.bom = true;
        }
        if self.no_bom {
            config.output.bom = false;
        }
        if self.no_header {
            config.output.include_header = false;
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum UnmatchedArg {
    /// Output unknown items under their raw name
    Keep,
    /// Leave unknown items out
    Drop,
}

impl From<UnmatchedArg> for UnmatchedPolicy {
    fn from(arg: UnmatchedArg) -> Self {
        match arg {
            UnmatchedArg::Keep => UnmatchedPolicy::Keep,
            UnmatchedArg::Drop => UnmatchedPolicy::Drop,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Delimited name/quantity table
    Csv,
    /// JSON output with records and diagnostics
    Json,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.options.apply(&mut config);
    config.validate()?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Loading catalog...");
    pb.set_position(10);
    let extractor = OrderExtractor::from_config(&config);

    pb.set_message("Reading document...");
    pb.set_position(30);
    let document = load_document(&args.input)?;

    pb.set_message("Extracting line items...");
    pb.set_position(60);
    let result = extractor.extract(&document);

    pb.finish_and_clear();

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let output = format_result(&result, args.format, &config.output)?;

    if let Some(output_path) = &args.output {
        write_output(output_path, &output, args.format, &config.output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    if args.diagnostics {
        print_diagnostics(&result);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Render an extraction result in the requested format.
pub fn format_result(
    result: &ExtractionResult,
    format: OutputFormat,
    output: &OutputConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Csv => format_csv(result, output),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)? + "\n"),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

/// Write rendered output to a file, adding the byte order mark to CSV
/// when configured.
pub fn write_output(
    path: &Path,
    content: &str,
    format: OutputFormat,
    output: &OutputConfig,
) -> anyhow::Result<()> {
    if format == OutputFormat::Csv && output.bom {
        fs::write(path, format!("\u{feff}{}", content))?;
    } else {
        fs::write(path, content)?;
    }
    debug!("Wrote output to {}", path.display());
    Ok(())
}

fn format_csv(result: &ExtractionResult, output: &OutputConfig) -> anyhow::Result<String> {
    let delimiter = match output.delimiter.as_bytes() {
        [byte] => *byte,
        _ => anyhow::bail!(
            "CSV delimiter must be a single ASCII character, got {:?}",
            output.delimiter
        ),
    };

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(vec![]);

    if output.include_header {
        wtr.write_record([&output.name_header, &output.quantity_header])?;
    }

    for item in &result.items {
        wtr.write_record([item.name.as_str(), item.quantity.to_string().as_str()])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    if result.items.is_empty() {
        output.push_str("No line items found.\n");
        return output;
    }

    let width = result
        .items
        .iter()
        .map(|i| i.quantity.to_string().len())
        .max()
        .unwrap_or(1);

    let catalog_used = result.items.iter().any(|i| i.matched);

    for item in &result.items {
        let marker = if catalog_used && !item.matched { " *" } else { "" };
        output.push_str(&format!(
            "{:>width$}  {}{}\n",
            item.quantity,
            item.name,
            marker,
            width = width
        ));
    }

    output.push('\n');
    output.push_str(&format!(
        "Items: {}, units: {}\n",
        result.items.len(),
        result.total_quantity()
    ));
    if catalog_used && result.items.iter().any(|i| !i.matched) {
        output.push_str("* not resolved against the catalog\n");
    }

    output
}

fn print_diagnostics(result: &ExtractionResult) {
    let d = &result.diagnostics;
    eprintln!();
    eprintln!("{} Strategy: {:?}", style("ℹ").blue(), d.strategy);
    eprintln!(
        "{} Pages: {}, lines: {}, words: {}",
        style("ℹ").blue(),
        d.pages,
        d.lines_scanned,
        d.words_scanned
    );
    eprintln!(
        "{} Lines: {} noise, {} header, {} totals, {} money, {} integer, {} dimension, {} text, {} after totals",
        style("ℹ").blue(),
        d.noise_lines,
        d.header_lines,
        d.totals_lines,
        d.money_lines,
        d.integer_lines,
        d.dimension_lines,
        d.plain_lines,
        d.lines_after_totals
    );
    eprintln!(
        "{} Anchors: {} opened, {} completed, {} folded; quantity anchors: {}",
        style("ℹ").blue(),
        d.anchors_opened,
        d.anchors_completed,
        d.anchors_folded,
        d.quantity_anchors
    );
    eprintln!(
        "{} Records: {} emitted, {} unmatched, {} dropped",
        style("ℹ").blue(),
        d.records_emitted,
        d.records_unmatched,
        d.records_dropped
    );
    eprintln!(
        "{} Processing time: {}ms",
        style("ℹ").blue(),
        result.processing_time_ms
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordline_core::{Document, LineItem};

    fn result_with(items: Vec<LineItem>) -> ExtractionResult {
        ExtractionResult {
            items,
            ..ExtractionResult::default()
        }
    }

    fn item(name: &str, quantity: u32) -> LineItem {
        LineItem {
            name: name.to_string(),
            quantity,
            article: None,
            matched: false,
        }
    }

    #[test]
    fn test_format_csv_default_header() {
        let result = result_with(vec![item("Widget Model A", 6), item("Gadget; large", 1)]);
        let csv = format_csv(&result, &OutputConfig::default()).unwrap();
        assert_eq!(
            csv,
            "Наименование;Количество\nWidget Model A;6\n\"Gadget; large\";1\n"
        );
    }

    #[test]
    fn test_format_csv_without_header() {
        let output = OutputConfig {
            delimiter: ",".to_string(),
            include_header: false,
            ..OutputConfig::default()
        };
        let csv = format_csv(&result_with(vec![item("Widget", 3)]), &output).unwrap();
        assert_eq!(csv, "Widget,3\n");
    }

    #[test]
    fn test_format_csv_rejects_wide_delimiter() {
        let output = OutputConfig {
            delimiter: "¦".to_string(),
            ..OutputConfig::default()
        };
        assert!(format_csv(&result_with(vec![]), &output).is_err());
    }

    #[test]
    fn test_format_text() {
        let doc = Document::from_pages([vec!["Widget", "25.00 ₽", "12", "300 ₽"]]);
        let result = OrderExtractor::new().extract(&doc);
        let text = format_text(&result);
        assert!(text.starts_with("12  Widget"));
        assert!(text.contains("Items: 1, units: 12"));
    }

    #[test]
    fn test_options_override_config() {
        let options = ExtractionOptions {
            catalog: Some(PathBuf::from("items.xlsx")),
            unmatched: Some(UnmatchedArg::Drop),
            delimiter: Some(','),
            bom: false,
            no_bom: true,
            no_header: true,
        };
        let mut config = OrdlineConfig::default();
        options.apply(&mut config);

        assert_eq!(config.catalog.path, Some(PathBuf::from("items.xlsx")));
        assert_eq!(config.catalog.unmatched, UnmatchedPolicy::Drop);
        assert_eq!(config.output.delimiter, ",");
        assert!(!config.output.bom);
        assert!(!config.output.include_header);
    }
}
