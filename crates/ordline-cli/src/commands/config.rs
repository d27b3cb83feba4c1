//! Config command - inspect and edit the configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use ordline_core::models::config::OrdlineConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write a configuration file with default values
    Init(InitArgs),

    /// Get a single configuration value
    Get {
        /// Dotted key (e.g. "extraction.max_quantity")
        key: String,
    },

    /// Set a single configuration value
    Set {
        /// Dotted key (e.g. "output.delimiter")
        key: String,
        /// New value, parsed as JSON when possible
        value: String,
    },

    /// Show the configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Where to write the file (default: the user config path)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init(init_args) => init_config(init_args, &path),
        ConfigCommand::Get { key } => get_config(&path, &key),
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

/// `<user config dir>/ordline/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ordline")
        .join("config.json")
}

fn read_config(path: &Path) -> anyhow::Result<OrdlineConfig> {
    if path.exists() {
        Ok(OrdlineConfig::from_file(path)?)
    } else {
        Ok(OrdlineConfig::default())
    }
}

fn show_config(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        eprintln!(
            "{} No config file at {}, showing defaults.",
            style("ℹ").blue(),
            path.display()
        );
    }

    let config = read_config(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs, default_path: &Path) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(|| default_path.to_path_buf());

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    OrdlineConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn get_config(path: &Path, key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(read_config(path)?)?;
    let value = lookup(&json, key)?;
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

fn set_config(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let config = read_config(path)?;

    let parsed_value: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let mut json = serde_json::to_value(&config)?;
    *lookup_mut(&mut json, key)? = parsed_value.clone();

    let config: OrdlineConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;
    config.validate()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed_value)?
    );

    Ok(())
}

fn show_path(path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'ordline config init' to create a configuration file.");
    }

    Ok(())
}

fn lookup<'a>(json: &'a Value, key: &str) -> anyhow::Result<&'a Value> {
    key.split('.').try_fold(json, |current, part| {
        current
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })
}

/// Only existing keys can be set; serde would silently drop unknown ones.
fn lookup_mut<'a>(json: &'a mut Value, key: &str) -> anyhow::Result<&'a mut Value> {
    key.split('.').try_fold(json, |current, part| {
        current
            .get_mut(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_nested_key() {
        let json = serde_json::to_value(OrdlineConfig::default()).unwrap();
        assert_eq!(lookup(&json, "extraction.max_quantity").unwrap(), &Value::from(500));
        assert!(lookup(&json, "extraction.nope").is_err());
    }

    #[test]
    fn test_set_config_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        set_config(&path, "output.delimiter", ",").unwrap();
        set_config(&path, "catalog.unmatched", "drop").unwrap();

        let config = OrdlineConfig::from_file(&path).unwrap();
        assert_eq!(config.output.delimiter, ",");
        assert_eq!(config.catalog.unmatched, ordline_core::UnmatchedPolicy::Drop);
    }

    #[test]
    fn test_set_config_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        assert!(set_config(&path, "extraction.min_quantity", "0").is_err());
        assert!(set_config(&path, "extraction.max_quantity", "lots").is_err());
        assert!(set_config(&path, "extraction.unknown", "1").is_err());
        assert!(!path.exists());
    }
}
