//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use finx_core::models::config::FinxConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "extraction.max_years")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value (JSON, or a bare string)
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

/// Runs against the `-c` file when given, else the per-user default.
pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init(init_args) => init_config(init_args, path),
        ConfigCommand::Get { key } => get_config(&path, &key),
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("finx")
        .join("config.json")
}

fn load_or_default(path: &Path) -> anyhow::Result<FinxConfig> {
    if path.exists() {
        Ok(FinxConfig::from_file(path)?)
    } else {
        Ok(FinxConfig::default())
    }
}

fn show_config(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        eprintln!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }
    let config = load_or_default(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init_config(args: InitArgs, path: PathBuf) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or(path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    FinxConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );
    Ok(())
}

fn get_config(path: &Path, key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(load_or_default(path)?)?;
    println!("{}", serde_json::to_string_pretty(lookup(&json, key)?)?);
    Ok(())
}

fn set_config(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let parsed: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let mut json = serde_json::to_value(load_or_default(path)?)?;
    assign(&mut json, key, parsed.clone())?;

    let config: FinxConfig = serde_json::from_value(json)
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
        serde_json::to_string(&parsed)?
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
        println!("Run 'finx config init' to create a configuration file.");
    }
    Ok(())
}

/// Value at a dotted key path.
fn lookup<'a>(json: &'a Value, key: &str) -> anyhow::Result<&'a Value> {
    key.split('.').try_fold(json, |current, part| {
        current
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })
}

/// Replace the value at an existing dotted key path.
fn assign(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let slot = key.split('.').try_fold(json, |current, part| {
        current
            .get_mut(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })?;
    if slot.is_object() {
        anyhow::bail!("{} is a section; set one of its keys instead", key);
    }
    *slot = value;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup() {
        let json = serde_json::to_value(FinxConfig::default()).unwrap();
        assert_eq!(lookup(&json, "extraction.max_years").unwrap(), &json!(5));
        assert_eq!(lookup(&json, "output.null_value").unwrap(), &json!("NULL"));
        assert!(lookup(&json, "extraction.nope").is_err());
    }

    #[test]
    fn test_assign() {
        let mut json = serde_json::to_value(FinxConfig::default()).unwrap();
        assign(&mut json, "extraction.number_locale", json!("period")).unwrap();

        let config: FinxConfig = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(
            serde_json::to_value(config.extraction.number_locale).unwrap(),
            json!("period")
        );

        assert!(assign(&mut json, "extraction", json!(1)).is_err());
        assert!(assign(&mut json, "pdf.unknown", json!(1)).is_err());
    }
}
