//! Config command implementation.
//!
//! View and manage configuration settings.
//! Config file is located at ~/.config/tq/config.toml.

use std::env;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tabfilter_rs::filter::LogicalOperator;
use tabfilter_rs::column::ColumnType;
use tabfilter_rs::ColumnConfig;
use tracing::debug;

use super::{CommandContext, CommandError, Result};
use crate::cli::Combinator;

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Default config file contents.
const DEFAULT_CONFIG: &str = r#"# tq - tabular filter query configuration

# Config schema version (do not modify)
version = 1

# Operator joining columns for split/join: "and" or "or"
# operator = "and"

# Output preferences
[output]
# color = true

# Default columns for split, join and check --column.
# type: any, text, numeric, datetime, dropdown
# case: sensitive, insensitive
#
# [[columns]]
# id = "age"
# type = "numeric"
#
# [[columns]]
# id = "name"
# type = "text"
# case = "insensitive"
"#;

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Default operator joining columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<LogicalOperator>,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Default column definitions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnConfig>,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            operator: None,
            output: OutputConfig::default(),
            columns: Vec::new(),
        }
    }
}

impl Config {
    /// The operator from the flag, else from the file, else `and`.
    pub fn operator_or(&self, flag: Option<Combinator>) -> LogicalOperator {
        flag.map(LogicalOperator::from)
            .or(self.operator)
            .unwrap_or(LogicalOperator::And)
    }

    /// The columns from the flags, or from the file when none were given.
    pub fn columns_or<'a>(&'a self, flag: &'a [ColumnConfig]) -> &'a [ColumnConfig] {
        if flag.is_empty() {
            &self.columns
        } else {
            flag
        }
    }

    /// A bare `--column id` picks up the type and case configured for `id`.
    pub fn column_or<'a>(&'a self, flag: &'a ColumnConfig) -> &'a ColumnConfig {
        let bare = ColumnConfig::new(flag.id.as_str(), ColumnType::Any);
        if *flag != bare {
            return flag;
        }
        self.columns
            .iter()
            .find(|column| column.id == flag.id)
            .unwrap_or(flag)
    }
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// Gets the config directory path.
/// Uses XDG-style paths: ~/.config/tq/ on all platforms.
fn get_config_dir() -> Result<PathBuf> {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("tq"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("tq"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Gets the config file path.
pub fn get_config_path() -> Result<PathBuf> {
    // Check for override env var first
    if let Ok(path) = env::var("TQ_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    let config_dir = get_config_dir()?;
    Ok(config_dir.join("config.toml"))
}

/// Loads the configuration from disk.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    parse_config(&content)
}

/// Parses config file contents.
fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    if let Some(id) = duplicate_column(&config.columns) {
        return Err(CommandError::Config(format!(
            "Column '{}' is defined more than once",
            id
        )));
    }

    config.version = CONFIG_VERSION;
    Ok(config)
}

fn duplicate_column(columns: &[ColumnConfig]) -> Option<&str> {
    columns.iter().enumerate().find_map(|(i, column)| {
        columns[..i]
            .iter()
            .any(|earlier| earlier.id == column.id)
            .then_some(column.id.as_str())
    })
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = load_config()?;
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        if path.exists() {
            println!("Settings:");
            println!("  operator: {}", config.operator_or(None).word());

            println!("\n[output]");
            if let Some(color) = config.output.color {
                println!("  color: {}", color);
            }

            println!("\n[[columns]]");
            if config.columns.is_empty() {
                println!("  (none)");
            }
            for column in &config.columns {
                println!(
                    "  {} ({}, {})",
                    column.id,
                    column.column_type.as_str(),
                    column.case_sensitivity.as_str()
                );
            }
        } else {
            println!("(No config file exists. Run 'tq config init' to create one.)");
        }
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

/// Executes the config init command.
pub fn execute_init(ctx: &CommandContext, force: bool) -> Result<()> {
    let path = get_config_path()?;

    if path.exists() && !force {
        return Err(CommandError::Config(format!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| CommandError::Config(format!("Failed to create config directory: {}", e)))?;
    }

    fs::write(&path, DEFAULT_CONFIG)
        .map_err(|e| CommandError::Config(format!("Failed to write config: {}", e)))?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Created default config at: {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabfilter_rs::column::CaseSensitivity;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.operator.is_none());
        assert!(config.output.color.is_none());
        assert!(config.columns.is_empty());
    }

    #[test]
    fn test_default_config_file_parses() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.columns.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            version: CONFIG_VERSION,
            operator: Some(LogicalOperator::Or),
            output: OutputConfig { color: Some(true) },
            columns: vec![ColumnConfig::new("age", ColumnType::Numeric)],
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("version = 1"));
        assert!(toml_str.contains(r#"operator = "or""#));
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("color = true"));
        assert!(toml_str.contains("[[columns]]"));
        assert!(toml_str.contains(r#"type = "numeric""#));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
version = 1
operator = "or"

[output]
color = false

[[columns]]
id = "age"
type = "numeric"

[[columns]]
id = "name"
type = "text"
case = "insensitive"

[[columns]]
id = "notes"
"#;
        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.operator, Some(LogicalOperator::Or));
        assert_eq!(config.output.color, Some(false));
        assert_eq!(
            config.columns,
            vec![
                ColumnConfig::new("age", ColumnType::Numeric),
                ColumnConfig::new("name", ColumnType::Text)
                    .with_case(CaseSensitivity::Insensitive),
                ColumnConfig::new("notes", ColumnType::Any),
            ]
        );
    }

    #[test]
    fn test_config_deserialization_empty() {
        let config = parse_config("").unwrap();
        // Missing version defaults to current version
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.operator.is_none());
    }

    #[test]
    fn test_config_rejects_unknown_column_type() {
        let toml_str = r#"
[[columns]]
id = "age"
type = "money"
"#;
        assert!(matches!(
            parse_config(toml_str),
            Err(CommandError::Config(_))
        ));
    }

    #[test]
    fn test_config_rejects_duplicate_columns() {
        let toml_str = r#"
[[columns]]
id = "age"

[[columns]]
id = "age"
type = "numeric"
"#;
        let err = parse_config(toml_str).unwrap_err();
        assert!(err.to_string().contains("'age'"));
    }

    #[test]
    fn test_operator_precedence() {
        let mut config = Config::default();
        assert_eq!(config.operator_or(None), LogicalOperator::And);

        config.operator = Some(LogicalOperator::Or);
        assert_eq!(config.operator_or(None), LogicalOperator::Or);
        assert_eq!(
            config.operator_or(Some(Combinator::And)),
            LogicalOperator::And
        );
    }

    #[test]
    fn test_flag_columns_override_config() {
        let config = Config {
            columns: vec![ColumnConfig::new("a", ColumnType::Text)],
            ..Config::default()
        };
        let flags = vec![ColumnConfig::new("b", ColumnType::Numeric)];
        assert_eq!(config.columns_or(&flags)[0].id, "b");
        assert_eq!(config.columns_or(&[])[0].id, "a");
    }

    #[test]
    fn test_bare_column_flag_uses_configured_column() {
        let config = Config {
            columns: vec![ColumnConfig::new("age", ColumnType::Numeric)],
            ..Config::default()
        };
        let bare = ColumnConfig::new("age", ColumnType::Any);
        assert_eq!(config.column_or(&bare).column_type, ColumnType::Numeric);

        let typed = ColumnConfig::new("age", ColumnType::Text);
        assert_eq!(config.column_or(&typed).column_type, ColumnType::Text);

        let unknown = ColumnConfig::new("city", ColumnType::Any);
        assert_eq!(config.column_or(&unknown), &unknown);
    }

    #[test]
    fn test_config_version_default_function() {
        assert_eq!(default_version(), CONFIG_VERSION);
    }
}
