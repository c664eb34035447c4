//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the tq CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tabfilter_rs::filter::LogicalOperator;
use tabfilter_rs::ColumnConfig;

/// tq - check, run and split tabular filter queries
#[derive(Parser, Debug)]
#[command(name = "tq")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a query and show how it parses
    #[command(alias = "c")]
    Check {
        /// Query text, or a column fragment when --column is given
        query: String,

        /// Check the query as a fragment of this column (id[:type[:case]])
        #[arg(short, long, conflicts_with = "multi")]
        column: Option<ColumnConfig>,

        /// Check the query as a multi-column query joined by this operator
        #[arg(short, long, value_enum)]
        multi: Option<Combinator>,
    },

    /// Print the records matching a query
    #[command(alias = "f")]
    Filter {
        /// Query text (e.g., "{age} >= 18 && {name} icontains ann")
        query: String,

        /// Read records from a file instead of stdin (JSON array or NDJSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print only the number of matching records
        #[arg(long)]
        count: bool,
    },

    /// Split a multi-column query into per-column fragments
    Split {
        /// Multi-column query (e.g., "{age} > 30 && {city} contains par")
        query: String,

        /// Operator joining the columns (default: from config, else and)
        #[arg(short, long, value_enum)]
        operator: Option<Combinator>,

        /// Column definition id[:type[:case]] (repeatable, overrides config)
        #[arg(short = 'c', long = "column", action = clap::ArgAction::Append)]
        columns: Vec<ColumnConfig>,
    },

    /// Join per-column fragments into a multi-column query
    Join {
        /// Column fragments as id=fragment (e.g., "age=> 30")
        #[arg(required = true, value_parser = parse_assignment)]
        fragments: Vec<(String, String)>,

        /// Operator joining the columns (default: from config, else and)
        #[arg(short, long, value_enum)]
        operator: Option<Combinator>,

        /// Column definition id[:type[:case]] (repeatable, overrides config)
        #[arg(short = 'c', long = "column", action = clap::ArgAction::Append)]
        columns: Vec<ColumnConfig>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Logical operator accepted on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

impl From<Combinator> for LogicalOperator {
    fn from(combinator: Combinator) -> Self {
        match combinator {
            Combinator::And => LogicalOperator::And,
            Combinator::Or => LogicalOperator::Or,
        }
    }
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print config file path
    Path,

    /// Write a commented default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Parses `id=fragment`. The fragment may itself start with `=`.
fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (id, fragment) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid fragment '{s}': expected id=fragment"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("invalid fragment '{s}': missing column id"));
    }
    Ok((id.to_string(), fragment.trim().to_string()))
}
