//! Command implementations for the tq CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod check;
pub mod completions;
pub mod config;
pub mod filter;
pub mod join;
pub mod split;

use tabfilter_rs::{ColumnNotFound, QueryError};

use crate::cli::Cli;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The query does not lex or parse.
    #[error("invalid query: {0}")]
    Query(#[from] QueryError),

    /// A query or fragment names a column that is not configured.
    #[error("{0}")]
    ColumnNotFound(#[from] ColumnNotFound),

    /// Records could not be read.
    #[error("invalid input: {0}")]
    Input(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether to be verbose.
    pub verbose: bool,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color,
            quiet: cli.quiet,
            verbose: cli.verbose,
        }
    }

    /// Applies the `[output]` settings of the config file.
    ///
    /// Flags win: `--no-color` cannot be undone by `color = true`.
    pub fn apply_config(&mut self, config: &config::Config) {
        if config.output.color == Some(false) {
            self.use_colors = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_context_from_flags() {
        let cli = Cli::parse_from(["tq", "--json", "--no-color", "check", "x"]);
        let ctx = CommandContext::from_cli(&cli);
        assert!(ctx.json_output);
        assert!(!ctx.use_colors);
        assert!(!ctx.quiet);
    }

    #[test]
    fn test_config_can_disable_colors() {
        let cli = Cli::parse_from(["tq", "check", "x"]);
        let mut ctx = CommandContext::from_cli(&cli);
        let mut config = config::Config::default();
        config.output.color = Some(true);
        ctx.apply_config(&config);
        assert!(ctx.use_colors);

        config.output.color = Some(false);
        ctx.apply_config(&config);
        assert!(!ctx.use_colors);
    }

    #[test]
    fn test_query_error_message() {
        let err = CommandError::from(QueryError::EmptyExpression);
        assert_eq!(err.to_string(), "invalid query: filter expression is empty");
    }
}
