use clap::Parser;
use std::process::ExitCode;

use tabfilter_rs::QueryEngine;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod dispatch;
mod output;

use cli::Cli;
use commands::config::load_config;
use commands::{CommandContext, CommandError};
use dispatch::{QueryCommand, QueryDispatch, StandaloneCommand, StandaloneDispatch};

/// Environment variable holding the log filter directives.
const LOG_ENV: &str = "TQ_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", error_json(&e));
            } else {
                eprintln!("Error: {e}");
            }
            error_exit_code(&e)
        }
    }
}

/// Installs a stderr subscriber. `TQ_LOG` wins over the verbosity flags.
fn init_logging(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> commands::Result<()> {
    let mut ctx = CommandContext::from_cli(cli);

    if let Some(dispatch) = StandaloneDispatch::try_from_cli(cli) {
        return dispatch.execute(&ctx);
    }

    let config = load_config()?;
    ctx.apply_config(&config);

    match QueryDispatch::from_cli(cli) {
        Some(dispatch) => dispatch.execute(&ctx, &config, &QueryEngine::new()),
        None => Ok(()),
    }
}

/// Builds the JSON error object printed with `--json`.
fn error_json(e: &CommandError) -> String {
    let mut error = serde_json::json!({
        "code": error_code(e),
        "message": e.to_string(),
    });
    if let CommandError::Query(query_error) = e {
        if let Some(context) = query_error.context() {
            error["context"] = context.into();
        }
    }
    let wrapped = serde_json::json!({ "error": error });
    serde_json::to_string_pretty(&wrapped).unwrap_or_else(|_| wrapped.to_string())
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Query(_) => "QUERY_ERROR",
        CommandError::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
        CommandError::Input(_) => "INPUT_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    match e {
        CommandError::Query(_) => ExitCode::from(1),
        CommandError::ColumnNotFound(_) => ExitCode::from(2),
        CommandError::Input(_) | CommandError::Io(_) => ExitCode::from(3),
        CommandError::Json(_) => ExitCode::from(4),
        CommandError::Config(_) => ExitCode::from(5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabfilter_rs::{ColumnNotFound, QueryError};

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            CommandError::Query(QueryError::EmptyExpression),
            CommandError::ColumnNotFound(ColumnNotFound {
                column: "x".to_string(),
                suggestion: None,
            }),
            CommandError::Input("bad".to_string()),
            CommandError::Config("bad".to_string()),
        ];
        let codes: Vec<&str> = errors.iter().map(error_code).collect();
        assert_eq!(
            codes,
            ["QUERY_ERROR", "COLUMN_NOT_FOUND", "INPUT_ERROR", "CONFIG_ERROR"]
        );
    }

    #[test]
    fn test_error_json_includes_lex_context() {
        let e = CommandError::Query(QueryError::lex("~~ 1", 4));
        let json: serde_json::Value = serde_json::from_str(&error_json(&e)).unwrap();
        assert_eq!(json["error"]["code"], "QUERY_ERROR");
        assert_eq!(json["error"]["context"], "~~ 1");
    }

    #[test]
    fn test_error_json_without_context() {
        let e = CommandError::Config("missing".to_string());
        let json: serde_json::Value = serde_json::from_str(&error_json(&e)).unwrap();
        assert_eq!(json["error"]["message"], "configuration error: missing");
        assert!(json["error"].get("context").is_none());
    }
}
