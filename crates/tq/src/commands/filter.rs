//! Filter command implementation.
//!
//! Reads records as a JSON array or as newline-delimited JSON and prints the
//! ones matching a query.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use serde_json::Value;
use tabfilter_rs::QueryEngine;
use tracing::debug;

use super::{CommandContext, CommandError, Result};

/// Options for the filter command.
pub struct FilterOptions<'a> {
    /// Query text.
    pub query: &'a str,
    /// Record file; stdin when `None`.
    pub input: Option<&'a Path>,
    /// Print only the number of matches.
    pub count: bool,
}

/// Executes the filter command.
pub fn execute(ctx: &CommandContext, engine: &QueryEngine, opts: &FilterOptions) -> Result<()> {
    let tree = engine.compile(opts.query);
    if let Some(err) = tree.error() {
        return Err(err.clone().into());
    }

    let content = read_input(opts.input)?;
    let records = parse_records(&content)?;
    let matches = tree.filter(&records)?;
    debug!(
        matched = matches.len(),
        total = records.len(),
        "filter finished"
    );

    if opts.count {
        if ctx.json_output {
            let output = serde_json::json!({
                "matched": matches.len(),
                "total": records.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", matches.len());
        }
    } else if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&matches)?);
    } else {
        for record in &matches {
            println!("{}", serde_json::to_string(record)?);
        }
        if ctx.verbose {
            eprintln!("{} of {} records matched", matches.len(), records.len());
        }
    }

    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            CommandError::Input(format!("failed to read {}: {}", path.display(), e))
        }),
        None => {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}

/// Parses a JSON array of records, or one record per non-blank line.
pub(crate) fn parse_records(content: &str) -> Result<Vec<Value>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed)
            .map_err(|e| CommandError::Input(format!("invalid JSON array: {}", e)));
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map_err(|e| CommandError::Input(format!("line {}: {}", i + 1, e)))
        })
        .collect()
}
