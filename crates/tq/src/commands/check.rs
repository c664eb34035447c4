//! Check command implementation.
//!
//! Parses a compound query, a single-column fragment or a multi-column query
//! and prints its tokens, canonical text and tree.

use tabfilter_rs::filter::LogicalOperator;
use tabfilter_rs::{ColumnConfig, QueryEngine, SyntaxTree};

use super::{CommandContext, CommandError, Result};
use crate::output::{format_check_json, format_check_table, CheckReport};

/// How the input is parsed.
pub enum CheckMode<'a> {
    /// A compound query.
    Query,
    /// A fragment of one column.
    Column(&'a ColumnConfig),
    /// A multi-column query.
    Multi(LogicalOperator),
}

/// Options for the check command.
pub struct CheckOptions<'a> {
    /// Text to check.
    pub input: &'a str,
    /// Parser to check it with.
    pub mode: CheckMode<'a>,
}

/// Executes the check command.
///
/// The report is printed for invalid input too; the parse error is then
/// returned so the process exits non-zero.
pub fn execute(ctx: &CommandContext, engine: &QueryEngine, opts: &CheckOptions) -> Result<()> {
    match opts.mode {
        CheckMode::Query => {
            let tree = engine.compile(opts.input);
            report(ctx, "query", opts.input, &tree)
        }
        CheckMode::Column(column) => {
            let tree = engine.compile_column(opts.input, column);
            report(ctx, "column", opts.input, tree.tree())
        }
        CheckMode::Multi(operator) => {
            let tree = engine.compile_multi(opts.input, operator);
            report(ctx, "multi", opts.input, tree.tree())
        }
    }
}

fn report(ctx: &CommandContext, mode: &'static str, input: &str, tree: &SyntaxTree) -> Result<()> {
    let report = CheckReport::new(mode, input, tree);

    if ctx.json_output {
        println!("{}", format_check_json(&report)?);
    } else if !ctx.quiet {
        print!("{}", format_check_table(&report, ctx.use_colors));
    }

    match tree.error() {
        Some(err) => Err(CommandError::Query(err.clone())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabfilter_rs::column::ColumnType;
    use tabfilter_rs::QueryError;

    fn quiet() -> CommandContext {
        CommandContext {
            json_output: false,
            use_colors: false,
            quiet: true,
            verbose: false,
        }
    }

    fn check(input: &str, mode: CheckMode) -> Result<()> {
        execute(&quiet(), &QueryEngine::new(), &CheckOptions { input, mode })
    }

    #[test]
    fn test_valid_query() {
        assert!(check("{a} = 1 or {b} is even", CheckMode::Query).is_ok());
    }

    #[test]
    fn test_invalid_query_is_an_error() {
        let err = check("({a} = 1", CheckMode::Query).unwrap_err();
        assert!(matches!(
            err,
            CommandError::Query(QueryError::UnbalancedNesting)
        ));
    }

    #[test]
    fn test_column_fragment() {
        let column = ColumnConfig::new("age", ColumnType::Numeric);
        assert!(check("> 5", CheckMode::Column(&column)).is_ok());
        assert!(check("{age} > 5", CheckMode::Column(&column)).is_err());
    }

    #[test]
    fn test_multi_rejects_duplicates() {
        let err = check("{a} = 1 && {a} = 2", CheckMode::Multi(LogicalOperator::And)).unwrap_err();
        assert!(matches!(
            err,
            CommandError::Query(QueryError::DuplicateColumn { .. })
        ));
    }
}
