//! Split command implementation.
//!
//! Decomposes a multi-column query into one fragment per column.

use tabfilter_rs::filter::LogicalOperator;
use tabfilter_rs::{ColumnConfig, QueryEngine};

use super::{CommandContext, CommandError, Result};
use crate::output::{format_split_json, format_split_table};

/// Options for the split command.
pub struct SplitOptions<'a> {
    /// Multi-column query.
    pub query: &'a str,
    /// Operator joining the columns.
    pub operator: LogicalOperator,
    /// Known columns.
    pub columns: &'a [ColumnConfig],
}

/// Executes the split command.
pub fn execute(ctx: &CommandContext, engine: &QueryEngine, opts: &SplitOptions) -> Result<()> {
    if opts.columns.is_empty() {
        return Err(CommandError::Config(
            "no columns configured; pass --column or add [[columns]] to the config file"
                .to_string(),
        ));
    }

    let tree = engine.compile_multi(opts.query, opts.operator);
    if let Some(err) = tree.error().filter(|_| !tree.is_empty()) {
        return Err(err.clone().into());
    }
    let fragments = engine.to_single_column_map(&tree, opts.columns)?;

    if ctx.json_output {
        println!("{}", format_split_json(opts.operator, &fragments)?);
    } else if !ctx.quiet {
        print!("{}", format_split_table(&fragments, ctx.use_colors));
    }

    Ok(())
}
