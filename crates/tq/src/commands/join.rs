//! Join command implementation.
//!
//! Completes per-column fragments and combines them into one query.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

use tabfilter_rs::column::{find_column, to_query_string, ColumnType};
use tabfilter_rs::filter::LogicalOperator;
use tabfilter_rs::{ColumnConfig, QueryEngine, QueryError, SingleColumnTree};
use tracing::warn;

use super::{CommandContext, CommandError, Result};
use crate::output::{format_join_json, SkippedFragment};

/// Options for the join command.
pub struct JoinOptions<'a> {
    /// `(column id, fragment)` pairs.
    pub fragments: &'a [(String, String)],
    /// Operator joining the columns.
    pub operator: LogicalOperator,
    /// Known columns. When empty, every id is accepted as an untyped column.
    pub columns: &'a [ColumnConfig],
}

/// Executes the join command.
///
/// Fragments that do not parse are reported and left out of the query, the
/// same way an invalid column filter is ignored by a table.
pub fn execute(ctx: &CommandContext, engine: &QueryEngine, opts: &JoinOptions) -> Result<()> {
    let (query, skipped) = join(engine, opts)?;

    if ctx.json_output {
        println!("{}", format_join_json(&query, opts.operator, &skipped)?);
        return Ok(());
    }

    if !ctx.quiet {
        for fragment in &skipped {
            eprintln!(
                "Skipping column '{}': {}",
                fragment.column, fragment.error
            );
        }
    }
    println!("{query}");

    Ok(())
}

fn join<'a>(
    engine: &QueryEngine,
    opts: &JoinOptions<'a>,
) -> Result<(String, Vec<SkippedFragment<'a>>)> {
    let mut seen = HashSet::new();
    let mut trees: Vec<Arc<SingleColumnTree>> = Vec::new();
    let mut skipped = Vec::new();

    for (id, fragment) in opts.fragments {
        if !seen.insert(id.as_str()) {
            return Err(QueryError::DuplicateColumn { column: id.clone() }.into());
        }

        let column = if opts.columns.is_empty() {
            Cow::Owned(ColumnConfig::new(id.as_str(), ColumnType::Any))
        } else {
            Cow::Borrowed(find_column(opts.columns, id)?)
        };

        let tree = engine.compile_column(fragment, &column);
        if let Some(err) = tree.error().filter(|_| !tree.is_empty()) {
            warn!(column = %id, error = %err, "skipping invalid column fragment");
            skipped.push(SkippedFragment {
                column: id,
                fragment,
                error: err.to_string(),
            });
        }
        trees.push(tree);
    }

    let query = to_query_string(trees.iter().map(|tree| &**tree), opts.operator);
    Ok((query, skipped))
}
