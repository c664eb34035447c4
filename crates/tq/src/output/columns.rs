//! Split and join output formatting.

use std::collections::BTreeMap;

use serde::Serialize;
use tabfilter_rs::filter::LogicalOperator;
use tabfilter_rs::SingleColumnTree;

use super::helpers::{format_dimmed, pad};

/// JSON output structure for the split command.
#[derive(Serialize)]
pub struct SplitOutput<'a> {
    pub operator: LogicalOperator,
    pub columns: BTreeMap<&'a str, &'a str>,
}

/// A join fragment that did not parse and was left out of the query.
#[derive(Debug, Serialize)]
pub struct SkippedFragment<'a> {
    pub column: &'a str,
    pub fragment: &'a str,
    pub error: String,
}

/// JSON output structure for the join command.
#[derive(Serialize)]
pub struct JoinOutput<'a> {
    pub query: &'a str,
    pub operator: LogicalOperator,
    pub skipped: &'a [SkippedFragment<'a>],
}

/// Formats split fragments as JSON.
pub fn format_split_json(
    operator: LogicalOperator,
    fragments: &BTreeMap<String, SingleColumnTree>,
) -> Result<String, serde_json::Error> {
    let output = SplitOutput {
        operator,
        columns: fragments
            .iter()
            .map(|(id, tree)| (id.as_str(), tree.fragment()))
            .collect(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats split fragments as a table.
pub fn format_split_table(
    fragments: &BTreeMap<String, SingleColumnTree>,
    use_colors: bool,
) -> String {
    if fragments.is_empty() {
        return "No column filters.\n".to_string();
    }

    let width = fragments
        .keys()
        .map(|id| id.chars().count())
        .max()
        .unwrap_or(0)
        .max("Column".len());

    let mut output = String::new();
    let header = format!("{} {}", pad("Column", width), "Fragment");
    output.push_str(&format_dimmed(&header, use_colors));
    output.push('\n');

    for (id, tree) in fragments {
        output.push_str(&format!("{} {}\n", pad(id, width), tree.fragment()));
    }

    output
}

/// Formats a joined query as JSON.
pub fn format_join_json(
    query: &str,
    operator: LogicalOperator,
    skipped: &[SkippedFragment],
) -> Result<String, serde_json::Error> {
    let output = JoinOutput {
        query,
        operator,
        skipped,
    };
    serde_json::to_string_pretty(&output)
}
