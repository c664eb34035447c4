//! Check output formatting.

use serde::Serialize;
use tabfilter_rs::filter::TreeStructure;
use tabfilter_rs::SyntaxTree;

use super::helpers::{format_dimmed, format_header, format_status, pad};

/// Width of the label column in the check table.
const LABEL_WIDTH: usize = 11;

/// JSON output structure for a single token.
#[derive(Serialize)]
pub struct TokenOutput<'a> {
    pub category: &'static str,
    pub text: &'a str,
}

/// Diagnostics for one checked query.
#[derive(Serialize)]
pub struct CheckReport<'a> {
    /// Which parser checked the input: `query`, `column` or `multi`.
    pub mode: &'static str,
    /// The input as given.
    pub input: &'a str,
    pub valid: bool,
    pub empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<&'a str>,
    pub tokens: Vec<TokenOutput<'a>>,
    /// Canonical query text, for valid input only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<TreeStructure>,
}

impl<'a> CheckReport<'a> {
    /// Builds the report for `input`, parsed into `tree`.
    pub fn new(mode: &'static str, input: &'a str, tree: &'a SyntaxTree) -> Self {
        let error = tree.error();
        Self {
            mode,
            input,
            valid: tree.is_valid(),
            empty: tree.is_empty(),
            error: error.map(ToString::to_string),
            context: error.and_then(|e| e.context()),
            tokens: tree
                .tokens()
                .iter()
                .map(|token| TokenOutput {
                    category: token.category().as_str(),
                    text: token.text(),
                })
                .collect(),
            canonical: tree.is_valid().then(|| tree.to_query_string()),
            tree: tree.to_structure(),
        }
    }
}

/// Formats a check report as JSON.
pub fn format_check_json(report: &CheckReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Formats a check report as a table.
pub fn format_check_table(report: &CheckReport, use_colors: bool) -> String {
    let mut output = String::new();
    let line = |label: &str, value: &str| format!("{} {}\n", pad(label, LABEL_WIDTH), value);

    output.push_str(&line("Input:", report.input));
    output.push_str(&line("Mode:", report.mode));
    output.push_str(&line("Status:", &format_status(report.valid, use_colors)));
    if let Some(ref error) = report.error {
        output.push_str(&line("Error:", error));
    }
    if let Some(context) = report.context {
        output.push_str(&line("Context:", &format!("'{context}'")));
    }
    if let Some(ref canonical) = report.canonical {
        output.push_str(&line("Canonical:", canonical));
    }

    if !report.tokens.is_empty() {
        output.push_str(&format!("\n{}\n", format_header("Tokens", use_colors)));
        for token in &report.tokens {
            output.push_str(&format!(
                "  {} {}\n",
                format_dimmed(&pad(token.category, LABEL_WIDTH), use_colors),
                token.text
            ));
        }
    }

    if let Some(ref tree) = report.tree {
        output.push_str(&format!("\n{}\n", format_header("Tree", use_colors)));
        render_node(tree, 1, use_colors, &mut output);
    }

    output
}

fn render_node(node: &TreeStructure, depth: usize, use_colors: bool, output: &mut String) {
    output.push_str(&format!(
        "{}{} {}\n",
        "  ".repeat(depth),
        format_dimmed(node.kind, use_colors),
        node.text
    ));
    for child in &node.children {
        render_node(child, depth + 1, use_colors, output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabfilter_rs::filter::Lexicon;

    #[test]
    fn test_valid_report() {
        let tree = SyntaxTree::new("{a} = 1 && {b} is nil", &Lexicon::query());
        let report = CheckReport::new("query", "{a} = 1 && {b} is nil", &tree);
        assert!(report.valid);
        assert!(report.error.is_none());
        assert_eq!(report.tokens.len(), 6);
        assert_eq!(report.tokens[0].category, "field");
        assert_eq!(report.canonical.as_deref(), Some("{a} = 1 && {b} is nil"));

        let table = format_check_table(&report, false);
        assert!(table.contains("Status:     valid"));
        assert!(table.contains("  logical &&"));
        assert!(table.contains("      field {a}"));
    }

    #[test]
    fn test_lex_failure_report() {
        let tree = SyntaxTree::new("{x} ~~ 1", &Lexicon::query());
        let report = CheckReport::new("query", "{x} ~~ 1", &tree);
        assert!(!report.valid);
        assert_eq!(report.context, Some("~~ 1"));
        assert!(report.canonical.is_none());
        assert!(report.tree.is_none());

        let table = format_check_table(&report, false);
        assert!(table.contains("Context:    '~~ 1'"));
    }

    #[test]
    fn test_report_json_shape() {
        let tree = SyntaxTree::new("", &Lexicon::query());
        let report = CheckReport::new("query", "", &tree);
        let json: serde_json::Value =
            serde_json::from_str(&format_check_json(&report).unwrap()).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["empty"], true);
        assert_eq!(json["tokens"], serde_json::json!([]));
        assert!(json.get("tree").is_none());
    }
}
