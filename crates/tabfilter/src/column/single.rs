//! Single-column filter fragments.

use serde_json::Value;
use tracing::debug;

use super::ColumnConfig;
use crate::filter::{
    escape_field, Category, ExpressionKind, LexemeKind, Lexicon, QueryError, QueryResult,
    SyntaxTree, Token,
};

/// The filter typed into one column's filter box, completed into a query on
/// that column.
///
/// Fragments take one of three shapes:
///
/// | fragment | completed query |
/// |---|---|
/// | `value` | `{id} <default op> value` |
/// | `op value` | `{id} op value` |
/// | `is <keyword>` | `{id} is <keyword>` |
///
/// The default operator depends on the column type, and gets an `i` prefix
/// on case-insensitive columns.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tabfilter_rs::column::{ColumnConfig, ColumnType, SingleColumnTree};
/// use tabfilter_rs::filter::Lexicon;
///
/// let column = ColumnConfig::new("price", ColumnType::Numeric);
/// let tree = SingleColumnTree::new("12", &column, &Lexicon::column());
/// assert_eq!(tree.to_query_string(), "{price} = 12");
/// assert!(tree.evaluate(&json!({"price": "12.0"})));
/// ```
#[derive(Debug, Clone)]
pub struct SingleColumnTree {
    fragment: String,
    column: ColumnConfig,
    tree: SyntaxTree,
}

impl SingleColumnTree {
    /// Lexes `fragment` with the column lexicon and completes it.
    pub fn new(fragment: &str, column: &ColumnConfig, lexicon: &Lexicon) -> Self {
        let tree = match lexicon.tokenize(fragment) {
            Ok(tokens) => complete(fragment, column, tokens),
            Err(err) => SyntaxTree::with_error(fragment, Vec::new(), err),
        };
        Self {
            fragment: fragment.to_string(),
            column: column.clone(),
            tree,
        }
    }

    /// The fragment as typed.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// The column this fragment filters.
    pub fn column(&self) -> &ColumnConfig {
        &self.column
    }

    /// The completed query tree.
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Returns true if the fragment completed into a valid query.
    pub fn is_valid(&self) -> bool {
        self.tree.is_valid()
    }

    /// Returns true if the fragment is blank.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Why the fragment is invalid, if it is.
    pub fn error(&self) -> Option<&QueryError> {
        self.tree.error()
    }

    /// Returns true if `record` satisfies the completed query.
    ///
    /// # Panics
    ///
    /// Panics if the fragment is invalid.
    pub fn evaluate(&self, record: &Value) -> bool {
        self.tree.evaluate(record)
    }

    /// Like [`evaluate`](Self::evaluate), returning the error of an invalid
    /// fragment instead of panicking.
    pub fn try_evaluate(&self, record: &Value) -> QueryResult<bool> {
        self.tree.try_evaluate(record)
    }

    /// Canonical text of the completed query; empty when invalid.
    pub fn to_query_string(&self) -> String {
        self.tree.to_query_string()
    }
}

/// Injects the column reference and, for bare values, the default operator.
fn complete(fragment: &str, column: &ColumnConfig, tokens: Vec<Token>) -> SyntaxTree {
    let field = Token::new(
        LexemeKind::Expression(ExpressionKind::Field),
        escape_field(&column.id),
    );

    let categories: Vec<Category> = tokens.iter().map(Token::category).collect();
    let completed = match categories.as_slice() {
        [] => return SyntaxTree::from_lexed(fragment, tokens),
        [Category::Literal] => {
            let op = column.column_type.default_operator();
            let op = Token::new(
                LexemeKind::Relational(op),
                op.present(column.default_flag()),
            );
            [vec![field, op], tokens].concat()
        }
        [Category::RelationalOperator, Category::Literal] | [Category::UnaryOperator] => {
            [vec![field], tokens].concat()
        }
        _ => {
            debug!(fragment, column = %column.id, "unsupported column fragment");
            return SyntaxTree::with_error(
                fragment,
                tokens,
                QueryError::UnsupportedFragment {
                    fragment: fragment.trim().to_string(),
                },
            );
        }
    };

    let query = completed
        .iter()
        .map(Token::text)
        .collect::<Vec<_>>()
        .join(" ");
    SyntaxTree::from_lexed(query, completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{CaseSensitivity, ColumnType};
    use serde_json::json;

    fn single(fragment: &str, column: &ColumnConfig) -> SingleColumnTree {
        SingleColumnTree::new(fragment, column, &Lexicon::column())
    }

    #[test]
    fn test_bare_value_gets_default_operator() {
        let cases = [
            (ColumnType::Any, "{c} contains x"),
            (ColumnType::Text, "{c} contains x"),
            (ColumnType::Numeric, "{c} = x"),
            (ColumnType::Datetime, "{c} datestartswith x"),
            (ColumnType::Dropdown, "{c} = x"),
        ];
        for (column_type, expected) in cases {
            let tree = single("x", &ColumnConfig::new("c", column_type));
            assert_eq!(tree.to_query_string(), expected, "type: {column_type:?}");
        }
    }

    #[test]
    fn test_insensitive_column_flags_default_operator() {
        let column =
            ColumnConfig::new("name", ColumnType::Text).with_case(CaseSensitivity::Insensitive);
        let tree = single("ANN", &column);
        assert_eq!(tree.to_query_string(), "{name} icontains ANN");
        assert!(tree.evaluate(&json!({"name": "Joanne"})));
    }

    #[test]
    fn test_explicit_operator_is_kept() {
        let column = ColumnConfig::new("age", ColumnType::Numeric);
        let tree = single(">= 18", &column);
        assert_eq!(tree.to_query_string(), "{age} >= 18");
        assert!(tree.evaluate(&json!({"age": 18})));
        assert!(!tree.evaluate(&json!({"age": 17})));
    }

    #[test]
    fn test_predicate_fragment() {
        let tree = single("is blank", &ColumnConfig::new("note", ColumnType::Text));
        assert_eq!(tree.to_query_string(), "{note} is blank");
        assert!(tree.evaluate(&json!({"note": " "})));
    }

    #[test]
    fn test_permissive_value_with_spaces() {
        let tree = single("new york", &ColumnConfig::new("city", ColumnType::Text));
        assert_eq!(tree.to_query_string(), "{city} contains \"new york\"");
        assert!(tree.evaluate(&json!({"city": "new york city"})));
    }

    #[test]
    fn test_field_id_is_escaped() {
        let tree = single("1", &ColumnConfig::new("a{b}", ColumnType::Numeric));
        assert_eq!(tree.to_query_string(), r"{a\{b\}} = 1");
        assert!(tree.evaluate(&json!({"a{b}": 1})));
    }

    #[test]
    fn test_empty_fragment() {
        let tree = single("   ", &ColumnConfig::new("c", ColumnType::Any));
        assert!(tree.is_empty());
        assert!(!tree.is_valid());
    }

    #[test]
    fn test_unsupported_fragments() {
        let column = ColumnConfig::new("c", ColumnType::Any);
        let tree = single("=", &column);
        assert_eq!(
            tree.error(),
            Some(&QueryError::UnsupportedFragment {
                fragment: "=".to_string()
            })
        );
        assert!(!single("'a' 'b'", &column).is_valid());
        assert!(!single("{c} = 1", &column).is_valid());
    }
}
