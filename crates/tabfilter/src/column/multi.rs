//! Compound multi-column filters.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;
use tracing::debug;

use super::{find_column, ColumnConfig, SingleColumnTree};
use crate::filter::{
    BinaryOp, CaseFlag, ColumnNotFound, Lexicon, LogicalOperator, Node, QueryError, QueryResult,
    RelationalOperator, SyntaxTree, UnaryOp,
};

/// A compound filter over several columns, such as
/// `{age} >= 18 && {name} icontains ann`.
///
/// Every statement filters one column and each column appears at most once,
/// so the query can be split into one fragment per column with
/// [`to_single_column_map`](Self::to_single_column_map) and rebuilt with
/// [`to_query_string`].
#[derive(Debug, Clone)]
pub struct MultiColumnTree {
    operator: LogicalOperator,
    tree: SyntaxTree,
}

impl MultiColumnTree {
    /// Parses `query` with a multi-column lexicon built for `operator`.
    pub fn new(query: &str, operator: LogicalOperator, lexicon: &Lexicon) -> Self {
        let tree = SyntaxTree::new(query, lexicon);
        let tree = match check_statements(&tree) {
            Some(err) => {
                debug!(query, error = %err, "multi-column query rejected");
                SyntaxTree::with_error(query, tree.tokens().to_vec(), err)
            }
            None => tree,
        };
        Self { operator, tree }
    }

    /// The combinator joining the statements.
    pub fn operator(&self) -> LogicalOperator {
        self.operator
    }

    /// The parsed query.
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Returns true if the query parsed and filters no column twice.
    pub fn is_valid(&self) -> bool {
        self.tree.is_valid()
    }

    /// Returns true if the query is blank.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Why the query is invalid, if it is.
    pub fn error(&self) -> Option<&QueryError> {
        self.tree.error()
    }

    /// Returns true if `record` satisfies the query.
    ///
    /// # Panics
    ///
    /// Panics if the query is invalid.
    pub fn evaluate(&self, record: &Value) -> bool {
        self.tree.evaluate(record)
    }

    /// Like [`evaluate`](Self::evaluate), returning the error of an invalid
    /// query instead of panicking.
    pub fn try_evaluate(&self, record: &Value) -> QueryResult<bool> {
        self.tree.try_evaluate(record)
    }

    /// The per-column statements of a valid query.
    pub fn statements(&self) -> Vec<&Node> {
        self.tree.statements()
    }

    /// Canonical text of the query; empty when invalid.
    pub fn to_query_string(&self) -> String {
        self.tree.to_query_string()
    }

    /// Splits the query into one single-column tree per filtered column.
    ///
    /// Each statement becomes the fragment a user would type in that
    /// column's filter box: the operator and the right operand, or the bare
    /// predicate. An `=` that the column would inject anyway is left out.
    /// An invalid query yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`ColumnNotFound`] if a statement filters a field that is not
    /// among `columns`.
    ///
    /// # Example
    ///
    /// ```
    /// use tabfilter_rs::column::{ColumnConfig, ColumnType, MultiColumnTree};
    /// use tabfilter_rs::filter::{Lexicon, LogicalOperator};
    ///
    /// let op = LogicalOperator::And;
    /// let multi = MultiColumnTree::new("{age} >= 18 && {city} = Paris", op, &Lexicon::multi_column(op));
    /// let columns = [
    ///     ColumnConfig::new("age", ColumnType::Numeric),
    ///     ColumnConfig::new("city", ColumnType::Text),
    /// ];
    /// let map = multi.to_single_column_map(&columns, &Lexicon::column()).unwrap();
    /// assert_eq!(map["age"].fragment(), ">= 18");
    /// assert_eq!(map["city"].fragment(), "= Paris");
    /// ```
    pub fn to_single_column_map(
        &self,
        columns: &[ColumnConfig],
        lexicon: &Lexicon,
    ) -> Result<BTreeMap<String, SingleColumnTree>, ColumnNotFound> {
        let mut map = BTreeMap::new();
        for statement in self.tree.statements() {
            let Some(field) = statement_field(statement) else {
                continue;
            };
            let column = find_column(columns, field)?;
            let fragment = fragment_for(statement, column, lexicon);
            map.insert(
                column.id.clone(),
                SingleColumnTree::new(&fragment, column, lexicon),
            );
        }
        Ok(map)
    }
}

/// Joins the valid, non-empty single-column trees into one compound query.
///
/// ```
/// use tabfilter_rs::column::{to_query_string, ColumnConfig, ColumnType, SingleColumnTree};
/// use tabfilter_rs::filter::{Lexicon, LogicalOperator};
///
/// let lexicon = Lexicon::column();
/// let age = SingleColumnTree::new("> 30", &ColumnConfig::new("age", ColumnType::Numeric), &lexicon);
/// let name = SingleColumnTree::new("", &ColumnConfig::new("name", ColumnType::Text), &lexicon);
/// let city = SingleColumnTree::new("par", &ColumnConfig::new("city", ColumnType::Text), &lexicon);
///
/// assert_eq!(
///     to_query_string([&age, &name, &city], LogicalOperator::And),
///     "{age} > 30 && {city} contains par"
/// );
/// ```
pub fn to_query_string<'a>(
    trees: impl IntoIterator<Item = &'a SingleColumnTree>,
    operator: LogicalOperator,
) -> String {
    let separator = format!(" {} ", operator.symbol());
    trees
        .into_iter()
        .filter(|tree| tree.is_valid())
        .map(SingleColumnTree::to_query_string)
        .collect::<Vec<_>>()
        .join(&separator)
}

/// The column filtered by a statement.
fn statement_field(statement: &Node) -> Option<&str> {
    match statement {
        Node::Binary {
            op: BinaryOp::Relational(..),
            left,
            ..
        } => left.field_name(),
        Node::Unary {
            op: UnaryOp::Predicate(_),
            operand,
            ..
        } => operand.field_name(),
        _ => None,
    }
}

/// Every statement must filter a column, and no column twice.
fn check_statements(tree: &SyntaxTree) -> Option<QueryError> {
    let mut seen = HashSet::new();
    for statement in tree.statements() {
        let Some(field) = statement_field(statement) else {
            return Some(QueryError::UnsupportedFragment {
                fragment: statement.token().text().to_string(),
            });
        };
        if !seen.insert(field) {
            return Some(QueryError::DuplicateColumn {
                column: field.to_string(),
            });
        }
    }
    None
}

/// Rebuilds the fragment a statement came from.
fn fragment_for(statement: &Node, column: &ColumnConfig, lexicon: &Lexicon) -> String {
    let operator = statement.token();
    let Node::Binary {
        op: BinaryOp::Relational(op, flag),
        right,
        ..
    } = statement
    else {
        return operator.present();
    };

    let operand = right.token().text();
    if is_redundant_equal(*op, *flag, column) && relexes_as_operand(operand, lexicon) {
        return operand.to_string();
    }
    format!("{} {}", operator.present(), operand)
}

/// `=` can be left out when the column would inject the same comparison.
fn is_redundant_equal(
    op: RelationalOperator,
    flag: Option<CaseFlag>,
    column: &ColumnConfig,
) -> bool {
    op == RelationalOperator::Equal
        && column.column_type.default_operator() == RelationalOperator::Equal
        && CaseFlag::is_insensitive(flag) == CaseFlag::is_insensitive(column.default_flag())
}

/// Returns true if `operand` alone reads back as a single operand.
fn relexes_as_operand(operand: &str, lexicon: &Lexicon) -> bool {
    matches!(lexicon.tokenize(operand).as_deref(), Ok([token]) if token.is_expression())
}
