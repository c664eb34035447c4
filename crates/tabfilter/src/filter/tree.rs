//! Parsed queries.

use serde_json::Value;

use super::ast::{Node, TreeStructure};
use super::error::{QueryError, QueryResult};
use super::lexer::Token;
use super::lexicon::Lexicon;
use super::syntaxer::parse;

/// A query together with its tokens and either its syntax tree or the
/// reason it is invalid.
///
/// Building a tree never fails: invalid input yields a tree whose
/// [`is_valid`](Self::is_valid) is false, which is what an editor needs while
/// the user is still typing.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tabfilter_rs::filter::{Lexicon, SyntaxTree};
///
/// let tree = SyntaxTree::new("{age} >= 18 && {name} icontains 'ann'", &Lexicon::query());
/// assert!(tree.is_valid());
/// assert!(tree.evaluate(&json!({"age": 30, "name": "Joanne"})));
/// assert!(!tree.evaluate(&json!({"age": 12, "name": "Anna"})));
/// ```
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    query: String,
    tokens: Vec<Token>,
    root: QueryResult<Node>,
}

impl SyntaxTree {
    /// Tokenizes and parses `query` with `lexicon`.
    pub fn new(query: &str, lexicon: &Lexicon) -> Self {
        match lexicon.tokenize(query) {
            Ok(tokens) => Self::from_lexed(query, tokens),
            Err(err) => Self::with_error(query, Vec::new(), err),
        }
    }

    /// Parses an already tokenized query.
    pub fn from_lexed(query: impl Into<String>, tokens: Vec<Token>) -> Self {
        let root = parse(&tokens);
        Self {
            query: query.into(),
            tokens,
            root,
        }
    }

    pub(crate) fn with_error(query: impl Into<String>, tokens: Vec<Token>, err: QueryError) -> Self {
        Self {
            query: query.into(),
            tokens,
            root: Err(err),
        }
    }

    /// The source text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns true if the query parsed into a tree.
    pub fn is_valid(&self) -> bool {
        self.root.is_ok()
    }

    /// Returns true if the query holds no tokens at all.
    pub fn is_empty(&self) -> bool {
        matches!(self.root, Err(QueryError::EmptyExpression))
    }

    /// Why the query is invalid, if it is.
    pub fn error(&self) -> Option<&QueryError> {
        self.root.as_ref().err()
    }

    /// The root node of a valid tree.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref().ok()
    }

    /// The tokens of the query. Empty when lexing failed.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns true if `record` satisfies the query.
    ///
    /// # Panics
    ///
    /// Panics if the tree is invalid. Check [`is_valid`](Self::is_valid)
    /// first or use [`try_evaluate`](Self::try_evaluate).
    pub fn evaluate(&self, record: &Value) -> bool {
        match &self.root {
            Ok(root) => root.evaluate(record),
            Err(err) => panic!("cannot evaluate invalid query '{}': {err}", self.query),
        }
    }

    /// Like [`evaluate`](Self::evaluate), returning the parse error of an
    /// invalid tree instead of panicking.
    pub fn try_evaluate(&self, record: &Value) -> QueryResult<bool> {
        match &self.root {
            Ok(root) => Ok(root.evaluate(record)),
            Err(err) => Err(err.clone()),
        }
    }

    /// Returns the records satisfying the query, in order.
    pub fn filter<'a>(&self, records: &'a [Value]) -> QueryResult<Vec<&'a Value>> {
        let root = self.root.as_ref().map_err(Clone::clone)?;
        Ok(records
            .iter()
            .filter(|record| root.evaluate(record))
            .collect())
    }

    /// The statements of the query: the operands of its logical
    /// combinations, with groupings removed. Empty when invalid.
    pub fn statements(&self) -> Vec<&Node> {
        self.root().map(Node::statements).unwrap_or_default()
    }

    /// Canonical text of the query; empty when invalid.
    pub fn to_query_string(&self) -> String {
        if !self.is_valid() {
            return String::new();
        }
        self.tokens
            .iter()
            .map(Token::present)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// A serializable description of the tree, if valid.
    pub fn to_structure(&self) -> Option<TreeStructure> {
        self.root().map(Node::to_structure)
    }
}
