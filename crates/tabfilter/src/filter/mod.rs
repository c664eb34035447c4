//! Filter query lexer, syntaxer and evaluator.
//!
//! Queries filter JSON records by their fields:
//!
//! ```text
//! {age} >= 18 && ({name} icontains 'ann' || {tags} is nil)
//! ```
//!
//! # Supported Syntax
//!
//! ## Operands
//! - `{field}` - a record field (`\{`, `\}` and `\\` escape)
//! - `'text'`, `"text"`, `` `text` `` - string literals
//! - `42`, `abc` - bare values, numeric when they parse as a number
//!
//! ## Relational Operators
//! - `=`/`eq`, `!=`/`ne`, `>`/`gt`, `>=`/`ge`, `<`/`lt`, `<=`/`le`
//! - `contains` - substring test
//! - `datestartswith` - date prefix test (`{d} datestartswith 2020-01`)
//!
//! Prefix an operator with `i` for a case-insensitive comparison or `s` for a
//! case-sensitive one (`icontains`, `ieq`). Unprefixed operators are
//! case-sensitive.
//!
//! ## Predicates
//! - `is nil`, `is blank`, `is bool`, `is num`, `is str`, `is object`
//! - `is even`, `is odd`, `is prime`
//!
//! ## Boolean Operators
//! - `and` / `&&`
//! - `or` / `||`
//! - `!` - NOT
//! - `()` - Grouping
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tabfilter_rs::filter::{Lexicon, SyntaxTree};
//!
//! let lexicon = Lexicon::query();
//! let tree = SyntaxTree::new("{x} = 5", &lexicon);
//!
//! // "5" and 5 compare numerically
//! assert!(tree.evaluate(&json!({"x": "5"})));
//!
//! // Records can be filtered in bulk
//! let records = vec![json!({"x": 5}), json!({"x": 6})];
//! assert_eq!(tree.filter(&records).unwrap().len(), 1);
//! ```

mod ast;
mod date;
mod error;
mod evaluator;
mod lexeme;
mod lexer;
mod lexicon;
mod syntaxer;
mod tree;

pub use ast::{BinaryOp, Node, Operand, TreeStructure, UnaryOp};
pub use date::{normalize_date, normalize_date_str};
pub use error::{ColumnNotFound, QueryError, QueryResult};
pub use evaluator::{compare, is_truthy, test_predicate};
pub use lexeme::{
    CaseFlag, Category, ExpressionKind, Lexeme, LexemeKind, LogicalOperator, RelationalOperator,
    UnaryOperator,
};
pub use lexer::{tokenize, Token};
pub use lexicon::Lexicon;
pub use syntaxer::parse;
pub use tree::SyntaxTree;

pub(crate) use lexer::escape_field;
