//! Filter query engine for tabular data.
//!
//! This crate parses and evaluates small filter queries over JSON records,
//! such as `{age} >= 18 && {name} icontains 'ann'`, and keeps a compound
//! multi-column query in sync with the per-column fragments shown in a
//! table's column headers.
//!
//! - [`filter`] - lexicons, tokenizer, syntaxer and evaluator
//! - [`column`] - single-column fragments and multi-column decomposition
//! - [`cache`] - scoped memoization of parsed trees
//! - [`QueryEngine`] - the facade tying them together
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tabfilter_rs::column::{to_query_string, ColumnConfig, ColumnType};
//! use tabfilter_rs::filter::LogicalOperator;
//! use tabfilter_rs::QueryEngine;
//!
//! let engine = QueryEngine::new();
//! let columns = vec![
//!     ColumnConfig::new("age", ColumnType::Numeric),
//!     ColumnConfig::new("city", ColumnType::Text),
//! ];
//!
//! // Split a compound query into column fragments...
//! let multi = engine.compile_multi("{age} > 30 && {city} contains par", LogicalOperator::And);
//! let map = engine.to_single_column_map(&multi, &columns).unwrap();
//! assert_eq!(map["age"].fragment(), "> 30");
//!
//! // ...and join them back.
//! let query = to_query_string(map.values(), LogicalOperator::And);
//! assert_eq!(query, "{age} > 30 && {city} contains par");
//!
//! let tree = engine.compile(&query);
//! assert!(!tree.evaluate(&json!({"age": 41, "city": "Paris"})));
//! assert!(tree.evaluate(&json!({"age": 41, "city": "paris"})));
//! ```

pub mod cache;
pub mod column;
mod engine;
pub mod filter;

pub use cache::{CacheStats, ScopeId, TreeCache};
pub use column::{ColumnConfig, MultiColumnTree, SingleColumnTree};
pub use engine::{QueryEngine, Scope};
pub use filter::{ColumnNotFound, QueryError, QueryResult, SyntaxTree};
