//! The [`QueryEngine`] facade.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::trace;

use crate::cache::{CacheStats, ScopeId, TreeCache};
use crate::column::{ColumnConfig, MultiColumnTree, SingleColumnTree};
use crate::filter::{ColumnNotFound, Lexicon, LogicalOperator, SyntaxTree};

/// Owns the lexicons and tree caches and hands out shared, parsed trees.
///
/// Compiling the same text twice in the same scope returns the same `Arc`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tabfilter_rs::QueryEngine;
///
/// let engine = QueryEngine::new();
/// let tree = engine.compile("{x} = 5");
/// assert!(tree.evaluate(&json!({"x": "5"})));
///
/// let again = engine.compile("{x} = 5");
/// assert!(std::sync::Arc::ptr_eq(&tree, &again));
/// ```
#[derive(Debug)]
pub struct QueryEngine {
    query_lexicon: Arc<Lexicon>,
    column_lexicon: Arc<Lexicon>,
    multi_and_lexicon: Arc<Lexicon>,
    multi_or_lexicon: Arc<Lexicon>,
    queries: TreeCache<String, SyntaxTree>,
    columns: TreeCache<(String, ColumnConfig), SingleColumnTree>,
    multi: TreeCache<(String, LogicalOperator), MultiColumnTree>,
}

impl QueryEngine {
    /// Creates an engine with the standard lexicons and empty caches.
    pub fn new() -> Self {
        Self {
            query_lexicon: Arc::new(Lexicon::query()),
            column_lexicon: Arc::new(Lexicon::column()),
            multi_and_lexicon: Arc::new(Lexicon::multi_column(LogicalOperator::And)),
            multi_or_lexicon: Arc::new(Lexicon::multi_column(LogicalOperator::Or)),
            queries: TreeCache::new(),
            columns: TreeCache::new(),
            multi: TreeCache::new(),
        }
    }

    /// The lexicon for compound queries.
    pub fn query_lexicon(&self) -> &Arc<Lexicon> {
        &self.query_lexicon
    }

    /// The lexicon for single-column fragments.
    pub fn column_lexicon(&self) -> &Arc<Lexicon> {
        &self.column_lexicon
    }

    /// The multi-column lexicon for `operator`.
    pub fn multi_lexicon(&self, operator: LogicalOperator) -> &Arc<Lexicon> {
        match operator {
            LogicalOperator::And => &self.multi_and_lexicon,
            LogicalOperator::Or => &self.multi_or_lexicon,
        }
    }

    /// Parses a compound query in the global scope.
    pub fn compile(&self, query: &str) -> Arc<SyntaxTree> {
        self.compile_in(&ScopeId::global(), query)
    }

    /// Completes a single-column fragment in the global scope.
    pub fn compile_column(&self, fragment: &str, column: &ColumnConfig) -> Arc<SingleColumnTree> {
        self.compile_column_in(&ScopeId::global(), fragment, column)
    }

    /// Parses a multi-column query in the global scope.
    pub fn compile_multi(&self, query: &str, operator: LogicalOperator) -> Arc<MultiColumnTree> {
        self.compile_multi_in(&ScopeId::global(), query, operator)
    }

    /// Splits a multi-column query into per-column trees.
    ///
    /// # Errors
    ///
    /// Returns [`ColumnNotFound`] if the query filters a field that is not
    /// among `columns`.
    pub fn to_single_column_map(
        &self,
        tree: &MultiColumnTree,
        columns: &[ColumnConfig],
    ) -> Result<BTreeMap<String, SingleColumnTree>, ColumnNotFound> {
        tree.to_single_column_map(columns, &self.column_lexicon)
    }

    /// A handle compiling into the named scope.
    pub fn scope(&self, name: impl Into<String>) -> Scope<'_> {
        Scope {
            engine: self,
            id: ScopeId::new(name),
        }
    }

    /// Drops every cached tree of `scope`.
    pub fn teardown(&self, scope: &ScopeId) -> usize {
        let removed = self.queries.evict_scope(scope)
            + self.columns.evict_scope(scope)
            + self.multi.evict_scope(scope);
        trace!(scope = %scope, removed, "scope torn down");
        removed
    }

    /// Combined counters of all caches.
    pub fn cache_stats(&self) -> CacheStats {
        self.queries
            .stats()
            .merge(self.columns.stats())
            .merge(self.multi.stats())
    }

    fn compile_in(&self, scope: &ScopeId, query: &str) -> Arc<SyntaxTree> {
        self.queries.get_or_build(scope, query.to_string(), || {
            SyntaxTree::new(query, &self.query_lexicon)
        })
    }

    fn compile_column_in(
        &self,
        scope: &ScopeId,
        fragment: &str,
        column: &ColumnConfig,
    ) -> Arc<SingleColumnTree> {
        let key = (fragment.to_string(), column.clone());
        self.columns.get_or_build(scope, key, || {
            SingleColumnTree::new(fragment, column, &self.column_lexicon)
        })
    }

    fn compile_multi_in(
        &self,
        scope: &ScopeId,
        query: &str,
        operator: LogicalOperator,
    ) -> Arc<MultiColumnTree> {
        let key = (query.to_string(), operator);
        self.multi.get_or_build(scope, key, || {
            MultiColumnTree::new(query, operator, self.multi_lexicon(operator))
        })
    }
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`QueryEngine`] handle whose trees belong to one scope, such as a
/// single table view.
#[derive(Debug, Clone)]
pub struct Scope<'e> {
    engine: &'e QueryEngine,
    id: ScopeId,
}

impl Scope<'_> {
    /// The scope id.
    pub fn id(&self) -> &ScopeId {
        &self.id
    }

    /// Parses a compound query in this scope.
    pub fn compile(&self, query: &str) -> Arc<SyntaxTree> {
        self.engine.compile_in(&self.id, query)
    }

    /// Completes a single-column fragment in this scope.
    pub fn compile_column(&self, fragment: &str, column: &ColumnConfig) -> Arc<SingleColumnTree> {
        self.engine.compile_column_in(&self.id, fragment, column)
    }

    /// Parses a multi-column query in this scope.
    pub fn compile_multi(&self, query: &str, operator: LogicalOperator) -> Arc<MultiColumnTree> {
        self.engine.compile_multi_in(&self.id, query, operator)
    }

    /// See [`QueryEngine::to_single_column_map`].
    pub fn to_single_column_map(
        &self,
        tree: &MultiColumnTree,
        columns: &[ColumnConfig],
    ) -> Result<BTreeMap<String, SingleColumnTree>, ColumnNotFound> {
        self.engine.to_single_column_map(tree, columns)
    }

    /// Drops every tree cached for this scope.
    pub fn teardown(self) -> usize {
        self.engine.teardown(&self.id)
    }
}
