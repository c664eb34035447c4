//! Lexicons: ordered lexeme catalogues with adjacency rules.
//!
//! A lexicon decides which lexemes may follow which, which is all the
//! context the tokenizer needs. Three variants exist:
//!
//! - [`Lexicon::query`] - the full compound query language
//! - [`Lexicon::column`] - fragments typed into a single column's filter box
//! - [`Lexicon::multi_column`] - compound filters that decompose into columns

use std::collections::{HashMap, HashSet};

use super::error::QueryResult;
use super::lexeme::{
    logical_lexeme, relational_lexemes, unary_lexemes, Category, ExpressionKind, Lexeme,
    LexemeKind, LogicalOperator, FIELD_PATTERN, PERMISSIVE_VALUE_PATTERN, STRING_PATTERN,
    VALUE_PATTERN,
};
use super::lexer::{self, Token};

/// An ordered catalogue of lexemes plus the table of allowed successions.
#[derive(Debug, Clone)]
pub struct Lexicon {
    name: &'static str,
    lexemes: Vec<Lexeme>,
    start: HashSet<Category>,
    allowed_next: HashMap<Category, HashSet<Category>>,
}

impl Lexicon {
    /// The full query language: operands, relational and unary operators,
    /// `!`, `and`/`or` and parentheses.
    pub fn query() -> Self {
        let mut lexemes = vec![
            Lexeme::new(LexemeKind::Not, r"^!"),
            Lexeme::new(LexemeKind::BlockOpen, r"^\("),
            Lexeme::new(LexemeKind::BlockClose, r"^\)"),
            logical_lexeme(LogicalOperator::And),
            logical_lexeme(LogicalOperator::Or),
        ];
        lexemes.extend(relational_lexemes());
        lexemes.extend(unary_lexemes());
        lexemes.extend(operand_lexemes(true, VALUE_PATTERN));

        let operand_start = [
            Category::Field,
            Category::Literal,
            Category::UnaryNot,
            Category::BlockOpen,
        ];
        let after_operand = [
            Category::RelationalOperator,
            Category::UnaryOperator,
            Category::LogicalOperator,
            Category::BlockClose,
        ];
        Self::new("query", lexemes, &operand_start)
            .allow(Category::Field, &after_operand)
            .allow(Category::Literal, &after_operand)
            .allow(
                Category::RelationalOperator,
                &[Category::Field, Category::Literal],
            )
            .allow(
                Category::UnaryOperator,
                &[Category::LogicalOperator, Category::BlockClose],
            )
            .allow(Category::UnaryNot, &operand_start)
            .allow(Category::LogicalOperator, &operand_start)
            // `()` is left for the syntaxer to reject
            .allow(Category::BlockOpen, &operand_start)
            .allow(Category::BlockOpen, &[Category::BlockClose])
            .allow(
                Category::BlockClose,
                &[Category::LogicalOperator, Category::BlockClose],
            )
    }

    /// Single-column fragments: `value`, `op value` or `is predicate`.
    ///
    /// Bare values may contain inner whitespace. Field references, logical
    /// operators and parentheses are not part of this lexicon.
    pub fn column() -> Self {
        let mut lexemes = relational_lexemes();
        lexemes.extend(unary_lexemes());
        lexemes.extend(operand_lexemes(false, PERMISSIVE_VALUE_PATTERN));

        let start = [
            Category::Literal,
            Category::RelationalOperator,
            Category::UnaryOperator,
        ];
        Self::new("column", lexemes, &start)
            .allow(Category::RelationalOperator, &[Category::Literal])
    }

    /// Compound filters of `{field} op value` statements joined by a single,
    /// fixed combinator.
    pub fn multi_column(operator: LogicalOperator) -> Self {
        let mut lexemes = vec![logical_lexeme(operator)];
        lexemes.extend(relational_lexemes());
        lexemes.extend(unary_lexemes());
        lexemes.extend(operand_lexemes(true, VALUE_PATTERN));

        let name = match operator {
            LogicalOperator::And => "multi-column (and)",
            LogicalOperator::Or => "multi-column (or)",
        };

        Self::new(name, lexemes, &[Category::Field])
            .allow(
                Category::Field,
                &[Category::RelationalOperator, Category::UnaryOperator],
            )
            .allow(Category::RelationalOperator, &[Category::Literal])
            .allow(Category::Literal, &[Category::LogicalOperator])
            .allow(Category::UnaryOperator, &[Category::LogicalOperator])
            .allow(Category::LogicalOperator, &[Category::Field])
    }

    fn new(name: &'static str, lexemes: Vec<Lexeme>, start: &[Category]) -> Self {
        Self {
            name,
            lexemes,
            start: start.iter().copied().collect(),
            allowed_next: HashMap::new(),
        }
    }

    fn allow(mut self, previous: Category, next: &[Category]) -> Self {
        self.allowed_next
            .entry(previous)
            .or_default()
            .extend(next.iter().copied());
        self
    }

    /// Name of the lexicon, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All lexemes in tie-break order.
    pub fn lexemes(&self) -> &[Lexeme] {
        &self.lexemes
    }

    /// Returns true if a token of category `next` may follow `previous`
    /// (`None` meaning the start of the input).
    pub fn allows(&self, previous: Option<Category>, next: Category) -> bool {
        match previous {
            None => self.start.contains(&next),
            Some(previous) => self
                .allowed_next
                .get(&previous)
                .is_some_and(|set| set.contains(&next)),
        }
    }

    /// Lexemes that may follow a token of category `previous`, in order.
    pub fn match_candidates(
        &self,
        previous: Option<Category>,
    ) -> impl Iterator<Item = &Lexeme> + '_ {
        self.lexemes
            .iter()
            .filter(move |lexeme| self.allows(previous, lexeme.kind().category()))
    }

    /// Tokenizes `input` with this lexicon.
    pub fn tokenize(&self, input: &str) -> QueryResult<Vec<Token>> {
        lexer::tokenize(input, self)
    }
}

/// Operand lexemes, optionally including field references.
fn operand_lexemes(with_fields: bool, value_pattern: &str) -> Vec<Lexeme> {
    let mut lexemes = Vec::with_capacity(3);
    if with_fields {
        lexemes.push(Lexeme::new(
            LexemeKind::Expression(ExpressionKind::Field),
            FIELD_PATTERN,
        ));
    }
    lexemes.push(Lexeme::new(
        LexemeKind::Expression(ExpressionKind::String),
        STRING_PATTERN,
    ));
    lexemes.push(Lexeme::new(
        LexemeKind::Expression(ExpressionKind::Value),
        value_pattern,
    ));
    lexemes
}
