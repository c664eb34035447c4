//! Lexeme definitions: what each token of a filter query can be.
//!
//! A [`Lexeme`] pairs a [`LexemeKind`] with the anchored pattern that
//! recognizes it. Everything else about a lexeme (its category, priority,
//! nesting delta, presentation) is derived from the kind, so tokens only need
//! to carry the kind to be evaluated later.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Token category, the unit of the lexicon adjacency tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// A field reference (`{name}`).
    Field,
    /// A string or bare literal.
    Literal,
    /// A relational operator (`=`, `contains`, ...).
    RelationalOperator,
    /// A postfix predicate (`is even`, ...).
    UnaryOperator,
    /// The prefix negation `!`.
    UnaryNot,
    /// `and` / `or`.
    LogicalOperator,
    /// `(`
    BlockOpen,
    /// `)`
    BlockClose,
}

impl Category {
    /// Returns true for categories that resolve to a value.
    pub fn is_expression(self) -> bool {
        matches!(self, Category::Field | Category::Literal)
    }

    /// Short name used in diagnostics output.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Field => "field",
            Category::Literal => "literal",
            Category::RelationalOperator => "relational",
            Category::UnaryOperator => "predicate",
            Category::UnaryNot => "not",
            Category::LogicalOperator => "logical",
            Category::BlockOpen => "open",
            Category::BlockClose => "close",
        }
    }
}

/// Subtype of an expression lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionKind {
    /// `{field}` reference into the record.
    Field,
    /// Quoted string literal.
    String,
    /// Bare literal, numeric when it parses as a number.
    Value,
}

/// Relational operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationalOperator {
    /// Substring test.
    Contains,
    /// Date prefix test.
    DateStartsWith,
    /// `=` / `eq`
    Equal,
    /// `!=` / `ne`
    NotEqual,
    /// `>=` / `ge`
    GreaterOrEqual,
    /// `>` / `gt`
    GreaterThan,
    /// `<=` / `le`
    LessOrEqual,
    /// `<` / `lt`
    LessThan,
}

impl RelationalOperator {
    /// Symbolic presentation.
    pub fn symbol(self) -> &'static str {
        match self {
            RelationalOperator::Contains => "contains",
            RelationalOperator::DateStartsWith => "datestartswith",
            RelationalOperator::Equal => "=",
            RelationalOperator::NotEqual => "!=",
            RelationalOperator::GreaterOrEqual => ">=",
            RelationalOperator::GreaterThan => ">",
            RelationalOperator::LessOrEqual => "<=",
            RelationalOperator::LessThan => "<",
        }
    }

    /// Word presentation, used when a case flag prefixes the operator.
    pub fn word(self) -> &'static str {
        match self {
            RelationalOperator::Contains => "contains",
            RelationalOperator::DateStartsWith => "datestartswith",
            RelationalOperator::Equal => "eq",
            RelationalOperator::NotEqual => "ne",
            RelationalOperator::GreaterOrEqual => "ge",
            RelationalOperator::GreaterThan => "gt",
            RelationalOperator::LessOrEqual => "le",
            RelationalOperator::LessThan => "lt",
        }
    }

    /// Returns the presentation of this operator with an optional case flag.
    ///
    /// ```
    /// use tabfilter_rs::filter::{CaseFlag, RelationalOperator};
    ///
    /// assert_eq!(RelationalOperator::Equal.present(None), "=");
    /// assert_eq!(RelationalOperator::Equal.present(Some(CaseFlag::Insensitive)), "ieq");
    /// ```
    pub fn present(self, flag: Option<CaseFlag>) -> String {
        match flag {
            Some(flag) => format!("{}{}", flag.prefix(), self.word()),
            None => self.symbol().to_string(),
        }
    }
}

/// Case-sensitivity flag carried as a one-letter operator prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseFlag {
    /// `i` prefix.
    Insensitive,
    /// `s` prefix.
    Sensitive,
}

impl CaseFlag {
    /// Reads the flag from the first character of an operator token.
    pub fn from_operator_text(text: &str) -> Option<Self> {
        match text.chars().next()? {
            'i' | 'I' => Some(CaseFlag::Insensitive),
            's' | 'S' => Some(CaseFlag::Sensitive),
            _ => None,
        }
    }

    /// The prefix letter.
    pub fn prefix(self) -> char {
        match self {
            CaseFlag::Insensitive => 'i',
            CaseFlag::Sensitive => 's',
        }
    }

    /// Unflagged operators compare case-sensitively.
    pub fn is_insensitive(flag: Option<CaseFlag>) -> bool {
        flag == Some(CaseFlag::Insensitive)
    }
}

/// Postfix predicates inspecting the runtime kind of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnaryOperator {
    /// `is blank`
    Blank,
    /// `is bool`
    Bool,
    /// `is even`
    Even,
    /// `is nil`
    Nil,
    /// `is num`
    Num,
    /// `is object`
    Object,
    /// `is odd`
    Odd,
    /// `is prime`
    Prime,
    /// `is str`
    Str,
}

impl UnaryOperator {
    /// Canonical presentation.
    pub fn present(self) -> &'static str {
        match self {
            UnaryOperator::Blank => "is blank",
            UnaryOperator::Bool => "is bool",
            UnaryOperator::Even => "is even",
            UnaryOperator::Nil => "is nil",
            UnaryOperator::Num => "is num",
            UnaryOperator::Object => "is object",
            UnaryOperator::Odd => "is odd",
            UnaryOperator::Prime => "is prime",
            UnaryOperator::Str => "is str",
        }
    }

    fn keyword(self) -> &'static str {
        &self.present()[3..]
    }
}

/// Logical combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    /// `and` / `&&`
    And,
    /// `or` / `||`
    Or,
}

impl LogicalOperator {
    /// Symbolic presentation.
    pub fn symbol(self) -> &'static str {
        match self {
            LogicalOperator::And => "&&",
            LogicalOperator::Or => "||",
        }
    }

    /// Word presentation.
    pub fn word(self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }
}

/// What a lexeme recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexemeKind {
    /// An operand.
    Expression(ExpressionKind),
    /// A binary comparison.
    Relational(RelationalOperator),
    /// A postfix predicate.
    Unary(UnaryOperator),
    /// Prefix negation.
    Not,
    /// A binary combinator.
    Logical(LogicalOperator),
    /// `(`
    BlockOpen,
    /// `)`
    BlockClose,
}

impl LexemeKind {
    /// Category used for adjacency checks.
    pub fn category(self) -> Category {
        match self {
            LexemeKind::Expression(ExpressionKind::Field) => Category::Field,
            LexemeKind::Expression(_) => Category::Literal,
            LexemeKind::Relational(_) => Category::RelationalOperator,
            LexemeKind::Unary(_) => Category::UnaryOperator,
            LexemeKind::Not => Category::UnaryNot,
            LexemeKind::Logical(_) => Category::LogicalOperator,
            LexemeKind::BlockOpen => Category::BlockOpen,
            LexemeKind::BlockClose => Category::BlockClose,
        }
    }

    /// Pivot priority. The loosest-binding operator has the highest number;
    /// leaves and `)` have none and never become pivots.
    pub fn priority(self) -> Option<u8> {
        match self {
            LexemeKind::Logical(LogicalOperator::Or) => Some(4),
            LexemeKind::Logical(LogicalOperator::And) => Some(3),
            LexemeKind::Not => Some(2),
            LexemeKind::BlockOpen => Some(1),
            LexemeKind::Relational(_) | LexemeKind::Unary(_) => Some(0),
            LexemeKind::Expression(_) | LexemeKind::BlockClose => None,
        }
    }

    /// Change of parenthesis depth after this token.
    pub fn nesting_delta(self) -> i32 {
        match self {
            LexemeKind::BlockOpen => 1,
            LexemeKind::BlockClose => -1,
            _ => 0,
        }
    }
}

/// A token definition: a kind and the pattern recognizing it.
#[derive(Debug, Clone)]
pub struct Lexeme {
    kind: LexemeKind,
    pattern: Regex,
}

impl Lexeme {
    /// Creates a lexeme from an anchored pattern.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regular expression. Patterns are
    /// compile-time constants of this crate.
    pub fn new(kind: LexemeKind, pattern: &str) -> Self {
        let pattern = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid pattern for {kind:?}: {e}"));
        Self { kind, pattern }
    }

    /// The kind of tokens this lexeme produces.
    pub fn kind(&self) -> LexemeKind {
        self.kind
    }

    /// Returns the length of the match at the start of `input`, if any.
    pub fn match_len(&self, input: &str) -> Option<usize> {
        self.pattern
            .find(input)
            .filter(|m| m.start() == 0 && m.end() > 0)
            .map(|m| m.end())
    }
}

// ==================== Patterns ====================

/// `{name}` with backslash escapes.
pub(crate) const FIELD_PATTERN: &str = r"^\{(?:[^{}\\]|\\.)+\}";

/// Single-, double- or back-quoted string with backslash escapes.
pub(crate) const STRING_PATTERN: &str =
    r#"^(?:'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"|`(?:[^`\\]|\\.)*`)"#;

/// Bare literal without whitespace, quotes, braces or parentheses.
pub(crate) const VALUE_PATTERN: &str =
    r#"^(?:[^\s'"`{}()\\!]|\\.)(?:[^\s'"`{}()\\]|\\.)*"#;

/// Bare literal that may contain inner whitespace, used in column filters.
pub(crate) const PERMISSIVE_VALUE_PATTERN: &str =
    r#"^(?:[^\s'"`{}()\\]|\\.)(?:(?:[^'"`{}()\\]|\\.)*(?:[^\s'"`{}()\\]|\\.))?"#;

/// Relational operators in tie-break order: two-character symbols first.
pub(crate) fn relational_lexemes() -> Vec<Lexeme> {
    [
        (RelationalOperator::Contains, r"^(?i)[is]?contains\b"),
        (RelationalOperator::DateStartsWith, r"^(?i)[is]?datestartswith\b"),
        (RelationalOperator::GreaterOrEqual, r"^(?i)[is]?(?:>=|ge\b)"),
        (RelationalOperator::GreaterThan, r"^(?i)[is]?(?:>|gt\b)"),
        (RelationalOperator::LessOrEqual, r"^(?i)[is]?(?:<=|le\b)"),
        (RelationalOperator::LessThan, r"^(?i)[is]?(?:<|lt\b)"),
        (RelationalOperator::NotEqual, r"^(?i)[is]?(?:!=|ne\b)"),
        (RelationalOperator::Equal, r"^(?i)[is]?(?:=|eq\b)"),
    ]
    .into_iter()
    .map(|(op, pattern)| Lexeme::new(LexemeKind::Relational(op), pattern))
    .collect()
}

/// `is <keyword>` predicates.
pub(crate) fn unary_lexemes() -> Vec<Lexeme> {
    [
        UnaryOperator::Blank,
        UnaryOperator::Bool,
        UnaryOperator::Even,
        UnaryOperator::Nil,
        UnaryOperator::Num,
        UnaryOperator::Object,
        UnaryOperator::Odd,
        UnaryOperator::Prime,
        UnaryOperator::Str,
    ]
    .into_iter()
    .map(|op| {
        let pattern = format!(r"^(?i)is\s+{}\b", op.keyword());
        Lexeme::new(LexemeKind::Unary(op), &pattern)
    })
    .collect()
}

/// The lexeme for one logical combinator.
pub(crate) fn logical_lexeme(op: LogicalOperator) -> Lexeme {
    let pattern = match op {
        LogicalOperator::And => r"^(?i)(?:&&|and\b)",
        LogicalOperator::Or => r"^(?i)(?:\|\||or\b)",
    };
    Lexeme::new(LexemeKind::Logical(op), pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priorities_order_loosest_highest() {
        let or = LexemeKind::Logical(LogicalOperator::Or).priority();
        let and = LexemeKind::Logical(LogicalOperator::And).priority();
        let not = LexemeKind::Not.priority();
        let open = LexemeKind::BlockOpen.priority();
        let rel = LexemeKind::Relational(RelationalOperator::Equal).priority();
        assert!(or > and && and > not && not > open && open > rel);
        assert_eq!(LexemeKind::Expression(ExpressionKind::Field).priority(), None);
        assert_eq!(LexemeKind::BlockClose.priority(), None);
    }

    #[test]
    fn test_relational_patterns_respect_word_boundaries() {
        let lexemes = relational_lexemes();
        let find = |input: &str| {
            lexemes
                .iter()
                .find_map(|l| l.match_len(input).map(|len| (l.kind(), len)))
        };

        assert_eq!(
            find(">= 5"),
            Some((LexemeKind::Relational(RelationalOperator::GreaterOrEqual), 2))
        );
        assert_eq!(
            find("icontains x"),
            Some((LexemeKind::Relational(RelationalOperator::Contains), 9))
        );
        assert_eq!(
            find("EQ 5"),
            Some((LexemeKind::Relational(RelationalOperator::Equal), 2))
        );
        assert_eq!(find("eq5"), None);
        assert_eq!(find("containsx"), None);
    }

    #[test]
    fn test_unary_patterns() {
        let lexemes = unary_lexemes();
        let even = lexemes
            .iter()
            .find(|l| l.kind() == LexemeKind::Unary(UnaryOperator::Even))
            .unwrap();
        assert_eq!(even.match_len("is even"), Some(7));
        assert_eq!(even.match_len("IS   EVEN && x"), Some(9));
        assert_eq!(even.match_len("is evening"), None);
    }

    #[test]
    fn test_case_flag_from_operator_text() {
        assert_eq!(
            CaseFlag::from_operator_text("icontains"),
            Some(CaseFlag::Insensitive)
        );
        assert_eq!(CaseFlag::from_operator_text("s="), Some(CaseFlag::Sensitive));
        assert_eq!(CaseFlag::from_operator_text("contains"), None);
        assert_eq!(CaseFlag::from_operator_text("="), None);
        assert!(CaseFlag::is_insensitive(Some(CaseFlag::Insensitive)));
        assert!(!CaseFlag::is_insensitive(None));
    }

    #[test]
    fn test_value_pattern_stops_at_delimiters() {
        let value = Lexeme::new(
            LexemeKind::Expression(ExpressionKind::Value),
            VALUE_PATTERN,
        );
        assert_eq!(value.match_len("42)"), Some(2));
        assert_eq!(value.match_len("a\\ b rest"), Some(4));
        assert_eq!(value.match_len("!x"), None);

        let permissive = Lexeme::new(
            LexemeKind::Expression(ExpressionKind::Value),
            PERMISSIVE_VALUE_PATTERN,
        );
        assert_eq!(permissive.match_len("hello world  "), Some(11));
        assert_eq!(permissive.match_len("x"), Some(1));
    }
}
