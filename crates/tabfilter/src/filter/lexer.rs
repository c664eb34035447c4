//! Lexer (tokenizer) for filter queries.
//!
//! Tokenizing is driven entirely by a [`Lexicon`]: at every step only the
//! lexemes allowed after the previous token are tried, and the first one
//! matching at the start of the remaining input wins.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Number, Value};
use tracing::debug;

use super::error::{QueryError, QueryResult};
use super::lexeme::{CaseFlag, Category, ExpressionKind, LexemeKind, VALUE_PATTERN};
use super::lexicon::Lexicon;

/// A whole bare value as the query and multi-column lexicons read it.
static QUERY_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{VALUE_PATTERN}$"))
        .unwrap_or_else(|e| panic!("invalid value pattern: {e}"))
});

/// A token of a filter query: the lexeme kind and the verbatim source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    kind: LexemeKind,
    text: String,
}

impl Token {
    /// Creates a token.
    pub fn new(kind: LexemeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// The lexeme kind.
    pub fn kind(&self) -> LexemeKind {
        self.kind
    }

    /// The matched source text, exactly as written.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The adjacency category.
    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Returns true if this token is an operand.
    pub fn is_expression(&self) -> bool {
        self.category().is_expression()
    }

    /// The case flag prefix of a relational operator, if any.
    pub fn case_flag(&self) -> Option<CaseFlag> {
        match self.kind {
            LexemeKind::Relational(_) => CaseFlag::from_operator_text(&self.text),
            _ => None,
        }
    }

    /// The unescaped field name of a `{field}` token.
    pub fn field_name(&self) -> Option<String> {
        match self.kind {
            LexemeKind::Expression(ExpressionKind::Field) => {
                let inner = &self.text[1..self.text.len() - 1];
                Some(unescape(inner))
            }
            _ => None,
        }
    }

    /// The value of a string or bare literal token.
    ///
    /// Bare literals that parse as a finite number become JSON numbers,
    /// everything else is a string with backslash escapes removed.
    pub fn literal(&self) -> Option<Value> {
        match self.kind {
            LexemeKind::Expression(ExpressionKind::String) => {
                let inner = &self.text[1..self.text.len() - 1];
                Some(Value::String(unescape(inner)))
            }
            LexemeKind::Expression(ExpressionKind::Value) => Some(
                parse_number(&self.text).unwrap_or_else(|| Value::String(unescape(&self.text))),
            ),
            _ => None,
        }
    }

    /// Canonical presentation of the token.
    ///
    /// Operators use their symbolic form (word form when case-flagged),
    /// predicates are normalized to `is <keyword>`, and bare values that the
    /// query lexicon would not read back as one operand (inner whitespace, a
    /// leading `!`) are quoted.
    pub fn present(&self) -> String {
        match self.kind {
            LexemeKind::Relational(op) => op.present(self.case_flag()),
            LexemeKind::Unary(op) => op.present().to_string(),
            LexemeKind::Logical(op) => op.symbol().to_string(),
            LexemeKind::Not => "!".to_string(),
            LexemeKind::BlockOpen => "(".to_string(),
            LexemeKind::BlockClose => ")".to_string(),
            LexemeKind::Expression(ExpressionKind::Value)
                if !QUERY_VALUE.is_match(&self.text) =>
            {
                quote(&unescape(&self.text))
            }
            LexemeKind::Expression(_) => self.text.clone(),
        }
    }
}

/// Splits `input` into tokens using `lexicon`.
///
/// # Errors
///
/// Returns [`QueryError::Lex`] with the untouched remainder of the input when
/// no allowed lexeme matches at some position.
///
/// # Example
///
/// ```
/// use tabfilter_rs::filter::{tokenize, Lexicon};
///
/// let tokens = tokenize("{age} >= 18", &Lexicon::query()).unwrap();
/// assert_eq!(tokens.len(), 3);
///
/// let err = tokenize("{x} ~~ 1", &Lexicon::query()).unwrap_err();
/// assert_eq!(err.context(), Some("~~ 1"));
/// ```
pub fn tokenize(input: &str, lexicon: &Lexicon) -> QueryResult<Vec<Token>> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut position = 0;

    loop {
        let rest = &input[position..];
        let remainder = rest.trim_start();
        position += rest.len() - remainder.len();
        if remainder.is_empty() {
            break;
        }

        let previous = tokens.last().map(Token::category);
        let matched = lexicon
            .match_candidates(previous)
            .find_map(|lexeme| lexeme.match_len(remainder).map(|len| (lexeme.kind(), len)));

        let Some((kind, len)) = matched else {
            debug!(
                lexicon = lexicon.name(),
                position, remainder, "no lexeme matches"
            );
            return Err(QueryError::lex(remainder, position));
        };

        tokens.push(Token::new(kind, &remainder[..len]));
        position += len;
    }

    Ok(tokens)
}

/// Removes backslash escapes: `\x` becomes `x`.
pub(crate) fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Escapes a field name for use inside `{...}`.
pub(crate) fn escape_field(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('{');
    for c in name.chars() {
        if matches!(c, '{' | '}' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('}');
    out
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Parses a bare literal as a finite number.
fn parse_number(text: &str) -> Option<Value> {
    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    let n: f64 = text.parse().ok()?;
    Number::from_f64(n).map(Value::Number)
}
