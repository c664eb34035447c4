//! Error types for filter queries.

use thiserror::Error;

use crate::column::lookup::format_not_found_error;

/// A specialized Result type for query lexing and parsing.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors that make a query invalid.
///
/// These are reported as data: a tree built from an invalid query keeps the
/// error and answers `is_valid() == false` instead of failing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The query contains no tokens.
    #[error("filter expression is empty")]
    EmptyExpression,

    /// No lexeme matched the remaining input.
    #[error("unexpected input at position {position}: '{remainder}'")]
    Lex {
        /// The unmatched remainder of the input, untouched.
        remainder: String,
        /// Byte offset of the remainder in the original input.
        position: usize,
    },

    /// Parentheses do not balance.
    #[error("unbalanced parentheses")]
    UnbalancedNesting,

    /// A pair of parentheses encloses nothing.
    #[error("empty parentheses")]
    EmptyBlock,

    /// Several tokens were found but none of them can be an operator.
    #[error("no operator found in '{tokens}'")]
    NoPivot {
        /// The tokens that could not be combined.
        tokens: String,
    },

    /// An operator lacks one of its operands.
    #[error("operator '{operator}' is missing an operand")]
    MissingOperand {
        /// The operator text.
        operator: String,
    },

    /// An operator has an operand it cannot take.
    #[error("unexpected operand '{operand}' for operator '{operator}'")]
    UnexpectedOperand {
        /// The operator text.
        operator: String,
        /// The offending operand text.
        operand: String,
    },

    /// A column filter fragment has a shape that cannot be completed.
    #[error("unsupported column filter: '{fragment}'")]
    UnsupportedFragment {
        /// The raw fragment.
        fragment: String,
    },

    /// A multi-column query filters the same column twice.
    #[error("column '{column}' is filtered more than once")]
    DuplicateColumn {
        /// The repeated column id.
        column: String,
    },
}

impl QueryError {
    /// Creates a lexing error for the unmatched `remainder` at `position`.
    pub fn lex(remainder: impl Into<String>, position: usize) -> Self {
        QueryError::Lex {
            remainder: remainder.into(),
            position,
        }
    }

    /// Creates a missing operand error.
    pub fn missing_operand(operator: impl Into<String>) -> Self {
        QueryError::MissingOperand {
            operator: operator.into(),
        }
    }

    /// Creates an unexpected operand error.
    pub fn unexpected_operand(operator: impl Into<String>, operand: impl Into<String>) -> Self {
        QueryError::UnexpectedOperand {
            operator: operator.into(),
            operand: operand.into(),
        }
    }

    /// Returns the diagnostic context of the error, if any.
    ///
    /// For lexing errors this is the untouched remainder of the input.
    pub fn context(&self) -> Option<&str> {
        match self {
            QueryError::Lex { remainder, .. } => Some(remainder),
            QueryError::NoPivot { tokens } => Some(tokens),
            QueryError::UnsupportedFragment { fragment } => Some(fragment),
            _ => None,
        }
    }
}

/// A multi-column query references a field that is not among the columns.
///
/// Unlike [`QueryError`] this is a hard failure: it means the caller handed
/// the engine a column list that does not match the data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", format_not_found_error(.column, .suggestion.as_deref()))]
pub struct ColumnNotFound {
    /// The field name referenced by the query.
    pub column: String,
    /// The closest known column id, if any is close enough.
    pub suggestion: Option<String>,
}
