//! Priority-pivot syntaxer.
//!
//! Instead of a grammar with one function per precedence level, every
//! operator lexeme carries a numeric priority. For a token slice, the
//! operator with the highest priority at parenthesis depth zero becomes the
//! root, the slice is cut around it and each part is parsed the same way.
//!
//! # Priorities (loosest first)
//!
//! | operator | priority |
//! |---|---|
//! | `or` / `\|\|` | 4 |
//! | `and` / `&&` | 3 |
//! | `!` | 2 |
//! | `(` | 1 |
//! | relational, `is <keyword>` | 0 |
//!
//! Ties go to the first occurrence, which makes chains of the same logical
//! operator right-nested. That is harmless since `and` and `or` are
//! associative.

use tracing::debug;

use super::ast::{BinaryOp, Node, UnaryOp};
use super::error::{QueryError, QueryResult};
use super::lexeme::LexemeKind;
use super::lexer::Token;

/// Builds a syntax tree from a token stream.
///
/// # Errors
///
/// - [`QueryError::EmptyExpression`] for an empty slice
/// - [`QueryError::UnbalancedNesting`] when parentheses do not balance
/// - [`QueryError::EmptyBlock`] for `()`
/// - [`QueryError::NoPivot`] when several tokens contain no usable operator
/// - [`QueryError::MissingOperand`] / [`QueryError::UnexpectedOperand`] when
///   an operator does not get the operands its arity requires
pub fn parse(tokens: &[Token]) -> QueryResult<Node> {
    let result = build(tokens);
    if let Err(err) = &result {
        debug!(tokens = %join(tokens), error = %err, "query rejected by syntaxer");
    }
    result
}

fn build(tokens: &[Token]) -> QueryResult<Node> {
    match tokens {
        [] => return Err(QueryError::EmptyExpression),
        [token] if token.is_expression() => return Ok(Node::leaf(token.clone())),
        _ => {}
    }

    let levels = nesting_levels(tokens)?;
    let Some(index) = find_pivot(tokens, &levels) else {
        return Err(QueryError::NoPivot {
            tokens: join(tokens),
        });
    };

    let pivot = &tokens[index];
    let left = &tokens[..index];
    let right = &tokens[index + 1..];

    match pivot.kind() {
        LexemeKind::Logical(op) => {
            if left.is_empty() || right.is_empty() {
                return Err(QueryError::missing_operand(pivot.text()));
            }
            Ok(Node::Binary {
                token: pivot.clone(),
                op: BinaryOp::Logical(op),
                left: Box::new(build(left)?),
                right: Box::new(build(right)?),
            })
        }
        LexemeKind::Relational(op) => {
            let left = single_operand(pivot, left)?;
            let right = single_operand(pivot, right)?;
            Ok(Node::Binary {
                token: pivot.clone(),
                op: BinaryOp::Relational(op, pivot.case_flag()),
                left: Box::new(left),
                right: Box::new(right),
            })
        }
        LexemeKind::Unary(op) => {
            if !right.is_empty() {
                return Err(QueryError::unexpected_operand(pivot.text(), join(right)));
            }
            let operand = single_operand(pivot, left)?;
            Ok(Node::Unary {
                token: pivot.clone(),
                op: UnaryOp::Predicate(op),
                operand: Box::new(operand),
            })
        }
        LexemeKind::Not => {
            if !left.is_empty() {
                return Err(QueryError::unexpected_operand(pivot.text(), join(left)));
            }
            if right.is_empty() {
                return Err(QueryError::missing_operand(pivot.text()));
            }
            Ok(Node::Unary {
                token: pivot.clone(),
                op: UnaryOp::Not,
                operand: Box::new(build(right)?),
            })
        }
        LexemeKind::BlockOpen => {
            if !left.is_empty() {
                return Err(QueryError::unexpected_operand(pivot.text(), join(left)));
            }
            // With no looser operator at depth zero, the matching `)` must
            // end the slice.
            let close = matching_close(&levels);
            if close + 1 != tokens.len() {
                return Err(QueryError::unexpected_operand(
                    pivot.text(),
                    join(&tokens[close + 1..]),
                ));
            }
            let inner = &tokens[1..close];
            if inner.is_empty() {
                return Err(QueryError::EmptyBlock);
            }
            Ok(Node::Grouping {
                token: pivot.clone(),
                inner: Box::new(build(inner)?),
            })
        }
        LexemeKind::Expression(_) | LexemeKind::BlockClose => Err(QueryError::NoPivot {
            tokens: join(tokens),
        }),
    }
}

/// Parenthesis depth of every token, recorded before the token's own delta.
fn nesting_levels(tokens: &[Token]) -> QueryResult<Vec<i32>> {
    let mut level = 0;
    let mut levels = Vec::with_capacity(tokens.len());
    for token in tokens {
        levels.push(level);
        level += token.kind().nesting_delta();
        if level < 0 {
            return Err(QueryError::UnbalancedNesting);
        }
    }
    if level != 0 {
        return Err(QueryError::UnbalancedNesting);
    }
    Ok(levels)
}

/// Index of the highest-priority token at depth zero; ties go to the first.
fn find_pivot(tokens: &[Token], levels: &[i32]) -> Option<usize> {
    let mut best: Option<(usize, u8)> = None;
    for (index, (token, &level)) in tokens.iter().zip(levels).enumerate() {
        if level != 0 {
            continue;
        }
        let Some(priority) = token.kind().priority() else {
            continue;
        };
        if best.map_or(true, |(_, top)| priority > top) {
            best = Some((index, priority));
        }
    }
    best.map(|(index, _)| index)
}

/// Index of the `)` closing the `(` at index 0 of a balanced slice.
fn matching_close(levels: &[i32]) -> usize {
    levels
        .iter()
        .enumerate()
        .skip(1)
        .find(|&(_, &level)| level == 0)
        .map_or(levels.len(), |(index, _)| index)
        - 1
}

/// Requires `side` to be exactly one operand token.
fn single_operand(pivot: &Token, side: &[Token]) -> QueryResult<Node> {
    match side {
        [] => Err(QueryError::missing_operand(pivot.text())),
        [token] if token.is_expression() => Ok(Node::leaf(token.clone())),
        _ => Err(QueryError::unexpected_operand(pivot.text(), join(side))),
    }
}

fn join(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::text)
        .collect::<Vec<_>>()
        .join(" ")
}
