//! Evaluation of syntax trees against JSON records.
//!
//! Records are `serde_json::Value` objects. A field that is missing, or a
//! lookup into something that is not an object, resolves to `null`.
//!
//! # Coercion rules
//!
//! - `=` compares numerically when both sides are numbers or numeric
//!   strings, and by text otherwise (`true` equals `"true"`).
//! - `!=` negates `=`, except that any `null` side makes it false.
//! - Ordering operators compare numerically when both sides are numeric and
//!   lexicographically when both are strings; any other mix is false.
//! - `contains` needs at least one string side.
//! - `datestartswith` normalizes both sides as dates and tests the prefix.
//!
//! A comparison involving `null` is false rather than an error.

use std::borrow::Cow;

use serde_json::Value;

use super::ast::{BinaryOp, Node, Operand, UnaryOp};
use super::date::normalize_date;
use super::lexeme::{CaseFlag, LogicalOperator, RelationalOperator, UnaryOperator};

static NULL: Value = Value::Null;

impl Node {
    /// Returns true if `record` satisfies this node.
    ///
    /// A leaf evaluates to the truthiness of its value.
    pub fn evaluate(&self, record: &Value) -> bool {
        match self {
            Node::Leaf { .. } => is_truthy(&self.resolve(record)),
            Node::Unary {
                op: UnaryOp::Not,
                operand,
                ..
            } => !operand.evaluate(record),
            Node::Unary {
                op: UnaryOp::Predicate(predicate),
                operand,
                ..
            } => test_predicate(*predicate, &operand.resolve(record)),
            Node::Binary {
                op: BinaryOp::Logical(LogicalOperator::And),
                left,
                right,
                ..
            } => left.evaluate(record) && right.evaluate(record),
            Node::Binary {
                op: BinaryOp::Logical(LogicalOperator::Or),
                left,
                right,
                ..
            } => left.evaluate(record) || right.evaluate(record),
            Node::Binary {
                op: BinaryOp::Relational(op, flag),
                left,
                right,
                ..
            } => compare(*op, *flag, &left.resolve(record), &right.resolve(record)),
            Node::Grouping { inner, .. } => inner.evaluate(record),
        }
    }

    /// Resolves this node to a value: leaves to their field or constant,
    /// everything else to the boolean result of evaluating it.
    pub fn resolve<'a>(&'a self, record: &'a Value) -> Cow<'a, Value> {
        match self {
            Node::Leaf {
                operand: Operand::Field(name),
                ..
            } => Cow::Borrowed(record.get(name).unwrap_or(&NULL)),
            Node::Leaf {
                operand: Operand::Literal(value),
                ..
            } => Cow::Borrowed(value),
            _ => Cow::Owned(Value::Bool(self.evaluate(record))),
        }
    }
}

/// Applies a relational operator to two resolved values.
pub fn compare(
    op: RelationalOperator,
    flag: Option<CaseFlag>,
    left: &Value,
    right: &Value,
) -> bool {
    let insensitive = CaseFlag::is_insensitive(flag);
    match op {
        RelationalOperator::Equal => equals(left, right, insensitive),
        RelationalOperator::NotEqual => {
            !left.is_null() && !right.is_null() && !equals(left, right, insensitive)
        }
        RelationalOperator::GreaterThan => order(left, right, insensitive, |o| o.is_gt()),
        RelationalOperator::GreaterOrEqual => order(left, right, insensitive, |o| o.is_ge()),
        RelationalOperator::LessThan => order(left, right, insensitive, |o| o.is_lt()),
        RelationalOperator::LessOrEqual => order(left, right, insensitive, |o| o.is_le()),
        RelationalOperator::Contains => contains(left, right, insensitive),
        RelationalOperator::DateStartsWith => {
            match (normalize_date(left), normalize_date(right)) {
                (Some(left), Some(right)) => left.starts_with(&right),
                _ => false,
            }
        }
    }
}

/// Applies a postfix predicate to a resolved value.
pub fn test_predicate(predicate: UnaryOperator, value: &Value) -> bool {
    match predicate {
        UnaryOperator::Nil => value.is_null(),
        UnaryOperator::Blank => match value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        },
        UnaryOperator::Bool => value.is_boolean(),
        UnaryOperator::Num => value.is_number(),
        UnaryOperator::Str => value.is_string(),
        UnaryOperator::Object => value.is_object() || value.is_array(),
        UnaryOperator::Even => as_integer(value).is_some_and(|n| n % 2 == 0),
        UnaryOperator::Odd => as_integer(value).is_some_and(|n| n % 2 != 0),
        UnaryOperator::Prime => as_integer(value).is_some_and(is_prime),
    }
}

/// Truthiness of a value standing alone as a condition.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

// ==================== Coercion ====================

fn equals(left: &Value, right: &Value, insensitive: bool) -> bool {
    if left.is_null() || right.is_null() {
        return false;
    }
    if let (Some(l), Some(r)) = (as_number(left), as_number(right)) {
        return l == r;
    }
    match (as_text(left), as_text(right)) {
        (Some(l), Some(r)) => fold(l, insensitive) == fold(r, insensitive),
        _ => left == right,
    }
}

fn order(
    left: &Value,
    right: &Value,
    insensitive: bool,
    accept: impl Fn(std::cmp::Ordering) -> bool,
) -> bool {
    if let (Some(l), Some(r)) = (as_number(left), as_number(right)) {
        return l.partial_cmp(&r).is_some_and(accept);
    }
    match (left, right) {
        (Value::String(l), Value::String(r)) => {
            let l = fold(Cow::Borrowed(l.as_str()), insensitive);
            let r = fold(Cow::Borrowed(r.as_str()), insensitive);
            accept(l.cmp(&r))
        }
        _ => false,
    }
}

fn contains(haystack: &Value, needle: &Value, insensitive: bool) -> bool {
    if haystack.is_null() || needle.is_null() {
        return false;
    }
    if !haystack.is_string() && !needle.is_string() {
        return false;
    }
    match (as_text(haystack), as_text(needle)) {
        (Some(h), Some(n)) => {
            let needle = fold(n, insensitive);
            fold(h, insensitive).contains(&*needle)
        }
        _ => false,
    }
}

/// Numbers, or strings that parse as a finite number once trimmed.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

/// Textual form of a scalar.
fn as_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        _ => None,
    }
}

fn fold(text: Cow<'_, str>, insensitive: bool) -> Cow<'_, str> {
    if insensitive {
        Cow::Owned(text.to_lowercase())
    } else {
        text
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Trial division by 6k ± 1.
fn is_prime(n: i64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5;
    while i <= n / i {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_prime() {
        let primes: Vec<i64> = (0..40).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37]);
        assert!(is_prime(7919));
        assert!(!is_prime(7917));
        assert!(!is_prime(-7));
    }

    #[test]
    fn test_as_number() {
        assert_eq!(as_number(&Value::from(" 4.5 ")), Some(4.5));
        assert_eq!(as_number(&Value::from("")), None);
        assert_eq!(as_number(&Value::from("inf")), None);
        assert_eq!(as_number(&Value::from(true)), None);
    }
}
