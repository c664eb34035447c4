//! Syntax tree for filter queries.

use serde::Serialize;
use serde_json::Value;

use super::lexeme::{CaseFlag, LogicalOperator, RelationalOperator, UnaryOperator};
use super::lexer::Token;

/// What a leaf resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A record field, by unescaped name.
    Field(String),
    /// A constant.
    Literal(Value),
}

/// Operators taking a single operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Prefix `!`.
    Not,
    /// Postfix `is <keyword>`.
    Predicate(UnaryOperator),
}

/// Operators taking two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `and` / `or`.
    Logical(LogicalOperator),
    /// A comparison, with the case flag written in front of it.
    Relational(RelationalOperator, Option<CaseFlag>),
}

/// A node of a parsed filter query.
///
/// Every node keeps the token it was built from. Children are owned, and a
/// tree never changes once built.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // ==================== Leaves ====================
    /// A field reference or constant.
    Leaf {
        /// The operand token.
        token: Token,
        /// The resolved operand.
        operand: Operand,
    },

    // ==================== Operators ====================
    /// `! operand` or `operand is <keyword>`.
    Unary {
        /// The operator token.
        token: Token,
        /// The operator.
        op: UnaryOp,
        /// The single operand.
        operand: Box<Node>,
    },

    /// `left op right`.
    Binary {
        /// The operator token.
        token: Token,
        /// The operator.
        op: BinaryOp,
        /// Left-hand side.
        left: Box<Node>,
        /// Right-hand side.
        right: Box<Node>,
    },

    /// `( inner )`.
    Grouping {
        /// The `(` token.
        token: Token,
        /// The enclosed expression.
        inner: Box<Node>,
    },
}

impl Node {
    /// Creates a leaf from an operand token.
    pub(crate) fn leaf(token: Token) -> Self {
        debug_assert!(token.is_expression());
        let operand = match token.field_name() {
            Some(name) => Operand::Field(name),
            None => Operand::Literal(token.literal().unwrap_or(Value::Null)),
        };
        Node::Leaf { token, operand }
    }

    /// The token this node was built from.
    pub fn token(&self) -> &Token {
        match self {
            Node::Leaf { token, .. }
            | Node::Unary { token, .. }
            | Node::Binary { token, .. }
            | Node::Grouping { token, .. } => token,
        }
    }

    /// The field name of a field leaf.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Node::Leaf {
                operand: Operand::Field(name),
                ..
            } => Some(name),
            _ => None,
        }
    }

    /// Flattens logical combinations and groupings into their statements,
    /// depth first, left to right.
    ///
    /// `{a} = 1 && ({b} is nil || {c} > 2)` yields the three comparisons.
    pub fn statements(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        self.collect_statements(&mut out);
        out
    }

    fn collect_statements<'a>(&'a self, out: &mut Vec<&'a Node>) {
        match self {
            Node::Binary {
                op: BinaryOp::Logical(_),
                left,
                right,
                ..
            } => {
                left.collect_statements(out);
                right.collect_statements(out);
            }
            Node::Grouping { inner, .. } => inner.collect_statements(out),
            _ => out.push(self),
        }
    }

    /// A serializable description of the tree.
    pub fn to_structure(&self) -> TreeStructure {
        let text = self.token().present();
        match self {
            Node::Leaf {
                operand: Operand::Field(_),
                ..
            } => TreeStructure::new("field", text),
            Node::Leaf {
                operand: Operand::Literal(value),
                ..
            } => TreeStructure {
                value: Some(value.clone()),
                ..TreeStructure::new("literal", text)
            },
            Node::Unary { op, operand, .. } => {
                let kind = match op {
                    UnaryOp::Not => "not",
                    UnaryOp::Predicate(_) => "predicate",
                };
                TreeStructure {
                    children: vec![operand.to_structure()],
                    ..TreeStructure::new(kind, text)
                }
            }
            Node::Binary {
                op, left, right, ..
            } => {
                let kind = match op {
                    BinaryOp::Logical(_) => "logical",
                    BinaryOp::Relational(..) => "relational",
                };
                TreeStructure {
                    children: vec![left.to_structure(), right.to_structure()],
                    ..TreeStructure::new(kind, text)
                }
            }
            Node::Grouping { inner, .. } => TreeStructure {
                children: vec![inner.to_structure()],
                ..TreeStructure::new("grouping", text)
            },
        }
    }
}

/// Serializable shape of a syntax tree, used for diagnostics output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeStructure {
    /// Node kind: `field`, `literal`, `relational`, `predicate`, `not`,
    /// `logical` or `grouping`.
    pub kind: &'static str,
    /// Presented token text.
    pub text: String,
    /// Constant value of a literal leaf.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Child nodes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeStructure>,
}

impl TreeStructure {
    fn new(kind: &'static str, text: String) -> Self {
        Self {
            kind,
            text,
            value: None,
            children: Vec::new(),
        }
    }
}
