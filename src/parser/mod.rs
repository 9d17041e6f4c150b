use std::fmt;

pub mod error;
pub mod lexer;
pub mod statement;

pub use lexer::{tokenize, Lexer, Token, TokenData, TokenKind};
pub use statement::Parser;

use crate::error::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(String),
    Reference(String),
}

impl ToLocated for Operand {}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Number(text) | Operand::Reference(text) => write!(f, "{}", text),
        }
    }
}

/// Exactly one binary operation, no precedence and no nesting.
#[derive(Debug, Clone, PartialEq)]
pub struct MathExpression {
    pub lhs: Located<Operand>,
    pub operator: Located<Operator>,
    pub rhs: Located<Operand>,
}

impl fmt::Display for MathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ":m {} {} {}",
            self.lhs.data, self.operator.data, self.rhs.data
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RValue {
    /// Raw literal text, quotes included; its type is inferred from this text.
    Literal(String),
    Reference(String),
    Math(MathExpression),
}

impl ToLocated for RValue {}

impl fmt::Display for RValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RValue::Literal(text) | RValue::Reference(text) => write!(f, "{}", text),
            RValue::Math(math) => write!(f, "{}", math),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: String,
    pub value: Located<RValue>,
    /// Annotation name with the `~` stripped.
    pub annotation: Located<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub namespace: String,
    /// Path with the quotes stripped.
    pub path: Located<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementBody {
    Define(Definition),
    Delete(String),
    Inspect(String),
    Import(Import),
    Math(MathExpression),
}

impl ToLocated for StatementBody {}

pub type Statement = Located<StatementBody>;

impl fmt::Display for StatementBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementBody::Define(Definition {
                name,
                value,
                annotation,
            }) => write!(f, ":o {} <-- {} ~{}", name, value.data, annotation.data),
            StatementBody::Delete(name) => write!(f, ":3 {}", name),
            StatementBody::Inspect(name) => write!(f, ":< {}", name),
            StatementBody::Import(Import { namespace, path }) => {
                write!(f, ":D {} <-- \"{}\" ~azumanga", namespace, path.data)
            }
            StatementBody::Math(math) => write!(f, "{}", math),
        }
    }
}

/// Strips one pair of matching surrounding quotes, if present.
pub fn unquote(text: &str) -> &str {
    for quote in &['"', '\''] {
        if text.len() >= 2 && text.starts_with(*quote) && text.ends_with(*quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

#[test]
fn unquote_literals() {
    assert_eq!(unquote("\"hi\""), "hi");
    assert_eq!(unquote("'hi'"), "hi");
    assert_eq!(unquote("\"\""), "");
    assert_eq!(unquote("'mixed\""), "'mixed\"");
    assert_eq!(unquote("42"), "42");
}
