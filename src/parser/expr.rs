use std::fmt;

use crate::analyzer::Ty;
use crate::lexer::TokenKind;

use super::Identifier;

/// An expression node. `ty` is filled in by the type checker, `line` by the
/// parser.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Option<Ty>,
    pub line: u32,
}

impl Expr {
    pub fn new(kind: ExprKind, line: u32) -> Self {
        Self {
            kind,
            ty: None,
            line,
        }
    }

    pub fn typed(kind: ExprKind, ty: Option<Ty>, line: u32) -> Self {
        Self { kind, ty, line }
    }

    /// True for a location that still carries array indices.
    pub fn is_array_access(&self) -> bool {
        matches!(&self.kind, ExprKind::Loc(loc) if !loc.indices.is_empty())
    }

    /// Calls `f` on this node and every expression below it.
    pub fn walk<'e>(&'e self, f: &mut impl FnMut(&'e Expr)) {
        f(self);
        match &self.kind {
            ExprKind::Binary(_, left, right) => {
                left.walk(f);
                right.walk(f);
            }
            ExprKind::Unary(_, operand) | ExprKind::Paren(operand) => operand.walk(f),
            ExprKind::Loc(loc) => {
                for index in &loc.indices {
                    index.walk(f);
                }
            }
            ExprKind::Num(_)
            | ExprKind::Real(_)
            | ExprKind::True
            | ExprKind::False
            | ExprKind::Temp(_) => {}
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Binary(BinOpKind, Box<Expr>, Box<Expr>),
    Unary(UnaryOpKind, Box<Expr>),
    Paren(Box<Expr>),
    Loc(Loc),
    Num(i32),
    Real(f64),
    True,
    False,
    /// Compiler-synthesized location, only created during TAC generation.
    Temp(Temp),
}

/// A storage slot: a scalar identifier, or an array element after indexing.
#[derive(Clone, Debug, PartialEq)]
pub struct Loc {
    pub id: Identifier,
    pub indices: Vec<Expr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Temp(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpClass {
    Logical,
    Comparison,
    Arithmetic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOpKind {
    Or,
    And,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOpKind {
    pub fn from_token(kind: &TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Or => BinOpKind::Or,
            TokenKind::And => BinOpKind::And,
            TokenKind::DoubleEqual => BinOpKind::Equal,
            TokenKind::NotEqual => BinOpKind::NotEqual,
            TokenKind::LessThan => BinOpKind::LessThan,
            TokenKind::LessEqual => BinOpKind::LessEqual,
            TokenKind::GreaterThan => BinOpKind::GreaterThan,
            TokenKind::GreaterEqual => BinOpKind::GreaterEqual,
            TokenKind::Plus => BinOpKind::Add,
            TokenKind::Minus => BinOpKind::Sub,
            TokenKind::Star => BinOpKind::Mul,
            TokenKind::Slash => BinOpKind::Div,
            _ => return None,
        };
        Some(op)
    }

    pub fn precedence(&self) -> u8 {
        match self {
            BinOpKind::Mul | BinOpKind::Div => 12,
            BinOpKind::Add | BinOpKind::Sub => 11,
            BinOpKind::LessThan
            | BinOpKind::LessEqual
            | BinOpKind::GreaterThan
            | BinOpKind::GreaterEqual => 9,
            BinOpKind::Equal | BinOpKind::NotEqual => 8,
            BinOpKind::And => 7,
            BinOpKind::Or => 6,
        }
    }

    pub fn class(&self) -> OpClass {
        match self {
            BinOpKind::Or | BinOpKind::And => OpClass::Logical,
            BinOpKind::Equal
            | BinOpKind::NotEqual
            | BinOpKind::LessThan
            | BinOpKind::LessEqual
            | BinOpKind::GreaterThan
            | BinOpKind::GreaterEqual => OpClass::Comparison,
            BinOpKind::Add | BinOpKind::Sub | BinOpKind::Mul | BinOpKind::Div => {
                OpClass::Arithmetic
            }
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinOpKind::Or => "||",
            BinOpKind::And => "&&",
            BinOpKind::Equal => "==",
            BinOpKind::NotEqual => "!=",
            BinOpKind::LessThan => "<",
            BinOpKind::LessEqual => "<=",
            BinOpKind::GreaterThan => ">",
            BinOpKind::GreaterEqual => ">=",
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOpKind {
    Neg,
    Not,
}

impl UnaryOpKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOpKind::Neg => "-",
            UnaryOpKind::Not => "!",
        }
    }
}

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id.name)?;
        for index in &self.indices {
            write!(f, "[{}]", index)?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Binary(op, left, right) => write!(f, "{} {} {}", left, op.symbol(), right),
            ExprKind::Unary(op, operand) => write!(f, "{}{}", op.symbol(), operand),
            ExprKind::Paren(inner) => write!(f, "({})", inner),
            ExprKind::Loc(loc) => write!(f, "{}", loc),
            ExprKind::Num(n) => write!(f, "{}", n),
            ExprKind::Real(r) => write!(f, "{:?}", r),
            ExprKind::True => write!(f, "true"),
            ExprKind::False => write!(f, "false"),
            ExprKind::Temp(t) => write!(f, "{}", t),
        }
    }
}
