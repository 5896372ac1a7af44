use std::fmt;

use crate::analyzer::{ScopeId, SymbolTable, Ty};
use crate::lexer::BasicType;

use super::Expr;

/// program = block
///
/// Owns the scope arena that every `Block::scope` points into.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub block: Block,
    pub symbols: SymbolTable,
}

/// block = "{" decl* stmt* "}"
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub decls: Vec<Decl>,
    pub stmts: Vec<Stmt>,
    pub scope: ScopeId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Decl {
    pub ty: TypeNode,
    pub id: Identifier,
}

/// Declared type: a basic type and the literal size of every array
/// dimension, outermost first.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeNode {
    pub basic: BasicType,
    pub dims: Vec<usize>,
}

impl TypeNode {
    pub fn depth(&self) -> usize {
        self.dims.len()
    }

    pub fn ty(&self) -> Ty {
        Ty {
            basic: self.basic,
            depth: self.depth(),
        }
    }

    /// Elements skipped per unit of the index at `dimension`: the product of
    /// every later dimension's size. `None` on overflow.
    pub fn stride(&self, dimension: usize) -> Option<usize> {
        self.dims
            .iter()
            .skip(dimension + 1)
            .try_fold(1usize, |acc, &size| acc.checked_mul(size))
    }

    /// Storage of the whole declaration in bytes. `None` on overflow.
    pub fn size_in_bytes(&self) -> Option<usize> {
        self.dims
            .iter()
            .try_fold(self.basic.width(), |acc, &size| acc.checked_mul(size))
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub line: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Assign(Assign),
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    While(Expr, Box<Stmt>),
    DoWhile(Box<Stmt>, Expr),
    Break,
    Block(Block),
}

/// assignment = loc "=" expr ";"
#[derive(Clone, Debug, PartialEq)]
pub struct Assign {
    pub target: Expr,
    pub value: Expr,
    pub line: u32,
}
