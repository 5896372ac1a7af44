use log::debug;

use crate::error::CompileError;
use crate::lexer::BasicType;
use crate::parser::{
    Assign, BinOpKind, Block, Expr, ExprKind, Loc, OpClass, Program, Stmt, UnaryOpKind,
};

use super::{ScopeId, Symbol, SymbolTable, Ty};

/// Resolves a type for every expression node and rejects ill-typed programs.
pub struct TypeChecker<'a> {
    symbols: &'a SymbolTable,
    scope: Option<ScopeId>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            symbols,
            scope: None,
        }
    }

    /// Type checks `program` in place.
    pub fn check(program: &mut Program) -> Result<(), CompileError> {
        let mut checker = TypeChecker::new(&program.symbols);
        checker.visit_program(&mut program.block)
    }

    fn visit_program(&mut self, block: &mut Block) -> Result<(), CompileError> {
        self.visit_block(block)?;
        debug!("type check passed");
        Ok(())
    }

    fn visit_block(&mut self, block: &mut Block) -> Result<(), CompileError> {
        let enclosing = self.scope.replace(block.scope);
        for stmt in block.stmts.iter_mut() {
            self.visit_stmt(stmt)?;
        }
        self.scope = enclosing;
        Ok(())
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Assign(assign) => self.visit_assign(assign),
            Stmt::If(expr, stmt, else_stmt) => {
                self.visit_expr(expr)?;
                self.visit_stmt(stmt)?;
                if let Some(else_stmt) = else_stmt {
                    self.visit_stmt(else_stmt)?;
                }
                Ok(())
            }
            Stmt::While(expr, body) => {
                self.visit_expr(expr)?;
                self.visit_stmt(body)
            }
            Stmt::DoWhile(body, expr) => {
                self.visit_stmt(body)?;
                self.visit_expr(expr).map(|_| ())
            }
            Stmt::Break => Ok(()),
            Stmt::Block(block) => self.visit_block(block),
        }
    }

    fn visit_assign(&mut self, assign: &mut Assign) -> Result<(), CompileError> {
        let left = self.visit_expr(&mut assign.target)?;
        let right = self.visit_expr(&mut assign.value)?;

        if left.depth != right.depth {
            return Err(CompileError::type_error(
                format!(
                    "array dimensions do not match: cannot assign '{}' to '{}'",
                    right, left
                ),
                assign.line,
            ));
        }
        // int widens to float.
        if left.basic == BasicType::Float && right.basic == BasicType::Int {
            return Ok(());
        }
        if left.basic != right.basic {
            return Err(CompileError::type_error(
                format!("type mismatch: cannot assign '{}' to '{}'", right, left),
                assign.line,
            ));
        }
        Ok(())
    }

    pub fn visit_expr(&mut self, expr: &mut Expr) -> Result<Ty, CompileError> {
        let line = expr.line;
        let ty = match &mut expr.kind {
            ExprKind::Binary(op, left, right) => {
                let l = self.visit_expr(left)?;
                let r = self.visit_expr(right)?;
                self.visit_binary(*op, l, r, line)?
            }
            ExprKind::Unary(op, operand) => {
                let t = self.visit_expr(operand)?;
                self.visit_unary(*op, t, line)?
            }
            ExprKind::Paren(inner) => self.visit_expr(inner)?,
            ExprKind::Loc(loc) => self.visit_loc(loc, line)?,
            ExprKind::Num(_) => Ty::INT,
            ExprKind::Real(_) => Ty::FLOAT,
            ExprKind::True | ExprKind::False => Ty::BOOL,
            ExprKind::Temp(temp) => {
                return expr.ty.ok_or_else(|| {
                    CompileError::Internal(format!("temporary '{}' has no type", temp))
                });
            }
        };
        expr.ty = Some(ty);
        Ok(ty)
    }

    fn lookup(&self, name: &str, line: u32) -> Result<&'a Symbol, CompileError> {
        let symbols = self.symbols;
        self.scope
            .and_then(|scope| symbols.lookup(scope, name))
            .ok_or_else(|| CompileError::type_error(format!("'{}' is not declared", name), line))
    }

    fn visit_loc(&mut self, loc: &mut Loc, line: u32) -> Result<Ty, CompileError> {
        let declared = self.lookup(&loc.id.name, line)?.ty.ty();
        let accessed = loc.indices.len();

        if accessed != declared.depth {
            let message = if declared.depth == 0 {
                format!(
                    "'{}' cannot be accessed as an array; it is type '{}'",
                    loc.id.name, declared
                )
            } else {
                format!(
                    "cannot access '{}' as a {} dimensional array; it is a {} dimensional array",
                    loc.id.name, accessed, declared.depth
                )
            };
            return Err(CompileError::type_error(message, line));
        }

        for index in loc.indices.iter_mut() {
            let t = self.visit_expr(index)?;
            if !t.is(BasicType::Int) {
                return Err(CompileError::type_error(
                    format!("array index must be an integer, not '{}'", t),
                    index.line,
                ));
            }
        }

        Ok(Ty::scalar(declared.basic))
    }

    fn visit_binary(&self, op: BinOpKind, l: Ty, r: Ty, line: u32) -> Result<Ty, CompileError> {
        if l.is_array() || r.is_array() {
            return Err(CompileError::type_error(
                format!("binary operator '{}' cannot be applied to an array", op.symbol()),
                line,
            ));
        }

        match op.class() {
            OpClass::Logical => {
                if !l.is(BasicType::Bool) || !r.is(BasicType::Bool) {
                    return Err(CompileError::type_error(
                        format!(
                            "logical operator '{}' expects boolean types, not '{}' and '{}'",
                            op.symbol(),
                            l,
                            r
                        ),
                        line,
                    ));
                }
                Ok(Ty::BOOL)
            }
            OpClass::Comparison => {
                if l.basic != r.basic {
                    return Err(CompileError::type_error(
                        format!(
                            "comparison operator '{}' expects same types, not '{}' and '{}'",
                            op.symbol(),
                            l,
                            r
                        ),
                        line,
                    ));
                }
                Ok(Ty::BOOL)
            }
            OpClass::Arithmetic => {
                if !l.is_numeric() || !r.is_numeric() {
                    return Err(CompileError::type_error(
                        format!(
                            "arithmetic operator '{}' expects numeric types, not '{}' and '{}'",
                            op.symbol(),
                            l,
                            r
                        ),
                        line,
                    ));
                }
                if l.is(BasicType::Float) || r.is(BasicType::Float) {
                    Ok(Ty::FLOAT)
                } else {
                    Ok(l)
                }
            }
        }
    }

    fn visit_unary(&self, op: UnaryOpKind, t: Ty, line: u32) -> Result<Ty, CompileError> {
        if t.is_array() {
            return Err(CompileError::type_error(
                format!("unary operator '{}' cannot be applied to an array", op.symbol()),
                line,
            ));
        }
        match op {
            UnaryOpKind::Not if !t.is(BasicType::Bool) => Err(CompileError::type_error(
                format!("'!' operator expects boolean type, not '{}'", t),
                line,
            )),
            UnaryOpKind::Neg if !t.is_numeric() => Err(CompileError::type_error(
                format!("unary '-' operator expects numeric type, not '{}'", t),
                line,
            )),
            _ => Ok(t),
        }
    }
}
