use log::debug;

use crate::analyzer::{ScopeId, Symbol, SymbolTable, Ty};
use crate::error::CompileError;
use crate::parser::{Assign, BinOpKind, Block, Expr, ExprKind, Identifier, Loc, Program, Stmt};

use super::{Label, NameContext, Statement};

/// Lowers a type-checked program into a flat list of TAC statements.
pub struct TacGenerator<'a> {
    symbols: &'a SymbolTable,
    names: &'a mut NameContext,
    scope: Option<ScopeId>,
    loop_exits: Vec<Label>,
    statements: Vec<Statement>,
}

impl<'a> TacGenerator<'a> {
    pub fn new(symbols: &'a SymbolTable, names: &'a mut NameContext) -> Self {
        Self {
            symbols,
            names,
            scope: None,
            loop_exits: vec![],
            statements: vec![],
        }
    }

    pub fn generate(
        program: Program,
        names: &mut NameContext,
    ) -> Result<Vec<Statement>, CompileError> {
        let Program { block, symbols } = program;
        let mut generator = TacGenerator::new(&symbols, names);
        generator.gen_block(block)?;
        debug!("generated {} TAC statements", generator.statements.len());
        Ok(generator.statements)
    }

    fn emit(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    fn gen_block(&mut self, block: Block) -> Result<(), CompileError> {
        let enclosing = self.scope.replace(block.scope);
        for stmt in block.stmts {
            self.gen_stmt(stmt)?;
        }
        self.scope = enclosing;
        Ok(())
    }

    fn gen_stmt(&mut self, stmt: Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Assign(assign) => self.gen_assign(assign),
            Stmt::If(cond, then_stmt, else_stmt) => self.gen_if(cond, *then_stmt, else_stmt),
            Stmt::While(cond, body) => self.gen_while(cond, *body),
            Stmt::DoWhile(body, cond) => self.gen_do_while(*body, cond),
            Stmt::Break => {
                let Some(&exit) = self.loop_exits.last() else {
                    return Err(CompileError::Internal("'break' outside of loop".to_string()));
                };
                self.emit(Statement::Goto(exit));
                Ok(())
            }
            Stmt::Block(block) => self.gen_block(block),
        }
    }

    fn gen_assign(&mut self, assign: Assign) -> Result<(), CompileError> {
        let to_array = assign.target.is_array_access();
        let target = self.reduce(assign.target, false)?;
        let value = self.reduce(assign.value, to_array)?;
        self.emit(Statement::Assign { target, value });
        Ok(())
    }

    fn gen_if(
        &mut self,
        cond: Expr,
        then_stmt: Stmt,
        else_stmt: Option<Box<Stmt>>,
    ) -> Result<(), CompileError> {
        let cond = self.reduce(cond, false)?;
        let false_label = self.names.new_label();
        self.emit(Statement::IfFalse(cond, false_label));
        self.gen_stmt(then_stmt)?;

        match else_stmt {
            Some(else_stmt) => {
                let end = self.names.new_label();
                self.emit(Statement::Goto(end));
                self.emit(Statement::Label(false_label));
                self.gen_stmt(*else_stmt)?;
                self.emit(Statement::Label(end));
            }
            None => self.emit(Statement::Label(false_label)),
        }
        Ok(())
    }

    fn gen_while(&mut self, cond: Expr, body: Stmt) -> Result<(), CompileError> {
        let start = self.names.new_label();
        let end = self.names.new_label();
        self.emit(Statement::Label(start));
        if cond.kind != ExprKind::True {
            let cond = self.reduce(cond, false)?;
            self.emit(Statement::IfFalse(cond, end));
        }

        self.loop_exits.push(end);
        self.gen_stmt(body)?;
        self.loop_exits.pop();

        self.emit(Statement::Goto(start));
        self.emit(Statement::Label(end));
        Ok(())
    }

    fn gen_do_while(&mut self, body: Stmt, cond: Expr) -> Result<(), CompileError> {
        let start = self.names.new_label();
        let end = self.names.new_label();
        self.emit(Statement::Label(start));

        self.loop_exits.push(end);
        self.gen_stmt(body)?;
        self.loop_exits.pop();

        let cond = self.reduce(cond, false)?;
        self.emit(Statement::IfTrue(cond, start));
        self.emit(Statement::Label(end));
        Ok(())
    }

    /// Flattens `expr` into TAC, emitting any intermediate assignments.
    ///
    /// With `need_single` the result is a temporary, a literal, or a scalar
    /// location. Without it a binary expression over such operands is
    /// returned as-is, for contexts that accept one operator.
    fn reduce(&mut self, expr: Expr, need_single: bool) -> Result<Expr, CompileError> {
        let Expr { kind, ty, line } = expr;
        match kind {
            ExprKind::Binary(op, left, right) => {
                let left = self.reduce(*left, true)?;
                let right = self.reduce(*right, true)?;
                let binary = Expr::typed(
                    ExprKind::Binary(op, Box::new(left), Box::new(right)),
                    ty,
                    line,
                );
                if need_single {
                    Ok(self.materialize(binary))
                } else {
                    Ok(binary)
                }
            }
            ExprKind::Unary(op, operand) => {
                let operand = self.reduce(*operand, need_single)?;
                Ok(Expr::typed(ExprKind::Unary(op, Box::new(operand)), ty, line))
            }
            ExprKind::Paren(inner) => {
                let inner = self.reduce(*inner, need_single)?;
                // A compound result still needs its grouping when printed.
                if matches!(inner.kind, ExprKind::Binary(..)) {
                    Ok(Expr::typed(ExprKind::Paren(Box::new(inner)), ty, line))
                } else {
                    Ok(inner)
                }
            }
            ExprKind::Loc(loc) if !loc.indices.is_empty() => {
                let access = self.linearize(loc, ty, line)?;
                if need_single {
                    Ok(self.materialize(access))
                } else {
                    Ok(access)
                }
            }
            kind => Ok(Expr::typed(kind, ty, line)),
        }
    }

    /// Assigns `expr` to a fresh temporary and returns the temporary.
    fn materialize(&mut self, expr: Expr) -> Expr {
        let temp = self.names.new_temp();
        let ty = expr.ty;
        let line = expr.line;
        self.emit(Statement::Assign {
            target: Expr::typed(ExprKind::Temp(temp), ty, line),
            value: expr,
        });
        Expr::typed(ExprKind::Temp(temp), ty, line)
    }

    fn lookup(&self, id: &Identifier) -> Result<&'a Symbol, CompileError> {
        let symbols = self.symbols;
        self.scope
            .and_then(|scope| symbols.lookup(scope, &id.name))
            .ok_or_else(|| CompileError::Internal(format!("no symbol for '{}'", id.name)))
    }

    /// Rewrites `a[i0]..[in]` into `a[offset]`, where offset is the row-major
    /// byte offset of the element. Dimensions are folded outermost first.
    fn linearize(&mut self, loc: Loc, ty: Option<Ty>, line: u32) -> Result<Expr, CompileError> {
        let declared = &self.lookup(&loc.id)?.ty;
        let int = |kind| Expr::typed(kind, Some(Ty::INT), line);

        let mut offset: Option<Expr> = None;
        for (dimension, index) in loc.indices.into_iter().enumerate() {
            let index = self.reduce(index, true)?;
            let stride = declared.stride(dimension).ok_or_else(|| {
                CompileError::Internal(format!("stride of '{}' overflows", loc.id.name))
            })?;
            let term = if stride == 1 {
                index
            } else {
                let stride = int(ExprKind::Num(literal(stride)?));
                self.materialize(int(ExprKind::Binary(
                    BinOpKind::Mul,
                    Box::new(index),
                    Box::new(stride),
                )))
            };
            offset = Some(match offset {
                None => term,
                Some(sum) => self.materialize(int(ExprKind::Binary(
                    BinOpKind::Add,
                    Box::new(sum),
                    Box::new(term),
                ))),
            });
        }

        let Some(offset) = offset else {
            return Err(CompileError::Internal(format!(
                "'{}' has no index to linearize",
                loc.id.name
            )));
        };
        let width = int(ExprKind::Num(literal(declared.basic.width())?));
        let bytes = self.materialize(int(ExprKind::Binary(
            BinOpKind::Mul,
            Box::new(offset),
            Box::new(width),
        )));

        Ok(Expr::typed(
            ExprKind::Loc(Loc {
                id: loc.id,
                indices: vec![bytes],
            }),
            ty,
            line,
        ))
    }
}

fn literal(value: usize) -> Result<i32, CompileError> {
    i32::try_from(value)
        .map_err(|_| CompileError::Internal(format!("array size {} does not fit an int", value)))
}
