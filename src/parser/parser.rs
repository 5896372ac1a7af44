use log::debug;

use crate::analyzer::{ScopeId, Symbol, SymbolTable};
use crate::error::CompileError;
use crate::lexer::{Lexer, Token, TokenKind};

use super::{
    Assign, BinOpKind, Block, Decl, Expr, ExprKind, Identifier, Loc, Program, Stmt, TypeNode,
    UnaryOpKind,
};

/// State threaded through the recursive descent: the innermost open scope
/// and the number of enclosing loops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseState {
    pub scope: Option<ScopeId>,
    pub loop_depth: u32,
}

impl ParseState {
    fn in_scope(self, scope: ScopeId) -> Self {
        Self {
            scope: Some(scope),
            ..self
        }
    }

    fn in_loop(self) -> Self {
        Self {
            loop_depth: self.loop_depth + 1,
            ..self
        }
    }
}

#[derive(Debug)]
pub struct Parser {
    lexer: Lexer,
    look: Token,
    symbols: SymbolTable,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, CompileError> {
        let look = lexer.next_token()?;
        Ok(Self {
            lexer,
            look,
            symbols: SymbolTable::new(),
        })
    }

    pub fn parse(mut self) -> Result<Program, CompileError> {
        self.parse_program()
    }

    fn advance(&mut self) -> Result<Token, CompileError> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.look, next))
    }

    fn syntax_error(&mut self, message: impl Into<String>) -> CompileError {
        CompileError::Syntax {
            message: message.into(),
            context: self.lexer.error_context(),
        }
    }

    fn consume(&mut self, kind: &TokenKind) -> Result<bool, CompileError> {
        if self.look.kind.same_kind(kind) {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, CompileError> {
        if self.look.kind.same_kind(kind) {
            return self.advance();
        }
        if self.look.kind == TokenKind::Eof {
            return Err(self.syntax_error("unexpected end of file"));
        }
        if *kind == TokenKind::SemiColon {
            self.lexer.set_missing_semicolon();
            return Err(self.syntax_error("expected ';' at end of statement"));
        }
        let message = format!("expected '{}' instead of '{}'", kind, self.look.kind);
        Err(self.syntax_error(message))
    }

    fn expect_ident(&mut self) -> Result<Identifier, CompileError> {
        match &self.look.kind {
            TokenKind::Ident(name) => {
                let id = Identifier {
                    name: name.clone(),
                    line: self.look.line,
                };
                self.advance()?;
                Ok(id)
            }
            TokenKind::Eof => Err(self.syntax_error("unexpected end of file")),
            kind => {
                let message = format!("expected identifier instead of '{}'", kind);
                Err(self.syntax_error(message))
            }
        }
    }

    /// program = block
    fn parse_program(&mut self) -> Result<Program, CompileError> {
        let block = self.parse_block(ParseState::default())?;
        if self.look.kind != TokenKind::Eof {
            let message = format!("expected 'EOF' instead of '{}'", self.look.kind);
            return Err(self.syntax_error(message));
        }

        debug!(
            "parsed program: {} declarations and {} statements at top level, {} scopes",
            block.decls.len(),
            block.stmts.len(),
            self.symbols.scope_count()
        );
        Ok(Program {
            block,
            symbols: std::mem::take(&mut self.symbols),
        })
    }

    /// block = "{" decl* stmt* "}"
    fn parse_block(&mut self, state: ParseState) -> Result<Block, CompileError> {
        self.expect(&TokenKind::OpenCurlyBrace)?;
        let scope = self.symbols.push_scope(state.scope);
        let state = state.in_scope(scope);

        let mut decls = vec![];
        while let TokenKind::Basic(_) = self.look.kind {
            decls.push(self.parse_decl(state)?);
        }

        let mut stmts = vec![];
        while self.look.kind != TokenKind::CloseCurlyBrace {
            stmts.push(self.parse_stmt(state)?);
        }
        self.expect(&TokenKind::CloseCurlyBrace)?;

        Ok(Block {
            decls,
            stmts,
            scope,
        })
    }

    /// decl = basic ("[" num "]")* ident ";"
    ///      | basic ident ("[" num "]")* ";"
    fn parse_decl(&mut self, state: ParseState) -> Result<Decl, CompileError> {
        let TokenKind::Basic(basic) = self.look.kind else {
            let message = format!("expected type instead of '{}'", self.look.kind);
            return Err(self.syntax_error(message));
        };
        self.advance()?;

        let mut dims = self.parse_dims()?;
        if let (Some(scope), TokenKind::Ident(name)) = (state.scope, &self.look.kind) {
            if self.symbols.declared_in(scope, name) {
                let message = format!("'{}' is already declared in this block", name);
                return Err(self.syntax_error(message));
            }
        }
        let id = self.expect_ident()?;
        if dims.is_empty() {
            dims = self.parse_dims()?;
        } else if self.look.kind == TokenKind::OpenSquareBrace {
            let message = format!("array dimensions given twice for '{}'", id.name);
            return Err(self.syntax_error(message));
        }

        let decl = Decl {
            ty: TypeNode { basic, dims },
            id,
        };
        let fits = decl
            .ty
            .size_in_bytes()
            .is_some_and(|size| i32::try_from(size).is_ok());
        if !fits {
            let message = format!("array '{}' is too large", decl.id.name);
            return Err(self.syntax_error(message));
        }
        if let Some(scope) = state.scope {
            let symbol = Symbol {
                ty: decl.ty.clone(),
                id: decl.id.clone(),
            };
            self.symbols.declare(scope, symbol);
        }
        self.expect(&TokenKind::SemiColon)?;

        Ok(decl)
    }

    fn parse_dims(&mut self) -> Result<Vec<usize>, CompileError> {
        let mut dims = vec![];
        while self.consume(&TokenKind::OpenSquareBrace)? {
            let TokenKind::Num(size) = self.look.kind else {
                let message = format!("expected integer array size instead of '{}'", self.look.kind);
                return Err(self.syntax_error(message));
            };
            self.advance()?;
            self.expect(&TokenKind::CloseSquareBrace)?;
            dims.push(size as usize);
        }
        Ok(dims)
    }

    /// stmt = loc "=" expr ";"
    ///      | "if" "(" expr ")" stmt ("else" stmt)?
    ///      | "while" "(" expr ")" stmt
    ///      | "do" stmt "while" "(" expr ")" ";"
    ///      | "break" ";"
    ///      | block
    fn parse_stmt(&mut self, state: ParseState) -> Result<Stmt, CompileError> {
        match self.look.kind {
            TokenKind::Ident(_) => self.parse_assign(state),
            TokenKind::If => self.parse_if(state),
            TokenKind::While => self.parse_while(state),
            TokenKind::Do => self.parse_do_while(state),
            TokenKind::Break => self.parse_break(state),
            TokenKind::OpenCurlyBrace => Ok(Stmt::Block(self.parse_block(state)?)),
            TokenKind::Eof => {
                Err(self.syntax_error("unexpected end of file; did you miss a closing brace?"))
            }
            ref kind => {
                let message = format!("invalid start of a statement '{}'", kind);
                Err(self.syntax_error(message))
            }
        }
    }

    fn parse_assign(&mut self, state: ParseState) -> Result<Stmt, CompileError> {
        let line = self.look.line;
        let target = self.parse_loc(state)?;
        self.expect(&TokenKind::Equal)?;
        let value = self.parse_expr(state)?;
        self.expect(&TokenKind::SemiColon)?;

        Ok(Stmt::Assign(Assign {
            target,
            value,
            line,
        }))
    }

    fn parse_if(&mut self, state: ParseState) -> Result<Stmt, CompileError> {
        self.expect(&TokenKind::If)?;
        self.expect(&TokenKind::OpenParen)?;
        let expr = self.parse_expr(state)?;
        self.expect(&TokenKind::CloseParen)?;
        let stmt = self.parse_stmt(state)?;
        let else_stmt = if self.consume(&TokenKind::Else)? {
            Some(Box::new(self.parse_stmt(state)?))
        } else {
            None
        };
        Ok(Stmt::If(expr, Box::new(stmt), else_stmt))
    }

    fn parse_while(&mut self, state: ParseState) -> Result<Stmt, CompileError> {
        self.expect(&TokenKind::While)?;
        self.expect(&TokenKind::OpenParen)?;
        let expr = self.parse_expr(state)?;
        self.expect(&TokenKind::CloseParen)?;
        let body = self.parse_stmt(state.in_loop())?;
        Ok(Stmt::While(expr, Box::new(body)))
    }

    fn parse_do_while(&mut self, state: ParseState) -> Result<Stmt, CompileError> {
        self.expect(&TokenKind::Do)?;
        let body = self.parse_stmt(state.in_loop())?;
        self.expect(&TokenKind::While)?;
        self.expect(&TokenKind::OpenParen)?;
        let expr = self.parse_expr(state)?;
        self.expect(&TokenKind::CloseParen)?;
        self.expect(&TokenKind::SemiColon)?;
        Ok(Stmt::DoWhile(Box::new(body), expr))
    }

    fn parse_break(&mut self, state: ParseState) -> Result<Stmt, CompileError> {
        if state.loop_depth == 0 {
            return Err(self.syntax_error("'break' outside of loop"));
        }
        self.expect(&TokenKind::Break)?;
        self.expect(&TokenKind::SemiColon)?;
        Ok(Stmt::Break)
    }

    /// loc = ident ("[" expr "]")*
    ///
    /// The identifier must already be declared in this or an enclosing block.
    fn parse_loc(&mut self, state: ParseState) -> Result<Expr, CompileError> {
        if let TokenKind::Ident(name) = &self.look.kind {
            let declared = state
                .scope
                .and_then(|scope| self.symbols.lookup(scope, name))
                .is_some();
            if !declared {
                let message = format!("'{}' is not declared", name);
                return Err(self.syntax_error(message));
            }
        }
        let id = self.expect_ident()?;
        let line = id.line;

        let mut indices = vec![];
        while self.consume(&TokenKind::OpenSquareBrace)? {
            indices.push(self.parse_expr(state)?);
            self.expect(&TokenKind::CloseSquareBrace)?;
        }

        Ok(Expr::new(ExprKind::Loc(Loc { id, indices }), line))
    }

    /// expr = factor (binop factor)*, grouped by operator precedence
    pub(crate) fn parse_expr(&mut self, state: ParseState) -> Result<Expr, CompileError> {
        let lhs = self.parse_factor(state)?;
        self.parse_binary(state, lhs, 0)
    }

    /// Precedence climbing. Folds operators of at least `min_precedence` into
    /// `lhs`, letting any tighter-binding operator that follows claim the
    /// right-hand side first.
    fn parse_binary(
        &mut self,
        state: ParseState,
        mut lhs: Expr,
        min_precedence: u8,
    ) -> Result<Expr, CompileError> {
        while let Some(op) = BinOpKind::from_token(&self.look.kind) {
            if op.precedence() < min_precedence {
                break;
            }
            let line = self.look.line;
            self.advance()?;

            let mut rhs = self.parse_factor(state)?;
            while let Some(next) = BinOpKind::from_token(&self.look.kind) {
                if next.precedence() <= op.precedence() {
                    break;
                }
                rhs = self.parse_binary(state, rhs, next.precedence())?;
            }

            lhs = Expr::new(ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)), line);
        }
        Ok(lhs)
    }

    /// factor = ("-" | "!") factor
    ///        | "(" expr ")"
    ///        | num | real | "true" | "false"
    ///        | loc
    fn parse_factor(&mut self, state: ParseState) -> Result<Expr, CompileError> {
        let line = self.look.line;
        let kind = match self.look.kind {
            TokenKind::Minus | TokenKind::Not => {
                let op = if self.advance()?.kind == TokenKind::Minus {
                    UnaryOpKind::Neg
                } else {
                    UnaryOpKind::Not
                };
                let operand = self.parse_factor(state)?;
                ExprKind::Unary(op, Box::new(operand))
            }
            TokenKind::OpenParen => {
                self.advance()?;
                let expr = self.parse_expr(state)?;
                self.expect(&TokenKind::CloseParen)?;
                ExprKind::Paren(Box::new(expr))
            }
            TokenKind::Num(num) => {
                self.advance()?;
                ExprKind::Num(num)
            }
            TokenKind::Real(value) => {
                self.advance()?;
                ExprKind::Real(value)
            }
            TokenKind::True => {
                self.advance()?;
                ExprKind::True
            }
            TokenKind::False => {
                self.advance()?;
                ExprKind::False
            }
            TokenKind::Ident(_) => return self.parse_loc(state),
            ref kind => {
                let message = format!("expected factor instead of '{}'", kind);
                return Err(self.syntax_error(message));
            }
        };
        Ok(Expr::new(kind, line))
    }
}
