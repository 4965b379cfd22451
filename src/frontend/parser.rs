//! Parser for tacc
//!
//! Recursive descent over the token vector. Binary operators are combined
//! iteratively per precedence level, which keeps them left-associative.

use crate::frontend::ast::*;
use crate::frontend::token::{Token, TokenKind};
use crate::types::Type;
use crate::utils::{Span, SyntaxError};

type PResult<T> = std::result::Result<T, SyntaxError>;

/// Combined depth of open blocks, parentheses, call argument lists and
/// operator chains. Later passes recurse over the tree, so it stays bounded.
const MAX_NESTING: usize = 128;

/// The parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Create a parser from pre-tokenized input. A missing trailing `Eof`
    /// is appended.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let span = tokens
                .last()
                .map(|t| Span::new(t.span.end, t.span.end, t.span.line))
                .unwrap_or_default();
            tokens.push(Token::eof(span));
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> &Token {
        // `new` guarantees a trailing Eof and `advance` never steps past it
        &self.tokens[self.pos]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn prev_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn error(&self, expected: impl Into<String>) -> SyntaxError {
        SyntaxError {
            expected: expected.into(),
            found: self.current_kind().clone(),
            span: self.current().span,
        }
    }

    fn expect(&mut self, expected: TokenKind) -> PResult<Token> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.error(expected.to_string()))
        }
    }

    fn enter_nesting(&mut self) -> PResult<()> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("shallower nesting"));
        }
        self.depth += 1;
        Ok(())
    }

    fn exit_nesting(&mut self, levels: usize) {
        self.depth -= levels;
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ==================== Parsing Methods ====================

    /// Parse a complete program
    pub fn parse_program(&mut self) -> PResult<Program> {
        let mut globals = Vec::new();
        let mut functions = Vec::new();
        self.depth = 0;

        while !self.is_at_end() {
            if self.at_function_start() {
                functions.push(self.parse_function()?);
            } else {
                globals.push(self.parse_stmt()?);
            }
        }

        // An Eof in the middle of the vector must not hide what follows it
        if let Some(extra) = self.tokens.get(self.pos + 1) {
            return Err(SyntaxError {
                expected: "nothing after end of input".to_string(),
                found: extra.kind.clone(),
                span: extra.span,
            });
        }

        log::debug!(
            "parsed {} top-level statements and {} functions",
            globals.len(),
            functions.len()
        );
        Ok(Program { globals, functions })
    }

    /// `int f(` or `void f(` starts a function, `int x;` a declaration
    fn at_function_start(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Int | TokenKind::Void)
            && matches!(self.peek_kind(1), Some(TokenKind::Ident(_)))
            && matches!(self.peek_kind(2), Some(TokenKind::LParen))
    }

    /// Parse a function declaration
    fn parse_function(&mut self) -> PResult<FunctionDecl> {
        let start = self.current().span;
        let ret_type = self.parse_type()?;
        let name = self.parse_ident()?;

        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Colon)?;

        let body = self.parse_block()?;

        Ok(FunctionDecl {
            name,
            params,
            ret_type,
            span: start.merge(&body.span),
            body,
        })
    }

    fn parse_params(&mut self) -> PResult<Vec<Param>> {
        let mut params = Vec::new();

        if self.check(&TokenKind::RParen) {
            return Ok(params);
        }

        loop {
            params.push(self.parse_param()?);
            if !self.consume(&TokenKind::Comma) {
                break;
            }
        }

        Ok(params)
    }

    fn parse_param(&mut self) -> PResult<Param> {
        let start = self.current().span;
        self.expect(TokenKind::Int)?;
        let name = self.parse_ident()?;

        Ok(Param {
            name,
            ty: Type::Int,
            span: start.merge(&self.prev_span()),
        })
    }

    fn parse_type(&mut self) -> PResult<Type> {
        let ty = match self.current_kind() {
            TokenKind::Int => Type::Int,
            TokenKind::Void => Type::Void,
            _ => return Err(self.error("type")),
        };
        self.advance();
        Ok(ty)
    }

    fn parse_ident(&mut self) -> PResult<Ident> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Ident { name, span: token.span })
            }
            _ => Err(self.error("identifier")),
        }
    }

    fn parse_block(&mut self) -> PResult<Block> {
        let start = self.current().span;
        self.enter_nesting()?;
        self.expect(TokenKind::Begin)?;

        let mut stmts = Vec::new();
        while !self.check(&TokenKind::End) && !self.is_at_end() {
            stmts.push(self.parse_stmt()?);
        }

        self.expect(TokenKind::End)?;
        self.exit_nesting(1);

        Ok(Block {
            stmts,
            span: start.merge(&self.prev_span()),
        })
    }

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        match self.current_kind() {
            TokenKind::Int => self.parse_var_decl(),
            TokenKind::Ident(_) => {
                if matches!(self.peek_kind(1), Some(TokenKind::LParen)) {
                    let call = self.parse_call()?;
                    self.expect(TokenKind::Semicolon)?;
                    Ok(Stmt::Call(call))
                } else {
                    self.parse_assign()
                }
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Begin => Ok(Stmt::Block(self.parse_block()?)),
            _ => Err(self.error("statement")),
        }
    }

    fn parse_var_decl(&mut self) -> PResult<Stmt> {
        let start = self.current().span;
        let ty = self.parse_type()?;
        let name = self.parse_ident()?;
        self.expect(TokenKind::Semicolon)?;

        Ok(Stmt::VarDecl {
            ty,
            name,
            span: start.merge(&self.prev_span()),
        })
    }

    fn parse_assign(&mut self) -> PResult<Stmt> {
        let name = self.parse_ident()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;

        Ok(Stmt::Assign {
            span: name.span.merge(&self.prev_span()),
            name,
            value,
        })
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        let start = self.current().span;
        self.expect(TokenKind::If)?;

        let cond = self.parse_expr()?;
        self.expect(TokenKind::Colon)?;
        let then_block = self.parse_block()?;

        let else_block = if self.consume(&TokenKind::Else) {
            self.expect(TokenKind::Colon)?;
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Stmt::If {
            cond,
            then_block,
            else_block,
            span: start.merge(&self.prev_span()),
        })
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        let start = self.current().span;
        self.expect(TokenKind::While)?;

        let cond = self.parse_expr()?;
        self.expect(TokenKind::Colon)?;
        let body = self.parse_block()?;

        Ok(Stmt::While {
            cond,
            span: start.merge(&body.span),
            body,
        })
    }

    fn parse_return(&mut self) -> PResult<Stmt> {
        let start = self.current().span;
        self.expect(TokenKind::Return)?;

        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon)?;

        Ok(Stmt::Return {
            value,
            span: start.merge(&self.prev_span()),
        })
    }

    fn parse_call(&mut self) -> PResult<Call> {
        let name = self.parse_ident()?;
        self.expect(TokenKind::LParen)?;

        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            self.enter_nesting()?;
            loop {
                args.push(self.parse_expr()?);
                if !self.consume(&TokenKind::Comma) {
                    break;
                }
            }
            self.exit_nesting(1);
        }
        self.expect(TokenKind::RParen)?;

        Ok(Call {
            span: name.span.merge(&self.prev_span()),
            name,
            args,
        })
    }

    // ==================== Expression Parsing ====================

    /// expression := additive (cmp additive)*
    fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_left_assoc(Self::parse_additive, |kind| match kind {
            TokenKind::EqEq => Some(BinOp::Eq),
            TokenKind::Ne => Some(BinOp::Ne),
            TokenKind::Lt => Some(BinOp::Lt),
            TokenKind::Le => Some(BinOp::Le),
            TokenKind::Gt => Some(BinOp::Gt),
            TokenKind::Ge => Some(BinOp::Ge),
            _ => None,
        })
    }

    /// additive := term (('+'|'-') term)*
    fn parse_additive(&mut self) -> PResult<Expr> {
        self.parse_left_assoc(Self::parse_term, |kind| match kind {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            _ => None,
        })
    }

    /// term := factor (('*'|'/') factor)*
    fn parse_term(&mut self) -> PResult<Expr> {
        self.parse_left_assoc(Self::parse_factor, |kind| match kind {
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            _ => None,
        })
    }

    fn parse_left_assoc(
        &mut self,
        operand: fn(&mut Self) -> PResult<Expr>,
        operator: fn(&TokenKind) -> Option<BinOp>,
    ) -> PResult<Expr> {
        let mut left = operand(self)?;
        let mut levels = 0;

        // Each operator deepens the left spine by one node
        while let Some(op) = operator(self.current_kind()) {
            self.enter_nesting()?;
            levels += 1;
            self.advance();
            let right = operand(self)?;
            let span = left.span().merge(&right.span());
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }

        self.exit_nesting(levels);
        Ok(left)
    }

    /// factor := NUMBER | IDENT | call | '(' expression ')'
    fn parse_factor(&mut self) -> PResult<Expr> {
        let token = self.current().clone();

        match token.kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Number(n, token.span))
            }
            TokenKind::Ident(_) => {
                if matches!(self.peek_kind(1), Some(TokenKind::LParen)) {
                    Ok(Expr::Call(self.parse_call()?))
                } else {
                    Ok(Expr::Ident(self.parse_ident()?))
                }
            }
            TokenKind::LParen => {
                self.enter_nesting()?;
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                self.exit_nesting(1);
                Ok(expr)
            }
            _ => Err(self.error("expression")),
        }
    }
}
