//! Recursive-descent parser producing the [`Program`] syntax tree.
//!
//! ```text
//! program     := statement*
//! statement   := IDENT '=' expr ';'
//!              | IDENT '->' IDENT* ';'
//!              | IDENT ':' [instruction (',' instruction)*] ';'
//!              | '^' IDENT* ';'
//! instruction := IDENT operand*
//! expr        := term (('+' | '-') term)*
//! term        := unary (('*' | '/') unary)*
//! unary       := '-' unary | primary
//! primary     := NUMBER | IDENT | '(' expr ')'
//! ```
//!
//! Operands of an instruction are separated by whitespace. Inside an
//! operand list a `-` with whitespace before it and none after it starts
//! a new, negated operand instead of continuing a subtraction, so
//! `m 1 -2 3` has three operands while `m 1 - 2 3` has two.
//!
//! On a syntax error the parser records a diagnostic and skips to the
//! next `;`, so every malformed statement is reported in one pass.
//!
//! Expression trees are at most [`MAX_NESTING`] levels deep. Parentheses,
//! unary minus and each operator of a chain count as one level.

use crate::ast::{BinOp, Expr, Ident, Instruction, Program, Statement};
use crate::error::{CompilerError, ErrorKind};
use crate::scanner::Scanner;
use crate::token::{Span, Token, TokenKind};

type ParseResult<T> = Result<T, CompilerError>;

/// Deepest expression tree the parser builds.
pub const MAX_NESTING: usize = 128;

/// Parse a whole source text.
///
/// Returns the statements that parsed cleanly together with every scan
/// and parse diagnostic. A non-empty diagnostic list means the tree is
/// incomplete.
pub fn parse(source: &str) -> (Program, Vec<CompilerError>) {
    let mut scanner = Scanner::new(source);
    let tokens = scanner.scan_all();
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        errors: scanner.take_errors(),
    };

    let mut statements = Vec::new();
    while !parser.peek().kind.is_eof() {
        match parser.statement() {
            Ok(stmt) => statements.push(stmt),
            Err(err) => {
                parser.errors.push(err);
                parser.depth = 0;
                parser.synchronize();
            }
        }
    }

    let program = Program {
        statements,
        span: Span::new(0, source.len()),
    };
    (program, parser.errors)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Current expression nesting.
    depth: usize,
    errors: Vec<CompilerError>,
}

impl Parser {
    // -- token cursor --

    fn peek(&self) -> &Token {
        // The scanner always ends the stream with Eof and the cursor never
        // moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if !tok.kind.is_eof() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn expect(&mut self, kind: &TokenKind, context: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("Expected {} {context}", kind.describe())))
        }
    }

    fn unexpected(&self, what: &str) -> CompilerError {
        let tok = self.peek();
        CompilerError::new(
            ErrorKind::UnexpectedToken,
            format!("{what}, found {}.", tok.kind.describe()),
        )
        .with_span(tok.span)
    }

    /// Enter one more expression level.
    fn deepen(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(CompilerError::new(
                ErrorKind::NestingTooDeep,
                format!("Expression is nested more than {MAX_NESTING} levels deep."),
            )
            .with_span(self.peek().span));
        }
        Ok(())
    }

    /// Skip past the next `;` (or to end of input).
    fn synchronize(&mut self) {
        loop {
            let tok = self.advance();
            if matches!(tok.kind, TokenKind::Semicolon | TokenKind::Eof) {
                return;
            }
        }
    }

    fn ident(&mut self, context: &str) -> ParseResult<Ident> {
        let tok = self.peek().clone();
        if let TokenKind::Ident(name) = tok.kind {
            self.advance();
            Ok(Ident::new(name, tok.span))
        } else {
            Err(self.unexpected(&format!("Expected {context}")))
        }
    }

    /// Identifiers up to the terminating `;`, which is consumed.
    fn symbol_list(&mut self) -> ParseResult<(Vec<Ident>, Span)> {
        let mut symbols = Vec::new();
        loop {
            if self.check(&TokenKind::Semicolon) {
                let end = self.advance().span;
                return Ok((symbols, end));
            }
            symbols.push(self.ident("a symbol or ';'")?);
        }
    }

    // -- statements --

    fn statement(&mut self) -> ParseResult<Statement> {
        let first = self.peek().clone();
        if first.kind == TokenKind::Caret {
            self.advance();
            let (symbols, end) = self.symbol_list()?;
            return Ok(Statement::Axiom {
                symbols,
                span: first.span.to(end),
            });
        }

        let name = self.ident("a statement")?;
        match self.peek().kind {
            TokenKind::Equals => {
                self.advance();
                let value = self.expr(false)?;
                let end = self.expect(&TokenKind::Semicolon, "after constant value")?;
                Ok(Statement::Constant {
                    name,
                    value,
                    span: first.span.to(end.span),
                })
            }
            TokenKind::Arrow => {
                self.advance();
                let (replacement, end) = self.symbol_list()?;
                Ok(Statement::Production {
                    symbol: name,
                    replacement,
                    span: first.span.to(end),
                })
            }
            TokenKind::Colon => {
                self.advance();
                let instructions = self.instruction_list()?;
                let end = self.expect(&TokenKind::Semicolon, "after instructions")?;
                Ok(Statement::Instructions {
                    symbol: name,
                    instructions,
                    span: first.span.to(end.span),
                })
            }
            _ => Err(self.unexpected(&format!(
                "Expected '=', '->' or ':' after '{}'",
                name.name
            ))),
        }
    }

    fn instruction_list(&mut self) -> ParseResult<Vec<Instruction>> {
        let mut instructions = Vec::new();
        if self.check(&TokenKind::Semicolon) {
            return Ok(instructions);
        }
        loop {
            instructions.push(self.instruction()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                return Ok(instructions);
            }
        }
    }

    fn instruction(&mut self) -> ParseResult<Instruction> {
        let name = self.ident("an instruction name")?;
        let mut operands = Vec::new();
        let mut span = name.span;
        while self.peek().kind.starts_expression() {
            let operand = self.expr(true)?;
            span = span.to(operand.span);
            operands.push(operand);
        }
        Ok(Instruction {
            name,
            operands,
            span,
        })
    }

    // -- expressions --

    /// Whether the current `-` begins a new operand rather than
    /// continuing a subtraction.
    fn is_operand_break(&self) -> bool {
        let tok = self.peek();
        tok.kind == TokenKind::Minus
            && tok.space_before
            && self
                .tokens
                .get(self.pos + 1)
                .is_some_and(|next| !next.space_before && next.kind.starts_expression())
    }

    fn expr(&mut self, in_operands: bool) -> ParseResult<Expr> {
        let outer = self.depth;
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus if !(in_operands && self.is_operand_break()) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            self.deepen()?;
            let rhs = self.term()?;
            lhs = Expr::binop(op, lhs, rhs);
        }
        self.depth = outer;
        Ok(lhs)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let outer = self.depth;
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.advance();
            self.deepen()?;
            let rhs = self.unary()?;
            lhs = Expr::binop(op, lhs, rhs);
        }
        self.depth = outer;
        Ok(lhs)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.check(&TokenKind::Minus) {
            let minus = self.advance();
            self.deepen()?;
            let operand = self.unary()?;
            self.depth -= 1;
            let span = minus.span.to(operand.span);
            return Ok(match operand.as_literal() {
                Some(n) => Expr::number(-n, span),
                None => {
                    let mut negated = Expr::binop(BinOp::Sub, Expr::number(0.0, minus.span), operand);
                    negated.span = span;
                    negated
                }
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::number(n, tok.span))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::variable(name, tok.span))
            }
            TokenKind::LeftParen => {
                self.advance();
                self.deepen()?;
                let mut inner = self.expr(false)?;
                self.depth -= 1;
                let close = self.expect(&TokenKind::RightParen, "to close '('")?;
                inner.span = tok.span.to(close.span);
                Ok(inner)
            }
            other => Err(CompilerError::new(
                ErrorKind::UnsupportedExpressionForm,
                format!("Expected an expression, found {}.", other.describe()),
            )
            .with_span(tok.span)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
