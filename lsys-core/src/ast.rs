//! Syntax tree for L-system programs.
//!
//! Every node carries the byte [`Span`] it was parsed from so the compiler
//! can attach diagnostics to exact source ranges.

use lsys_graphics::types::Scalar;

use crate::token::Span;

/// A name with its location: an alphabet symbol, a constant name or an
/// instruction name.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    #[must_use]
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// The four binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }
}

/// An arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Reference to a constant.
    Variable(String),
    /// Numeric literal (possibly negative, see the parser's unary minus).
    Number(Scalar),
    /// Binary operation.
    Binop {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    #[must_use]
    pub const fn number(value: Scalar, span: Span) -> Self {
        Self {
            kind: ExprKind::Number(value),
            span,
        }
    }

    #[must_use]
    pub fn variable(name: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ExprKind::Variable(name.into()),
            span,
        }
    }

    #[must_use]
    pub fn binop(op: BinOp, lhs: Self, rhs: Self) -> Self {
        let span = lhs.span.to(rhs.span);
        Self {
            kind: ExprKind::Binop {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        }
    }

    /// The literal value, if this expression is a bare number.
    #[must_use]
    pub const fn as_literal(&self) -> Option<Scalar> {
        match self.kind {
            ExprKind::Number(n) => Some(n),
            _ => None,
        }
    }
}

/// One instruction in a symbol's block: `name operand operand ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub name: Ident,
    pub operands: Vec<Expr>,
    pub span: Span,
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `name = expr;`
    Constant {
        name: Ident,
        value: Expr,
        span: Span,
    },
    /// `Sym -> Sym ...;`
    Production {
        symbol: Ident,
        replacement: Vec<Ident>,
        span: Span,
    },
    /// `Sym : instr, instr, ...;`
    Instructions {
        symbol: Ident,
        instructions: Vec<Instruction>,
        span: Span,
    },
    /// `^ Sym ...;`
    Axiom { symbols: Vec<Ident>, span: Span },
}

impl Statement {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Constant { span, .. }
            | Self::Production { span, .. }
            | Self::Instructions { span, .. }
            | Self::Axiom { span, .. } => *span,
        }
    }
}

/// A whole program, statements in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
    /// Span of the whole source text.
    pub span: Span,
}

impl Program {
    /// Constant declarations in source order.
    pub fn constants(&self) -> impl Iterator<Item = (&Ident, &Expr)> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Constant { name, value, .. } => Some((name, value)),
            _ => None,
        })
    }
}
