//! Token types for the L-system scanner.
//!
//! The scanner produces four kinds of tokens:
//! - **Identifiers**: symbol names, constant names and instruction names
//! - **Numbers**: non-negative floating-point literals (`-` is a separate
//!   token)
//! - **Punctuation**: `->`, `:`, `;`, `,`, `=`, `^`, `(`, `)` and the four
//!   arithmetic operators
//! - **Eof**
//!
//! Whether an identifier names a symbol, a constant or an instruction is
//! decided by the parser from its position in a statement.

use lsys_graphics::types::Scalar;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Source location
// ---------------------------------------------------------------------------

/// A byte-offset span in the source input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A zero-length span at the given position.
    #[must_use]
    pub const fn at(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Smallest span covering both `self` and `other`.
    #[must_use]
    pub const fn to(self, other: Self) -> Self {
        let start = if self.start < other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end > other.end {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The slice of `src` this span covers, if in bounds.
    #[must_use]
    pub fn slice(self, src: &str) -> Option<&str> {
        src.get(self.start..self.end)
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// A lexical token produced by the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind and value of the token.
    pub kind: TokenKind,
    /// Source location.
    pub span: Span,
    /// Whether whitespace or a comment separates this token from the
    /// previous one. Operand lists are whitespace-separated, so the parser
    /// needs this to tell `a -b` (two operands) from `a - b` (one).
    pub space_before: bool,
}

/// The kind and payload of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// An identifier: `[A-Za-z_][A-Za-z0-9_]*`.
    Ident(String),
    /// A non-negative numeric literal.
    Number(Scalar),
    /// `->`
    Arrow,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `=`
    Equals,
    /// `^`
    Caret,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Returns `true` if this is an identifier.
    #[must_use]
    pub const fn is_ident(&self) -> bool {
        matches!(self, Self::Ident(_))
    }

    /// Returns `true` if this is end-of-input.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /// Whether this token can begin an expression.
    #[must_use]
    pub const fn starts_expression(&self) -> bool {
        matches!(
            self,
            Self::Ident(_) | Self::Number(_) | Self::LeftParen | Self::Minus
        )
    }

    /// Short human-readable description for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("'{name}'"),
            Self::Number(n) => format!("number {n}"),
            Self::Arrow => "'->'".into(),
            Self::Colon => "':'".into(),
            Self::Semicolon => "';'".into(),
            Self::Comma => "','".into(),
            Self::Equals => "'='".into(),
            Self::Caret => "'^'".into(),
            Self::LeftParen => "'('".into(),
            Self::RightParen => "')'".into(),
            Self::Plus => "'+'".into(),
            Self::Minus => "'-'".into(),
            Self::Star => "'*'".into(),
            Self::Slash => "'/'".into(),
            Self::Eof => "end of input".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
