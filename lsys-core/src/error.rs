//! Error types for the L-system compiler and growth engine.

use std::fmt;

use serde::Serialize;

use crate::token::Span;

// ---------------------------------------------------------------------------
// Error severity
// ---------------------------------------------------------------------------

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Compilation still produces a program.
    Warning,
    /// Compilation produces no program.
    Error,
}

// ---------------------------------------------------------------------------
// Compiler diagnostic
// ---------------------------------------------------------------------------

/// A diagnostic produced while scanning, parsing or compiling a program.
///
/// The flat `{start, end, message}` shape maps directly onto editor
/// gutter and inline diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompilerError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Source location.
    pub span: Span,
    /// Severity.
    pub severity: Severity,
}

impl CompilerError {
    /// Create a new error-severity diagnostic.
    ///
    /// Kinds that are warning-grade by nature ([`ErrorKind::is_warning`])
    /// start out as warnings.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let severity = if kind.is_warning() {
            Severity::Warning
        } else {
            Severity::Error
        };
        Self {
            kind,
            message: message.into(),
            span: Span::default(),
            severity,
        }
    }

    /// Attach a source span.
    #[must_use]
    pub const fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Set severity.
    #[must_use]
    pub const fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Start byte offset.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.span.start
    }

    /// End byte offset.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.span.end
    }

    /// Whether this diagnostic prevents a program from being produced.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{}] {}", self.span.start, self.span.end, self.message)
    }
}

impl std::error::Error for CompilerError {}

/// Whether any diagnostic in the list is error-grade.
pub fn has_errors(diagnostics: &[CompilerError]) -> bool {
    diagnostics.iter().any(CompilerError::is_error)
}

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

/// Categories of diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    // -- Scan / parse errors --
    /// Character outside the language.
    InvalidCharacter,
    /// Token that does not fit the statement being parsed.
    UnexpectedToken,
    /// Token that cannot begin or continue an expression.
    UnsupportedExpressionForm,
    /// Expression nested past the parser's depth limit.
    NestingTooDeep,

    // -- Expression errors --
    /// Reference to a constant that is not (yet) defined.
    UndefinedVariable,
    /// Division whose divisor evaluated to zero.
    DivisionByZero,

    // -- Declaration errors --
    /// Constant declared twice.
    DuplicateConstant,
    /// Two production rules with the same left-hand side.
    DuplicateProductionRule,
    /// Two instruction blocks for the same symbol.
    DuplicateInstructionBlock,
    /// Symbol used where only alphabet members are allowed.
    UnknownAlphabetSymbol,
    /// Instruction name not in the built-in function table.
    UnknownInstruction,
    /// No overload of an instruction accepts the given operand count.
    NoMatchingOverload,
    /// No `^` axiom declaration.
    MissingAxiom,
    /// More than one `^` axiom declaration.
    MultipleAxioms,

    // -- Geometry --
    /// A draw executed with a singular accumulated transform.
    DegenerateTransform,
}

impl ErrorKind {
    /// Kinds that never block compilation.
    #[must_use]
    pub const fn is_warning(self) -> bool {
        matches!(self, Self::DivisionByZero | Self::DegenerateTransform)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCharacter => write!(f, "invalid character"),
            Self::UnexpectedToken => write!(f, "unexpected token"),
            Self::UnsupportedExpressionForm => write!(f, "unsupported expression"),
            Self::NestingTooDeep => write!(f, "nesting too deep"),
            Self::UndefinedVariable => write!(f, "undefined variable"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::DuplicateConstant => write!(f, "duplicate constant"),
            Self::DuplicateProductionRule => write!(f, "duplicate production rule"),
            Self::DuplicateInstructionBlock => write!(f, "duplicate instruction block"),
            Self::UnknownAlphabetSymbol => write!(f, "unknown alphabet symbol"),
            Self::UnknownInstruction => write!(f, "unknown instruction"),
            Self::NoMatchingOverload => write!(f, "no matching overload"),
            Self::MissingAxiom => write!(f, "missing axiom"),
            Self::MultipleAxioms => write!(f, "multiple axioms"),
            Self::DegenerateTransform => write!(f, "degenerate transform"),
        }
    }
}

// ---------------------------------------------------------------------------
// Structural errors
// ---------------------------------------------------------------------------

/// A specification or application that violates the alphabet invariant.
///
/// These never come from user source that compiled cleanly; they indicate
/// a caller built a specification by hand or bypassed the compiler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternError {
    #[error("Axiom must consist of members from alphabet (found '{0}').")]
    AxiomSymbolNotInAlphabet(String),
    #[error("Substitutions must consist of members from alphabet (found '{0}').")]
    SubstitutionSymbolNotInAlphabet(String),
    #[error("Application refers to symbol '{0}' outside the alphabet.")]
    ApplicationSymbolNotInAlphabet(String),
    #[error("Alphabet lists symbol '{0}' more than once.")]
    DuplicateAlphabetSymbol(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
