//! Error types for the scene compiler and VM.
//!
//! Every user-facing error carries a [`Span`](crate::ast::Span) so the
//! diagnostic reporter can slice the offending source line. Internal
//! invariant violations (bugs in this crate, not in the user's program) are
//! raised with [`bug!`] rather than folded into these `Result` types — a
//! caller is never expected to recover from them.
//!
//! # Error categories
//!
//! - [`LexError`]: tokenization failures.
//! - [`ParseError`]: grammar failures, including unrecovered speculative rules.
//! - [`SemanticError`]: name resolution, type checking, and dependency-graph failures.
//! - [`VmError`]: failures raised while executing bytecode.

use crate::ast::Span;
use crate::types::Type;
use thiserror::Error;

/// Errors produced by the [`Lexer`](crate::lexer::Lexer).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    /// A character outside the language's alphabet, or a lone `&`/`|` not
    /// followed by its pair.
    #[error("illegal symbol '{ch}' at line {}, column {}", span.line, span.column)]
    IllegalSymbol { ch: char, span: Span },

    /// A string literal contains an unescaped newline before its closing quote.
    #[error("stray newline in string literal starting at line {}, column {}", span.line, span.column)]
    StrayNewlineInStringLiteral { span: Span },

    /// End of file reached before a string literal's closing quote.
    #[error("unclosed string literal starting at line {}, column {}", span.line, span.column)]
    UnclosedStringLiteral { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::IllegalSymbol { span, .. }
            | LexError::StrayNewlineInStringLiteral { span }
            | LexError::UnclosedStringLiteral { span } => *span,
        }
    }
}

/// Errors produced by the [`Parser`](crate::parser::Parser).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} at line {}, column {} (found '{lexeme}')", span.line, span.column)]
pub struct ParseError {
    pub message: String,
    pub lexeme: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            lexeme: lexeme.into(),
            span,
        }
    }
}

/// Errors produced by the semantic pass (name resolution, type checking,
/// indexing, dependency ordering).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    #[error("no symbol named '{name}' at line {}, column {}", span.line, span.column)]
    UnresolvedName { name: String, span: Span },

    #[error("'{name}' is a {found}, not a {expected} at line {}, column {}", span.line, span.column)]
    WrongSymbolCategory {
        name: String,
        expected: &'static str,
        found: &'static str,
        span: Span,
    },

    #[error(
        "'{name}' expects {expected} argument(s), found {found} at line {}, column {}",
        span.line, span.column
    )]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("type mismatch: expected {expected}, found {found} at line {}, column {}", span.line, span.column)]
    TypeMismatch {
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("invalid assignment target at line {}, column {}", span.line, span.column)]
    InvalidLvalue { span: Span },

    #[error("a compile unit must contain exactly one component instance document, found {found}")]
    WrongInstanceDocumentCount { found: usize },

    #[error("loop detected in property dependency, first witnessed at '{witness}'")]
    DependencyCycle { witness: String },

    #[error("duplicate instance id '{id}' at line {}, column {}", span.line, span.column)]
    DuplicateInstanceId { id: String, span: Span },

    #[error("'{keyword}' outside a loop body at line {}, column {}", span.line, span.column)]
    MisplacedLoopControl { keyword: &'static str, span: Span },
}

impl SemanticError {
    pub fn span(&self) -> Option<Span> {
        match self {
            SemanticError::UnresolvedName { span, .. }
            | SemanticError::WrongSymbolCategory { span, .. }
            | SemanticError::ArityMismatch { span, .. }
            | SemanticError::TypeMismatch { span, .. }
            | SemanticError::InvalidLvalue { span }
            | SemanticError::DuplicateInstanceId { span, .. }
            | SemanticError::MisplacedLoopControl { span, .. } => Some(*span),
            SemanticError::WrongInstanceDocumentCount { .. }
            | SemanticError::DependencyCycle { .. } => None,
        }
    }
}

/// Errors raised while the virtual machine executes bytecode.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VmError {
    #[error("division by zero at instruction {ip}")]
    DivisionByZero { ip: usize },

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

/// A single error from any stage of the pipeline, used by the top-level
/// driver to report a uniform diagnostic regardless of which stage failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    Vm(#[from] VmError),
}

impl CompileError {
    /// The span to underline when rendering this error, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Lex(LexError::IllegalSymbol { span, .. })
            | CompileError::Lex(LexError::StrayNewlineInStringLiteral { span })
            | CompileError::Lex(LexError::UnclosedStringLiteral { span }) => Some(*span),
            CompileError::Parse(e) => Some(e.span),
            CompileError::Semantic(e) => e.span(),
            CompileError::Vm(_) => None,
        }
    }
}

/// Panics with a message identifying the failure as an internal invariant
/// violation rather than a user-facing compile error. Used in places the
/// symbol pass is expected to have already ruled out (e.g. an opcode
/// encountering an operand category that type checking should have
/// rejected).
#[macro_export]
macro_rules! bug {
    ($($arg:tt)*) => {
        panic!("internal invariant violated: {}", format!($($arg)*))
    };
}
