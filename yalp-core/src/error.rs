//! Structured diagnostics and the runtime error type.
//!
//! Build-time failures accumulate into a batch so the caller sees every
//! problem at once instead of stopping at the first one (section 7 of
//! the spec). Runtime failures are a plain [`thiserror`] enum, mirroring
//! `core/src/error.rs` in the teacher repo.

use itertools::Itertools as _;
use thiserror::Error;

use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single structured entry on the build-time diagnostic channel.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub span: Option<Span>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            span: None,
            message: message.into(),
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            span: None,
            message: message.into(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn emit(&self) {
        match self.severity {
            Severity::Error => tracing::error!(code = self.code, "{}", self.message),
            Severity::Warning => tracing::warn!(code = self.code, "{}", self.message),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: [{}] {}", self.severity, self.code, self.message)?;
        if let Some(span) = &self.span {
            write!(f, " ({span})")?;
        }
        Ok(())
    }
}

/// A batch of diagnostics produced by a failed build. Always contains
/// at least one entry with [`Severity::Error`].
#[derive(Debug, Clone, Error)]
#[error("{}", .0.iter().join("\n"))]
pub struct DiagnosticBatch(pub Vec<Diagnostic>);

impl DiagnosticBatch {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| !d.is_error())
    }
}

/// Marker type used when a parser has no custom user-error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no custom error")]
pub struct NoCustomError;

/// Runtime error kinds raised by the lexer and parser drivers.
#[derive(Debug, Clone, Error)]
pub enum ErrorKind<C> {
    #[error("no lexer rule matched the input at {0}")]
    LexError(Span),

    #[error("unknown token kind {0:?} returned by a lexer action")]
    UnknownTokenKind(String),

    #[error("unexpected symbol {got}, expecting one of [{expecting}]")]
    UnexpectedSymbol { got: String, expecting: String },

    #[error("parse error at {0:?}")]
    ParseError(Option<Span>),

    #[error("parser could not recover from a syntax error: the stack was exhausted")]
    Unrecoverable,

    #[error("{0}")]
    Custom(C),
}

impl<C> ErrorKind<C> {
    pub fn unexpected_symbol<I, S>(got: &str, expecting: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self::UnexpectedSymbol {
            got: got.to_string(),
            expecting: expecting.into_iter().map(|s| s.to_string()).join(", "),
        }
    }
}

/// The error type threaded through lexer and parser runtime operations.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct YalpError<C> {
    pub kind: ErrorKind<C>,
    pub span: Option<Span>,
}

impl<C> YalpError<C> {
    pub fn new(kind: impl Into<ErrorKind<C>>, span: Option<Span>) -> Self {
        Self {
            kind: kind.into(),
            span,
        }
    }

    pub fn custom(value: C, span: Option<Span>) -> Self {
        Self::new(ErrorKind::Custom(value), span)
    }
}

impl<C> From<ErrorKind<C>> for YalpError<C> {
    fn from(kind: ErrorKind<C>) -> Self {
        Self { kind, span: None }
    }
}

pub type YalpResult<T, C> = Result<T, YalpError<C>>;
