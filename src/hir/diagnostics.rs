//! Diagnostics published per document.
//!
//! Lexical and syntax errors come from the parser; the binder adds its own
//! warnings; a frontend panic is reported as one internal-error diagnostic.

use std::sync::Arc;

use crate::base::{LineIndex, Span, TextRange};
use crate::parser::{SyntaxError, SyntaxErrorKind};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub span: Span,
    pub severity: Severity,
    /// Error/warning code (e.g., "T0001").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(span: Span, message: impl Into<Arc<str>>) -> Self {
        Self {
            span,
            severity: Severity::Error,
            code: None,
            message: message.into(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(span: Span, message: impl Into<Arc<str>>) -> Self {
        Self {
            span,
            severity: Severity::Warning,
            code: None,
            message: message.into(),
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Convert a parser error, locating it through `line_index`.
    pub fn from_syntax_error(error: &SyntaxError, line_index: &LineIndex) -> Self {
        let code = match error.kind {
            SyntaxErrorKind::Lexical => codes::LEXICAL_ERROR,
            SyntaxErrorKind::Syntax => codes::SYNTAX_ERROR,
        };
        Self::error(line_index.span(error.range), error.message.as_str()).with_code(code)
    }

    /// The synthetic diagnostic standing in for a crashed frontend.
    pub fn internal_error(stage: &str, detail: &str) -> Self {
        let span = Span::new(TextRange::default(), 0, 0);
        Self::error(span, format!("internal error while {stage}: {detail}"))
            .with_code(codes::INTERNAL_ERROR)
    }
}

/// Whether any diagnostic in the slice is an error.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Diagnostic codes.
///
/// ## Code Ranges
///
/// - **T0001-T0099**: lexical and syntax errors
/// - **W0001-W0099**: binder warnings
/// - **T9000**: internal error (a frontend stage panicked)
pub mod codes {
    /// Invalid character or unterminated literal.
    pub const LEXICAL_ERROR: &str = "T0001";
    /// Unexpected or missing token.
    pub const SYNTAX_ERROR: &str = "T0002";

    /// Two top-level declarations share a name.
    pub const DUPLICATE_DECLARATION: &str = "W0001";

    /// Lexing or parsing panicked.
    pub const INTERNAL_ERROR: &str = "T9000";
}

/// Extract a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
