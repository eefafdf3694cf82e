//! Parse errors.

use moose_diagnostic::{Diagnostic, ErrorCode};
use moose_ir::Span;

/// A parse error with its location.
#[derive(Clone, Debug)]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        ParseError {
            code,
            message: message.into(),
            span,
        }
    }

    /// Render as a diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code, self.message.clone()).with_span(self.span)
    }
}
