//! Lexer for Moose using logos with string interning.
//!
//! The main entry point is [`lex()`], which converts source text into
//! a [`TokenList`] plus a list of lexical errors. Invalid tokens
//! become `TokenKind::Error` and lexing continues, so one run reports
//! every lexical problem in the file.
//!
//! # Token Types
//!
//! - **Literals**: 64-bit integers, floats, strings, `true`/`false`, `nil`
//! - **Keywords**: reserved words (`if`, `func`, `class`, ...)
//! - **Symbols**: operator symbols (interned), delimiters, punctuation
//! - **Identifiers**: user-defined names (interned)
//!
//! Newlines are kept as tokens (they separate statements); comments
//! are dropped.

mod convert;
mod raw_token;

use logos::Logos;
use moose_diagnostic::{Diagnostic, ErrorCode};
use moose_ir::{Span, StringInterner, Token, TokenKind, TokenList};

use convert::convert_token;
use raw_token::RawToken;

/// A lexical error with its location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// The kinds of lexical error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexErrorKind {
    /// A character no token can start with.
    InvalidCharacter,
    /// A string literal missing its closing quote.
    UnterminatedString,
    /// A numeric literal out of range.
    InvalidNumber,
}

impl LexError {
    /// Render as a diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, message) = match self.kind {
            LexErrorKind::InvalidCharacter => {
                (ErrorCode::E0001, "invalid character in source".to_string())
            }
            LexErrorKind::UnterminatedString => {
                (ErrorCode::E0002, "unterminated string literal".to_string())
            }
            LexErrorKind::InvalidNumber => {
                (ErrorCode::E0003, "number literal out of range".to_string())
            }
        };
        Diagnostic::error(code, message).with_span(self.span)
    }
}

/// Lex source code into a [`TokenList`].
///
/// Always produces a list ending in `Eof`. Errors are returned
/// alongside; the corresponding positions hold `TokenKind::Error`.
pub fn lex(source: &str, interner: &StringInterner) -> (TokenList, Vec<LexError>) {
    let mut result = TokenList::new();
    let mut errors = Vec::new();
    let mut logos = RawToken::lexer(source);

    while let Some(token_result) = logos.next() {
        let span = Span::from_range(logos.span());
        let slice = logos.slice();

        match token_result {
            Ok(RawToken::LineComment) => {}
            Ok(RawToken::Newline) => {
                result.push(Token::new(TokenKind::Newline, span));
            }
            Ok(raw) => match convert_token(raw, slice, span, interner) {
                Ok(kind) => result.push(Token::new(kind, span)),
                Err(err) => {
                    errors.push(err);
                    result.push(Token::new(TokenKind::Error, span));
                }
            },
            Err(()) => {
                errors.push(LexError {
                    kind: LexErrorKind::InvalidCharacter,
                    span,
                });
                result.push(Token::new(TokenKind::Error, span));
            }
        }
    }

    let eof_pos = u32::try_from(source.len()).unwrap_or(u32::MAX);
    result.push(Token::new(TokenKind::Eof, Span::point(eof_pos)));
    (result, errors)
}

#[cfg(test)]
mod tests;
