//! Token conversion: raw logos tokens to interned `TokenKind`s.

use moose_ir::{StringInterner, TokenKind};

use crate::raw_token::RawToken;
use crate::{LexError, LexErrorKind};

/// Fold escape sequences in a string literal body.
///
/// Supported escapes: `\n`, `\r`, `\t`, `\\`, `\"`, `\0`. An
/// unrecognized escape is preserved literally.
pub(crate) fn fold_escapes(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('0') => out.push('\0'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Convert a raw token to its final `TokenKind`, interning as needed.
///
/// Returns `Err` for raw tokens that are lexically invalid (bad number
/// literals, unterminated strings); the caller records the error and
/// emits `TokenKind::Error` so parsing can continue.
pub(crate) fn convert_token(
    raw: RawToken,
    slice: &str,
    span: moose_ir::Span,
    interner: &StringInterner,
) -> Result<TokenKind, LexError> {
    let kind = match raw {
        RawToken::Mut => TokenKind::Mut,
        RawToken::Return => TokenKind::Return,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::Func => TokenKind::Func,
        RawToken::Class => TokenKind::Class,
        RawToken::Prefix => TokenKind::Prefix,
        RawToken::Infix => TokenKind::Infix,
        RawToken::Postfix => TokenKind::Postfix,
        RawToken::Me => TokenKind::Me,
        RawToken::Is => TokenKind::Is,
        RawToken::Nil => TokenKind::Nil,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,

        RawToken::Int => {
            let digits: String = slice.chars().filter(|c| *c != '_').collect();
            match digits.parse::<i64>() {
                Ok(n) => TokenKind::Int(n),
                Err(_) => {
                    return Err(LexError {
                        kind: LexErrorKind::InvalidNumber,
                        span,
                    })
                }
            }
        }
        RawToken::Float => {
            let digits: String = slice.chars().filter(|c| *c != '_').collect();
            match digits.parse::<f64>() {
                Ok(f) => TokenKind::Float(f.to_bits()),
                Err(_) => {
                    return Err(LexError {
                        kind: LexErrorKind::InvalidNumber,
                        span,
                    })
                }
            }
        }
        RawToken::Str => {
            let body = &slice[1..slice.len() - 1];
            TokenKind::Str(interner.intern(&fold_escapes(body)))
        }
        RawToken::UnterminatedStr => {
            return Err(LexError {
                kind: LexErrorKind::UnterminatedString,
                span,
            })
        }

        RawToken::Ident => TokenKind::Ident(interner.intern(slice)),

        RawToken::EqEq
        | RawToken::NotEq
        | RawToken::LtEq
        | RawToken::GtEq
        | RawToken::AndAnd
        | RawToken::OrOr
        | RawToken::Plus
        | RawToken::Minus
        | RawToken::Star
        | RawToken::Slash
        | RawToken::Percent
        | RawToken::Lt
        | RawToken::Gt
        | RawToken::Bang => TokenKind::Op(interner.intern(slice)),

        RawToken::Arrow => TokenKind::Arrow,
        RawToken::Assign => TokenKind::Assign,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Semi => TokenKind::Semi,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,

        // Trivia is filtered before conversion.
        RawToken::LineComment | RawToken::Newline => unreachable!("trivia reaches convert_token"),
    };
    Ok(kind)
}
