//! Token cursor for navigating the token stream.
//!
//! Provides low-level token access, lookahead, and consumption
//! methods. The cursor never runs past the trailing `Eof` token.

use moose_diagnostic::ErrorCode;
use moose_ir::{Name, Span, StringInterner, Token, TokenKind, TokenList};

use crate::ParseError;

/// Cursor for navigating tokens.
pub struct Cursor<'a> {
    tokens: &'a TokenList,
    interner: &'a StringInterner,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the start of the token stream.
    pub fn new(tokens: &'a TokenList, interner: &'a StringInterner) -> Self {
        debug_assert!(
            matches!(tokens.get(tokens.len().wrapping_sub(1)).map(|t| t.kind), Some(TokenKind::Eof)),
            "token stream must end in Eof"
        );
        Cursor {
            tokens,
            interner,
            pos: 0,
        }
    }

    /// Get a reference to the string interner.
    pub fn interner(&self) -> &'a StringInterner {
        self.interner
    }

    /// The current token (clamped to the trailing `Eof`).
    #[inline]
    pub fn peek(&self) -> Token {
        self.nth(0)
    }

    /// The current token kind.
    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// The current token's span.
    #[inline]
    pub fn span(&self) -> Span {
        self.peek().span
    }

    /// Look ahead `n` tokens (0 = current), clamped to `Eof`.
    pub fn nth(&self, n: usize) -> Token {
        let last = self.tokens.len().saturating_sub(1);
        *self
            .tokens
            .get((self.pos + n).min(last))
            .expect("token stream is never empty")
    }

    /// Consume and return the current token.
    pub fn advance(&mut self) -> Token {
        let token = self.peek();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Whether the cursor is at the end of input.
    #[inline]
    pub fn at_eof(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    /// Whether the current token is an operator with the given symbol.
    pub fn at_op(&self, symbol: &str) -> bool {
        matches!(self.kind(), TokenKind::Op(name) if self.interner.lookup(name) == symbol)
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skip newline tokens.
    pub fn skip_newlines(&mut self) {
        while matches!(self.kind(), TokenKind::Newline) {
            self.advance();
        }
    }

    /// Skip statement separators (newlines and semicolons).
    pub fn skip_separators(&mut self) {
        while matches!(self.kind(), TokenKind::Newline | TokenKind::Semi) {
            self.advance();
        }
    }

    /// Consume a token of the given kind or report an error.
    pub fn expect(
        &mut self,
        kind: TokenKind,
        code: ErrorCode,
        what: &str,
    ) -> Result<Token, ParseError> {
        if self.kind() == kind {
            Ok(self.advance())
        } else {
            Err(ParseError::new(
                code,
                format!("expected {what}, found {}", describe(self.kind(), self.interner)),
                self.span(),
            ))
        }
    }

    /// Consume an identifier or report an error.
    pub fn expect_ident(&mut self, what: &str) -> Result<(Name, Span), ParseError> {
        match self.kind() {
            TokenKind::Ident(name) => {
                let span = self.span();
                self.advance();
                Ok((name, span))
            }
            other => Err(ParseError::new(
                ErrorCode::E1004,
                format!("expected {what}, found {}", describe(other, self.interner)),
                self.span(),
            )),
        }
    }
}

/// Human-readable description of a token kind for error messages.
pub fn describe(kind: TokenKind, interner: &StringInterner) -> String {
    match kind {
        TokenKind::Int(n) => format!("integer `{n}`"),
        TokenKind::Float(bits) => format!("float `{}`", f64::from_bits(bits)),
        TokenKind::Str(_) => "string literal".to_string(),
        TokenKind::True => "`true`".to_string(),
        TokenKind::False => "`false`".to_string(),
        TokenKind::Nil => "`nil`".to_string(),
        TokenKind::Ident(name) => format!("`{}`", interner.lookup(name)),
        TokenKind::Op(name) => format!("`{}`", interner.lookup(name)),
        TokenKind::Mut => "`mut`".to_string(),
        TokenKind::Return => "`return`".to_string(),
        TokenKind::If => "`if`".to_string(),
        TokenKind::Else => "`else`".to_string(),
        TokenKind::Func => "`func`".to_string(),
        TokenKind::Class => "`class`".to_string(),
        TokenKind::Prefix => "`prefix`".to_string(),
        TokenKind::Infix => "`infix`".to_string(),
        TokenKind::Postfix => "`postfix`".to_string(),
        TokenKind::Me => "`me`".to_string(),
        TokenKind::Is => "`is`".to_string(),
        TokenKind::Assign => "`=`".to_string(),
        TokenKind::Arrow => "`->`".to_string(),
        TokenKind::Colon => "`:`".to_string(),
        TokenKind::Comma => "`,`".to_string(),
        TokenKind::Dot => "`.`".to_string(),
        TokenKind::Semi => "`;`".to_string(),
        TokenKind::LParen => "`(`".to_string(),
        TokenKind::RParen => "`)`".to_string(),
        TokenKind::LBracket => "`[`".to_string(),
        TokenKind::RBracket => "`]`".to_string(),
        TokenKind::LBrace => "`{`".to_string(),
        TokenKind::RBrace => "`}`".to_string(),
        TokenKind::Newline => "end of line".to_string(),
        TokenKind::Error => "invalid token".to_string(),
        TokenKind::Eof => "end of input".to_string(),
    }
}
