//! Recursive descent parser for Moose.
//!
//! Produces the flat `moose_ir` AST. Statements are parsed with
//! single-token dispatch; expressions with a Pratt loop whose binding
//! powers are keyed by operator symbol. Errors synchronize at
//! statement boundaries so one run reports as many problems as
//! possible.

mod cursor;
mod error;
mod grammar;

#[cfg(test)]
mod tests;

pub use cursor::Cursor;
pub use error::ParseError;

use moose_ir::{Arena, Module, StringInterner, TokenKind, TokenList};

/// Parser state.
pub struct Parser<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) arena: Arena,
    pub(crate) errors: Vec<ParseError>,
}

/// Result of parsing a token stream.
pub struct Parsed {
    pub module: Module,
    pub arena: Arena,
    pub errors: Vec<ParseError>,
}

impl Parsed {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse a token stream into a module.
pub fn parse(tokens: &TokenList, interner: &StringInterner) -> Parsed {
    let mut parser = Parser {
        cursor: Cursor::new(tokens, interner),
        arena: Arena::new(),
        errors: Vec::new(),
    };

    let mut stmts = Vec::new();
    loop {
        parser.cursor.skip_separators();
        if parser.cursor.at_eof() {
            break;
        }
        match parser.parse_statement() {
            Ok(stmt) => stmts.push(stmt),
            Err(err) => {
                parser.errors.push(err);
                parser.synchronize();
            }
        }
    }

    Parsed {
        module: Module { stmts },
        arena: parser.arena,
        errors: parser.errors,
    }
}

impl Parser<'_> {
    /// Skip to the next statement boundary after an error.
    pub(crate) fn synchronize(&mut self) {
        loop {
            match self.cursor.kind() {
                TokenKind::Newline | TokenKind::Semi => {
                    self.cursor.advance();
                    return;
                }
                TokenKind::RBrace | TokenKind::Eof => return,
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }
}
