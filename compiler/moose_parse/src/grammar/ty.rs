//! Type annotations.

use moose_diagnostic::ErrorCode;
use moose_ir::types::ParamType;
use moose_ir::{MooseType, TokenKind};

use crate::cursor::describe;
use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Parse a type annotation.
    ///
    /// The well-known names (`Int`, `Float`, `Bool`, `String`, `Void`,
    /// `Nil`) are resolved here; any other identifier is a class type.
    pub(crate) fn parse_type(&mut self) -> Result<MooseType, ParseError> {
        match self.cursor.kind() {
            TokenKind::Ident(name) => {
                self.cursor.advance();
                Ok(match self.cursor.interner().lookup(name) {
                    "Int" => MooseType::Integer,
                    "Float" => MooseType::Float,
                    "Bool" => MooseType::Bool,
                    "String" => MooseType::String,
                    "Void" => MooseType::Void,
                    "Nil" => MooseType::Nil,
                    _ => MooseType::Class(name),
                })
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                let elem = self.parse_type()?;
                self.cursor
                    .expect(TokenKind::RBracket, ErrorCode::E1003, "`]`")?;
                Ok(MooseType::List(Box::new(elem)))
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let mut items = vec![self.parse_type()?];
                while self.cursor.eat(TokenKind::Comma) {
                    items.push(self.parse_type()?);
                }
                self.cursor
                    .expect(TokenKind::RParen, ErrorCode::E1003, "`)`")?;
                // A single parenthesized type is just grouping.
                if items.len() == 1 {
                    Ok(items.pop().expect("one item"))
                } else {
                    Ok(MooseType::Tuple(items))
                }
            }
            TokenKind::Func => {
                self.cursor.advance();
                self.cursor
                    .expect(TokenKind::LParen, ErrorCode::E1005, "`(`")?;
                let mut params = Vec::new();
                if self.cursor.kind() != TokenKind::RParen {
                    params.push(ParamType::new(self.parse_type()?));
                    while self.cursor.eat(TokenKind::Comma) {
                        params.push(ParamType::new(self.parse_type()?));
                    }
                }
                self.cursor
                    .expect(TokenKind::RParen, ErrorCode::E1003, "`)`")?;
                self.cursor
                    .expect(TokenKind::Arrow, ErrorCode::E1005, "`->`")?;
                let ret = self.parse_type()?;
                Ok(MooseType::Function {
                    params,
                    ret: Box::new(ret),
                })
            }
            other => Err(ParseError::new(
                ErrorCode::E1005,
                format!(
                    "expected type, found {}",
                    describe(other, self.cursor.interner())
                ),
                self.cursor.span(),
            )),
        }
    }
}
