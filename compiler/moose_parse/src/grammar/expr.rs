//! Expression grammar: a Pratt loop over interned operator symbols.

use moose_diagnostic::ErrorCode;
use moose_ir::{Expr, ExprId, ExprKind, Span, TokenKind};

use crate::cursor::describe;
use crate::{ParseError, Parser};

/// Binding power of prefix operators.
const PREFIX_BP: u8 = 70;
/// `is` binds at comparison level.
const IS_BP: u8 = 40;

/// Left/right binding powers of the infix operator symbols.
///
/// A symbol absent from this table (only `!`) never binds infix.
fn infix_bp(symbol: &str) -> Option<(u8, u8)> {
    Some(match symbol {
        "||" => (10, 11),
        "&&" => (20, 21),
        "==" | "!=" => (30, 31),
        "<" | "<=" | ">" | ">=" => (40, 41),
        "+" | "-" => (50, 51),
        "*" | "/" | "%" => (60, 61),
        _ => return None,
    })
}

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        self.expr_bp(0)
    }

    pub(crate) fn expr_span(&self, id: ExprId) -> Span {
        self.arena.expr(id).span
    }

    fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.alloc_expr(Expr::new(kind, span))
    }

    fn expr_bp(&mut self, min_bp: u8) -> Result<ExprId, ParseError> {
        let mut lhs = self.parse_primary()?;

        loop {
            match self.cursor.kind() {
                TokenKind::Dot => {
                    self.cursor.advance();
                    let member = self.parse_member()?;
                    let span = self.expr_span(lhs).merge(self.expr_span(member));
                    lhs = self.alloc(ExprKind::Deref { object: lhs, member }, span);
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    self.cursor.skip_newlines();
                    let index = self.parse_expr()?;
                    self.cursor.skip_newlines();
                    let close =
                        self.cursor
                            .expect(TokenKind::RBracket, ErrorCode::E1003, "`]`")?;
                    let span = self.expr_span(lhs).merge(close.span);
                    lhs = self.alloc(ExprKind::Index { object: lhs, index }, span);
                }
                TokenKind::Is => {
                    if IS_BP < min_bp {
                        break;
                    }
                    self.cursor.advance();
                    let (name, name_span) = self.cursor.expect_ident("type name after `is`")?;
                    let span = self.expr_span(lhs).merge(name_span);
                    lhs = self.alloc(ExprKind::Is { value: lhs, name }, span);
                }
                TokenKind::Op(op) => {
                    let symbol = self.cursor.interner().lookup(op);
                    let follower_starts = self.cursor.nth(1).kind.starts_expression();
                    match infix_bp(symbol) {
                        Some((l_bp, r_bp)) if follower_starts => {
                            if l_bp < min_bp {
                                break;
                            }
                            self.cursor.advance();
                            self.cursor.skip_newlines();
                            let right = self.expr_bp(r_bp)?;
                            let span = self.expr_span(lhs).merge(self.expr_span(right));
                            lhs = self.alloc(
                                ExprKind::Infix {
                                    op,
                                    left: lhs,
                                    right,
                                },
                                span,
                            );
                        }
                        _ => {
                            // Nothing follows that could be an operand:
                            // the symbol binds postfix.
                            let op_span = self.cursor.span();
                            self.cursor.advance();
                            let span = self.expr_span(lhs).merge(op_span);
                            lhs = self.alloc(ExprKind::Postfix { op, operand: lhs }, span);
                        }
                    }
                }
                _ => break,
            }
        }

        Ok(lhs)
    }

    fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let token = self.cursor.peek();
        match token.kind {
            TokenKind::Int(n) => {
                self.cursor.advance();
                Ok(self.alloc(ExprKind::Int(n), token.span))
            }
            TokenKind::Float(bits) => {
                self.cursor.advance();
                Ok(self.alloc(ExprKind::Float(bits), token.span))
            }
            TokenKind::Str(name) => {
                self.cursor.advance();
                Ok(self.alloc(ExprKind::Str(name), token.span))
            }
            TokenKind::True => {
                self.cursor.advance();
                Ok(self.alloc(ExprKind::Bool(true), token.span))
            }
            TokenKind::False => {
                self.cursor.advance();
                Ok(self.alloc(ExprKind::Bool(false), token.span))
            }
            TokenKind::Nil => {
                self.cursor.advance();
                Ok(self.alloc(ExprKind::Nil, token.span))
            }
            TokenKind::Me => {
                self.cursor.advance();
                Ok(self.alloc(ExprKind::Me, token.span))
            }
            TokenKind::Ident(name) => {
                self.cursor.advance();
                if self.cursor.kind() == TokenKind::LParen {
                    let (args, close_span) = self.parse_call_args()?;
                    let span = token.span.merge(close_span);
                    Ok(self.alloc(ExprKind::Call { callee: name, args }, span))
                } else {
                    Ok(self.alloc(ExprKind::Ident(name), token.span))
                }
            }
            TokenKind::Op(op) => {
                self.cursor.advance();
                let operand = self.expr_bp(PREFIX_BP)?;
                let span = token.span.merge(self.expr_span(operand));
                Ok(self.alloc(ExprKind::Prefix { op, operand }, span))
            }
            TokenKind::LParen => self.parse_paren_or_tuple(),
            TokenKind::LBracket => self.parse_list(),
            other => Err(ParseError::new(
                ErrorCode::E1002,
                format!(
                    "expected expression, found {}",
                    describe(other, self.cursor.interner())
                ),
                token.span,
            )),
        }
    }

    /// The member after `.`: an identifier, optionally called.
    fn parse_member(&mut self) -> Result<ExprId, ParseError> {
        let (name, name_span) = self.cursor.expect_ident("member name after `.`")?;
        if self.cursor.kind() == TokenKind::LParen {
            let (args, close_span) = self.parse_call_args()?;
            let span = name_span.merge(close_span);
            Ok(self.alloc(ExprKind::Call { callee: name, args }, span))
        } else {
            Ok(self.alloc(ExprKind::Ident(name), name_span))
        }
    }

    /// Parenthesized argument list; returns the args and the `)` span.
    fn parse_call_args(&mut self) -> Result<(moose_ir::ExprRange, Span), ParseError> {
        self.cursor
            .expect(TokenKind::LParen, ErrorCode::E1001, "`(`")?;
        let mut args = Vec::new();
        self.cursor.skip_newlines();
        if self.cursor.kind() != TokenKind::RParen {
            loop {
                args.push(self.parse_expr()?);
                self.cursor.skip_newlines();
                if !self.cursor.eat(TokenKind::Comma) {
                    break;
                }
                self.cursor.skip_newlines();
            }
        }
        let close = self
            .cursor
            .expect(TokenKind::RParen, ErrorCode::E1003, "`)`")?;
        Ok((self.arena.alloc_expr_list(args), close.span))
    }

    /// `(expr)` is grouping; `(a, b, ...)` is a tuple literal.
    fn parse_paren_or_tuple(&mut self) -> Result<ExprId, ParseError> {
        let open = self
            .cursor
            .expect(TokenKind::LParen, ErrorCode::E1001, "`(`")?;
        self.cursor.skip_newlines();
        let first = self.parse_expr()?;
        self.cursor.skip_newlines();

        if self.cursor.kind() != TokenKind::Comma {
            self.cursor
                .expect(TokenKind::RParen, ErrorCode::E1003, "`)`")?;
            return Ok(first);
        }

        let mut items = vec![first];
        while self.cursor.eat(TokenKind::Comma) {
            self.cursor.skip_newlines();
            items.push(self.parse_expr()?);
            self.cursor.skip_newlines();
        }
        let close = self
            .cursor
            .expect(TokenKind::RParen, ErrorCode::E1003, "`)`")?;
        let range = self.arena.alloc_expr_list(items);
        Ok(self.alloc(ExprKind::Tuple(range), open.span.merge(close.span)))
    }

    fn parse_list(&mut self) -> Result<ExprId, ParseError> {
        let open = self
            .cursor
            .expect(TokenKind::LBracket, ErrorCode::E1001, "`[`")?;
        let mut items = Vec::new();
        self.cursor.skip_newlines();
        if self.cursor.kind() != TokenKind::RBracket {
            loop {
                items.push(self.parse_expr()?);
                self.cursor.skip_newlines();
                if !self.cursor.eat(TokenKind::Comma) {
                    break;
                }
                self.cursor.skip_newlines();
            }
        }
        let close = self
            .cursor
            .expect(TokenKind::RBracket, ErrorCode::E1003, "`]`")?;
        let range = self.arena.alloc_expr_list(items);
        Ok(self.alloc(ExprKind::List(range), open.span.merge(close.span)))
    }
}
