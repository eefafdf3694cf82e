//! Statement grammar: declarations, control flow, definitions.

use moose_diagnostic::ErrorCode;
use moose_ir::types::OpPosition;
use moose_ir::{
    ClassDef, ExprId, ExprKind, FunctionDef, OperationDef, Param, PropertyDef, Stmt, StmtId,
    StmtKind, TokenKind,
};

use crate::cursor::describe;
use crate::{ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn parse_statement(&mut self) -> Result<StmtId, ParseError> {
        match self.cursor.kind() {
            TokenKind::Mut => {
                let start = self.cursor.advance().span;
                let target = self.parse_expr()?;
                self.parse_assignment(target, true, start)
            }
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::Func => {
                let def = self.parse_function_def()?;
                let span = def.span;
                let id = self.arena.alloc_function(def);
                Ok(self.arena.alloc_stmt(Stmt::new(StmtKind::Function(id), span)))
            }
            TokenKind::Prefix | TokenKind::Infix | TokenKind::Postfix => {
                let def = self.parse_operation_def()?;
                let span = def.span;
                let id = self.arena.alloc_operation(def);
                Ok(self
                    .arena
                    .alloc_stmt(Stmt::new(StmtKind::Operation(id), span)))
            }
            TokenKind::Class => self.parse_class(),
            TokenKind::LBrace => self.parse_block(),
            _ => {
                let expr = self.parse_expr()?;
                if matches!(self.cursor.kind(), TokenKind::Colon | TokenKind::Assign) {
                    let start = self.expr_span(expr);
                    self.parse_assignment(expr, false, start)
                } else {
                    let span = self.expr_span(expr);
                    Ok(self.arena.alloc_stmt(Stmt::new(StmtKind::Expr(expr), span)))
                }
            }
        }
    }

    /// The tail of an assignment, after its target has been parsed.
    fn parse_assignment(
        &mut self,
        target: ExprId,
        mutable: bool,
        start: moose_ir::Span,
    ) -> Result<StmtId, ParseError> {
        self.check_assign_target(target)?;
        let ty = if self.cursor.eat(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.cursor
            .expect(TokenKind::Assign, ErrorCode::E1001, "`=`")?;
        self.cursor.skip_newlines();
        let value = self.parse_expr()?;
        let span = start.merge(self.expr_span(value));
        Ok(self.arena.alloc_stmt(Stmt::new(
            StmtKind::Assign {
                target,
                ty,
                value,
                mutable,
            },
            span,
        )))
    }

    /// Targets must be identifiers, tuples of targets, index
    /// expressions, or member accesses.
    fn check_assign_target(&mut self, target: ExprId) -> Result<(), ParseError> {
        match &self.arena.expr(target).kind {
            ExprKind::Ident(_) | ExprKind::Index { .. } | ExprKind::Deref { .. } => Ok(()),
            ExprKind::Tuple(range) => {
                let elems: Vec<ExprId> = self.arena.exprs(*range).to_vec();
                for elem in elems {
                    self.check_assign_target(elem)?;
                }
                Ok(())
            }
            _ => Err(ParseError::new(
                ErrorCode::E1007,
                "invalid assignment target",
                self.arena.expr(target).span,
            )),
        }
    }

    fn parse_return(&mut self) -> Result<StmtId, ParseError> {
        let kw = self.cursor.advance();
        let value = if matches!(
            self.cursor.kind(),
            TokenKind::Newline | TokenKind::Semi | TokenKind::RBrace | TokenKind::Eof
        ) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let span = match value {
            Some(v) => kw.span.merge(self.expr_span(v)),
            None => kw.span,
        };
        Ok(self
            .arena
            .alloc_stmt(Stmt::new(StmtKind::Return(value), span)))
    }

    fn parse_if(&mut self) -> Result<StmtId, ParseError> {
        let kw = self.cursor.advance();
        let cond = self.parse_expr()?;
        let then_block = self.parse_block()?;

        self.cursor.skip_newlines();
        let else_block = if self.cursor.eat(TokenKind::Else) {
            self.cursor.skip_newlines();
            if self.cursor.kind() == TokenKind::If {
                Some(self.parse_if()?)
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        let end = else_block.unwrap_or(then_block);
        let span = kw.span.merge(self.arena.stmt(end).span);
        Ok(self.arena.alloc_stmt(Stmt::new(
            StmtKind::If {
                cond,
                then_block,
                else_block,
            },
            span,
        )))
    }

    pub(crate) fn parse_block(&mut self) -> Result<StmtId, ParseError> {
        self.cursor.skip_newlines();
        let open = self
            .cursor
            .expect(TokenKind::LBrace, ErrorCode::E1001, "`{`")?;
        let mut stmts = Vec::new();
        let close = loop {
            self.cursor.skip_separators();
            match self.cursor.kind() {
                TokenKind::RBrace => break self.cursor.advance(),
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        ErrorCode::E1003,
                        "unclosed block: expected `}`",
                        open.span,
                    ))
                }
                _ => match self.parse_statement() {
                    Ok(stmt) => stmts.push(stmt),
                    Err(err) => {
                        self.errors.push(err);
                        self.synchronize();
                    }
                },
            }
        };
        let range = self.arena.alloc_stmt_list(stmts);
        Ok(self
            .arena
            .alloc_stmt(Stmt::new(StmtKind::Block(range), open.span.merge(close.span))))
    }

    /// `( [mut] name: type, ... )`
    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.cursor
            .expect(TokenKind::LParen, ErrorCode::E1001, "`(`")?;
        let mut params = Vec::new();
        self.cursor.skip_newlines();
        if self.cursor.kind() != TokenKind::RParen {
            loop {
                let mutable = self.cursor.eat(TokenKind::Mut);
                let (name, name_span) = self.cursor.expect_ident("parameter name")?;
                self.cursor
                    .expect(TokenKind::Colon, ErrorCode::E1005, "`:` before parameter type")?;
                let ty = self.parse_type()?;
                params.push(Param {
                    name,
                    ty,
                    mutable,
                    span: name_span,
                });
                self.cursor.skip_newlines();
                if !self.cursor.eat(TokenKind::Comma) {
                    break;
                }
                self.cursor.skip_newlines();
            }
        }
        self.cursor
            .expect(TokenKind::RParen, ErrorCode::E1003, "`)`")?;
        Ok(params)
    }

    fn parse_return_type(&mut self) -> Result<moose_ir::MooseType, ParseError> {
        if self.cursor.eat(TokenKind::Arrow) {
            self.parse_type()
        } else {
            Ok(moose_ir::MooseType::Void)
        }
    }

    fn parse_function_def(&mut self) -> Result<FunctionDef, ParseError> {
        let kw = self
            .cursor
            .expect(TokenKind::Func, ErrorCode::E1001, "`func`")?;
        let (name, _) = self.cursor.expect_ident("function name")?;
        let params = self.parse_params()?;
        let ret = self.parse_return_type()?;
        let body = self.parse_block()?;
        let span = kw.span.merge(self.arena.stmt(body).span);
        Ok(FunctionDef {
            name,
            params,
            ret,
            body,
            span,
        })
    }

    fn parse_operation_def(&mut self) -> Result<OperationDef, ParseError> {
        let kw = self.cursor.advance();
        let position = match kw.kind {
            TokenKind::Prefix => OpPosition::Prefix,
            TokenKind::Infix => OpPosition::Infix,
            TokenKind::Postfix => OpPosition::Postfix,
            _ => unreachable!("operation keyword checked by caller"),
        };
        let op = match self.cursor.kind() {
            TokenKind::Op(op) => {
                self.cursor.advance();
                op
            }
            other => {
                return Err(ParseError::new(
                    ErrorCode::E1006,
                    format!(
                        "expected operator symbol after `{position}`, found {}",
                        describe(other, self.cursor.interner())
                    ),
                    self.cursor.span(),
                ))
            }
        };
        let params = self.parse_params()?;

        let expected_arity = match position {
            OpPosition::Infix => 2,
            OpPosition::Prefix | OpPosition::Postfix => 1,
        };
        if params.len() != expected_arity {
            // Recoverable: record the arity error and keep the definition.
            self.errors.push(ParseError::new(
                ErrorCode::E1006,
                format!(
                    "a {position} operator takes exactly {expected_arity} parameter{}, found {}",
                    if expected_arity == 1 { "" } else { "s" },
                    params.len()
                ),
                kw.span,
            ));
        }

        let ret = self.parse_return_type()?;
        let body = self.parse_block()?;
        let span = kw.span.merge(self.arena.stmt(body).span);
        Ok(OperationDef {
            op,
            position,
            params,
            ret,
            body,
            span,
        })
    }

    fn parse_class(&mut self) -> Result<StmtId, ParseError> {
        let kw = self.cursor.advance();
        let (name, _) = self.cursor.expect_ident("class name")?;

        let superclass = if self.cursor.at_op("<") {
            self.cursor.advance();
            Some(self.cursor.expect_ident("superclass name")?.0)
        } else {
            None
        };

        self.cursor
            .expect(TokenKind::LBrace, ErrorCode::E1001, "`{`")?;

        let mut properties = Vec::new();
        let mut methods = Vec::new();
        let mut operators = Vec::new();

        let close = loop {
            self.cursor.skip_separators();
            match self.cursor.kind() {
                TokenKind::RBrace => break self.cursor.advance(),
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        ErrorCode::E1003,
                        "unclosed class body: expected `}`",
                        kw.span,
                    ))
                }
                TokenKind::Func => match self.parse_function_def() {
                    Ok(def) => methods.push(self.arena.alloc_function(def)),
                    Err(err) => {
                        self.errors.push(err);
                        self.synchronize();
                    }
                },
                TokenKind::Prefix | TokenKind::Infix | TokenKind::Postfix => {
                    match self.parse_operation_def() {
                        Ok(def) => operators.push(self.arena.alloc_operation(def)),
                        Err(err) => {
                            self.errors.push(err);
                            self.synchronize();
                        }
                    }
                }
                TokenKind::Ident(_) => match self.parse_property() {
                    Ok(prop) => properties.push(prop),
                    Err(err) => {
                        self.errors.push(err);
                        self.synchronize();
                    }
                },
                other => {
                    self.errors.push(ParseError::new(
                        ErrorCode::E1001,
                        format!(
                            "expected class member, found {}",
                            describe(other, self.cursor.interner())
                        ),
                        self.cursor.span(),
                    ));
                    self.synchronize();
                }
            }
        };

        let span = kw.span.merge(close.span);
        let id = self.arena.alloc_class(ClassDef {
            name,
            superclass,
            properties,
            methods,
            operators,
            span,
        });
        Ok(self.arena.alloc_stmt(Stmt::new(StmtKind::Class(id), span)))
    }

    fn parse_property(&mut self) -> Result<PropertyDef, ParseError> {
        let (name, name_span) = self.cursor.expect_ident("property name")?;
        self.cursor
            .expect(TokenKind::Colon, ErrorCode::E1005, "`:` before property type")?;
        let ty = self.parse_type()?;
        let default = if self.cursor.eat(TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(PropertyDef {
            name,
            ty,
            default,
            span: name_span,
        })
    }
}
