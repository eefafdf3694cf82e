//! Expression checking.
//!
//! Every case ends by recording the expression's type in the
//! `TypeTable`. On error the recovery type is `Nil`, which matches
//! everything downstream and keeps cascades quiet.

use moose_diagnostic::ErrorCode;
use moose_ir::types::Resolution;
use moose_ir::{ExprId, ExprKind, MooseType, Name, OpPosition, Span};

use super::Checker;

impl Checker<'_> {
    pub(crate) fn check_expr(&mut self, expr_id: ExprId) -> MooseType {
        let expr = self.arena.expr(expr_id).clone();
        let ty = match expr.kind {
            ExprKind::Int(_) => MooseType::Integer,
            ExprKind::Float(_) => MooseType::Float,
            ExprKind::Str(_) => MooseType::String,
            ExprKind::Bool(_) => MooseType::Bool,
            ExprKind::Nil => MooseType::Nil,

            ExprKind::Ident(name) => match self.scope.var(name) {
                Some(record) => record.ty,
                None => {
                    self.error(
                        ErrorCode::E2002,
                        format!("unknown name `{}`", self.interner.lookup(name)),
                        expr.span,
                    );
                    MooseType::Nil
                }
            },

            ExprKind::Tuple(range) => {
                let elems = self.arena.exprs(range).to_vec();
                let ts: Vec<MooseType> = elems.iter().map(|e| self.check_expr(*e)).collect();
                MooseType::Tuple(ts)
            }

            ExprKind::List(range) => {
                let elems = self.arena.exprs(range).to_vec();
                let mut elem_t = MooseType::Nil;
                for &elem in &elems {
                    let t = self.check_expr(elem);
                    if elem_t.super_of(&t, &self.graph()) {
                        continue;
                    }
                    if t.super_of(&elem_t, &self.graph()) {
                        elem_t = t;
                    } else {
                        let found = self.render(&t);
                        let want = self.render(&elem_t);
                        self.error(
                            ErrorCode::E2001,
                            format!("list element has type {found}, expected {want}"),
                            self.arena.expr(elem).span,
                        );
                    }
                }
                MooseType::List(Box::new(elem_t))
            }

            ExprKind::Prefix { op, operand } => {
                let operand_t = self.with_open_scope(|c| c.check_expr(operand));
                self.check_operator(op, OpPosition::Prefix, &[operand_t], expr.span)
            }
            ExprKind::Infix { op, left, right } => {
                let left_t = self.with_open_scope(|c| c.check_expr(left));
                let right_t = self.with_open_scope(|c| c.check_expr(right));
                self.check_operator(op, OpPosition::Infix, &[left_t, right_t], expr.span)
            }
            ExprKind::Postfix { op, operand } => {
                let operand_t = self.with_open_scope(|c| c.check_expr(operand));
                self.check_operator(op, OpPosition::Postfix, &[operand_t], expr.span)
            }

            ExprKind::Call { callee, args } => self.check_call(expr_id, callee, args, expr.span),

            ExprKind::Deref { object, member } => self.check_deref(object, member, expr.span),

            ExprKind::Index { object, index } => {
                let object_t = self.check_expr(object);
                let index_t = self.check_expr(index);
                if !MooseType::Integer.super_of(&index_t, &self.graph()) {
                    let found = self.render(&index_t);
                    self.error(
                        ErrorCode::E2001,
                        format!("index must be Int, found {found}"),
                        self.arena.expr(index).span,
                    );
                }
                match object_t {
                    MooseType::List(elem) => *elem,
                    MooseType::Nil => MooseType::Nil,
                    other => {
                        let found = self.render(&other);
                        self.error(
                            ErrorCode::E2001,
                            format!("cannot index into {found}"),
                            expr.span,
                        );
                        MooseType::Nil
                    }
                }
            }

            ExprKind::Me => match self.scope.nearest_class() {
                Some(class_name) => MooseType::Class(class_name),
                None => {
                    self.error(
                        ErrorCode::E2002,
                        "`me` used outside of a class".to_string(),
                        expr.span,
                    );
                    MooseType::Nil
                }
            },

            ExprKind::Is { value, .. } => {
                self.check_expr(value);
                MooseType::Bool
            }
        };
        self.table.set(expr_id, ty.clone());
        ty
    }

    fn check_operator(
        &mut self,
        op: Name,
        position: OpPosition,
        args: &[MooseType],
        span: Span,
    ) -> MooseType {
        match self.scope.resolve_operator(op, position, args, &self.graph()) {
            Resolution::Found(sig) => sig.ret,
            Resolution::Ambiguous => {
                let rendered = self.render_args(args);
                self.error(
                    ErrorCode::E2003,
                    format!(
                        "ambiguous use of {position} operator `{}` for {rendered}",
                        self.interner.lookup(op)
                    ),
                    span,
                );
                MooseType::Nil
            }
            Resolution::NotFound => {
                let rendered = self.render_args(args);
                self.error(
                    ErrorCode::E2002,
                    format!(
                        "no {position} operator `{}` for {rendered}",
                        self.interner.lookup(op)
                    ),
                    span,
                );
                MooseType::Nil
            }
        }
    }

    pub(crate) fn check_call(
        &mut self,
        expr_id: ExprId,
        callee: Name,
        args: moose_ir::ExprRange,
        span: Span,
    ) -> MooseType {
        let arg_ids = self.arena.exprs(args).to_vec();
        let arg_ts: Vec<MooseType> = self.with_open_scope(|c| {
            arg_ids.iter().map(|a| c.check_expr(*a)).collect()
        });

        // A visible class name makes this a constructor call.
        if let Some(info) = self.scope.class(callee).or_else(|| {
            if self.scope.closed() {
                None
            } else {
                self.global.class(callee)
            }
        }) {
            let properties = info.borrow().properties.clone();
            if arg_ts.len() > properties.len() {
                self.error(
                    ErrorCode::E2009,
                    format!(
                        "class `{}` has {} propert{} but the constructor call passes {}",
                        self.interner.lookup(callee),
                        properties.len(),
                        if properties.len() == 1 { "y" } else { "ies" },
                        arg_ts.len()
                    ),
                    span,
                );
            }
            for (arg_t, (prop_name, prop_t)) in arg_ts.iter().zip(&properties) {
                if !prop_t.super_of(arg_t, &self.graph()) {
                    let found = self.render(arg_t);
                    let want = self.render(prop_t);
                    self.error(
                        ErrorCode::E2001,
                        format!(
                            "constructor argument for `{}` has type {found}, expected {want}",
                            self.interner.lookup(*prop_name)
                        ),
                        span,
                    );
                }
            }
            self.table.mark_constructor(expr_id);
            return MooseType::Class(callee);
        }

        match self.scope.resolve_function(callee, &arg_ts, &self.graph()) {
            Resolution::Found(sig) => sig.ret,
            Resolution::Ambiguous => {
                let rendered = self.render_args(&arg_ts);
                self.error(
                    ErrorCode::E2003,
                    format!(
                        "ambiguous call to `{}` with {rendered}",
                        self.interner.lookup(callee)
                    ),
                    span,
                );
                MooseType::Nil
            }
            Resolution::NotFound => {
                let rendered = self.render_args(&arg_ts);
                self.error(
                    ErrorCode::E2002,
                    format!(
                        "no function `{}` matching {rendered}",
                        self.interner.lookup(callee)
                    ),
                    span,
                );
                MooseType::Nil
            }
        }
    }

    fn check_deref(&mut self, object: ExprId, member: ExprId, span: Span) -> MooseType {
        // The reserved `global` accessor pierces closed scopes.
        if let ExprKind::Ident(name) = self.arena.expr(object).kind {
            if name == self.global_name && self.scope.var(name).is_none() {
                self.table.set(object, MooseType::Void);
                let global = self.global.clone();
                return self.with_scope_swapped(&global, |c| c.check_member(member));
            }
        }

        let object_t = self.check_expr(object);
        match &object_t {
            MooseType::Class(class_name) => {
                let Some(info) = self
                    .scope
                    .class(*class_name)
                    .or_else(|| self.global.class(*class_name))
                else {
                    let rendered = self.interner.lookup(*class_name);
                    self.error(ErrorCode::E2013, format!("unknown class `{rendered}`"), span);
                    return MooseType::Nil;
                };
                let class_scope = info.borrow().scope.clone();
                self.with_member_scope(&class_scope, |c| c.check_member(member))
            }
            MooseType::Nil => {
                // Poison: skip the member; upstream already failed or
                // the receiver is a literal nil (a runtime NilUsage).
                self.table.set(member, MooseType::Nil);
                MooseType::Nil
            }
            other => match self.members.for_type(other) {
                Some(member_scope) => {
                    self.with_member_scope(&member_scope, |c| c.check_member(member))
                }
                None => {
                    let found = self.render(other);
                    self.error(
                        ErrorCode::E2014,
                        format!("{found} has no members"),
                        span,
                    );
                    MooseType::Nil
                }
            },
        }
    }

    /// Check a member expression inside its receiver scope.
    fn check_member(&mut self, member: ExprId) -> MooseType {
        let expr = self.arena.expr(member).clone();
        match expr.kind {
            ExprKind::Ident(name) => {
                let ty = match self.scope.var(name) {
                    Some(record) => record.ty,
                    None => {
                        self.error(
                            ErrorCode::E2014,
                            format!("unknown member `{}`", self.interner.lookup(name)),
                            expr.span,
                        );
                        MooseType::Nil
                    }
                };
                self.table.set(member, ty.clone());
                ty
            }
            ExprKind::Call { callee, args } => {
                let ty = self.check_call(member, callee, args, expr.span);
                self.table.set(member, ty.clone());
                ty
            }
            _ => {
                self.error(
                    ErrorCode::E2014,
                    "a member access expects a name or a call".to_string(),
                    expr.span,
                );
                MooseType::Nil
            }
        }
    }
}
