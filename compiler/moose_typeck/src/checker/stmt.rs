//! Statement checking.

use moose_diagnostic::ErrorCode;
use moose_ir::{
    ClassDef, ExprId, ExprKind, FunctionDef, MooseType, OperationDef, StmtId, StmtKind,
};

use crate::explore::{register_class, signature_of};
use crate::flatten::flat;
use crate::scope::{ScopeKind, SharedClassInfo, SharedScope};

use super::Checker;

impl Checker<'_> {
    pub(crate) fn check_stmt(&mut self, stmt_id: StmtId) {
        let stmt = self.arena.stmt(stmt_id).clone();
        match stmt.kind {
            StmtKind::Expr(expr) => {
                self.check_expr(expr);
            }
            StmtKind::Assign {
                target,
                ty,
                value,
                mutable,
            } => {
                let errors_before = self.diags.len();
                let value_t = self.check_expr(value);
                // A failed value expression poisons to Nil; inferring
                // from it would only add a second diagnostic.
                let poisoned = self.diags.len() > errors_before;
                self.check_assign_target(target, &value_t, ty.as_ref(), mutable, poisoned);
            }
            StmtKind::Return(value) => self.check_return(value, stmt.span),
            StmtKind::Block(range) => {
                let stmts = self.arena.stmts(range).to_vec();
                self.with_child_scope(ScopeKind::Block, |c| {
                    for s in stmts {
                        c.check_stmt(s);
                    }
                });
            }
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                let cond_t = self.check_expr(cond);
                if !MooseType::Bool.super_of(&cond_t, &self.graph()) {
                    let cond_span = self.arena.expr(cond).span;
                    let rendered = self.render(&cond_t);
                    self.error(
                        ErrorCode::E2010,
                        format!("`if` condition must be Bool, found {rendered}"),
                        cond_span,
                    );
                }
                self.check_stmt(then_block);
                if let Some(else_block) = else_block {
                    self.check_stmt(else_block);
                }
            }
            StmtKind::Function(id) => {
                let def = self.arena.function(id).clone();
                if !self.scope.is_global() {
                    let sig = signature_of(&def.params, &def.ret);
                    if self.scope.define_function(def.name, sig).is_err() {
                        self.error(
                            ErrorCode::E2005,
                            format!(
                                "function `{}` is already defined with these parameter types",
                                self.interner.lookup(def.name)
                            ),
                            def.span,
                        );
                    }
                }
                let parent = self.scope.clone();
                self.check_function_body_in(&def, &parent);
            }
            StmtKind::Operation(id) => {
                let def = self.arena.operation(id).clone();
                if !self.scope.is_global() {
                    let sig = signature_of(&def.params, &def.ret);
                    if self
                        .scope
                        .define_operator(def.op, def.position, sig)
                        .is_err()
                    {
                        self.error(
                            ErrorCode::E2005,
                            format!(
                                "{} operator `{}` is already defined with these parameter types",
                                def.position,
                                self.interner.lookup(def.op)
                            ),
                            def.span,
                        );
                    }
                }
                let parent = self.scope.clone();
                self.check_operation_body_in(&def, &parent);
            }
            StmtKind::Class(id) => {
                let def = self.arena.class(id).clone();
                let info = if self.scope.is_global() {
                    // Registered and flattened by the up-front passes.
                    self.scope.class(def.name)
                } else {
                    let current = self.scope.clone();
                    let registered = register_class(
                        &def,
                        self.arena,
                        self.interner,
                        &current,
                        &current,
                        &mut self.diags,
                    );
                    if let Some(info) = &registered {
                        let registry = self.scope.clone();
                        flat(info, &registry, self.interner, &mut self.diags);
                    }
                    registered
                };
                if let Some(info) = info {
                    self.check_class_members(&def, &info);
                }
            }
        }
    }

    fn check_return(&mut self, value: Option<ExprId>, span: moose_ir::Span) {
        let Some(expected) = self.return_stack.last().cloned() else {
            self.error(
                ErrorCode::E2012,
                "`return` outside of a function".to_string(),
                span,
            );
            if let Some(value) = value {
                self.check_expr(value);
            }
            return;
        };
        match value {
            None => {
                if expected != MooseType::Void {
                    let rendered = self.render(&expected);
                    self.error(
                        ErrorCode::E2001,
                        format!("bare `return` in a function returning {rendered}"),
                        span,
                    );
                }
            }
            Some(value) => {
                let value_t = self.check_expr(value);
                if !expected.super_of(&value_t, &self.graph()) {
                    let found = self.render(&value_t);
                    let want = self.render(&expected);
                    self.error(
                        ErrorCode::E2001,
                        format!("return type mismatch: expected {want}, found {found}"),
                        self.arena.expr(value).span,
                    );
                }
            }
        }
    }

    /// Check a function body in a fresh scope under `parent`.
    pub(crate) fn check_function_body_in(&mut self, def: &FunctionDef, parent: &SharedScope) {
        let def = def.clone();
        self.return_stack.push(def.ret.clone());
        self.with_child_scope_in(parent, ScopeKind::Function, |c| {
            for param in &def.params {
                c.scope.define_var(param.name, param.ty.clone(), param.mutable);
            }
            c.check_stmt(def.body);
        });
        self.return_stack.pop();
    }

    pub(crate) fn check_operation_body_in(&mut self, def: &OperationDef, parent: &SharedScope) {
        let def = def.clone();
        self.return_stack.push(def.ret.clone());
        self.with_child_scope_in(parent, ScopeKind::Function, |c| {
            for param in &def.params {
                c.scope.define_var(param.name, param.ty.clone(), param.mutable);
            }
            c.check_stmt(def.body);
        });
        self.return_stack.pop();
    }

    /// Check property defaults and member bodies of a class.
    pub(crate) fn check_class_members(&mut self, def: &ClassDef, info: &SharedClassInfo) {
        let class_scope = info.borrow().scope.clone();

        for prop in &def.properties {
            if let Some(default) = prop.default {
                let default_t =
                    self.with_scope_swapped(&class_scope.clone(), |c| c.check_expr(default));
                if !prop.ty.super_of(&default_t, &self.graph()) {
                    let found = self.render(&default_t);
                    let want = self.render(&prop.ty);
                    self.error(
                        ErrorCode::E2001,
                        format!(
                            "default for property `{}` has type {found}, expected {want}",
                            self.interner.lookup(prop.name)
                        ),
                        prop.span,
                    );
                }
            }
        }

        for &method_id in &def.methods {
            let method = self.arena.function(method_id).clone();
            self.check_function_body_in(&method, &class_scope);
        }
        for &op_id in &def.operators {
            let op = self.arena.operation(op_id).clone();
            self.check_operation_body_in(&op, &class_scope);
        }
    }

    /// Dispatch an assignment over the target's syntactic form.
    pub(crate) fn check_assign_target(
        &mut self,
        target: ExprId,
        value_t: &MooseType,
        annotation: Option<&MooseType>,
        mutable: bool,
        poisoned: bool,
    ) {
        let target_expr = self.arena.expr(target).clone();
        match target_expr.kind {
            ExprKind::Ident(name) => {
                if let Some(ann) = annotation {
                    // A declaration: the annotation fixes the type.
                    if !ann.super_of(value_t, &self.graph()) {
                        let found = self.render(value_t);
                        let want = self.render(ann);
                        self.error(
                            ErrorCode::E2001,
                            format!("cannot assign {found} to `{}` of type {want}",
                                self.interner.lookup(name)),
                            target_expr.span,
                        );
                    }
                    self.scope.define_var(name, ann.clone(), mutable);
                    self.table.set(target, ann.clone());
                } else if let Some(record) = self.scope.var(name) {
                    // Re-assignment to an existing binding.
                    if !record.mutable {
                        self.error(
                            ErrorCode::E2004,
                            format!(
                                "cannot assign twice to immutable binding `{}`",
                                self.interner.lookup(name)
                            ),
                            target_expr.span,
                        );
                    }
                    if !record.ty.super_of(value_t, &self.graph()) {
                        let found = self.render(value_t);
                        let want = self.render(&record.ty);
                        self.error(
                            ErrorCode::E2001,
                            format!(
                                "cannot assign {found} to `{}` of type {want}",
                                self.interner.lookup(name)
                            ),
                            target_expr.span,
                        );
                    }
                    self.table.set(target, record.ty);
                } else {
                    // A declaration with an inferred type.
                    if matches!(value_t, MooseType::Nil) && !poisoned {
                        self.error(
                            ErrorCode::E2011,
                            format!(
                                "cannot infer a type for `{}` from `nil`; add a type annotation",
                                self.interner.lookup(name)
                            ),
                            target_expr.span,
                        );
                    }
                    self.scope.define_var(name, value_t.clone(), mutable);
                    self.table.set(target, value_t.clone());
                }
            }
            ExprKind::Tuple(range) => {
                let elems = self.arena.exprs(range).to_vec();
                let MooseType::Tuple(component_ts) = value_t else {
                    let found = self.render(value_t);
                    self.error(
                        ErrorCode::E2001,
                        format!("cannot destructure {found} into a tuple target"),
                        target_expr.span,
                    );
                    return;
                };
                if component_ts.len() != elems.len() {
                    self.error(
                        ErrorCode::E2001,
                        format!(
                            "tuple target has {} elements but the value has {}",
                            elems.len(),
                            component_ts.len()
                        ),
                        target_expr.span,
                    );
                    return;
                }
                let annotations: Option<&Vec<MooseType>> = match annotation {
                    Some(MooseType::Tuple(anns)) if anns.len() == elems.len() => Some(anns),
                    _ => None,
                };
                for (i, (elem, component_t)) in elems.iter().zip(component_ts).enumerate() {
                    let ann = annotations.map(|a| &a[i]);
                    self.check_assign_target(*elem, component_t, ann, mutable, poisoned);
                }
                self.table.set(target, value_t.clone());
            }
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
                    MooseType::List(elem) => {
                        if !elem.super_of(value_t, &self.graph()) {
                            let found = self.render(value_t);
                            let want = self.render(&elem);
                            self.error(
                                ErrorCode::E2001,
                                format!("cannot store {found} in a list of {want}"),
                                target_expr.span,
                            );
                        }
                        self.table.set(target, *elem);
                    }
                    MooseType::Nil => {}
                    other => {
                        let found = self.render(&other);
                        self.error(
                            ErrorCode::E2001,
                            format!("cannot assign into an index of {found}"),
                            target_expr.span,
                        );
                    }
                }
            }
            ExprKind::Deref { object, member } => {
                let object_t = self.check_expr(object);
                let ExprKind::Ident(member_name) = self.arena.expr(member).kind else {
                    self.error(
                        ErrorCode::E1007,
                        "invalid assignment target".to_string(),
                        target_expr.span,
                    );
                    return;
                };
                match object_t {
                    MooseType::Class(class_name) => {
                        let Some(info) = self.scope.class(class_name).or_else(|| {
                            self.global.class(class_name)
                        }) else {
                            let rendered = self.interner.lookup(class_name);
                            self.error(
                                ErrorCode::E2013,
                                format!("unknown class `{rendered}`"),
                                target_expr.span,
                            );
                            return;
                        };
                        let class_scope = info.borrow().scope.clone();
                        match class_scope.var_in_current(member_name) {
                            Some(record) => {
                                if !record.ty.super_of(value_t, &self.graph()) {
                                    let found = self.render(value_t);
                                    let want = self.render(&record.ty);
                                    self.error(
                                        ErrorCode::E2001,
                                        format!(
                                            "cannot assign {found} to property `{}` of type {want}",
                                            self.interner.lookup(member_name)
                                        ),
                                        target_expr.span,
                                    );
                                }
                                self.table.set(member, record.ty.clone());
                                self.table.set(target, record.ty);
                            }
                            None => {
                                self.error(
                                    ErrorCode::E2014,
                                    format!(
                                        "class `{}` has no property `{}`",
                                        self.interner.lookup(class_name),
                                        self.interner.lookup(member_name)
                                    ),
                                    target_expr.span,
                                );
                            }
                        }
                    }
                    MooseType::Nil => {}
                    other => {
                        let found = self.render(&other);
                        self.error(
                            ErrorCode::E2001,
                            format!("cannot assign to a member of {found}"),
                            target_expr.span,
                        );
                    }
                }
            }
            _ => {
                self.error(
                    ErrorCode::E1007,
                    "invalid assignment target".to_string(),
                    target_expr.span,
                );
            }
        }
    }
}
