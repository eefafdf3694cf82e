//! Global exploration.
//!
//! Registers every top-level class, function, and operator signature
//! into the global scope before any body is checked, so definitions
//! are visible regardless of their order in the file.

use std::cell::RefCell;
use std::rc::Rc;

use moose_diagnostic::{Diagnostic, ErrorCode};
use moose_ir::types::ParamType;
use moose_ir::{
    Arena, ClassDef, Module, Param, Signature, StmtKind, StringInterner,
};

use crate::scope::{ClassInfo, DefineError, ScopeKind, SharedClassInfo, SharedScope};

pub(crate) fn signature_of(params: &[Param], ret: &moose_ir::MooseType) -> Signature {
    let params = params
        .iter()
        .map(|p| ParamType {
            ty: p.ty.clone(),
            mutable: p.mutable,
        })
        .collect();
    Signature::new(params, ret.clone())
}

/// Register all top-level signatures into `global`.
pub fn explore(
    module: &Module,
    arena: &Arena,
    interner: &StringInterner,
    global: &SharedScope,
    diags: &mut Vec<Diagnostic>,
) {
    for &stmt_id in &module.stmts {
        match &arena.stmt(stmt_id).kind {
            StmtKind::Function(id) => {
                let def = arena.function(*id);
                let sig = signature_of(&def.params, &def.ret);
                if global.define_function(def.name, sig).is_err() {
                    diags.push(
                        Diagnostic::error(
                            ErrorCode::E2005,
                            format!(
                                "function `{}` is already defined with these parameter types",
                                interner.lookup(def.name)
                            ),
                        )
                        .with_span(def.span),
                    );
                }
            }
            StmtKind::Operation(id) => {
                let def = arena.operation(*id);
                let sig = signature_of(&def.params, &def.ret);
                if global.define_operator(def.op, def.position, sig).is_err() {
                    diags.push(
                        Diagnostic::error(
                            ErrorCode::E2005,
                            format!(
                                "{} operator `{}` is already defined with these parameter types",
                                def.position,
                                interner.lookup(def.op)
                            ),
                        )
                        .with_span(def.span),
                    );
                }
            }
            StmtKind::Class(id) => {
                let def = arena.class(*id);
                register_class(def, arena, interner, global, global, diags);
            }
            _ => {}
        }
    }
}

/// Register one class: its scope, property variables, and member
/// signatures. Shared with the checker for class statements in inner
/// scopes.
pub(crate) fn register_class(
    def: &ClassDef,
    arena: &Arena,
    interner: &StringInterner,
    parent_scope: &SharedScope,
    registry: &SharedScope,
    diags: &mut Vec<Diagnostic>,
) -> Option<SharedClassInfo> {
    let scope = SharedScope::child(parent_scope, ScopeKind::Class(def.name));
    let mut info = ClassInfo::new(def.name, def.superclass, scope.clone(), def.span);

    for prop in &def.properties {
        if info.properties.iter().any(|(n, _)| *n == prop.name) {
            diags.push(
                Diagnostic::error(
                    ErrorCode::E2005,
                    format!(
                        "property `{}` is declared twice in class `{}`",
                        interner.lookup(prop.name),
                        interner.lookup(def.name)
                    ),
                )
                .with_span(prop.span),
            );
            continue;
        }
        info.properties.push((prop.name, prop.ty.clone()));
        scope.define_var(prop.name, prop.ty.clone(), true);
    }

    for &method_id in &def.methods {
        let method = arena.function(method_id);
        let sig = signature_of(&method.params, &method.ret);
        if scope.define_function(method.name, sig).is_err() {
            diags.push(
                Diagnostic::error(
                    ErrorCode::E2005,
                    format!(
                        "method `{}` is already defined in class `{}` with these parameter types",
                        interner.lookup(method.name),
                        interner.lookup(def.name)
                    ),
                )
                .with_span(method.span),
            );
        }
    }

    for &op_id in &def.operators {
        let op = arena.operation(op_id);
        let sig = signature_of(&op.params, &op.ret);
        if scope.define_operator(op.op, op.position, sig).is_err() {
            diags.push(
                Diagnostic::error(
                    ErrorCode::E2005,
                    format!(
                        "{} operator `{}` is already defined in class `{}`",
                        op.position,
                        interner.lookup(op.op),
                        interner.lookup(def.name)
                    ),
                )
                .with_span(op.span),
            );
        }
    }

    let info = Rc::new(RefCell::new(info));
    match registry.define_class(def.name, info.clone()) {
        Ok(()) => Some(info),
        Err(DefineError::DuplicateName | DefineError::DuplicateSignature) => {
            diags.push(
                Diagnostic::error(
                    ErrorCode::E2005,
                    format!("class `{}` is already defined", interner.lookup(def.name)),
                )
                .with_span(def.span),
            );
            None
        }
    }
}
