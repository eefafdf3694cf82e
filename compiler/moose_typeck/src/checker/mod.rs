//! The type checker proper.
//!
//! Walks the module statement by statement, resolving names against
//! the scope tree and writing every expression's type into the
//! `TypeTable`. Member accesses check their member against the
//! receiver's scope with the `closed` flag set, mirroring exactly what
//! the evaluator does with environments at runtime.

mod expr;
mod stmt;

use moose_diagnostic::{Diagnostic, ErrorCode};
use moose_ir::builtins;
use moose_ir::{Arena, Module, MooseType, Name, Span, StringInterner, TypeTable};
use tracing::debug;

use crate::explore::explore;
use crate::flatten::flatten_classes;
use crate::scope::{ScopeGraph, ScopeKind, SharedScope};

/// Result of type checking a module.
pub struct Checked {
    pub table: TypeTable,
    pub diagnostics: Vec<Diagnostic>,
}

impl Checked {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Type check a parsed module.
///
/// Runs global exploration and class flattening, then checks every
/// statement. All diagnostics are collected; the table is complete for
/// whatever checked successfully.
pub fn check(module: &Module, arena: &Arena, interner: &StringInterner) -> Checked {
    let mut diags = Vec::new();

    let builtin_root = SharedScope::root(ScopeKind::BuiltinRoot);
    seed_builtin_operators(&builtin_root, interner);
    let global = SharedScope::child(&builtin_root, ScopeKind::Global);

    explore(module, arena, interner, &global, &mut diags);
    flatten_classes(&global, interner, &mut diags);

    let mut checker = Checker {
        arena,
        interner,
        scope: global.clone(),
        global: global.clone(),
        members: BuiltinMemberScopes::new(&global, interner),
        table: TypeTable::new(),
        diags,
        return_stack: Vec::new(),
        global_name: interner.intern("global"),
    };

    for &stmt_id in &module.stmts {
        checker.check_stmt(stmt_id);
    }
    debug!(
        exprs = checker.table.len(),
        errors = checker.diags.len(),
        "type check finished"
    );

    Checked {
        table: checker.table,
        diagnostics: checker.diags,
    }
}

/// Seed the built-in root scope with the global operator table.
///
/// Built-ins live in the parent of the global scope, so a user
/// definition with the same signature shadows the built-in instead of
/// colliding with it.
fn seed_builtin_operators(root: &SharedScope, interner: &StringInterner) {
    for op in builtins::operator_signatures() {
        let name = interner.intern(op.symbol);
        let _ = root.define_operator(name, op.position, op.sig);
    }
}

/// Member scopes for the built-in primitive types.
pub(crate) struct BuiltinMemberScopes {
    int: SharedScope,
    float: SharedScope,
    bool_: SharedScope,
    string: SharedScope,
    list: SharedScope,
}

impl BuiltinMemberScopes {
    fn new(global: &SharedScope, interner: &StringInterner) -> Self {
        let build = |recv: &MooseType| {
            let scope = SharedScope::child(global, ScopeKind::BuiltinMembers);
            for member in builtins::member_signatures(recv) {
                let _ = scope.define_function(interner.intern(member.name), member.sig);
            }
            scope
        };
        BuiltinMemberScopes {
            int: build(&MooseType::Integer),
            float: build(&MooseType::Float),
            bool_: build(&MooseType::Bool),
            string: build(&MooseType::String),
            list: build(&MooseType::List(Box::new(MooseType::Nil))),
        }
    }

    /// The member scope for a primitive receiver type, if it has one.
    pub(crate) fn for_type(&self, ty: &MooseType) -> Option<SharedScope> {
        Some(match ty {
            MooseType::Integer => self.int.clone(),
            MooseType::Float => self.float.clone(),
            MooseType::Bool => self.bool_.clone(),
            MooseType::String => self.string.clone(),
            MooseType::List(_) => self.list.clone(),
            _ => return None,
        })
    }
}

pub(crate) struct Checker<'a> {
    pub(crate) arena: &'a Arena,
    pub(crate) interner: &'a StringInterner,
    pub(crate) scope: SharedScope,
    pub(crate) global: SharedScope,
    pub(crate) members: BuiltinMemberScopes,
    pub(crate) table: TypeTable,
    pub(crate) diags: Vec<Diagnostic>,
    /// Declared return types of the enclosing functions, innermost last.
    pub(crate) return_stack: Vec<MooseType>,
    /// Pre-interned reserved `global` accessor name.
    pub(crate) global_name: Name,
}

impl Checker<'_> {
    pub(crate) fn error(&mut self, code: ErrorCode, message: String, span: Span) {
        self.diags.push(Diagnostic::error(code, message).with_span(span));
    }

    pub(crate) fn render(&self, ty: &MooseType) -> String {
        ty.display(self.interner).to_string()
    }

    pub(crate) fn render_args(&self, args: &[MooseType]) -> String {
        let parts: Vec<String> = args.iter().map(|t| self.render(t)).collect();
        format!("({})", parts.join(", "))
    }

    pub(crate) fn graph(&self) -> ScopeGraph {
        ScopeGraph::new(self.scope.clone())
    }

    /// Run `f` in a fresh child of the current scope.
    pub(crate) fn with_child_scope<T>(
        &mut self,
        kind: ScopeKind,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = self.scope.clone();
        self.scope = SharedScope::child(&saved, kind);
        let out = f(self);
        self.scope = saved;
        out
    }

    /// Run `f` in a fresh child of a given parent scope.
    pub(crate) fn with_child_scope_in<T>(
        &mut self,
        parent: &SharedScope,
        kind: ScopeKind,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = self.scope.clone();
        self.scope = SharedScope::child(parent, kind);
        let out = f(self);
        self.scope = saved;
        out
    }

    /// Run `f` with the current scope swapped to `scope` (no child).
    pub(crate) fn with_scope_swapped<T>(
        &mut self,
        scope: &SharedScope,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved = self.scope.clone();
        self.scope = scope.clone();
        let out = f(self);
        self.scope = saved;
        out
    }

    /// Run `f` with the current scope as a closed member scope.
    ///
    /// The flag is restored on exit; member scopes are shared, so the
    /// prior value is saved rather than assumed open.
    pub(crate) fn with_member_scope<T>(
        &mut self,
        target: &SharedScope,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        let saved_scope = self.scope.clone();
        let saved_closed = target.closed();
        self.scope = target.clone();
        target.set_closed(true);
        let out = f(self);
        target.set_closed(saved_closed);
        self.scope = saved_scope;
        out
    }

    /// Run `f` with the current scope's `closed` flag cleared.
    ///
    /// Argument subexpressions of calls and operators must see the
    /// scopes enclosing the member scope, even mid-member-access.
    pub(crate) fn with_open_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let scope = self.scope.clone();
        let saved = scope.closed();
        scope.set_closed(false);
        let out = f(self);
        scope.set_closed(saved);
        out
    }
}
