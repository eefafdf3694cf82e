//! The type-side scope tree.
//!
//! A scope is a linked node mapping names to variable records, to
//! overload lists for functions and operators, and to class
//! registrations. The runtime `Environment` has the same shape with
//! values as payloads; keeping the shapes aligned is what lets one
//! overload-matching algorithm serve both.
//!
//! The `closed` flag blocks transparent lookup into the parent for
//! variables, functions, operators, and classes. It is toggled while
//! checking member accesses so that `instance.x` resolves against the
//! instance and not a same-named binding in the enclosing lexical
//! scope.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use moose_ir::types::{params_equal, resolve_overload, ClassGraph, Resolution};
use moose_ir::{MooseType, Name, OpPosition, Signature, Span};

/// What a scope node belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    /// The built-in root: seeded operators and nothing else.
    BuiltinRoot,
    /// The program's global scope.
    Global,
    /// A member scope of a built-in primitive type.
    BuiltinMembers,
    /// A braced block.
    Block,
    /// A function body.
    Function,
    /// A class body; carries the class name for `me`.
    Class(Name),
}

/// A variable declaration record.
#[derive(Clone, Debug)]
pub struct VarRecord {
    pub ty: MooseType,
    pub mutable: bool,
}

/// A single-threaded shared scope handle.
///
/// Scopes are shared between the scope stack, the class registry, and
/// member-access checking, so they are reference counted with interior
/// mutability. All allocation goes through [`SharedScope::new`].
#[derive(Clone)]
pub struct SharedScope(Rc<RefCell<ScopeNode>>);

/// Error from adding a definition to a scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefineError {
    /// An overload with a structurally equal parameter list exists.
    DuplicateSignature,
    /// The name is already registered (classes).
    DuplicateName,
}

/// A scope node's tables.
pub struct ScopeNode {
    parent: Option<SharedScope>,
    kind: ScopeKind,
    vars: FxHashMap<Name, VarRecord>,
    funcs: FxHashMap<Name, Vec<Signature>>,
    ops: FxHashMap<(Name, OpPosition), Vec<Signature>>,
    classes: FxHashMap<Name, SharedClassInfo>,
    closed: bool,
}

/// Registered information about a class, shared between the registry
/// and the flattening pass.
pub struct ClassInfo {
    pub name: Name,
    /// Cleared by flattening.
    pub superclass: Option<Name>,
    /// Ordered property list; after flattening, inherited properties
    /// come first.
    pub properties: Vec<(Name, MooseType)>,
    /// The class scope: property variables plus method and operator
    /// signatures. Parent is the global scope.
    pub scope: SharedScope,
    /// The class and its ancestors, nearest first. Filled by
    /// flattening; consulted by `is` and the subtype predicate.
    pub lineage: Vec<Name>,
    pub flattened: bool,
    /// Flattening re-entry mark for cycle detection.
    pub visiting: bool,
    pub span: Span,
}

pub type SharedClassInfo = Rc<RefCell<ClassInfo>>;

impl SharedScope {
    /// Create a scope with no parent.
    pub fn root(kind: ScopeKind) -> Self {
        SharedScope(Rc::new(RefCell::new(ScopeNode {
            parent: None,
            kind,
            vars: FxHashMap::default(),
            funcs: FxHashMap::default(),
            ops: FxHashMap::default(),
            classes: FxHashMap::default(),
            closed: false,
        })))
    }

    /// Create a child scope.
    pub fn child(parent: &SharedScope, kind: ScopeKind) -> Self {
        let scope = SharedScope::root(kind);
        scope.0.borrow_mut().parent = Some(parent.clone());
        scope
    }

    /// Pointer identity.
    pub fn ptr_eq(&self, other: &SharedScope) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn kind(&self) -> ScopeKind {
        self.0.borrow().kind
    }

    pub fn parent(&self) -> Option<SharedScope> {
        self.0.borrow().parent.clone()
    }

    /// Whether this is the program's global scope.
    pub fn is_global(&self) -> bool {
        matches!(self.kind(), ScopeKind::Global)
    }

    pub fn closed(&self) -> bool {
        self.0.borrow().closed
    }

    pub fn set_closed(&self, closed: bool) {
        self.0.borrow_mut().closed = closed;
    }

    /// Walk to the global scope; this is the reserved accessor that
    /// pierces `closed`.
    pub fn global(&self) -> SharedScope {
        let mut scope = self.clone();
        loop {
            if scope.is_global() {
                return scope;
            }
            match scope.parent() {
                Some(parent) => scope = parent,
                None => return scope,
            }
        }
    }

    /// The nearest enclosing class scope, if any.
    pub fn nearest_class(&self) -> Option<Name> {
        let mut scope = Some(self.clone());
        while let Some(s) = scope {
            if let ScopeKind::Class(name) = s.kind() {
                return Some(name);
            }
            scope = s.parent();
        }
        None
    }

    // --- Variables ---

    /// Define a variable in this scope, replacing any previous record.
    pub fn define_var(&self, name: Name, ty: MooseType, mutable: bool) {
        self.0
            .borrow_mut()
            .vars
            .insert(name, VarRecord { ty, mutable });
    }

    /// Look up a variable record, walking outward. A closed scope
    /// stops the walk.
    pub fn var(&self, name: Name) -> Option<VarRecord> {
        let node = self.0.borrow();
        if let Some(record) = node.vars.get(&name) {
            return Some(record.clone());
        }
        if node.closed {
            return None;
        }
        node.parent.as_ref().and_then(|p| p.var(name))
    }

    /// Look up a variable record in this scope only.
    pub fn var_in_current(&self, name: Name) -> Option<VarRecord> {
        self.0.borrow().vars.get(&name).cloned()
    }

    // --- Functions ---

    /// Add a function overload; refuses a structurally equal signature
    /// in the same scope.
    pub fn define_function(&self, name: Name, sig: Signature) -> Result<(), DefineError> {
        let mut node = self.0.borrow_mut();
        let overloads = node.funcs.entry(name).or_default();
        if overloads.iter().any(|s| params_equal(&s.params, &sig.params)) {
            return Err(DefineError::DuplicateSignature);
        }
        overloads.push(sig);
        Ok(())
    }

    /// Resolve a function call, walking outward per the overload rule:
    /// exactly one match in a scope wins; two or more is ambiguous;
    /// none recurses into the parent unless the scope is closed.
    pub fn resolve_function(
        &self,
        name: Name,
        args: &[MooseType],
        classes: &dyn ClassGraph,
    ) -> Resolution<Signature> {
        let node = self.0.borrow();
        if let Some(overloads) = node.funcs.get(&name) {
            match resolve_overload(overloads, |s: &Signature| s.params.as_slice(), args, classes) {
                Resolution::Found(sig) => return Resolution::Found(sig.clone()),
                Resolution::Ambiguous => return Resolution::Ambiguous,
                Resolution::NotFound => {}
            }
        }
        if node.closed {
            return Resolution::NotFound;
        }
        match &node.parent {
            Some(parent) => parent.resolve_function(name, args, classes),
            None => Resolution::NotFound,
        }
    }

    /// Whether a matching function exists; `include_enclosing` limits
    /// the search to this scope when false.
    pub fn has_function(
        &self,
        name: Name,
        args: &[MooseType],
        include_enclosing: bool,
        classes: &dyn ClassGraph,
    ) -> bool {
        if include_enclosing {
            return matches!(
                self.resolve_function(name, args, classes),
                Resolution::Found(_) | Resolution::Ambiguous
            );
        }
        let node = self.0.borrow();
        node.funcs.get(&name).is_some_and(|overloads| {
            !matches!(
                resolve_overload(overloads, |s: &Signature| s.params.as_slice(), args, classes),
                Resolution::NotFound
            )
        })
    }

    /// All overloads of a function in this scope only.
    pub fn function_overloads(&self, name: Name) -> Vec<Signature> {
        self.0
            .borrow()
            .funcs
            .get(&name)
            .cloned()
            .unwrap_or_default()
    }

    // --- Operators ---

    /// Add an operator overload, keyed by symbol and position.
    pub fn define_operator(
        &self,
        op: Name,
        position: OpPosition,
        sig: Signature,
    ) -> Result<(), DefineError> {
        let mut node = self.0.borrow_mut();
        let overloads = node.ops.entry((op, position)).or_default();
        if overloads.iter().any(|s| params_equal(&s.params, &sig.params)) {
            return Err(DefineError::DuplicateSignature);
        }
        overloads.push(sig);
        Ok(())
    }

    /// Resolve an operator application; same walk as functions.
    pub fn resolve_operator(
        &self,
        op: Name,
        position: OpPosition,
        args: &[MooseType],
        classes: &dyn ClassGraph,
    ) -> Resolution<Signature> {
        let node = self.0.borrow();
        if let Some(overloads) = node.ops.get(&(op, position)) {
            match resolve_overload(overloads, |s: &Signature| s.params.as_slice(), args, classes) {
                Resolution::Found(sig) => return Resolution::Found(sig.clone()),
                Resolution::Ambiguous => return Resolution::Ambiguous,
                Resolution::NotFound => {}
            }
        }
        if node.closed {
            return Resolution::NotFound;
        }
        match &node.parent {
            Some(parent) => parent.resolve_operator(op, position, args, classes),
            None => Resolution::NotFound,
        }
    }

    // --- Classes ---

    /// Register a class in this scope.
    pub fn define_class(&self, name: Name, info: SharedClassInfo) -> Result<(), DefineError> {
        let mut node = self.0.borrow_mut();
        if node.classes.contains_key(&name) {
            return Err(DefineError::DuplicateName);
        }
        node.classes.insert(name, info);
        Ok(())
    }

    /// Look up a class registration, walking outward per the closed
    /// rule.
    pub fn class(&self, name: Name) -> Option<SharedClassInfo> {
        let node = self.0.borrow();
        if let Some(info) = node.classes.get(&name) {
            return Some(info.clone());
        }
        if node.closed {
            return None;
        }
        node.parent.as_ref().and_then(|p| p.class(name))
    }

    /// Whether a class with this name is visible.
    pub fn has_class(&self, name: Name) -> bool {
        self.class(name).is_some()
    }

    /// Class names registered in this scope only.
    pub fn class_names(&self) -> Vec<Name> {
        self.0.borrow().classes.keys().copied().collect()
    }

    // --- Table snapshots (used by class flattening) ---

    /// All variable records in this scope only.
    pub fn all_vars(&self) -> Vec<(Name, VarRecord)> {
        self.0
            .borrow()
            .vars
            .iter()
            .map(|(n, r)| (*n, r.clone()))
            .collect()
    }

    /// All function overloads in this scope only.
    pub fn all_functions(&self) -> Vec<(Name, Vec<Signature>)> {
        self.0
            .borrow()
            .funcs
            .iter()
            .map(|(n, sigs)| (*n, sigs.clone()))
            .collect()
    }

    /// All operator overloads in this scope only.
    pub fn all_operators(&self) -> Vec<((Name, OpPosition), Vec<Signature>)> {
        self.0
            .borrow()
            .ops
            .iter()
            .map(|(k, sigs)| (*k, sigs.clone()))
            .collect()
    }
}

impl ClassInfo {
    pub fn new(name: Name, superclass: Option<Name>, scope: SharedScope, span: Span) -> Self {
        ClassInfo {
            name,
            superclass,
            properties: Vec::new(),
            scope,
            lineage: Vec::new(),
            flattened: false,
            visiting: false,
            span,
        }
    }

    /// Whether `ancestor` appears in this class's superclass chain.
    pub fn has_ancestor(&self, ancestor: Name, registry: &SharedScope) -> bool {
        if self.flattened {
            return self.lineage.iter().skip(1).any(|n| *n == ancestor);
        }
        let mut current = self.superclass;
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            current = registry
                .class(name)
                .and_then(|info| info.borrow().superclass);
        }
        false
    }
}

/// `ClassGraph` view over a scope chain, for the subtype predicate.
pub struct ScopeGraph {
    scope: SharedScope,
}

impl ScopeGraph {
    pub fn new(scope: SharedScope) -> Self {
        ScopeGraph { scope }
    }
}

impl ClassGraph for ScopeGraph {
    fn is_ancestor(&self, ancestor: Name, descendant: Name) -> bool {
        // Ancestry is not a lexical property: fall back to the global
        // registry when the lexical walk (or `closed`) hides the class.
        let registry = self.scope.global();
        self.scope
            .class(descendant)
            .or_else(|| registry.class(descendant))
            .is_some_and(|info| info.borrow().has_ancestor(ancestor, &registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moose_ir::types::{NoClasses, ParamType};
    use moose_ir::StringInterner;

    fn sig(params: Vec<MooseType>, ret: MooseType) -> Signature {
        Signature::new(params.into_iter().map(ParamType::new).collect(), ret)
    }

    #[test]
    fn closed_blocks_parent_lookup() {
        let interner = StringInterner::new();
        let name = interner.intern("x");
        let global = SharedScope::root(ScopeKind::Global);
        global.define_var(name, MooseType::Integer, false);

        let inner = SharedScope::child(&global, ScopeKind::Block);
        assert!(inner.var(name).is_some());
        inner.set_closed(true);
        assert!(inner.var(name).is_none());
        inner.set_closed(false);
        assert!(inner.var(name).is_some());
    }

    #[test]
    fn global_accessor_pierces_closed() {
        let global = SharedScope::root(ScopeKind::Global);
        let inner = SharedScope::child(&global, ScopeKind::Block);
        inner.set_closed(true);
        assert!(inner.global().ptr_eq(&global));
    }

    #[test]
    fn duplicate_signature_is_refused() {
        let interner = StringInterner::new();
        let f = interner.intern("f");
        let scope = SharedScope::root(ScopeKind::Global);
        scope
            .define_function(f, sig(vec![MooseType::Integer], MooseType::Void))
            .unwrap();
        assert_eq!(
            scope.define_function(f, sig(vec![MooseType::Integer], MooseType::Bool)),
            Err(DefineError::DuplicateSignature)
        );
        // Widening the parameter is permitted.
        scope
            .define_function(f, sig(vec![MooseType::Float], MooseType::Void))
            .unwrap();
    }

    #[test]
    fn resolution_recurses_until_closed() {
        let interner = StringInterner::new();
        let f = interner.intern("f");
        let global = SharedScope::root(ScopeKind::Global);
        global
            .define_function(f, sig(vec![MooseType::Integer], MooseType::Void))
            .unwrap();

        let inner = SharedScope::child(&global, ScopeKind::Function);
        assert!(matches!(
            inner.resolve_function(f, &[MooseType::Integer], &NoClasses),
            Resolution::Found(_)
        ));
        inner.set_closed(true);
        assert!(matches!(
            inner.resolve_function(f, &[MooseType::Integer], &NoClasses),
            Resolution::NotFound
        ));
    }

    #[test]
    fn has_function_can_ignore_enclosing_scopes() {
        let interner = StringInterner::new();
        let f = interner.intern("f");
        let global = SharedScope::root(ScopeKind::Global);
        global
            .define_function(f, sig(vec![MooseType::Integer], MooseType::Void))
            .unwrap();
        let inner = SharedScope::child(&global, ScopeKind::Function);

        assert!(inner.has_function(f, &[MooseType::Integer], true, &NoClasses));
        assert!(!inner.has_function(f, &[MooseType::Integer], false, &NoClasses));
    }

    #[test]
    fn inner_overload_shadows_outer() {
        let interner = StringInterner::new();
        let f = interner.intern("f");
        let global = SharedScope::root(ScopeKind::Global);
        global
            .define_function(f, sig(vec![MooseType::Integer], MooseType::Integer))
            .unwrap();
        let inner = SharedScope::child(&global, ScopeKind::Function);
        inner
            .define_function(f, sig(vec![MooseType::Integer], MooseType::Bool))
            .unwrap();

        match inner.resolve_function(f, &[MooseType::Integer], &NoClasses) {
            Resolution::Found(found) => assert_eq!(found.ret, MooseType::Bool),
            other => panic!("expected inner overload, got {other:?}"),
        }
    }

    #[test]
    fn nearest_class_walks_the_chain() {
        let interner = StringInterner::new();
        let a = interner.intern("A");
        let global = SharedScope::root(ScopeKind::Global);
        let class = SharedScope::child(&global, ScopeKind::Class(a));
        let body = SharedScope::child(&class, ScopeKind::Function);
        assert_eq!(body.nearest_class(), Some(a));
        assert_eq!(global.nearest_class(), None);
    }
}
