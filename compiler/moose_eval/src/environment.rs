//! The runtime environment tree.
//!
//! Same shape as the checker's scope — parent pointer, variable table,
//! function/operator overload tables, class registry, `closed` flag —
//! with values as payloads. Environments are shared between call
//! frames, closures, and class instances, so nodes are reference
//! counted with interior mutability; all allocation goes through the
//! [`SharedEnv`] factory methods.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use moose_ir::types::{resolve_overload, ClassGraph, Resolution};
use moose_ir::{MooseType, Name, OpPosition};

use crate::value::{callable_params, Value};

/// What an environment node belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnvKind {
    /// The built-in root: seeded operators, parent of global.
    BuiltinRoot,
    /// The program's global environment.
    Global,
    /// A member environment of a built-in primitive type.
    BuiltinMembers,
    /// A braced block.
    Block,
    /// A call frame.
    Function,
    /// A class template or instance environment.
    Instance(Name),
}

/// A single-threaded shared environment handle.
#[derive(Clone)]
pub struct SharedEnv(Rc<RefCell<EnvNode>>);

/// An environment node's tables.
pub struct EnvNode {
    parent: Option<SharedEnv>,
    kind: EnvKind,
    vars: FxHashMap<Name, Value>,
    funcs: FxHashMap<Name, Vec<Value>>,
    ops: FxHashMap<(Name, OpPosition), Vec<Value>>,
    classes: FxHashMap<Name, SharedClass>,
    closed: bool,
}

/// The runtime registration of a class.
pub struct ClassTemplate {
    pub name: Name,
    /// Cleared by `flat()`.
    pub superclass: Option<Name>,
    /// Ordered; inherited properties first after flattening.
    pub properties: Vec<(Name, MooseType)>,
    /// The class template environment: default property values plus
    /// method and operator values closed over it.
    pub env: SharedEnv,
    /// The class and its ancestors, nearest first; filled by `flat()`.
    pub lineage: Vec<Name>,
    pub flattened: bool,
    /// Re-entry mark; inheritance cycles are compile errors, this only
    /// keeps `flat()` from recursing forever on corrupt input.
    pub visiting: bool,
}

pub type SharedClass = Rc<RefCell<ClassTemplate>>;

impl SharedEnv {
    /// Create an environment with no parent.
    pub fn root(kind: EnvKind) -> Self {
        SharedEnv(Rc::new(RefCell::new(EnvNode {
            parent: None,
            kind,
            vars: FxHashMap::default(),
            funcs: FxHashMap::default(),
            ops: FxHashMap::default(),
            classes: FxHashMap::default(),
            closed: false,
        })))
    }

    /// Create a child environment.
    pub fn child(parent: &SharedEnv, kind: EnvKind) -> Self {
        let env = SharedEnv::root(kind);
        env.0.borrow_mut().parent = Some(parent.clone());
        env
    }

    /// Copy this node's tables into a new environment with the same
    /// parent. Used to stamp a class instance out of its template.
    pub fn duplicate(&self, kind: EnvKind) -> SharedEnv {
        let node = self.0.borrow();
        SharedEnv(Rc::new(RefCell::new(EnvNode {
            parent: node.parent.clone(),
            kind,
            vars: node.vars.clone(),
            funcs: node.funcs.clone(),
            ops: node.ops.clone(),
            classes: node.classes.clone(),
            closed: false,
        })))
    }

    pub fn ptr_eq(&self, other: &SharedEnv) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn kind(&self) -> EnvKind {
        self.0.borrow().kind.clone()
    }

    pub fn parent(&self) -> Option<SharedEnv> {
        self.0.borrow().parent.clone()
    }

    pub fn closed(&self) -> bool {
        self.0.borrow().closed
    }

    pub fn set_closed(&self, closed: bool) {
        self.0.borrow_mut().closed = closed;
    }

    /// Walk to the global environment; the reserved accessor that
    /// pierces `closed`.
    pub fn global(&self) -> SharedEnv {
        let mut env = self.clone();
        loop {
            if matches!(env.kind(), EnvKind::Global) {
                return env;
            }
            match env.parent() {
                Some(parent) => env = parent,
                None => return env,
            }
        }
    }

    /// The nearest enclosing class environment, walking parents.
    pub fn nearest_instance(&self) -> Option<(Name, SharedEnv)> {
        let mut env = Some(self.clone());
        while let Some(e) = env {
            if let EnvKind::Instance(name) = e.kind() {
                return Some((name, e));
            }
            env = e.parent();
        }
        None
    }

    // --- Variables ---

    /// Define a variable in this environment.
    pub fn define(&self, name: Name, value: Value) {
        self.0.borrow_mut().vars.insert(name, value);
    }

    /// Look up a variable, walking outward; a closed node stops the
    /// walk.
    pub fn lookup(&self, name: Name) -> Option<Value> {
        let node = self.0.borrow();
        if let Some(value) = node.vars.get(&name) {
            return Some(value.clone());
        }
        if node.closed {
            return None;
        }
        node.parent.as_ref().and_then(|p| p.lookup(name))
    }

    /// Update an existing binding, walking outward. When none exists
    /// and `allow_define` is set, defines in this environment instead.
    /// Returns whether a binding was written.
    pub fn update(&self, name: Name, value: Value, allow_define: bool) -> bool {
        if self.update_walk(name, &value) {
            return true;
        }
        if allow_define {
            self.define(name, value);
            return true;
        }
        false
    }

    fn update_walk(&self, name: Name, value: &Value) -> bool {
        let mut node = self.0.borrow_mut();
        if let Some(slot) = node.vars.get_mut(&name) {
            *slot = value.clone();
            return true;
        }
        if node.closed {
            return false;
        }
        match node.parent.clone() {
            Some(parent) => {
                drop(node);
                parent.update_walk(name, value)
            }
            None => false,
        }
    }

    /// Update or define in this environment only; never walks outward.
    pub fn update_in_current(&self, name: Name, value: Value) {
        self.define(name, value);
    }

    /// A variable of this environment only.
    pub fn var_in_current(&self, name: Name) -> Option<Value> {
        self.0.borrow().vars.get(&name).cloned()
    }

    // --- Functions ---

    /// Add a function overload (a `Function` or `BuiltinFunction`
    /// value). The checker has already refused duplicates.
    pub fn define_function(&self, name: Name, value: Value) {
        self.0.borrow_mut().funcs.entry(name).or_default().push(value);
    }

    /// Resolve a function call against stored overloads, walking
    /// outward per the overload rule.
    pub fn resolve_function(
        &self,
        name: Name,
        args: &[MooseType],
        classes: &dyn ClassGraph,
    ) -> Resolution<Value> {
        let node = self.0.borrow();
        if let Some(overloads) = node.funcs.get(&name) {
            match resolve_overload(overloads, callable_params, args, classes) {
                Resolution::Found(value) => return Resolution::Found(value.clone()),
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

    // --- Operators ---

    /// Add an operator overload, keyed by symbol and position.
    pub fn define_operator(&self, op: Name, position: OpPosition, value: Value) {
        self.0
            .borrow_mut()
            .ops
            .entry((op, position))
            .or_default()
            .push(value);
    }

    /// Resolve an operator application; same walk as functions.
    pub fn resolve_operator(
        &self,
        op: Name,
        position: OpPosition,
        args: &[MooseType],
        classes: &dyn ClassGraph,
    ) -> Resolution<Value> {
        let node = self.0.borrow();
        if let Some(overloads) = node.ops.get(&(op, position)) {
            match resolve_overload(overloads, callable_params, args, classes) {
                Resolution::Found(value) => return Resolution::Found(value.clone()),
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

    /// Register a class template in this environment.
    pub fn define_class(&self, name: Name, template: SharedClass) {
        self.0.borrow_mut().classes.insert(name, template);
    }

    /// Look up a class template, walking outward per the closed rule.
    pub fn class(&self, name: Name) -> Option<SharedClass> {
        let node = self.0.borrow();
        if let Some(template) = node.classes.get(&name) {
            return Some(template.clone());
        }
        if node.closed {
            return None;
        }
        node.parent.as_ref().and_then(|p| p.class(name))
    }

    // --- Table snapshots (flattening and instantiation) ---

    pub fn all_vars(&self) -> Vec<(Name, Value)> {
        self.0
            .borrow()
            .vars
            .iter()
            .map(|(n, v)| (*n, v.clone()))
            .collect()
    }

    pub fn all_functions(&self) -> Vec<(Name, Vec<Value>)> {
        self.0
            .borrow()
            .funcs
            .iter()
            .map(|(n, vs)| (*n, vs.clone()))
            .collect()
    }

    pub fn all_operators(&self) -> Vec<((Name, OpPosition), Vec<Value>)> {
        self.0
            .borrow()
            .ops
            .iter()
            .map(|(k, vs)| (*k, vs.clone()))
            .collect()
    }

    /// Function overloads of this environment only.
    pub fn function_overloads(&self, name: Name) -> Vec<Value> {
        self.0.borrow().funcs.get(&name).cloned().unwrap_or_default()
    }

    /// Replace a function table wholesale (method rebinding).
    pub fn replace_functions(&self, funcs: FxHashMap<Name, Vec<Value>>) {
        self.0.borrow_mut().funcs = funcs;
    }

    /// Replace the operator table wholesale (method rebinding).
    pub fn replace_operators(&self, ops: FxHashMap<(Name, OpPosition), Vec<Value>>) {
        self.0.borrow_mut().ops = ops;
    }
}

/// `ClassGraph` view over the runtime class registry.
pub struct EnvGraph {
    env: SharedEnv,
}

impl EnvGraph {
    pub fn new(env: SharedEnv) -> Self {
        EnvGraph { env }
    }
}

impl ClassGraph for EnvGraph {
    fn is_ancestor(&self, ancestor: Name, descendant: Name) -> bool {
        let registry = self.env.global();
        let Some(template) = self.env.class(descendant).or_else(|| registry.class(descendant))
        else {
            return false;
        };
        let template = template.borrow();
        if template.flattened {
            return template.lineage.iter().skip(1).any(|n| *n == ancestor);
        }
        let mut current = template.superclass;
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            current = registry.class(name).and_then(|t| t.borrow().superclass);
        }
        false
    }
}

#[cfg(test)]
mod tests;
