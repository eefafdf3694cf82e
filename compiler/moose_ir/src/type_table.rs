//! Expression-type side table.
//!
//! The type checker records the inferred type of every expression
//! here, plus which `Call` nodes are constructor calls. The evaluator
//! treats these annotations as authoritative: it never re-infers a
//! static type, only captures runtime types for dispatch.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::ExprId;
use crate::types::MooseType;

/// Checked-type annotations for one program.
#[derive(Clone, Debug, Default)]
pub struct TypeTable {
    types: FxHashMap<ExprId, MooseType>,
    constructor_calls: FxHashSet<ExprId>,
}

impl TypeTable {
    pub fn new() -> Self {
        TypeTable::default()
    }

    /// Record the checked type of an expression.
    pub fn set(&mut self, id: ExprId, ty: MooseType) {
        self.types.insert(id, ty);
    }

    /// The checked type of an expression, if the checker reached it.
    pub fn get(&self, id: ExprId) -> Option<&MooseType> {
        self.types.get(&id)
    }

    /// Mark a `Call` node as a constructor invocation.
    pub fn mark_constructor(&mut self, id: ExprId) {
        self.constructor_calls.insert(id);
    }

    /// Whether a `Call` node constructs a class instance.
    pub fn is_constructor(&self, id: ExprId) -> bool {
        self.constructor_calls.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
