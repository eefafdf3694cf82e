//! Type checker for Moose.
//!
//! Three passes over the parsed module, sharing one scope tree:
//!
//! 1. **Global exploration** registers every top-level class, function,
//!    and operator signature into the global scope, so later
//!    definitions are visible to earlier bodies.
//! 2. **Class flattening** resolves single-inheritance chains: each
//!    class ends with its superclass's properties and methods merged
//!    into its own tables and a cleared superclass pointer.
//! 3. **Checking** walks every statement, annotates each expression's
//!    type into the `TypeTable`, and marks constructor calls.
//!
//! Errors are collected in bulk; checking synchronizes on statement
//! boundaries, so one run reports as many problems as it can find.

mod checker;
mod explore;
mod flatten;
mod scope;

#[cfg(test)]
mod tests;

pub use checker::{check, Checked};
pub use explore::explore;
pub use flatten::flatten_classes;
pub use scope::{ClassInfo, ScopeGraph, ScopeKind, SharedClassInfo, SharedScope, VarRecord};
