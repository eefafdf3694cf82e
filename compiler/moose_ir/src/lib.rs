//! Moose IR - Intermediate Representation Types
//!
//! This crate contains the core data structures shared by every phase
//! of the Moose compiler:
//! - Spans for source locations
//! - Names for interned identifiers
//! - Tokens and `TokenList` for lexer output
//! - Flat AST nodes allocated in an `Arena`
//! - The Moose type lattice (`MooseType`) with the subtype predicate
//!   and the overload-matching algorithm used by both the type checker
//!   and the evaluator
//! - The `TypeTable` side table the checker produces and the evaluator
//!   consumes
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: Strings → Name(u32)
//! - **Flatten Everything**: No `Box<Expr>`, use `ExprId(u32)` indices

mod arena;
pub mod ast;
pub mod builtins;
mod interner;
mod name;
mod span;
mod token;
mod type_table;
pub mod types;

pub use arena::{Arena, ClassId, ExprRange, FuncId, OpId, StmtRange};
pub use ast::{
    ClassDef, Expr, ExprId, ExprKind, FunctionDef, Module, OperationDef, Param, PropertyDef, Stmt,
    StmtId, StmtKind,
};
pub use interner::StringInterner;
pub use name::Name;
pub use span::Span;
pub use token::{Token, TokenKind, TokenList};
pub use type_table::TypeTable;
pub use types::{
    ClassGraph, MooseType, OpPosition, ParamType, Resolution, Signature, params_equal,
    resolve_overload, signature_matches,
};
