//! Tree-walking evaluator for Moose.
//!
//! The runtime half of the semantic engine: `Value` (tagged runtime
//! objects with typed-nil slots), `Environment` (the scope-shaped name
//! tree with values as payloads), the built-in registry, and the
//! interpreter itself. Evaluation is single-threaded and synchronous;
//! every environment mutation is guarded so state is restored on all
//! exit paths, including panics and return signals.

mod builtins;
mod environment;
mod flow;
mod interpreter;
mod value;

#[cfg(test)]
mod tests;

pub use builtins::Builtins;
pub use environment::{ClassTemplate, EnvGraph, EnvKind, SharedClass, SharedEnv};
pub use flow::{EvalResult, Flow, Panic, PanicKind, TraceEntry};
pub use interpreter::Interpreter;
pub use value::{
    BuiltinFunctionValue, BuiltinOperatorValue, FunctionValue, InstanceValue, NativeFn,
    OperatorValue, Value,
};

use moose_ir::types::ParamType;
use moose_ir::{MooseType, Param, Signature};

/// The declared signature of a parameter list.
pub(crate) fn signature_of(params: &[Param], ret: &MooseType) -> Signature {
    let params = params
        .iter()
        .map(|p| ParamType {
            ty: p.ty.clone(),
            mutable: p.mutable,
        })
        .collect();
    Signature::new(params, ret.clone())
}
