//! Built-in registry.
//!
//! Seeds two kinds of environment at interpreter start:
//!
//! - the **built-in root**: the parent of the global environment,
//!   holding the global operator table. Living above global means a
//!   user definition with the same signature shadows the built-in
//!   rather than colliding with it.
//! - the **member templates**: one environment per primitive type
//!   holding its conversion members. A member access on a primitive
//!   stamps a child of the template with the receiver bound under a
//!   reserved name; the native bodies read it back from there.
//!
//! The signatures come from the shared `moose_ir::builtins` catalog —
//! the same catalog the type checker seeds its scopes from.

mod members;
mod operators;

use moose_ir::{builtins as catalog, MooseType, Name, StringInterner};

use crate::environment::{EnvKind, SharedEnv};
use crate::value::{BuiltinFunctionValue, BuiltinOperatorValue, Value};
use std::rc::Rc;

/// The installed built-in environments.
pub struct Builtins {
    /// Parent of the global environment; holds the operator table.
    pub root: SharedEnv,
    int_members: SharedEnv,
    float_members: SharedEnv,
    bool_members: SharedEnv,
    string_members: SharedEnv,
    list_members: SharedEnv,
    /// Reserved name the receiver is bound under in member frames.
    pub receiver: Name,
}

impl Builtins {
    /// Install the built-in root and member templates, returning them
    /// with the fresh global environment chained under the root.
    pub fn install(interner: &StringInterner) -> (Builtins, SharedEnv) {
        let root = SharedEnv::root(EnvKind::BuiltinRoot);
        for op in catalog::operator_signatures() {
            let symbol = interner.intern(op.symbol);
            let native = operators::native_for(op.symbol, op.position, &op.sig.params[0].ty);
            root.define_operator(
                symbol,
                op.position,
                Value::BuiltinOperator(Rc::new(BuiltinOperatorValue {
                    op: symbol,
                    position: op.position,
                    sig: op.sig,
                    native,
                })),
            );
        }

        let global = SharedEnv::child(&root, EnvKind::Global);

        let build = |recv: &MooseType| {
            let env = SharedEnv::child(&global, EnvKind::BuiltinMembers);
            for member in catalog::member_signatures(recv) {
                let name = interner.intern(member.name);
                let native = members::native_for(recv, member.name);
                env.define_function(
                    name,
                    Value::BuiltinFunction(Rc::new(BuiltinFunctionValue {
                        name,
                        sig: member.sig,
                        native,
                    })),
                );
            }
            env
        };

        let builtins = Builtins {
            int_members: build(&MooseType::Integer),
            float_members: build(&MooseType::Float),
            bool_members: build(&MooseType::Bool),
            string_members: build(&MooseType::String),
            list_members: build(&MooseType::List(Box::new(MooseType::Nil))),
            root,
            receiver: interner.intern("__self"),
        };
        (builtins, global)
    }

    /// The member template for a primitive value, if it has one.
    pub fn member_template(&self, value: &Value) -> Option<&SharedEnv> {
        Some(match value {
            Value::Int(_) => &self.int_members,
            Value::Float(_) => &self.float_members,
            Value::Bool(_) => &self.bool_members,
            Value::Str(_) => &self.string_members,
            Value::List { .. } => &self.list_members,
            _ => return None,
        })
    }
}
