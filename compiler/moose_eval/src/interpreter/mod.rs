//! Tree-walking interpreter for Moose.
//!
//! Evaluation consumes the parsed arena and the checker's `TypeTable`
//! (authoritative for declared types and constructor marking) and
//! maintains the current environment handle. The global-exploration
//! pass mirrors the checker's: top-level functions, operators, and
//! classes are registered into the global environment before the
//! statements run, so the statements themselves are no-ops for those
//! forms at global scope.
//!
//! Submodules:
//! - `stmt` - statements, assignment-target dispatch
//! - `expr` - expressions, member access, indexing
//! - `call` - the call protocol and constructor calls
//! - `guard` - RAII environment/closed-flag guards

mod call;
mod expr;
mod guard;
mod stmt;

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use moose_ir::{
    Arena, ClassDef, FunctionDef, Module, Name, OperationDef, StmtKind, StringInterner, TypeTable,
};

use crate::builtins::Builtins;
use crate::environment::{ClassTemplate, EnvGraph, EnvKind, SharedEnv};
use crate::flow::{Flow, Panic, PanicKind};
use crate::value::{FunctionValue, OperatorValue, Value};

/// Tree-walking interpreter.
///
/// One interpreter instance owns its global environment; resetting
/// means constructing a fresh one and re-seeding built-ins.
pub struct Interpreter<'a> {
    pub(crate) interner: &'a StringInterner,
    pub(crate) arena: &'a Arena,
    pub(crate) types: &'a TypeTable,
    /// The current environment.
    pub(crate) env: SharedEnv,
    pub(crate) global: SharedEnv,
    pub(crate) builtins: Builtins,
    /// Pre-interned reserved `global` accessor name.
    pub(crate) global_name: Name,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter with seeded built-ins.
    pub fn new(interner: &'a StringInterner, arena: &'a Arena, types: &'a TypeTable) -> Self {
        let (builtins, global) = Builtins::install(interner);
        Interpreter {
            interner,
            arena,
            types,
            env: global.clone(),
            global,
            builtins,
            global_name: interner.intern("global"),
        }
    }

    /// Run a type-checked module.
    ///
    /// Registers the global definitions, then evaluates the top-level
    /// statements in order. A panic unwinds here with its trace; a
    /// stray return signal (impossible in checked programs) is turned
    /// into a panic rather than leaking.
    pub fn run(&mut self, module: &Module) -> Result<(), Panic> {
        self.register_globals(module)?;
        for &stmt_id in &module.stmts {
            match self.eval_stmt(stmt_id) {
                Ok(_) => {}
                Err(Flow::Panic(panic)) => return Err(panic),
                Err(Flow::Return(_)) => {
                    return Err(Panic::new(PanicKind::Generic(
                        "`return` outside of a function".to_string(),
                    )))
                }
            }
        }
        debug!("evaluation finished");
        Ok(())
    }

    /// The global environment.
    pub fn global_env(&self) -> &SharedEnv {
        &self.global
    }

    /// Look up a global binding by source name.
    pub fn lookup_global(&self, name: &str) -> Option<Value> {
        self.global.lookup(self.interner.intern(name))
    }

    /// The receiver bound in the current built-in member frame.
    pub(crate) fn receiver(&self) -> Result<Value, Panic> {
        self.env.lookup(self.builtins.receiver).ok_or_else(|| {
            Panic::new(PanicKind::Generic(
                "built-in member called without a receiver".to_string(),
            ))
        })
    }

    pub(crate) fn graph(&self) -> EnvGraph {
        EnvGraph::new(self.env.clone())
    }

    pub(crate) fn render_args(&self, args: &[Value]) -> String {
        let parts: Vec<String> = args
            .iter()
            .map(|v| v.type_of().display(self.interner).to_string())
            .collect();
        format!("({})", parts.join(", "))
    }

    /// Register top-level definitions into the global environment.
    ///
    /// Functions and operators first, then classes, so property
    /// defaults can call any top-level function.
    fn register_globals(&mut self, module: &Module) -> Result<(), Panic> {
        for &stmt_id in &module.stmts {
            match &self.arena.stmt(stmt_id).kind {
                StmtKind::Function(id) => {
                    let def = self.arena.function(*id);
                    let value = self.function_value(def, self.global.clone());
                    self.global.define_function(def.name, value);
                }
                StmtKind::Operation(id) => {
                    let def = self.arena.operation(*id);
                    let value = self.operator_value(def, self.global.clone());
                    self.global.define_operator(def.op, def.position, value);
                }
                _ => {}
            }
        }
        for &stmt_id in &module.stmts {
            if let StmtKind::Class(id) = self.arena.stmt(stmt_id).kind {
                let def = self.arena.class(id).clone();
                let global = self.global.clone();
                if let Err(flow) = self.register_class(&def, &global) {
                    return Err(match flow {
                        Flow::Panic(panic) => panic,
                        Flow::Return(_) => Panic::new(PanicKind::Generic(
                            "`return` outside of a function".to_string(),
                        )),
                    });
                }
            }
        }
        Ok(())
    }

    pub(crate) fn function_value(&self, def: &FunctionDef, closure: SharedEnv) -> Value {
        Value::Function(Rc::new(FunctionValue {
            name: def.name,
            sig: crate::signature_of(&def.params, &def.ret),
            param_names: def.params.iter().map(|p| p.name).collect(),
            body: def.body,
            closure,
        }))
    }

    pub(crate) fn operator_value(&self, def: &OperationDef, closure: SharedEnv) -> Value {
        Value::Operator(Rc::new(OperatorValue {
            op: def.op,
            position: def.position,
            sig: crate::signature_of(&def.params, &def.ret),
            param_names: def.params.iter().map(|p| p.name).collect(),
            body: def.body,
            closure,
        }))
    }

    /// Register a class: build its template environment (evaluated
    /// property defaults, methods closed over the template) and file
    /// it in `parent_env`'s class table.
    pub(crate) fn register_class(
        &mut self,
        def: &ClassDef,
        parent_env: &SharedEnv,
    ) -> Result<(), Flow> {
        let template_env = SharedEnv::child(parent_env, EnvKind::Instance(def.name));

        for prop in &def.properties {
            if prop.default.is_none() {
                template_env.define(prop.name, Value::nil_of(&prop.ty));
            }
        }
        for prop in &def.properties {
            if let Some(default) = prop.default {
                let value = {
                    let mut guard = self.enter_env(template_env.clone());
                    guard.eval_expr(default)?
                };
                template_env.define(prop.name, value.retype_nil(&prop.ty));
            }
        }

        for &method_id in &def.methods {
            let method = self.arena.function(method_id);
            let value = self.function_value(method, template_env.clone());
            template_env.define_function(method.name, value);
        }
        for &op_id in &def.operators {
            let op = self.arena.operation(op_id);
            let value = self.operator_value(op, template_env.clone());
            template_env.define_operator(op.op, op.position, value);
        }

        let template = Rc::new(RefCell::new(ClassTemplate {
            name: def.name,
            superclass: def.superclass,
            properties: def
                .properties
                .iter()
                .map(|p| (p.name, p.ty.clone()))
                .collect(),
            env: template_env,
            lineage: Vec::new(),
            flattened: false,
            visiting: false,
        }));
        parent_env.define_class(def.name, template);
        Ok(())
    }
}
