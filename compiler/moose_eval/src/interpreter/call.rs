//! The call protocol and constructor calls.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use moose_ir::types::params_equal;
use moose_ir::Name;

use crate::environment::{EnvKind, SharedClass, SharedEnv};
use crate::flow::{generic, not_found, EvalResult, Flow};
use crate::value::{callable_params, FunctionValue, NativeFn, OperatorValue, Value};

use super::Interpreter;

impl Interpreter<'_> {
    /// Invoke a resolved callable with evaluated arguments.
    ///
    /// Untyped nil arguments are retyped against the callee's declared
    /// parameters as they are bound — for built-ins as much as for
    /// user code, so a native comparing `Int` slots sees `Int(nil)`.
    pub(crate) fn call_value(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult {
        match callee {
            Value::BuiltinFunction(f) => {
                let args = retype_args(args, &f.sig.params);
                self.call_native(f.native, args)
            }
            Value::BuiltinOperator(o) => {
                let args = retype_args(args, &o.sig.params);
                self.call_native(o.native, args)
            }
            Value::Function(f) => {
                let f = f.clone();
                self.call_user(&f.sig, &f.param_names, f.body, &f.closure, args)
            }
            Value::Operator(o) => {
                let o = o.clone();
                self.call_user(&o.sig, &o.param_names, o.body, &o.closure, args)
            }
            other => Err(generic(format!(
                "{} is not callable",
                other.type_of().display(self.interner)
            ))),
        }
    }

    /// Built-in call: unless already inside a built-in member frame
    /// (where the receiver lives), switch to the global environment so
    /// the native sees a clean lexical frame. The closed flag is
    /// cleared either way and restored on exit.
    fn call_native(&mut self, native: NativeFn, args: Vec<Value>) -> EvalResult {
        if matches!(self.env.kind(), EnvKind::BuiltinMembers) {
            let mut guard = self.enter_open();
            native(&mut guard, &args).map_err(Flow::from)
        } else {
            let global = self.global.clone();
            let mut guard = self.enter_env_open(global);
            native(&mut guard, &args).map_err(Flow::from)
        }
    }

    /// User call: activate the callee's captured closure (closed flag
    /// cleared), push a fresh frame, bind parameters, evaluate the
    /// body. The return signal is absorbed here; falling off the end
    /// yields Void. The guard restores everything on every exit path.
    fn call_user(
        &mut self,
        sig: &moose_ir::Signature,
        param_names: &[Name],
        body: moose_ir::StmtId,
        closure: &SharedEnv,
        args: Vec<Value>,
    ) -> EvalResult {
        if args.len() != param_names.len() {
            return Err(generic(format!(
                "expected {} argument{}, found {}",
                param_names.len(),
                if param_names.len() == 1 { "" } else { "s" },
                args.len()
            )));
        }

        let mut frame = self.enter_call_frame(closure);
        for ((name, param), arg) in param_names.iter().zip(&sig.params).zip(args) {
            frame.env.define(*name, arg.retype_nil(&param.ty));
        }
        let result = frame.eval_stmt(body);
        drop(frame);

        match result {
            Ok(_) => Ok(Value::Void),
            Err(Flow::Return(value)) => Ok(value),
            Err(panic) => Err(panic),
        }
    }

    /// Constructor call: flatten the class (idempotent), stamp an
    /// instance out of the template, bind positional arguments to the
    /// flattened property list, and rebind every method's closure to
    /// the new instance environment.
    pub(crate) fn construct(&mut self, class_name: Name, args: Vec<Value>) -> EvalResult {
        let Some(template) = self
            .env
            .class(class_name)
            .or_else(|| self.global.class(class_name))
        else {
            return Err(not_found(format!(
                "unknown class `{}`",
                self.interner.lookup(class_name)
            )));
        };

        self.flat(&template);

        let (properties, template_env) = {
            let t = template.borrow();
            (t.properties.clone(), t.env.clone())
        };
        if args.len() > properties.len() {
            return Err(generic(format!(
                "class `{}` has {} properties but {} arguments were passed",
                self.interner.lookup(class_name),
                properties.len(),
                args.len()
            )));
        }

        let instance_env = template_env.duplicate(EnvKind::Instance(class_name));
        for ((prop_name, prop_ty), arg) in properties.iter().zip(args) {
            instance_env.define(*prop_name, arg.retype_nil(prop_ty));
        }

        // Method rebinding: class-stored closures point at the
        // template; the instance must own them.
        let mut funcs: FxHashMap<Name, Vec<Value>> = FxHashMap::default();
        for (name, overloads) in instance_env.all_functions() {
            funcs.insert(
                name,
                overloads
                    .into_iter()
                    .map(|v| rebind(v, &instance_env))
                    .collect(),
            );
        }
        instance_env.replace_functions(funcs);

        let mut ops = FxHashMap::default();
        for (key, overloads) in instance_env.all_operators() {
            ops.insert(
                key,
                overloads
                    .into_iter()
                    .map(|v| rebind(v, &instance_env))
                    .collect(),
            );
        }
        instance_env.replace_operators(ops);

        Ok(Value::Instance(Rc::new(crate::value::InstanceValue {
            class_name,
            env: instance_env,
        })))
    }

    /// Runtime class flattening; mirrors the checker's pass minus the
    /// error reporting (the checker already validated the hierarchy).
    /// Idempotent after the first call.
    fn flat(&mut self, template: &SharedClass) {
        {
            let t = template.borrow();
            if t.flattened || t.visiting {
                return;
            }
        }
        template.borrow_mut().visiting = true;

        let superclass = template.borrow().superclass;
        if let Some(sup_name) = superclass {
            let registry = self.global.clone();
            if let Some(sup) = registry.class(sup_name) {
                self.flat(&sup);
                if sup.borrow().flattened {
                    merge_template(template, &sup);
                }
            }
        }

        let mut t = template.borrow_mut();
        if t.lineage.is_empty() {
            t.lineage = vec![t.name];
        }
        t.superclass = None;
        t.flattened = true;
        t.visiting = false;
    }
}

/// Rebind a stored method's closure to a new instance environment.
fn rebind(value: Value, env: &SharedEnv) -> Value {
    match value {
        Value::Function(f) => Value::Function(Rc::new(FunctionValue {
            name: f.name,
            sig: f.sig.clone(),
            param_names: f.param_names.clone(),
            body: f.body,
            closure: env.clone(),
        })),
        Value::Operator(o) => Value::Operator(Rc::new(OperatorValue {
            op: o.op,
            position: o.position,
            sig: o.sig.clone(),
            param_names: o.param_names.clone(),
            body: o.body,
            closure: env.clone(),
        })),
        other => other,
    }
}

/// Retype untyped nil arguments against declared parameter types.
fn retype_args(args: Vec<Value>, params: &[moose_ir::types::ParamType]) -> Vec<Value> {
    args.into_iter()
        .zip(params)
        .map(|(arg, param)| arg.retype_nil(&param.ty))
        .collect()
}

/// Merge a flattened superclass template into a subclass template.
fn merge_template(template: &SharedClass, sup: &SharedClass) {
    let (sup_props, sup_env, sup_lineage) = {
        let s = sup.borrow();
        (s.properties.clone(), s.env.clone(), s.lineage.clone())
    };
    let env = template.borrow().env.clone();

    for (name, value) in sup_env.all_vars() {
        if env.var_in_current(name).is_none() {
            env.define(name, value);
        }
    }
    for (name, overloads) in sup_env.all_functions() {
        for value in overloads {
            let own = env.function_overloads(name);
            let overridden = own
                .iter()
                .any(|o| params_equal(callable_params(o), callable_params(&value)));
            if !overridden {
                env.define_function(name, value);
            }
        }
    }
    for ((op, position), overloads) in sup_env.all_operators() {
        for value in overloads {
            let own: Vec<Value> = env
                .all_operators()
                .into_iter()
                .filter(|(key, _)| *key == (op, position))
                .flat_map(|(_, vs)| vs)
                .collect();
            let overridden = own
                .iter()
                .any(|o| params_equal(callable_params(o), callable_params(&value)));
            if !overridden {
                env.define_operator(op, position, value);
            }
        }
    }

    let mut t = template.borrow_mut();
    let mut properties = sup_props;
    properties.extend(t.properties.iter().cloned());
    t.properties = properties;
    let mut lineage = vec![t.name];
    lineage.extend(sup_lineage);
    t.lineage = lineage;
}
