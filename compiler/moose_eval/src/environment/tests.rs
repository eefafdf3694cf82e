use moose_ir::types::{NoClasses, ParamType, Resolution};
use moose_ir::{MooseType, Signature, StringInterner};

use super::*;
use crate::value::{BuiltinFunctionValue, Value};
use std::rc::Rc;

fn builtin_fn(interner: &StringInterner, name: &str, params: Vec<MooseType>) -> Value {
    Value::BuiltinFunction(Rc::new(BuiltinFunctionValue {
        name: interner.intern(name),
        sig: Signature::new(params.into_iter().map(ParamType::new).collect(), MooseType::Void),
        native: |_, _| Ok(Value::Void),
    }))
}

#[test]
fn lookup_walks_outward() {
    let interner = StringInterner::new();
    let x = interner.intern("x");
    let global = SharedEnv::root(EnvKind::Global);
    global.define(x, Value::int(1));
    let inner = SharedEnv::child(&global, EnvKind::Block);
    assert_eq!(inner.lookup(x), Some(Value::int(1)));
}

#[test]
fn closed_blocks_lookup_but_not_global_accessor() {
    let interner = StringInterner::new();
    let x = interner.intern("x");
    let global = SharedEnv::root(EnvKind::Global);
    global.define(x, Value::int(1));
    let inner = SharedEnv::child(&global, EnvKind::Block);
    inner.set_closed(true);
    assert_eq!(inner.lookup(x), None);
    assert_eq!(inner.global().lookup(x), Some(Value::int(1)));
}

#[test]
fn update_walks_to_the_defining_env() {
    let interner = StringInterner::new();
    let x = interner.intern("x");
    let global = SharedEnv::root(EnvKind::Global);
    global.define(x, Value::int(1));
    let inner = SharedEnv::child(&global, EnvKind::Block);

    assert!(inner.update(x, Value::int(2), true));
    // The outer binding was updated; no shadow was created.
    assert_eq!(inner.var_in_current(x), None);
    assert_eq!(global.lookup(x), Some(Value::int(2)));
}

#[test]
fn update_defines_innermost_when_missing() {
    let interner = StringInterner::new();
    let y = interner.intern("y");
    let global = SharedEnv::root(EnvKind::Global);
    let inner = SharedEnv::child(&global, EnvKind::Block);

    assert!(inner.update(y, Value::int(7), true));
    assert_eq!(inner.var_in_current(y), Some(Value::int(7)));
    assert_eq!(global.var_in_current(y), None);
}

#[test]
fn update_in_current_never_walks_outward() {
    let interner = StringInterner::new();
    let x = interner.intern("x");
    let global = SharedEnv::root(EnvKind::Global);
    global.define(x, Value::int(1));
    let inner = SharedEnv::child(&global, EnvKind::Block);

    inner.update_in_current(x, Value::int(2));
    // A shadow was created; the outer binding is untouched.
    assert_eq!(inner.var_in_current(x), Some(Value::int(2)));
    assert_eq!(global.var_in_current(x), Some(Value::int(1)));
}

#[test]
fn update_without_define_reports_misses() {
    let interner = StringInterner::new();
    let z = interner.intern("z");
    let env = SharedEnv::root(EnvKind::Global);
    assert!(!env.update(z, Value::int(1), false));
}

#[test]
fn function_resolution_walks_until_closed() {
    let interner = StringInterner::new();
    let f = interner.intern("f");
    let global = SharedEnv::root(EnvKind::Global);
    global.define_function(f, builtin_fn(&interner, "f", vec![MooseType::Integer]));

    let inner = SharedEnv::child(&global, EnvKind::Function);
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
fn ambiguity_stops_in_one_scope() {
    let interner = StringInterner::new();
    let f = interner.intern("f");
    let env = SharedEnv::root(EnvKind::Global);
    env.define_function(f, builtin_fn(&interner, "f", vec![MooseType::Integer]));
    env.define_function(f, builtin_fn(&interner, "f", vec![MooseType::Float]));

    assert!(matches!(
        env.resolve_function(f, &[MooseType::Nil], &NoClasses),
        Resolution::Ambiguous
    ));
}

#[test]
fn inner_definition_shadows_outer() {
    let interner = StringInterner::new();
    let f = interner.intern("f");
    let global = SharedEnv::root(EnvKind::Global);
    let outer = builtin_fn(&interner, "f", vec![MooseType::Integer]);
    global.define_function(f, outer);

    let inner_env = SharedEnv::child(&global, EnvKind::Function);
    let inner = builtin_fn(&interner, "f", vec![MooseType::Integer]);
    inner_env.define_function(f, inner.clone());

    match inner_env.resolve_function(f, &[MooseType::Integer], &NoClasses) {
        Resolution::Found(found) => assert_eq!(found, inner),
        other => panic!("expected the inner overload, got {other:?}"),
    }
}

#[test]
fn duplicate_preserves_template_parent() {
    let interner = StringInterner::new();
    let x = interner.intern("x");
    let global = SharedEnv::root(EnvKind::Global);
    global.define(x, Value::int(9));
    let a = interner.intern("A");
    let template = SharedEnv::child(&global, EnvKind::Instance(a));
    template.define(interner.intern("y"), Value::Int(None));

    let instance = template.duplicate(EnvKind::Instance(a));
    // Shares the parent chain but not the tables.
    assert_eq!(instance.lookup(x), Some(Value::int(9)));
    instance.define(interner.intern("y"), Value::int(1));
    assert_eq!(template.var_in_current(interner.intern("y")), Some(Value::Int(None)));
}

#[test]
fn nearest_instance_walks_the_chain() {
    let interner = StringInterner::new();
    let a = interner.intern("A");
    let global = SharedEnv::root(EnvKind::Global);
    let inst = SharedEnv::child(&global, EnvKind::Instance(a));
    let frame = SharedEnv::child(&inst, EnvKind::Function);
    let (name, env) = frame.nearest_instance().expect("instance in chain");
    assert_eq!(name, a);
    assert!(env.ptr_eq(&inst));
}
