//! End-to-end scenarios driven through the full pipeline.

use moose_eval::{PanicKind, Value};
use moosec::driver::{run_source, FinalState, RunError};

fn run_ok(source: &str) -> FinalState {
    match run_source(source) {
        Ok(state) => state,
        Err(RunError::Compile(diags)) => panic!("compile errors: {diags:?}"),
        Err(RunError::Panic(panic)) => {
            panic!("runtime panic: {} ({:?})", panic.message(), panic.kind)
        }
    }
}

fn run_panics(source: &str) -> moose_eval::Panic {
    match run_source(source) {
        Ok(_) => panic!("expected a runtime panic"),
        Err(RunError::Compile(diags)) => panic!("compile errors: {diags:?}"),
        Err(RunError::Panic(panic)) => panic,
    }
}

fn compile_errors(source: &str) -> Vec<moose_diagnostic::Diagnostic> {
    match run_source(source) {
        Ok(_) => panic!("expected compile errors"),
        Err(RunError::Compile(diags)) => diags,
        Err(RunError::Panic(panic)) => panic!("unexpected runtime panic: {}", panic.message()),
    }
}

#[test]
fn declaration_and_conversion() {
    let state = run_ok("a: Int = 5\nb = a.toString()");
    assert_eq!(state.lookup("a"), Some(Value::int(5)));
    assert_eq!(state.lookup("b"), Some(Value::string("5")));
}

#[test]
fn mutable_accumulation() {
    let state = run_ok("mut a = 1\na = a + 2");
    assert_eq!(state.lookup("a"), Some(Value::int(3)));
}

#[test]
fn tuple_destructuring_then_sum() {
    let state = run_ok("(a, b) = (1, 2)\nc = a + b");
    assert_eq!(state.lookup("c"), Some(Value::int(3)));
}

#[test]
fn inherited_property_access() {
    let source = "\
class A { x: Int }
class B < A { y: Int }
b = B(1, 2)
s = b.x + b.y
";
    let state = run_ok(source);
    assert_eq!(state.lookup("s"), Some(Value::int(3)));
}

#[test]
fn list_boundaries() {
    let state = run_ok("l = [10, 20, 30]\nlast = l[-1]");
    assert_eq!(state.lookup("last"), Some(Value::int(30)));

    let panic = run_panics("l = [10, 20, 30]\nx = l[3]");
    assert_eq!(panic.kind, PanicKind::OutOfBounds { len: 3, index: 3 });
}

#[test]
fn user_overload_shadows_builtin() {
    let source = "\
infix +(a: Int, b: Int) -> Int { return a - b }
x = 1 + 2
";
    let state = run_ok(source);
    assert_eq!(state.lookup("x"), Some(Value::int(-1)));
}

#[test]
fn nil_call_ambiguity_is_a_compile_error() {
    let source = "\
func f(a: Int) -> Int { return 1 }
func f(a: Float) -> Int { return 2 }
x = f(nil)
";
    let diags = compile_errors(source);
    assert!(diags
        .iter()
        .any(|d| d.code == moose_diagnostic::ErrorCode::E2003));
}

#[test]
fn nil_call_binds_against_single_overload() {
    let source = "\
func f(a: Int) -> Bool { return a == nil }
x = f(nil)
";
    let state = run_ok(source);
    assert_eq!(state.lookup("x"), Some(Value::bool(true)));
}

#[test]
fn indexing_nil_panics_with_nil_usage() {
    let panic = run_panics("l: [Int] = nil\nx = l[0]");
    assert_eq!(panic.kind, PanicKind::NilUsage);
}

#[test]
fn integer_round_trip() {
    let source = "\
(v, err) = 12345.toString().parseInt()
(n, nerr) = 9.toString().parseInt()
";
    let state = run_ok(source);
    assert_eq!(state.lookup("v"), Some(Value::int(12345)));
    assert_eq!(state.lookup("err"), Some(Value::Str(None)));
    assert_eq!(state.lookup("n"), Some(Value::int(9)));
}

#[test]
fn bool_round_trip() {
    let source = "\
(t, terr) = true.toString().parseBool()
a = true.toInt()
b = false.toInt()
back = a.toBool()
";
    let state = run_ok(source);
    assert_eq!(state.lookup("t"), Some(Value::bool(true)));
    assert_eq!(state.lookup("terr"), Some(Value::Str(None)));
    assert_eq!(state.lookup("a"), Some(Value::int(1)));
    assert_eq!(state.lookup("b"), Some(Value::int(0)));
    assert_eq!(state.lookup("back"), Some(Value::bool(true)));
}

#[test]
fn parse_failure_reports_the_message() {
    let state = run_ok("(v, err) = \"moose\".parseInt()");
    assert_eq!(state.lookup("v"), Some(Value::Int(None)));
    assert_eq!(
        state.lookup("err"),
        Some(Value::string("Cannot parse 'moose' to an Int."))
    );
}

#[test]
fn methods_and_me() {
    let source = "\
class Point {
    x: Int
    y: Int
    func manhattan() -> Int { return me.x + me.y }
}
p = Point(3, 4)
d = p.manhattan()
";
    let state = run_ok(source);
    assert_eq!(state.lookup("d"), Some(Value::int(7)));
}

#[test]
fn overridden_method_dispatches_on_the_instance() {
    let source = "\
class A {
    x: Int
    func describe() -> Int { return 1 }
}
class B < A {
    y: Int
    func describe() -> Int { return 2 }
}
a = A(0)
b = B(0, 0)
da = a.describe()
db = b.describe()
";
    let state = run_ok(source);
    assert_eq!(state.lookup("da"), Some(Value::int(1)));
    assert_eq!(state.lookup("db"), Some(Value::int(2)));
}

#[test]
fn panic_is_traced_through_calls() {
    let source = "\
func inner() -> Int { return [1, 2][9] }
func outer() -> Int { return inner() }
x = outer()
";
    let panic = run_panics(source);
    assert_eq!(panic.kind, PanicKind::OutOfBounds { len: 2, index: 9 });
    assert!(panic.trace.iter().any(|t| t.what == "call to `inner`"));
    assert!(panic.trace.iter().any(|t| t.what == "call to `outer`"));
}

#[test]
fn multiple_compile_errors_in_one_run() {
    let diags = compile_errors("x = missing1\ny = missing2\nz = 1 + 2.0");
    let errors = diags.iter().filter(|d| d.is_error()).count();
    assert!(errors >= 3, "expected 3+ errors, got {diags:?}");
}

#[test]
fn operators_on_classes() {
    let source = "\
class Vec2 {
    x: Int
    y: Int
}
infix +(a: Vec2, b: Vec2) -> Vec2 { return Vec2(a.x + b.x, a.y + b.y) }
v = Vec2(1, 2) + Vec2(10, 20)
sx = v.x
sy = v.y
";
    let state = run_ok(source);
    assert_eq!(state.lookup("sx"), Some(Value::int(11)));
    assert_eq!(state.lookup("sy"), Some(Value::int(22)));
}

#[test]
fn string_concat_and_equality() {
    let source = "\
a = \"moo\" + \"se\"
b = a == \"moose\"
";
    let state = run_ok(source);
    assert_eq!(state.lookup("a"), Some(Value::string("moose")));
    assert_eq!(state.lookup("b"), Some(Value::bool(true)));
}
