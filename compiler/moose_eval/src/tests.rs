//! Whole-pipeline evaluator tests: lex, parse, check, run, then
//! inspect the global environment or the panic.

use moose_ir::StringInterner;

use crate::{Interpreter, Panic, PanicKind, Value};

struct Program {
    interner: StringInterner,
    arena: moose_ir::Arena,
    module: moose_ir::Module,
    table: moose_ir::TypeTable,
}

fn compile(source: &str) -> Program {
    let interner = StringInterner::new();
    let (tokens, lex_errors) = moose_lexer::lex(source, &interner);
    assert!(lex_errors.is_empty(), "lex errors: {lex_errors:?}");
    let parsed = moose_parse::parse(&tokens, &interner);
    assert!(!parsed.has_errors(), "parse errors: {:?}", parsed.errors);
    let checked = moose_typeck::check(&parsed.module, &parsed.arena, &interner);
    assert!(
        !checked.has_errors(),
        "type errors: {:?}",
        checked.diagnostics
    );
    Program {
        interner,
        arena: parsed.arena,
        module: parsed.module,
        table: checked.table,
    }
}

fn run_program(source: &str, inspect: impl FnOnce(&Interpreter<'_>)) {
    let program = compile(source);
    let mut interp = Interpreter::new(&program.interner, &program.arena, &program.table);
    match interp.run(&program.module) {
        Ok(()) => inspect(&interp),
        Err(panic) => panic!("unexpected panic: {} ({:?})", panic.message(), panic.kind),
    }
}

fn run_expect_panic(source: &str) -> Panic {
    let program = compile(source);
    let mut interp = Interpreter::new(&program.interner, &program.arena, &program.table);
    match interp.run(&program.module) {
        Ok(()) => panic!("expected a runtime panic"),
        Err(panic) => panic,
    }
}

#[test]
fn declaration_and_builtin_conversion() {
    run_program("a: Int = 5\nb = a.toString()", |interp| {
        assert_eq!(interp.lookup_global("a"), Some(Value::int(5)));
        assert_eq!(interp.lookup_global("b"), Some(Value::string("5")));
    });
}

#[test]
fn mutable_reassignment() {
    run_program("mut a = 1\na = a + 2", |interp| {
        assert_eq!(interp.lookup_global("a"), Some(Value::int(3)));
    });
}

#[test]
fn tuple_destructuring() {
    run_program("(a, b) = (1, 2)\nc = a + b", |interp| {
        assert_eq!(interp.lookup_global("c"), Some(Value::int(3)));
    });
}

#[test]
fn inherited_properties_are_constructed_in_order() {
    let source = "\
class A { x: Int }
class B < A { y: Int }
b = B(1, 2)
z = b.x + b.y
";
    run_program(source, |interp| {
        assert_eq!(interp.lookup_global("z"), Some(Value::int(3)));
    });
}

#[test]
fn negative_index_counts_from_the_end() {
    run_program("l = [10, 20, 30]\nx = l[-1]\ny = l[0]", |interp| {
        assert_eq!(interp.lookup_global("x"), Some(Value::int(30)));
        assert_eq!(interp.lookup_global("y"), Some(Value::int(10)));
    });
}

#[test]
fn index_at_length_is_out_of_bounds() {
    let panic = run_expect_panic("l = [10, 20, 30]\nx = l[3]");
    assert_eq!(panic.kind, PanicKind::OutOfBounds { len: 3, index: 3 });
}

#[test]
fn indexing_nil_is_nil_usage() {
    let panic = run_expect_panic("l: [Int] = nil\nx = l[0]");
    assert_eq!(panic.kind, PanicKind::NilUsage);
}

#[test]
fn user_operator_shadows_builtin() {
    let source = "\
infix +(a: Int, b: Int) -> Int { return a - b }
x = 1 + 2
";
    run_program(source, |interp| {
        assert_eq!(interp.lookup_global("x"), Some(Value::int(-1)));
    });
}

#[test]
fn user_postfix_operator() {
    let source = "\
postfix !(a: Int) -> Int { return a * 10 }
x = 3!
";
    run_program(source, |interp| {
        assert_eq!(interp.lookup_global("x"), Some(Value::int(30)));
    });
}

#[test]
fn function_call_with_nil_binds_typed_nil() {
    let source = "\
func isNilInt(a: Int) -> Bool { return a == nil }
x = isNilInt(nil)
y = isNilInt(4)
";
    run_program(source, |interp| {
        assert_eq!(interp.lookup_global("x"), Some(Value::bool(true)));
        assert_eq!(interp.lookup_global("y"), Some(Value::bool(false)));
    });
}

#[test]
fn indexed_write_mutates_the_list() {
    run_program("l = [1, 2, 3]\nl[1] = 9\nx = l[1]", |interp| {
        assert_eq!(interp.lookup_global("x"), Some(Value::int(9)));
    });
}

#[test]
fn field_write_through_instance() {
    let source = "\
class A { x: Int }
a = A(1)
a.x = 5
y = a.x
";
    run_program(source, |interp| {
        assert_eq!(interp.lookup_global("y"), Some(Value::int(5)));
    });
}

#[test]
fn methods_bind_to_their_instance() {
    let source = "\
class Counter {
    n: Int
    func bump() -> Int { return me.n + 1 }
}
a = Counter(1)
b = Counter(10)
x = a.bump()
y = b.bump()
";
    run_program(source, |interp| {
        assert_eq!(interp.lookup_global("x"), Some(Value::int(2)));
        assert_eq!(interp.lookup_global("y"), Some(Value::int(11)));
    });
}

#[test]
fn method_bodies_reach_globals() {
    let source = "\
func offset() -> Int { return 100 }
class A {
    x: Int
    func shifted() -> Int { return me.x + offset() }
}
a = A(1)
y = a.shifted()
";
    run_program(source, |interp| {
        assert_eq!(interp.lookup_global("y"), Some(Value::int(101)));
    });
}

#[test]
fn member_access_hides_the_callers_scope() {
    // `n` in the caller's scope must not leak into the member lookup.
    let source = "\
class A { x: Int }
n = 7
a = A(1)
y = a.x
";
    run_program(source, |interp| {
        assert_eq!(interp.lookup_global("y"), Some(Value::int(1)));
    });
}

#[test]
fn property_defaults_survive_partial_construction() {
    let source = "\
class A {
    x: Int = 4
    y: Int = 9
}
a = A(1)
s = a.x + a.y
";
    run_program(source, |interp| {
        assert_eq!(interp.lookup_global("s"), Some(Value::int(10)));
    });
}

#[test]
fn is_expression_tests_lineage_and_printable_form() {
    let source = "\
class A { x: Int }
class B < A { y: Int }
b = B(1, 2)
p = b is A
q = b is B
r = 5 is Int
s = 5 is Float
";
    run_program(source, |interp| {
        assert_eq!(interp.lookup_global("p"), Some(Value::bool(true)));
        assert_eq!(interp.lookup_global("q"), Some(Value::bool(true)));
        assert_eq!(interp.lookup_global("r"), Some(Value::bool(true)));
        assert_eq!(interp.lookup_global("s"), Some(Value::bool(false)));
    });
}

#[test]
fn if_on_bool_nil_panics() {
    let panic = run_expect_panic("c: Bool = nil\nif c { x = 1 }");
    assert_eq!(panic.kind, PanicKind::NilUsage);
}

#[test]
fn arithmetic_on_typed_nil_panics() {
    let panic = run_expect_panic("a: Int = nil\nx = a + 1");
    assert_eq!(panic.kind, PanicKind::NilUsage);
}

#[test]
fn division_by_zero_panics() {
    let panic = run_expect_panic("x = 1 / 0");
    assert_eq!(panic.kind, PanicKind::DivisionByZero);
}

#[test]
fn panic_trace_accumulates_node_levels() {
    let panic = run_expect_panic("func f() -> Int { return [1][5] }\nx = f()");
    // At least the index expression, the call, and the assignment.
    assert!(panic.trace.len() >= 3, "trace: {:?}", panic.trace);
    assert_eq!(panic.trace[0].what, "index expression");
    assert!(panic.trace.iter().any(|t| t.what == "call to `f`"));
}

#[test]
fn parse_round_trips() {
    let source = "\
(a, aerr) = 42.toString().parseInt()
(b, berr) = true.toString().parseBool()
(c, cerr) = \"oops\".parseInt()
";
    run_program(source, |interp| {
        assert_eq!(interp.lookup_global("a"), Some(Value::int(42)));
        assert_eq!(interp.lookup_global("aerr"), Some(Value::Str(None)));
        assert_eq!(interp.lookup_global("b"), Some(Value::bool(true)));
        assert_eq!(interp.lookup_global("berr"), Some(Value::Str(None)));
        assert_eq!(interp.lookup_global("c"), Some(Value::Int(None)));
        assert_eq!(
            interp.lookup_global("cerr"),
            Some(Value::string("Cannot parse 'oops' to an Int."))
        );
    });
}

#[test]
fn bool_int_conversions_round_trip() {
    let source = "\
a = true.toInt()
b = false.toInt()
c = a.toBool()
d = b.toBool()
";
    run_program(source, |interp| {
        assert_eq!(interp.lookup_global("a"), Some(Value::int(1)));
        assert_eq!(interp.lookup_global("b"), Some(Value::int(0)));
        assert_eq!(interp.lookup_global("c"), Some(Value::bool(true)));
        assert_eq!(interp.lookup_global("d"), Some(Value::bool(false)));
    });
}

#[test]
fn nil_receiver_propagates_through_conversions() {
    let source = "\
a: Int = nil
b = a.toString()
";
    run_program(source, |interp| {
        assert_eq!(interp.lookup_global("b"), Some(Value::Str(None)));
    });
}

#[test]
fn list_length_member() {
    run_program("l = [1, 2, 3]\nn = l.length()", |interp| {
        assert_eq!(interp.lookup_global("n"), Some(Value::int(3)));
    });
}

#[test]
fn blocks_scope_their_bindings() {
    let source = "\
mut a = 1
{
    a = 2
    b = 99
}
";
    run_program(source, |interp| {
        // The outer binding was updated through the block scope.
        assert_eq!(interp.lookup_global("a"), Some(Value::int(2)));
        // The block-local binding did not leak.
        assert_eq!(interp.lookup_global("b"), None);
    });
}

#[test]
fn environment_is_balanced_after_calls() {
    let source = "\
func f(a: Int) -> Int { return a + 1 }
x = f(f(f(1)))
";
    run_program(source, |interp| {
        // After every call completed, the current environment is the
        // global again and the result landed there.
        assert!(interp.global_env().ptr_eq(&interp.global_env().global()));
        assert_eq!(interp.lookup_global("x"), Some(Value::int(4)));
    });
}

#[test]
fn recursion_terminates() {
    let source = "\
func fact(n: Int) -> Int {
    if n <= 1 { return 1 }
    return n * fact(n - 1)
}
x = fact(10)
";
    run_program(source, |interp| {
        assert_eq!(interp.lookup_global("x"), Some(Value::int(3628800)));
    });
}

#[test]
fn global_accessor_pierces_member_scope() {
    let source = "\
limit = 50
class A {
    x: Int
    func capped() -> Int {
        if me.x > global.limit { return global.limit }
        return me.x
    }
}
a = A(80)
y = a.capped()
";
    run_program(source, |interp| {
        assert_eq!(interp.lookup_global("y"), Some(Value::int(50)));
    });
}

#[test]
fn else_branch_runs() {
    let source = "\
mut x = 0
if 1 > 2 { x = 1 } else { x = 2 }
";
    run_program(source, |interp| {
        assert_eq!(interp.lookup_global("x"), Some(Value::int(2)));
    });
}
