use moose_diagnostic::ErrorCode;
use moose_ir::StringInterner;

use crate::check;

struct Outcome {
    codes: Vec<ErrorCode>,
}

fn check_source(source: &str) -> Outcome {
    let interner = StringInterner::new();
    let (tokens, lex_errors) = moose_lexer::lex(source, &interner);
    assert!(lex_errors.is_empty(), "lex errors: {lex_errors:?}");
    let parsed = moose_parse::parse(&tokens, &interner);
    assert!(!parsed.has_errors(), "parse errors: {:?}", parsed.errors);
    let checked = check(&parsed.module, &parsed.arena, &interner);
    Outcome {
        codes: checked.diagnostics.iter().map(|d| d.code).collect(),
    }
}

fn assert_clean(source: &str) {
    let outcome = check_source(source);
    assert!(outcome.codes.is_empty(), "unexpected errors: {:?}", outcome.codes);
}

fn assert_error(source: &str, code: ErrorCode) {
    let outcome = check_source(source);
    assert!(
        outcome.codes.contains(&code),
        "expected {code}, got {:?}",
        outcome.codes
    );
}

#[test]
fn well_typed_declaration_and_conversion() {
    assert_clean("a: Int = 5\nb = a.toString()");
}

#[test]
fn reassignment_requires_mut() {
    assert_error("a = 1\na = 2", ErrorCode::E2004);
    assert_clean("mut a = 1\na = a + 2");
}

#[test]
fn tuple_destructuring_checks_arity() {
    assert_clean("(a, b) = (1, 2)\nc = a + b");
    assert_error("(a, b) = (1, 2, 3)", ErrorCode::E2001);
}

#[test]
fn nil_requires_annotation() {
    assert_error("a = nil", ErrorCode::E2011);
    assert_clean("a: Int = nil");
}

#[test]
fn mixed_arithmetic_is_rejected() {
    assert_error("x = 1 + 2.5", ErrorCode::E2002);
}

#[test]
fn condition_must_be_bool() {
    assert_error("if 1 { a = 2 }", ErrorCode::E2010);
    assert_clean("if true { a = 2 }");
}

#[test]
fn call_with_nil_is_ambiguous_across_overloads() {
    let source = "\
func f(a: Int) -> Int { return 1 }
func f(a: Float) -> Int { return 2 }
x = f(nil)
";
    assert_error(source, ErrorCode::E2003);
}

#[test]
fn call_with_nil_resolves_against_single_overload() {
    let source = "\
func f(a: Int) -> Int { return 1 }
x = f(nil)
";
    assert_clean(source);
}

#[test]
fn duplicate_signature_is_rejected() {
    let source = "\
func f(a: Int) -> Int { return 1 }
func f(a: Int) -> Float { return 2.0 }
";
    assert_error(source, ErrorCode::E2005);
}

#[test]
fn unknown_function_is_reported() {
    assert_error("x = g(1)", ErrorCode::E2002);
}

#[test]
fn user_operator_definition_checks() {
    assert_clean("infix +(a: Int, b: Int) -> Int { return a - b }\nx = 1 + 2");
}

#[test]
fn class_members_are_visible_through_inheritance() {
    let source = "\
class A { x: Int }
class B < A { y: Int }
b = B(1, 2)
z = b.x + b.y
";
    assert_clean(source);
}

#[test]
fn property_conflict_with_superclass() {
    let source = "\
class A { x: Int }
class B < A { x: Int }
";
    assert_error(source, ErrorCode::E2007);
}

#[test]
fn override_must_keep_return_type() {
    let source = "\
class A { func f() -> Int { return 1 } }
class B < A { func f() -> Float { return 2.0 } }
";
    assert_error(source, ErrorCode::E2008);
}

#[test]
fn override_with_same_return_type_is_fine() {
    let source = "\
class A { func f() -> Int { return 1 } }
class B < A { func f() -> Int { return 2 } }
b = B()
x = b.f()
";
    assert_clean(source);
}

#[test]
fn inheritance_cycle_is_detected() {
    let source = "\
class A < B { x: Int }
class B < A { y: Int }
";
    assert_error(source, ErrorCode::E2006);
}

#[test]
fn subclass_widens_to_superclass() {
    let source = "\
class A { x: Int }
class B < A { y: Int }
func takes(a: A) -> Int { return a.x }
b = B(1, 2)
z = takes(b)
";
    assert_clean(source);
}

#[test]
fn unknown_member_is_reported() {
    let source = "\
class A { x: Int }
a = A(1)
z = a.missing
";
    assert_error(source, ErrorCode::E2014);
}

#[test]
fn member_access_hides_enclosing_scope() {
    // `x` exists in the caller's scope but not on the class.
    let source = "\
class A { y: Int }
x = 5
a = A(1)
z = a.x
";
    assert_error(source, ErrorCode::E2014);
}

#[test]
fn me_refers_to_the_class() {
    let source = "\
class A {
    x: Int
    func double() -> Int { return me.x + me.x }
}
a = A(21)
z = a.double()
";
    assert_clean(source);
}

#[test]
fn me_outside_class_is_an_error() {
    assert_error("z = me", ErrorCode::E2002);
}

#[test]
fn return_outside_function_is_an_error() {
    assert_error("return 1", ErrorCode::E2012);
}

#[test]
fn return_type_is_checked() {
    assert_error("func f() -> Int { return 1.5 }", ErrorCode::E2001);
    assert_clean("func f() -> Int { return nil }");
}

#[test]
fn constructor_arity_is_bounded() {
    let source = "\
class A { x: Int }
a = A(1, 2)
";
    assert_error(source, ErrorCode::E2009);
}

#[test]
fn list_elements_must_agree() {
    assert_error("l = [1, 2.5]", ErrorCode::E2001);
    assert_clean("l = [1, 2, 3]\nx = l[0] + 1");
}

#[test]
fn index_must_be_int() {
    assert_error("l = [1]\nx = l[true]", ErrorCode::E2001);
}

#[test]
fn string_parse_returns_tuple() {
    assert_clean("(v, err) = \"5\".parseInt()\nw: Int = v");
}

#[test]
fn multiple_errors_are_collected() {
    let outcome = check_source("x = unknown1\ny = unknown2");
    assert!(outcome.codes.len() >= 2);
}
