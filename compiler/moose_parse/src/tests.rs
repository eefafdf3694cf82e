use moose_ir::{ExprKind, StmtKind, StringInterner};

use crate::{parse, Parsed};

fn parse_ok(source: &str) -> (Parsed, StringInterner) {
    let interner = StringInterner::new();
    let (tokens, lex_errors) = moose_lexer::lex(source, &interner);
    assert!(lex_errors.is_empty(), "lex errors: {lex_errors:?}");
    let parsed = parse(&tokens, &interner);
    assert!(!parsed.has_errors(), "parse errors: {:?}", parsed.errors);
    (parsed, interner)
}

fn parse_err(source: &str) -> Parsed {
    let interner = StringInterner::new();
    let (tokens, _) = moose_lexer::lex(source, &interner);
    let parsed = parse(&tokens, &interner);
    assert!(parsed.has_errors(), "expected parse errors");
    parsed
}

#[test]
fn parses_typed_declaration() {
    let (parsed, _) = parse_ok("a: Int = 5");
    assert_eq!(parsed.module.stmts.len(), 1);
    let stmt = parsed.arena.stmt(parsed.module.stmts[0]);
    match &stmt.kind {
        StmtKind::Assign {
            ty, mutable, target, ..
        } => {
            assert_eq!(*ty, Some(moose_ir::MooseType::Integer));
            assert!(!mutable);
            assert!(matches!(parsed.arena.expr(*target).kind, ExprKind::Ident(_)));
        }
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn parses_mut_declaration() {
    let (parsed, _) = parse_ok("mut a = 1");
    let stmt = parsed.arena.stmt(parsed.module.stmts[0]);
    assert!(matches!(
        stmt.kind,
        StmtKind::Assign { mutable: true, ty: None, .. }
    ));
}

#[test]
fn parses_tuple_destructuring() {
    let (parsed, _) = parse_ok("(a, b) = (1, 2)");
    let stmt = parsed.arena.stmt(parsed.module.stmts[0]);
    let StmtKind::Assign { target, value, .. } = &stmt.kind else {
        panic!("expected assignment");
    };
    assert!(matches!(parsed.arena.expr(*target).kind, ExprKind::Tuple(_)));
    assert!(matches!(parsed.arena.expr(*value).kind, ExprKind::Tuple(_)));
}

#[test]
fn precedence_mul_over_add() {
    let (parsed, interner) = parse_ok("x = 1 + 2 * 3");
    let stmt = parsed.arena.stmt(parsed.module.stmts[0]);
    let StmtKind::Assign { value, .. } = &stmt.kind else {
        panic!("expected assignment");
    };
    let ExprKind::Infix { op, right, .. } = &parsed.arena.expr(*value).kind else {
        panic!("expected infix at top");
    };
    assert_eq!(interner.lookup(*op), "+");
    assert!(matches!(
        parsed.arena.expr(*right).kind,
        ExprKind::Infix { .. }
    ));
}

#[test]
fn negative_index_parses_as_prefix_operator() {
    let (parsed, interner) = parse_ok("l[-1]");
    let stmt = parsed.arena.stmt(parsed.module.stmts[0]);
    let StmtKind::Expr(expr) = stmt.kind else {
        panic!("expected expression statement");
    };
    let ExprKind::Index { index, .. } = parsed.arena.expr(expr).kind else {
        panic!("expected index expression");
    };
    let ExprKind::Prefix { op, .. } = parsed.arena.expr(index).kind else {
        panic!("expected prefix operand");
    };
    assert_eq!(interner.lookup(op), "-");
}

#[test]
fn member_call_parses_as_deref() {
    let (parsed, interner) = parse_ok("b = a.toString()");
    let stmt = parsed.arena.stmt(parsed.module.stmts[0]);
    let StmtKind::Assign { value, .. } = &stmt.kind else {
        panic!("expected assignment");
    };
    let ExprKind::Deref { member, .. } = parsed.arena.expr(*value).kind else {
        panic!("expected deref");
    };
    let ExprKind::Call { callee, args } = parsed.arena.expr(member).kind else {
        panic!("expected call member");
    };
    assert_eq!(interner.lookup(callee), "toString");
    assert!(args.is_empty());
}

#[test]
fn parses_operator_definition() {
    let (parsed, interner) = parse_ok("infix +(a: Int, b: Int) -> Int { return a - b }");
    let stmt = parsed.arena.stmt(parsed.module.stmts[0]);
    let StmtKind::Operation(id) = stmt.kind else {
        panic!("expected operation statement");
    };
    let def = parsed.arena.operation(id);
    assert_eq!(interner.lookup(def.op), "+");
    assert_eq!(def.position, moose_ir::OpPosition::Infix);
    assert_eq!(def.params.len(), 2);
    assert_eq!(def.ret, moose_ir::MooseType::Integer);
}

#[test]
fn parses_class_with_inheritance() {
    let (parsed, interner) = parse_ok("class B < A { y: Int\n func sum() -> Int { return 1 } }");
    let stmt = parsed.arena.stmt(parsed.module.stmts[0]);
    let StmtKind::Class(id) = stmt.kind else {
        panic!("expected class statement");
    };
    let def = parsed.arena.class(id);
    assert_eq!(interner.lookup(def.name), "B");
    assert_eq!(def.superclass.map(|n| interner.lookup(n)), Some("A"));
    assert_eq!(def.properties.len(), 1);
    assert_eq!(def.methods.len(), 1);
}

#[test]
fn parses_if_else_chain() {
    let (parsed, _) = parse_ok("if a { b = 1 } else if c { b = 2 } else { b = 3 }");
    let stmt = parsed.arena.stmt(parsed.module.stmts[0]);
    let StmtKind::If { else_block, .. } = stmt.kind else {
        panic!("expected if statement");
    };
    let else_id = else_block.expect("else branch");
    assert!(matches!(
        parsed.arena.stmt(else_id).kind,
        StmtKind::If { .. }
    ));
}

#[test]
fn parses_is_expression() {
    let (parsed, interner) = parse_ok("x is Int");
    let stmt = parsed.arena.stmt(parsed.module.stmts[0]);
    let StmtKind::Expr(expr) = stmt.kind else {
        panic!("expected expression statement");
    };
    let ExprKind::Is { name, .. } = parsed.arena.expr(expr).kind else {
        panic!("expected is expression");
    };
    assert_eq!(interner.lookup(name), "Int");
}

#[test]
fn postfix_operator_binds_when_nothing_follows() {
    let (parsed, interner) = parse_ok("y = x!");
    let stmt = parsed.arena.stmt(parsed.module.stmts[0]);
    let StmtKind::Assign { value, .. } = &stmt.kind else {
        panic!("expected assignment");
    };
    let ExprKind::Postfix { op, .. } = parsed.arena.expr(*value).kind else {
        panic!("expected postfix");
    };
    assert_eq!(interner.lookup(op), "!");
}

#[test]
fn recovers_at_statement_boundaries() {
    let parsed = parse_err("a = \nb = 2\nc = ]\nd = 4");
    // Both bad statements are reported; both good ones survive.
    assert!(parsed.errors.len() >= 2);
    assert!(parsed.module.stmts.len() >= 2);
}

#[test]
fn rejects_invalid_assignment_target() {
    let parsed = parse_err("1 + 2 = 3");
    assert!(parsed
        .errors
        .iter()
        .any(|e| e.code == moose_diagnostic::ErrorCode::E1007));
}

#[test]
fn rejects_wrong_operator_arity() {
    let parsed = parse_err("infix +(a: Int) -> Int { return a }");
    assert!(parsed
        .errors
        .iter()
        .any(|e| e.code == moose_diagnostic::ErrorCode::E1006));
}

#[test]
fn bare_return_parses() {
    let (parsed, _) = parse_ok("func f() { return }");
    let stmt = parsed.arena.stmt(parsed.module.stmts[0]);
    let StmtKind::Function(id) = stmt.kind else {
        panic!("expected function");
    };
    let def = parsed.arena.function(id);
    let StmtKind::Block(range) = parsed.arena.stmt(def.body).kind else {
        panic!("expected block body");
    };
    let body: Vec<_> = parsed.arena.stmts(range).to_vec();
    assert_eq!(body.len(), 1);
    assert!(matches!(
        parsed.arena.stmt(body[0]).kind,
        StmtKind::Return(None)
    ));
}
