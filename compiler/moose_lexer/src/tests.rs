use super::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    let interner = StringInterner::new();
    let (tokens, errors) = lex(source, &interner);
    assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
    tokens.iter().map(|t| t.kind).collect()
}

#[test]
fn lexes_declaration() {
    let interner = StringInterner::new();
    let (tokens, errors) = lex("a: Int = 5", &interner);
    assert!(errors.is_empty());
    let a = interner.intern("a");
    let int_name = interner.intern("Int");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Ident(a),
            TokenKind::Colon,
            TokenKind::Ident(int_name),
            TokenKind::Assign,
            TokenKind::Int(5),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn operator_symbols_are_interned() {
    let interner = StringInterner::new();
    let (tokens, _) = lex("1 + 2 == 3", &interner);
    let plus = interner.intern("+");
    let eqeq = interner.intern("==");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Int(1),
            TokenKind::Op(plus),
            TokenKind::Int(2),
            TokenKind::Op(eqeq),
            TokenKind::Int(3),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn keywords_are_not_identifiers() {
    let ks = kinds("mut me is nil");
    assert_eq!(
        ks,
        vec![
            TokenKind::Mut,
            TokenKind::Me,
            TokenKind::Is,
            TokenKind::Nil,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn string_escapes_are_folded() {
    let interner = StringInterner::new();
    let (tokens, errors) = lex(r#""a\nb""#, &interner);
    assert!(errors.is_empty());
    let expected = interner.intern("a\nb");
    assert_eq!(tokens.get(0).unwrap().kind, TokenKind::Str(expected));
}

#[test]
fn float_and_int_literals() {
    let ks = kinds("3.5 42 1_000");
    assert_eq!(
        ks,
        vec![
            TokenKind::Float(3.5f64.to_bits()),
            TokenKind::Int(42),
            TokenKind::Int(1000),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn comments_are_dropped_newlines_kept() {
    let ks = kinds("a // trailing\nb");
    assert!(matches!(ks[0], TokenKind::Ident(_)));
    assert_eq!(ks[1], TokenKind::Newline);
    assert!(matches!(ks[2], TokenKind::Ident(_)));
}

#[test]
fn unterminated_string_is_an_error() {
    let interner = StringInterner::new();
    let (tokens, errors) = lex("\"oops", &interner);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, LexErrorKind::UnterminatedString);
    assert_eq!(tokens.get(0).unwrap().kind, TokenKind::Error);
}

#[test]
fn invalid_character_is_reported_and_skipped() {
    let interner = StringInterner::new();
    let (tokens, errors) = lex("a @ b", &interner);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, LexErrorKind::InvalidCharacter);
    // Lexing continues past the error token.
    assert!(matches!(
        tokens.get(2).unwrap().kind,
        TokenKind::Ident(_)
    ));
}

#[test]
fn arrow_is_not_an_operator() {
    let interner = StringInterner::new();
    let (tokens, _) = lex("-> - >", &interner);
    let minus = interner.intern("-");
    let gt = interner.intern(">");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Arrow,
            TokenKind::Op(minus),
            TokenKind::Op(gt),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn int_overflow_is_an_error() {
    let interner = StringInterner::new();
    let (_, errors) = lex("99999999999999999999", &interner);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, LexErrorKind::InvalidNumber);
}
