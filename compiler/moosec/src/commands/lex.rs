//! The `lex` command: dump the token stream.

use moose_ir::StringInterner;

use super::read_file;

pub fn lex_file(path: &str) {
    let source = read_file(path);
    let interner = StringInterner::new();
    let (tokens, errors) = moose_lexer::lex(&source, &interner);

    for token in tokens.iter() {
        println!("{token:?}");
    }
    if !errors.is_empty() {
        eprintln!("{} lexical error(s)", errors.len());
        std::process::exit(1);
    }
}
