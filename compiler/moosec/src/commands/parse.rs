//! The `parse` command: dump the parsed AST.

use moose_ir::StringInterner;

use super::{read_file, report_diagnostics};

pub fn parse_file(path: &str) {
    let source = read_file(path);
    let interner = StringInterner::new();
    let (tokens, lex_errors) = moose_lexer::lex(&source, &interner);
    let parsed = moose_parse::parse(&tokens, &interner);

    for &stmt_id in &parsed.module.stmts {
        println!("{:#?}", parsed.arena.stmt(stmt_id));
    }

    if !lex_errors.is_empty() || parsed.has_errors() {
        let mut diagnostics: Vec<_> = lex_errors
            .iter()
            .map(moose_lexer::LexError::to_diagnostic)
            .collect();
        diagnostics.extend(parsed.errors.iter().map(moose_parse::ParseError::to_diagnostic));
        report_diagnostics(&diagnostics, &source, path);
        std::process::exit(1);
    }
}
