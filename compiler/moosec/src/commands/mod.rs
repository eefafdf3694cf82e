//! CLI commands.

mod check;
mod lex;
mod parse;
mod run;

pub use check::check_file;
pub use lex::lex_file;
pub use parse::parse_file;
pub use run::run_file;

use std::io::IsTerminal;

use moose_diagnostic::{ColorMode, Diagnostic, TerminalEmitter};

/// Read a source file or exit with an error.
pub(crate) fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("error: cannot read '{path}': {err}");
            std::process::exit(1);
        }
    }
}

/// Report a batch of diagnostics against the source.
pub(crate) fn report_diagnostics(diagnostics: &[Diagnostic], source: &str, path: &str) {
    let is_tty = std::io::stderr().is_terminal();
    let mut emitter = TerminalEmitter::new(std::io::stderr(), ColorMode::Auto, is_tty)
        .with_source(source)
        .with_file_path(path);
    for diag in diagnostics {
        emitter.emit(diag);
    }
    emitter.finish();
}
