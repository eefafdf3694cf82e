//! The `run` command: compile and evaluate a Moose source file.

use moose_diagnostic::LineOffsetTable;
use moose_eval::Panic;
use moosec::driver::{run_source, RunError};

use super::{read_file, report_diagnostics};

/// Run a Moose source file.
///
/// All compile diagnostics are reported together before exiting; a
/// runtime panic prints its message and the accumulated node trace.
pub fn run_file(path: &str) {
    let source = read_file(path);
    match run_source(&source) {
        Ok(_) => {}
        Err(RunError::Compile(diagnostics)) => {
            report_diagnostics(&diagnostics, &source, path);
            std::process::exit(1);
        }
        Err(RunError::Panic(panic)) => {
            report_panic(&panic, &source, path);
            std::process::exit(1);
        }
    }
}

/// Format a runtime panic with its trace against the source.
pub(crate) fn report_panic(panic: &Panic, source: &str, path: &str) {
    let table = LineOffsetTable::new(source);
    eprintln!("panic[{}]: {}", panic.code(), panic.message());
    for entry in &panic.trace {
        let (line, col) = table.line_col(source, entry.span.start);
        eprintln!("  at {} ({path}:{line}:{col})", entry.what);
    }
}
