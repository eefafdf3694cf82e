//! The `check` command: compile without evaluating.

use moosec::driver::compile;

use super::{read_file, report_diagnostics};

pub fn check_file(path: &str) {
    let source = read_file(path);
    match compile(&source) {
        Ok(_) => {
            println!("{path}: ok");
        }
        Err(diagnostics) => {
            report_diagnostics(&diagnostics, &source, path);
            std::process::exit(1);
        }
    }
}
