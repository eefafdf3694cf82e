//! The compilation pipeline.
//!
//! Source text goes through lexing, parsing, global exploration,
//! class flattening, and type checking; diagnostics from every phase
//! are accumulated and reported together. Evaluation runs only on a
//! clean compile.

use tracing::debug;

use moose_diagnostic::Diagnostic;
use moose_eval::{Interpreter, Panic, SharedEnv, Value};
use moose_ir::{Arena, Module, StringInterner, TypeTable};

/// A fully checked program, ready to evaluate.
pub struct CompiledProgram {
    pub interner: StringInterner,
    pub arena: Arena,
    pub module: Module,
    pub table: TypeTable,
}

/// Why a run did not complete.
pub enum RunError {
    /// Compile-time diagnostics (lexing through type checking).
    Compile(Vec<Diagnostic>),
    /// A runtime panic, with its accumulated trace.
    Panic(Panic),
}

/// The final state of a completed run.
pub struct FinalState {
    pub program: CompiledProgram,
    global: SharedEnv,
}

impl FinalState {
    /// Look up a global binding by source name.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.global.lookup(self.program.interner.intern(name))
    }
}

/// Compile source text, accumulating diagnostics across phases.
///
/// Parse output is still produced when only the lexer errored, so a
/// single run reports problems from every phase it could reach.
pub fn compile(source: &str) -> Result<CompiledProgram, Vec<Diagnostic>> {
    let interner = StringInterner::new();
    let mut diagnostics = Vec::new();

    let (tokens, lex_errors) = moose_lexer::lex(source, &interner);
    diagnostics.extend(lex_errors.iter().map(moose_lexer::LexError::to_diagnostic));

    let parsed = moose_parse::parse(&tokens, &interner);
    diagnostics.extend(parsed.errors.iter().map(moose_parse::ParseError::to_diagnostic));

    let checked = moose_typeck::check(&parsed.module, &parsed.arena, &interner);
    diagnostics.extend(checked.diagnostics);

    if diagnostics.iter().any(Diagnostic::is_error) {
        debug!(count = diagnostics.len(), "compile failed");
        return Err(diagnostics);
    }

    Ok(CompiledProgram {
        interner,
        arena: parsed.arena,
        module: parsed.module,
        table: checked.table,
    })
}

/// Compile and evaluate source text.
pub fn run_source(source: &str) -> Result<FinalState, RunError> {
    let program = compile(source).map_err(RunError::Compile)?;
    let global = {
        let mut interp = Interpreter::new(&program.interner, &program.arena, &program.table);
        match interp.run(&program.module) {
            Ok(()) => interp.global_env().clone(),
            Err(panic) => return Err(RunError::Panic(panic)),
        }
    };
    Ok(FinalState { program, global })
}
