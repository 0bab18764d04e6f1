//! Calor compiler driver.
//!
//! Wires the pipeline stages together: text → lexer → parser → checker →
//! forward emitter (C#) or reverse emitter (canonical Calor). Every public
//! entry point builds all state fresh for the call and converts any
//! internal fault into a single `internal_error` diagnostic — no stage
//! throws past this boundary on malformed input. Concurrent callers are
//! safe: nothing process-wide is mutated.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use tracing::debug;

use calor_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use calor_ir::Module;

pub use calor_check::{ContractProver, NullProver, Proposition, ProverVerdict};
pub use calor_codegen::EmitOptions;

/// Output of a full compilation.
pub struct CompileOutput {
    /// Emitted host (C#) source; absent when errors blocked emission.
    pub host_source: Option<String>,
    /// All diagnostics, sorted by source position.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Output of formatting (reverse emission).
pub struct FormatOutput {
    /// Canonical Calor text; absent when the source did not parse at all.
    pub formatted: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compile Calor source to host-language source.
pub fn compile_to_host(source: &str, options: &EmitOptions) -> CompileOutput {
    contained(source, |source| {
        let (module, diagnostics) = front_end(source);
        let Some(module) = module else {
            return CompileOutput {
                host_source: None,
                diagnostics,
            };
        };
        let emitted = calor_codegen::emit(&module, &diagnostics, options);
        let mut diagnostics = diagnostics;
        diagnostics.extend(emitted.diagnostics);
        CompileOutput {
            host_source: emitted.source,
            diagnostics,
        }
    })
    .unwrap_or_else(internal_failure)
}

/// Run the front end only (lex, parse, check) and report diagnostics.
pub fn check_source(source: &str) -> CompileOutput {
    contained(source, |source| {
        let (_, diagnostics) = front_end(source);
        CompileOutput {
            host_source: None,
            diagnostics,
        }
    })
    .unwrap_or_else(internal_failure)
}

/// Reformat Calor source to its canonical text.
///
/// Formatting is best-effort on sources with diagnostics: whatever parsed
/// is re-emitted, preserving every user-authored ID.
pub fn format_source(source: &str) -> FormatOutput {
    let result = contained(source, |source| {
        let lexed = calor_lexer::lex(source);
        let parsed = calor_parse::parse(&lexed.tokens);
        let mut queue = DiagnosticQueue::new();
        for diagnostic in lexed.diagnostics.into_iter().chain(parsed.diagnostics) {
            queue.push(diagnostic);
        }
        FormatOutput {
            formatted: parsed.module.as_ref().map(calor_fmt::emit_calor),
            diagnostics: queue.flush(),
        }
    });
    result.unwrap_or_else(|diagnostic| FormatOutput {
        formatted: None,
        diagnostics: vec![diagnostic],
    })
}

/// Extract contract propositions and run them through a prover, one
/// deadline per clause. With no prover available, use [`NullProver`]; every
/// clause comes back `Skipped` without blocking.
pub fn prove_source(
    source: &str,
    prover: &dyn ContractProver,
    deadline: Duration,
) -> Vec<(Proposition, ProverVerdict)> {
    let result = contained(source, |source| {
        let lexed = calor_lexer::lex(source);
        let parsed = calor_parse::parse(&lexed.tokens);
        let Some(module) = parsed.module else {
            return Vec::new();
        };
        let checked = calor_check::check(&module);
        calor_check::prove_contracts(&checked.propositions, prover, deadline)
    });
    result.unwrap_or_default()
}

/// Lex source and return the token stream with diagnostics.
pub fn lex_source(source: &str) -> calor_lexer::LexOutput {
    calor_lexer::lex(source)
}

/// Parse source and return the module with accumulated diagnostics.
pub fn parse_source(source: &str) -> calor_parse::ParseResult {
    let lexed = calor_lexer::lex(source);
    let mut parsed = calor_parse::parse(&lexed.tokens);
    let mut diagnostics = lexed.diagnostics;
    diagnostics.append(&mut parsed.diagnostics);
    parsed.diagnostics = diagnostics;
    parsed
}

/// Lex, parse, and check; diagnostics come back deduplicated and sorted.
fn front_end(source: &str) -> (Option<Module>, Vec<Diagnostic>) {
    debug!(bytes = source.len(), "compiling");
    let lexed = calor_lexer::lex(source);
    let parsed = calor_parse::parse(&lexed.tokens);

    let mut queue = DiagnosticQueue::new();
    for diagnostic in lexed.diagnostics.into_iter().chain(parsed.diagnostics) {
        queue.push(diagnostic);
    }

    let module = parsed.module;
    if let Some(module) = &module {
        let checked = calor_check::check(module);
        for diagnostic in checked.diagnostics {
            queue.push(diagnostic);
        }
    }
    (module, queue.flush())
}

/// Run a stage behind the panic boundary.
fn contained<T>(source: &str, f: impl FnOnce(&str) -> T) -> Result<T, Diagnostic> {
    catch_unwind(AssertUnwindSafe(|| f(source))).map_err(|payload| {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Diagnostic::error(ErrorCode::InternalError)
            .with_message(format!("internal compiler error: {detail}"))
            .with_note("this is a bug in the compiler, not in the source being compiled")
    })
}

fn internal_failure(diagnostic: Diagnostic) -> CompileOutput {
    CompileOutput {
        host_source: None,
        diagnostics: vec![diagnostic],
    }
}
