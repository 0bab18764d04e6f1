//! C# forward emitter.
//!
//! A single tree walk over a checked AST. Formatting is an explicit
//! indent-depth argument, never ambient state. Output is deterministic:
//! identical AST means byte-identical C#, since round-trip and regression
//! tooling diff the output directly.
//!
//! Emission refuses to run while error-level diagnostics are outstanding
//! upstream; it reports a single `emit_blocked` diagnostic instead.

mod decl;
mod emitter;
mod expr;
mod prelude;
mod stmt;
mod types;

pub use emitter::StringEmitter;
pub use prelude::RUNTIME_PRELUDE;

use calor_diagnostic::{count_errors, Diagnostic, ErrorCode};
use calor_ir::Module;

/// Emission options.
#[derive(Clone, Debug)]
pub struct EmitOptions {
    /// Prepend the `Calor.Runtime` support namespace.
    pub prelude: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions { prelude: true }
    }
}

/// Result of forward emission.
pub struct EmitResult {
    /// The emitted C# source; absent when emission was refused or failed.
    pub source: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Emit C# for a checked module.
///
/// `upstream` carries the diagnostics of earlier stages; any error among
/// them blocks emission.
pub fn emit(module: &Module, upstream: &[Diagnostic], options: &EmitOptions) -> EmitResult {
    if count_errors(upstream) > 0 {
        return EmitResult {
            source: None,
            diagnostics: vec![Diagnostic::error(ErrorCode::EmitBlocked)
                .with_message(format!(
                    "emission refused: {} unresolved error{} from earlier stages",
                    count_errors(upstream),
                    if count_errors(upstream) == 1 { "" } else { "s" }
                ))
                .with_note("fix the reported errors and compile again")],
        };
    }

    let mut emitter = CSharpEmitter::new(options.clone());
    emitter.emit_module(module, 0);

    let diagnostics = std::mem::take(&mut emitter.diagnostics);
    if diagnostics.iter().any(Diagnostic::is_error) {
        return EmitResult {
            source: None,
            diagnostics,
        };
    }

    let mut source = String::new();
    if options.prelude {
        source.push_str(RUNTIME_PRELUDE);
        source.push('\n');
    }
    source.push_str(&emitter.out.finish());
    EmitResult {
        source: Some(source),
        diagnostics,
    }
}

/// Walk state for one emission call.
///
/// The temp counter is created fresh per call and threaded through the
/// emitter; nothing is shared across concurrent compilations.
pub(crate) struct CSharpEmitter {
    pub(crate) out: StringEmitter,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) options: EmitOptions,
    /// Monotonic counter for emitter-synthesized locals.
    pub(crate) tmp: u32,
}

impl CSharpEmitter {
    fn new(options: EmitOptions) -> Self {
        CSharpEmitter {
            out: StringEmitter::with_capacity(4096),
            diagnostics: Vec::new(),
            options,
            tmp: 0,
        }
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Next synthesized local name.
    pub(crate) fn fresh_tmp(&mut self, prefix: &str) -> String {
        let name = format!("__{prefix}{}", self.tmp);
        self.tmp += 1;
        name
    }
}

/// Escape a string for a C# string literal.
pub(crate) fn cs_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests;
