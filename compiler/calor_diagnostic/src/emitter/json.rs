//! JSON emitter.
//!
//! Machine-readable output matching the external diagnostic shape:
//!
//! ```text
//! {severity, code, message, line, column, suggestion?,
//!  fix?: {description, edits: [{startLine, startColumn, endLine, endColumn, newText}]}}
//! ```
//!
//! JSON is built by hand; the diagnostic surface is small enough that a
//! serialization dependency isn't warranted.

use std::io::Write;

use crate::{Diagnostic, Severity};

use super::{escape_json, trailing_comma, DiagnosticEmitter};

/// JSON emitter for machine-readable output.
pub struct JsonEmitter<W: Write> {
    writer: W,
    first: bool,
}

impl<W: Write> JsonEmitter<W> {
    pub fn new(writer: W) -> Self {
        JsonEmitter {
            writer,
            first: true,
        }
    }

    /// Begin the JSON array output.
    pub fn begin(&mut self) {
        let _ = write!(self.writer, "[");
    }

    /// End the JSON array output.
    pub fn end(&mut self) {
        let _ = writeln!(self.writer, "\n]");
    }

    fn severity_str(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
        }
    }
}

impl<W: Write> DiagnosticEmitter for JsonEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        if !self.first {
            let _ = write!(self.writer, ",");
        }
        self.first = false;

        let (line, column) = diagnostic
            .primary_span()
            .map_or((0, 0), |span| (span.line, span.column));

        let _ = writeln!(self.writer, "\n  {{");
        let _ = writeln!(
            self.writer,
            "    \"severity\": \"{}\",",
            Self::severity_str(diagnostic.severity)
        );
        let _ = writeln!(
            self.writer,
            "    \"code\": \"{}\",",
            diagnostic.code.as_str()
        );
        let _ = writeln!(
            self.writer,
            "    \"message\": \"{}\",",
            escape_json(&diagnostic.message)
        );
        let _ = writeln!(self.writer, "    \"line\": {line},");

        // Free-text suggestion: the first text-only suggestion wins.
        let text_suggestion = diagnostic.suggestions.iter().find(|s| s.is_text_only());
        let fix = diagnostic.machine_fix();

        if text_suggestion.is_none() && fix.is_none() {
            let _ = writeln!(self.writer, "    \"column\": {column}");
        } else {
            let _ = writeln!(self.writer, "    \"column\": {column},");
        }

        if let Some(suggestion) = text_suggestion {
            let comma = if fix.is_some() { "," } else { "" };
            let _ = writeln!(
                self.writer,
                "    \"suggestion\": \"{}\"{comma}",
                escape_json(&suggestion.message)
            );
        }

        if let Some(fix) = fix {
            let _ = writeln!(self.writer, "    \"fix\": {{");
            let _ = writeln!(
                self.writer,
                "      \"description\": \"{}\",",
                escape_json(&fix.message)
            );
            let _ = writeln!(self.writer, "      \"edits\": [");
            for (i, edit) in fix.substitutions.iter().enumerate() {
                let comma = trailing_comma(i, fix.substitutions.len());
                // Fix edits replace single-line regions (IDs, operators), so
                // the end position is on the start line.
                let span = edit.span;
                let _ = writeln!(self.writer, "        {{");
                let _ = writeln!(self.writer, "          \"startLine\": {},", span.line);
                let _ = writeln!(self.writer, "          \"startColumn\": {},", span.column);
                let _ = writeln!(self.writer, "          \"endLine\": {},", span.line);
                let _ = writeln!(
                    self.writer,
                    "          \"endColumn\": {},",
                    span.column + span.length
                );
                let _ = writeln!(
                    self.writer,
                    "          \"newText\": \"{}\"",
                    escape_json(&edit.snippet)
                );
                let _ = writeln!(self.writer, "        }}{comma}");
            }
            let _ = writeln!(self.writer, "      ]");
            let _ = writeln!(self.writer, "    }}");
        }

        let _ = write!(self.writer, "  }}");
    }
}

#[cfg(test)]
mod tests {
    use calor_ir::Span;

    use crate::{ErrorCode, Suggestion};

    use super::*;

    fn render(diagnostics: &[Diagnostic]) -> String {
        let mut buffer = Vec::new();
        let mut emitter = JsonEmitter::new(&mut buffer);
        emitter.begin();
        emitter.emit_all(diagnostics);
        emitter.end();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn emits_external_shape() {
        let span = Span::new(20, 3, 7, 4);
        let diagnostic = Diagnostic::error(ErrorCode::IdMismatch)
            .with_message("closing tag ID `f002` does not match opening tag ID `f001`")
            .with_label(span, "expected `f001`")
            .with_suggestion(Suggestion::machine_applicable(
                "replace `f002` with `f001`",
                span,
                "f001",
            ));
        let out = render(&[diagnostic]);
        assert!(out.contains("\"code\": \"id_mismatch\""));
        assert!(out.contains("\"line\": 3"));
        assert!(out.contains("\"column\": 7"));
        assert!(out.contains("\"startColumn\": 7"));
        assert!(out.contains("\"endColumn\": 11"));
        assert!(out.contains("\"newText\": \"f001\""));
    }

    #[test]
    fn suggestion_without_fix() {
        let diagnostic = Diagnostic::error(ErrorCode::UnknownTag)
            .with_message("unknown tag `\u{00a7}FO`")
            .with_label(Span::new(0, 1, 1, 3), "not a known tag")
            .with_suggestion(Suggestion::did_you_mean("\u{00a7}FOR"));
        let out = render(&[diagnostic]);
        assert!(out.contains("\"suggestion\": \"did you mean `\u{00a7}FOR`?\""));
        assert!(!out.contains("\"fix\""));
    }

    #[test]
    fn array_wraps_multiple_diagnostics() {
        let a = Diagnostic::error(ErrorCode::UnexpectedToken)
            .with_message("a")
            .with_label(Span::new(0, 1, 1, 1), "");
        let b = Diagnostic::warning(ErrorCode::UnknownEffect)
            .with_message("b")
            .with_label(Span::new(5, 2, 1, 1), "");
        let out = render(&[a, b]);
        assert_eq!(out.matches("\"severity\"").count(), 2);
        assert!(out.trim_start().starts_with('['));
        assert!(out.trim_end().ends_with(']'));
    }
}
