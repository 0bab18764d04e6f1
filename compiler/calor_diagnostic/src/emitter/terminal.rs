//! Terminal emitter.
//!
//! Human-readable diagnostic output with optional ANSI color support.

use std::io::Write;

use crate::{Diagnostic, Severity};

use super::DiagnosticEmitter;

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const HELP: &str = "\x1b[1;32m"; // Bold green
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";
}

/// Color output mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Decide based on whether output is a TTY.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Terminal emitter with optional color support.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W) -> Self {
        TerminalEmitter {
            writer,
            colors: false,
        }
    }

    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
        }
    }

    fn severity_color(&self, severity: Severity) -> &'static str {
        if !self.colors {
            return "";
        }
        match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
            Severity::Help => colors::HELP,
        }
    }

    fn reset(&self) -> &'static str {
        if self.colors {
            colors::RESET
        } else {
            ""
        }
    }

    fn bold(&self) -> &'static str {
        if self.colors {
            colors::BOLD
        } else {
            ""
        }
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        let color = self.severity_color(diagnostic.severity);
        let reset = self.reset();
        let bold = self.bold();

        let _ = writeln!(
            self.writer,
            "{color}{}[{}]{reset}{bold}: {}{reset}",
            diagnostic.severity,
            diagnostic.code.as_str(),
            diagnostic.message
        );

        if let Some(span) = diagnostic.primary_span() {
            let _ = writeln!(self.writer, "  --> {}:{}", span.line, span.column);
        }
        for label in &diagnostic.labels {
            if !label.message.is_empty() {
                let marker = if label.is_primary { "^" } else { "-" };
                let _ = writeln!(
                    self.writer,
                    "   {marker} {} ({}:{})",
                    label.message, label.span.line, label.span.column
                );
            }
        }
        for note in &diagnostic.notes {
            let _ = writeln!(self.writer, "   = note: {note}");
        }
        for suggestion in &diagnostic.suggestions {
            let _ = writeln!(self.writer, "   = help: {}", suggestion.message);
        }
        let _ = writeln!(self.writer);
    }
}

#[cfg(test)]
mod tests {
    use calor_ir::Span;

    use crate::{ErrorCode, Suggestion};

    use super::*;

    #[test]
    fn plain_rendering_has_no_ansi() {
        let diagnostic = Diagnostic::error(ErrorCode::UndefinedReference)
            .with_message("cannot find `widht` in this scope")
            .with_label(Span::new(12, 2, 8, 5), "not found")
            .with_suggestion(Suggestion::did_you_mean("width"));
        let mut buffer = Vec::new();
        TerminalEmitter::new(&mut buffer).emit(&diagnostic);
        let out = String::from_utf8(buffer).unwrap();
        assert!(out.contains("error[undefined_reference]"));
        assert!(out.contains("--> 2:8"));
        assert!(out.contains("help: did you mean `width`?"));
        assert!(!out.contains("\x1b["));
    }

    #[test]
    fn always_mode_adds_color() {
        let diagnostic = Diagnostic::warning(ErrorCode::UnknownEffect)
            .with_message("unknown effect `gpu`")
            .with_label(Span::new(0, 1, 1, 3), "");
        let mut buffer = Vec::new();
        TerminalEmitter::with_color_mode(&mut buffer, ColorMode::Always, false).emit(&diagnostic);
        let out = String::from_utf8(buffer).unwrap();
        assert!(out.contains("\x1b[1;33m"));
    }
}
