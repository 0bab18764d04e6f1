//! Core diagnostic types for structured error reporting.
//!
//! Defines [`Diagnostic`], [`Label`], [`Severity`], and [`Suggestion`] — the
//! building blocks every compiler phase uses to report errors and warnings.

use std::fmt;

use calor_ir::Span;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
            Severity::Help => write!(f, "help"),
        }
    }
}

/// Applicability level for code suggestions.
///
/// Indicates how confident the compiler is that a suggestion is correct,
/// so a fix tool can safely auto-apply machine-applicable edits.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Applicability {
    /// Definitely correct; safe to auto-apply.
    MachineApplicable,
    /// Probably correct but needs human verification.
    MaybeIncorrect,
    #[default]
    Unspecified,
}

impl Applicability {
    pub fn is_machine_applicable(&self) -> bool {
        matches!(self, Applicability::MachineApplicable)
    }
}

/// A text substitution for a code fix.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Substitution {
    /// The span to replace.
    pub span: Span,
    /// The replacement text.
    pub snippet: String,
}

impl Substitution {
    pub fn new(span: Span, snippet: impl Into<String>) -> Self {
        Substitution {
            span,
            snippet: snippet.into(),
        }
    }
}

/// A structured suggestion.
///
/// Text-only suggestions carry no substitutions; span-bearing suggestions
/// carry the exact edits a fix tool applies.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Suggestion {
    /// Human-readable description of the fix.
    pub message: String,
    /// Edits to make (empty for text-only suggestions).
    pub substitutions: Vec<Substitution>,
    pub applicability: Applicability,
}

impl Suggestion {
    /// A text-only suggestion.
    pub fn text(message: impl Into<String>) -> Self {
        Suggestion {
            message: message.into(),
            substitutions: Vec::new(),
            applicability: Applicability::Unspecified,
        }
    }

    /// A "did you mean" suggestion.
    pub fn did_you_mean(candidate: impl fmt::Display) -> Self {
        Self::text(format!("did you mean `{candidate}`?"))
    }

    /// A machine-applicable suggestion with a single substitution.
    pub fn machine_applicable(
        message: impl Into<String>,
        span: Span,
        snippet: impl Into<String>,
    ) -> Self {
        Suggestion {
            message: message.into(),
            substitutions: vec![Substitution::new(span, snippet)],
            applicability: Applicability::MachineApplicable,
        }
    }

    pub fn is_text_only(&self) -> bool {
        self.substitutions.is_empty()
    }
}

/// A labeled span with a message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
    /// Whether this is the primary error location.
    pub is_primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// A rich diagnostic with all context needed for a good error message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    /// Labeled spans; the first primary label is the diagnostic's location.
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub suggestions: Vec<Suggestion>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a primary label at the error location.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label for context.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestions.push(suggestion);
        self
    }

    /// The primary span, if a primary label was attached.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|label| label.is_primary)
            .map(|label| label.span)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// The first machine-applicable suggestion, if any.
    pub fn machine_fix(&self) -> Option<&Suggestion> {
        self.suggestions
            .iter()
            .find(|s| s.applicability.is_machine_applicable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_parts() {
        let span = Span::new(10, 2, 3, 4);
        let diagnostic = Diagnostic::error(ErrorCode::IdMismatch)
            .with_message("closing tag ID `f002` does not match opening tag ID `f001`")
            .with_label(span, "expected `f001`")
            .with_suggestion(Suggestion::machine_applicable(
                "replace the closing ID with the opening ID",
                span,
                "f001",
            ));
        assert_eq!(diagnostic.primary_span(), Some(span));
        assert!(diagnostic.is_error());
        let fix = diagnostic.machine_fix().unwrap();
        assert_eq!(fix.substitutions.len(), 1);
        assert_eq!(fix.substitutions[0].snippet, "f001");
    }

    #[test]
    fn warning_is_not_error() {
        let diagnostic = Diagnostic::warning(ErrorCode::UnknownEffect)
            .with_message("unknown effect `gpu`");
        assert!(!diagnostic.is_error());
        assert_eq!(diagnostic.primary_span(), None);
    }
}
