//! Diagnostic system for rich error reporting.
//!
//! Every compiler phase reports problems through the same building blocks:
//! - Stable error codes for searchability
//! - Clear messages (what went wrong)
//! - Primary span (where it went wrong)
//! - Context labels (why it's wrong)
//! - Suggestions, optionally with machine-applicable edits (how to fix)
//!
//! Phases accumulate diagnostics into a [`DiagnosticQueue`] and keep going;
//! one compilation surfaces as many independent problems as possible instead
//! of failing at the first.

mod diagnostic;
pub mod emitter;
mod error_code;
mod queue;
pub mod suggest;

pub use diagnostic::{Applicability, Diagnostic, Label, Severity, Substitution, Suggestion};
pub use error_code::ErrorCode;
pub use queue::{count_errors, DiagnosticConfig, DiagnosticQueue};
