//! Diagnostics: the stable, namespaced error vocabulary shared by every
//! pipeline stage.
//!
//! Codes are namespaced by stage per `spec.md` §3 and §6: `TOL1xxx` parse,
//! `TOL2xxx` semantic, `TOL3xxx` codegen. Codes are a stable public surface
//! — once shipped, a code's meaning does not change, only its message text
//! may be refined.

use crate::span::Span;
use std::fmt;

/// A stable, namespaced diagnostic code, e.g. `TOL2026`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagnosticCode(pub &'static str);

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A structured diagnostic: stable code, human message, and source span.
///
/// Diagnostics are accumulated values, not exceptions — the parser and
/// checker collect as many as they safely can in a single pass rather than
/// aborting on the first one, per `spec.md` §7.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    pub file: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>, file: impl Into<String>, span: Span) -> Self {
        Self { code, message: message.into(), file: file.into(), span }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}:{}:{})",
            self.code, self.message, self.file, self.span.start.line, self.span.start.column
        )
    }
}

/// Logs a diagnostic at `warn` level via `tracing` so a caller that wires a
/// subscriber sees pipeline diagnostics without the core ever writing to
/// stderr itself (`spec.md` §7: "the core never writes to stderr").
pub fn trace_diagnostic(diag: &Diagnostic) {
    tracing::warn!(code = %diag.code, file = %diag.file, line = diag.span.start.line, column = diag.span.start.column, "{}", diag.message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Pos;

    #[test]
    fn diagnostic_display_includes_code_and_position() {
        let diag = Diagnostic::new(
            DiagnosticCode("TOL2026"),
            "name collides across namespaces",
            "demo.tol",
            Span::point(Pos::new(10, 2, 3)),
        );
        let text = diag.to_string();
        assert!(text.contains("TOL2026"));
        assert!(text.contains("demo.tol:2:3"));
    }
}
