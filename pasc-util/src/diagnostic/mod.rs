//! Diagnostics and the fatal-on-first-error handler.
//!
//! Spec.md §4.2/§7 mandates that the first lexical/syntactic/semantic error
//! aborts the whole translation — no error recovery, no partial AST. The
//! teacher's `Handler` accumulates diagnostics for later batch reporting;
//! here `Handler::emit` instead latches only the first `Level::Error` and
//! drops the rest. `emit` itself never unwinds — it just records — so
//! every call site that can fail also returns its own `Err(())` sentinel
//! (the parser's `error()` helper does both at once) or, for call sites
//! that cannot conveniently return early (the lexer skipping whitespace
//! and comments), the caller must check `Handler::has_error()` before
//! trusting a later `Ok` (spec.md §9 "Error carrying").

mod builder;
mod level;

pub use builder::DiagnosticBuilder;
pub use level::Level;

use crate::span::Span;

/// A single diagnostic message, ready to be rendered in the
/// `"<file>:<line>: <message>"` form spec.md §6 requires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    /// Renders this diagnostic against `file_name`, using `line` resolved
    /// from a [`crate::span::SourceMap`] by the caller.
    pub fn render(&self, file_name: &str, line: u32) -> String {
        format!("{file_name}:{line}: {}", self.message)
    }
}

/// Collects at most one error: the first call to `emit` with
/// `Level::Error` is latched and returned by every subsequent `result()`
/// call, matching the fatal-first-error policy.
#[derive(Default)]
pub struct Handler {
    first_error: Option<Diagnostic>,
}

impl Handler {
    pub fn new() -> Self {
        Self { first_error: None }
    }

    /// Records `diagnostic`. Errors are latched; warnings/notes are
    /// dropped once an error exists since the caller is about to unwind
    /// anyway (spec.md §7 "no partial AST is returned on error").
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if self.first_error.is_none() && diagnostic.level == Level::Error {
            self.first_error = Some(diagnostic);
        }
    }

    pub fn has_error(&self) -> bool {
        self.first_error.is_some()
    }

    pub fn take_error(&mut self) -> Option<Diagnostic> {
        self.first_error.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latches_first_error_only() {
        let mut h = Handler::new();
        h.emit(Diagnostic { level: Level::Error, message: "first".into(), span: Span::DUMMY });
        h.emit(Diagnostic { level: Level::Error, message: "second".into(), span: Span::DUMMY });
        assert_eq!(h.take_error().unwrap().message, "first");
    }
}
