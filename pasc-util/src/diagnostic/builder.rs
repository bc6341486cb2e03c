use super::{Diagnostic, Handler, Level};
use crate::span::Span;

/// Builder for a [`Diagnostic`], mirroring the teacher's
/// `DiagnosticBuilder::error(..).span(..).emit(handler)` call shape.
pub struct DiagnosticBuilder {
    level: Level,
    message: String,
    span: Span,
}

impl DiagnosticBuilder {
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: Level::Error, message: message.into(), span: Span::DUMMY }
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn build(self) -> Diagnostic {
        Diagnostic { level: self.level, message: self.message, span: self.span }
    }

    pub fn emit(self, handler: &mut Handler) {
        handler.emit(self.build());
    }
}
