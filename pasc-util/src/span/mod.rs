//! Source location tracking.

mod source_map;

pub use source_map::{SourceFile, SourceMap};

/// A byte-offset range in the translation unit's single source file, with
/// the 1-based line/column the lexer was at when the span started.
///
/// Spec.md §6 only ever surfaces line numbers in error messages, but the
/// byte range is kept for potential multi-span diagnostics and for the
/// lexer idempotence test (spec.md §8, property 4).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub const DUMMY: Span = Span { start: 0, end: 0, line: 0, column: 0 };

    #[inline]
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self { start, end, line, column }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line,
            column: self.column,
        }
    }
}
