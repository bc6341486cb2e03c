use thiserror::Error;

/// Errors internal to the utility crate itself (as opposed to translation
/// diagnostics, which are [`crate::diagnostic::Diagnostic`] values). These
/// are programmer errors: spec.md §7 keeps "internal invariant violations"
/// distinct from user-visible parse errors.
#[derive(Debug, Error)]
pub enum UtilError {
    #[error("symbol index {0} out of range")]
    InvalidSymbol(u32),

    #[error("byte offset {0} out of range for source of length {1}")]
    SpanOutOfBounds(usize, usize),
}
