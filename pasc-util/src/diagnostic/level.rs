/// Severity of a [`super::Diagnostic`]. Only `Error` is fatal; the others
/// exist for parity with the teacher's multi-diagnostic model even though
/// this core only ever latches errors (spec.md §7).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Note,
}
