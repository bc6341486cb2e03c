//! pasc-util - shared interning, source-location, and diagnostic types.
//!
//! Foundation crate for the `pasc-lex` / `pasc-par` / `pasc` translation
//! core. Nothing here is language-specific.

pub mod diagnostic;
pub mod error;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, Handler, Level};
pub use error::UtilError;
pub use index_vec::{Idx, IndexVec};
pub use span::{SourceFile, SourceMap, Span};
pub use symbol::Symbol;
