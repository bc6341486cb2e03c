//! pasc-par - recursive-descent parser with interwoven semantic analysis
//! (spec.md §4.2, §5).
//!
//! Consumes a [`pasc_lex::Lexer`] token-at-a-time and builds a [`decl::Program`]
//! whose every expression and statement already carries its resolved type;
//! there is no separate semantic-analysis pass over a bare syntax tree.

pub mod builtins;
pub mod decl;
pub mod expr;
mod parser;
pub mod scope;
pub mod stmt;
pub mod types;

pub use parser::{parse, Ast, Parser};
