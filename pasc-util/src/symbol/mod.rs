//! String interning.
//!
//! Identifiers are case-folded to lowercase before interning (spec.md §3.1,
//! §9 "Case-insensitivity"), so two `Symbol`s compare equal iff the source
//! spelled the same identifier modulo ASCII case.

mod interner;

pub use interner::Interner;

use std::cell::RefCell;
use std::fmt;

thread_local! {
    static INTERNER: RefCell<Interner> = RefCell::new(Interner::with_keywords());
}

/// An interned, case-folded identifier or string value.
///
/// Comparison and hashing are O(1) integer operations. The core runs
/// single-threaded (spec.md §5), so the backing table is a thread-local
/// rather than a lock/atomic-protected global.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    /// Interns `text` as-is. Callers that need case-folding (identifiers)
    /// should fold before calling; string/char literal contents are
    /// interned verbatim.
    pub fn intern(text: &str) -> Self {
        INTERNER.with(|i| i.borrow_mut().intern(text))
    }

    /// Interns `text` after lowercasing ASCII letters, matching the
    /// identifier-folding rule of spec.md §3.1 / §9.
    pub fn intern_folded(text: &str) -> Self {
        let folded: String = text
            .chars()
            .map(|c| if c.is_ascii_uppercase() { c.to_ascii_lowercase() } else { c })
            .collect();
        Self::intern(&folded)
    }

    pub fn as_str(self) -> &'static str {
        INTERNER.with(|i| i.borrow().resolve(self))
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_interns_to_same_symbol() {
        assert_eq!(Symbol::intern("begin"), Symbol::intern("begin"));
    }

    #[test]
    fn folding_ignores_ascii_case() {
        assert_eq!(Symbol::intern_folded("BEGIN"), Symbol::intern_folded("begin"));
        assert_eq!(Symbol::intern_folded("Foo"), Symbol::intern_folded("foo"));
    }

    #[test]
    fn distinct_text_interns_distinctly() {
        assert_ne!(Symbol::intern("foo"), Symbol::intern("bar"));
    }

    #[test]
    fn round_trips_through_as_str() {
        let s = Symbol::intern("maxint");
        assert_eq!(s.as_str(), "maxint");
    }
}
