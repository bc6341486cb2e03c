//! pasc-lex - lexical analyzer for the source language (spec.md §4.1).
//!
//! Converts source text into a stream of [`Token`]s. Runs as a
//! single-threaded cooperative producer: `Lexer::next_token` is pulled by
//! the parser one token at a time (spec.md §5).

pub mod cursor;
pub mod lexer;
pub mod token;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use token::{Token, TokenKind};

#[cfg(test)]
mod idempotence {
    use super::*;
    use pasc_util::Handler;

    /// Testable property 4 (spec.md §8): re-lexing the same source
    /// preserves the token stream.
    fn lex_all(src: &str) -> Vec<(TokenKind, &'static str)> {
        let mut handler = Handler::new();
        let mut lexer = Lexer::new(src, &mut handler);
        let mut out = Vec::new();
        loop {
            let t = lexer.next_token();
            if t.is_eof() {
                break;
            }
            out.push((t.kind, t.text()));
        }
        out
    }

    #[test]
    fn lexing_is_idempotent_over_trivial_programs() {
        let src = "program test; var a : integer; begin a := 3 end.";
        assert_eq!(lex_all(src), lex_all(src));
    }

    #[test]
    fn lexing_is_idempotent_with_real_literals_and_strings() {
        let src = "const pi = 3.14; msg = 'it''s ok';";
        assert_eq!(lex_all(src), lex_all(src));
    }
}
