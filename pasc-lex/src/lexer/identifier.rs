use pasc_util::Symbol;

use super::Lexer;
use crate::token::{is_keyword, Token, TokenKind};

impl<'a> Lexer<'a> {
    /// Lexes an identifier or keyword. Per spec.md §4.1, the first
    /// character is a letter; subsequent characters may be letters or
    /// digits. The matched text is folded to lowercase.
    pub(crate) fn lex_identifier(&mut self) -> Token {
        let start = self.cursor.position();
        while self.cursor.current_char().is_ascii_alphanumeric() {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        let folded = text.to_ascii_lowercase();
        let symbol = Symbol::intern(&folded);
        let kind = if is_keyword(&folded) { TokenKind::Keyword } else { TokenKind::Identifier };
        Token::new(kind, self.span(), symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasc_util::Handler;

    fn lex_one(src: &str) -> Token {
        let mut handler = Handler::new();
        let mut lexer = Lexer::new(src, &mut handler);
        lexer.next_token()
    }

    #[test]
    fn keywords_are_recognized_case_insensitively() {
        let t = lex_one("BeGiN");
        assert_eq!(t.kind, TokenKind::Keyword);
        assert_eq!(t.text(), "begin");
    }

    #[test]
    fn identifiers_are_folded_to_lowercase() {
        let t = lex_one("FooBar");
        assert_eq!(t.kind, TokenKind::Identifier);
        assert_eq!(t.text(), "foobar");
    }
}
