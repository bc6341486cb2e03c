use pasc_util::Symbol;

use super::Lexer;
use crate::token::{Token, TokenKind};

impl<'a> Lexer<'a> {
    /// Lexes a single-quoted string literal. A doubled quote `''` inside
    /// the literal encodes a single literal quote character (spec.md
    /// §4.1).
    pub(crate) fn lex_string(&mut self) -> Token {
        self.cursor.advance(); // opening '\''
        let mut value = String::new();
        loop {
            if self.cursor.is_at_end() {
                self.report_error("unterminated string literal".to_string());
                return self.make(TokenKind::Error, &value);
            }
            match self.cursor.current_char() {
                '\'' => {
                    self.cursor.advance();
                    if self.cursor.current_char() == '\'' {
                        value.push('\'');
                        self.cursor.advance();
                    } else {
                        break;
                    }
                }
                c => {
                    value.push(c);
                    self.cursor.advance();
                }
            }
        }
        Token::new(TokenKind::StringLiteral, self.span(), Symbol::intern(&value))
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
    fn plain_string() {
        let t = lex_one("'hello'");
        assert_eq!(t.kind, TokenKind::StringLiteral);
        assert_eq!(t.text(), "hello");
    }

    #[test]
    fn doubled_quote_is_a_literal_quote() {
        let t = lex_one("'it''s'");
        assert_eq!(t.text(), "it's");
    }

    #[test]
    fn unterminated_string_reports_error() {
        let mut handler = Handler::new();
        let mut lexer = Lexer::new("'unterminated", &mut handler);
        let t = lexer.next_token();
        assert_eq!(t.kind, TokenKind::Error);
        assert!(handler.has_error());
    }
}
