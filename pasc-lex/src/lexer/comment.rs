use super::Lexer;
use crate::token::{Token, TokenKind};

impl<'a> Lexer<'a> {
    /// Skips whitespace and both comment forms (spec.md §4.1). `(*` and
    /// `{` are treated as equivalent comment delimiters; an unterminated
    /// comment is a lexical error rather than a silent EOF.
    ///
    /// Returns `Some` with an error token the moment a comment runs off
    /// the end of the source, mirroring `lex_string`'s unterminated-string
    /// handling: the caller must surface this token rather than keep
    /// skipping, or the latched diagnostic would never reach a token the
    /// parser actually looks at.
    pub(crate) fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            match self.cursor.current_char() {
                c if c.is_whitespace() => {
                    self.cursor.advance();
                }
                '{' => {
                    if let Some(tok) = self.skip_brace_comment() {
                        return Some(tok);
                    }
                }
                '(' if self.cursor.peek_char(1) == '*' => {
                    if let Some(tok) = self.skip_paren_star_comment() {
                        return Some(tok);
                    }
                }
                _ => break,
            }
        }
        None
    }

    fn skip_brace_comment(&mut self) -> Option<Token> {
        self.mark_token_start();
        self.cursor.advance(); // '{'
        loop {
            if self.cursor.is_at_end() {
                self.report_error("unterminated comment".to_string());
                return Some(self.make(TokenKind::Error, ""));
            }
            if self.cursor.current_char() == '}' {
                self.cursor.advance();
                return None;
            }
            self.cursor.advance();
        }
    }

    fn skip_paren_star_comment(&mut self) -> Option<Token> {
        self.mark_token_start();
        self.cursor.advance(); // '('
        self.cursor.advance(); // '*'
        loop {
            if self.cursor.is_at_end() {
                self.report_error("unterminated comment".to_string());
                return Some(self.make(TokenKind::Error, ""));
            }
            if self.cursor.current_char() == '*' && self.cursor.peek_char(1) == ')' {
                self.cursor.advance();
                self.cursor.advance();
                return None;
            }
            self.cursor.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;
    use pasc_util::Handler;

    fn tokens(src: &str) -> Vec<crate::token::Token> {
        let mut handler = Handler::new();
        let mut lexer = Lexer::new(src, &mut handler);
        let mut out = Vec::new();
        loop {
            let t = lexer.next_token();
            if t.is_eof() {
                break;
            }
            out.push(t);
        }
        out
    }

    #[test]
    fn brace_comments_are_skipped() {
        let toks = tokens("a {a comment} b");
        assert_eq!(toks.len(), 2);
        assert_eq!(toks[0].kind, TokenKind::Identifier);
        assert_eq!(toks[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn paren_star_comments_are_skipped() {
        let toks = tokens("a (* a comment *) b");
        assert_eq!(toks.len(), 2);
    }

    #[test]
    fn unterminated_brace_comment_reports_error() {
        let mut handler = Handler::new();
        let mut lexer = Lexer::new("a { oops", &mut handler);
        lexer.next_token(); // 'a'
        let t = lexer.next_token();
        assert_eq!(t.kind, TokenKind::Error);
        assert!(handler.has_error());
    }

    #[test]
    fn unterminated_paren_star_comment_reports_error() {
        let mut handler = Handler::new();
        let mut lexer = Lexer::new("a (* oops", &mut handler);
        lexer.next_token(); // 'a'
        let t = lexer.next_token();
        assert_eq!(t.kind, TokenKind::Error);
        assert!(handler.has_error());
    }
}
