use pasc_util::{Span, Symbol};

use super::Lexer;
use crate::token::{Token, TokenKind};

impl<'a> Lexer<'a> {
    /// Lexes an unsigned digit sequence. A trailing `.` fraction and `e`
    /// scaled factor are recognized here (so the digits immediately after
    /// `e`/`E` are not mistaken for the start of an identifier) but are
    /// queued as separate sub-tokens rather than folded into one real
    /// literal value — the parser assembles the real from
    /// integer/dot/integer/identifier("e")/sign/integer sub-tokens
    /// (spec.md §4.1, "simplifies `.` versus `..`").
    pub(crate) fn lex_number(&mut self) -> Token {
        let int_start = self.cursor.position();
        self.consume_digits();
        let int_text = self.cursor.slice_from(int_start).to_string();
        let int_span = self.span();
        let int_tok = Token::new(TokenKind::IntegerLiteral, int_span, Symbol::intern(&int_text));

        if self.cursor.current_char() == '.' && self.cursor.peek_char(1).is_ascii_digit() {
            self.cursor.advance(); // '.'
            let dot_span = Span::new(
                int_span.end,
                self.cursor.position(),
                int_span.line,
                int_span.column,
            );
            self.pending.push_back(Token::new(
                TokenKind::Punctuator,
                dot_span,
                Symbol::intern("."),
            ));

            let frac_start = self.cursor.position();
            self.consume_digits();
            let frac_text = self.cursor.slice_from(frac_start).to_string();
            self.pending.push_back(Token::new(
                TokenKind::IntegerLiteral,
                self.span(),
                Symbol::intern(&frac_text),
            ));
        }

        self.lex_optional_exponent();

        int_tok
    }

    fn lex_optional_exponent(&mut self) {
        let c = self.cursor.current_char();
        if c != 'e' && c != 'E' {
            return;
        }
        let lookahead_sign = matches!(self.cursor.peek_char(1), '+' | '-');
        let digit_offset = if lookahead_sign { 2 } else { 1 };
        if !self.cursor.peek_char(digit_offset).is_ascii_digit() {
            return;
        }

        let marker_start = self.cursor.position();
        self.cursor.advance(); // 'e'/'E'
        self.pending.push_back(Token::new(
            TokenKind::Identifier,
            Span::new(marker_start, self.cursor.position(), self.token_start_line, self.token_start_column),
            Symbol::intern("e"),
        ));

        if lookahead_sign {
            let sign_start = self.cursor.position();
            let sign_char = self.cursor.current_char();
            self.cursor.advance();
            self.pending.push_back(Token::new(
                TokenKind::Sign,
                Span::new(sign_start, self.cursor.position(), self.token_start_line, self.token_start_column),
                Symbol::intern(&sign_char.to_string()),
            ));
        }

        let exp_start = self.cursor.position();
        self.consume_digits();
        let exp_text = self.cursor.slice_from(exp_start).to_string();
        self.pending.push_back(Token::new(
            TokenKind::IntegerLiteral,
            self.span(),
            Symbol::intern(&exp_text),
        ));
    }

    fn consume_digits(&mut self) {
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasc_util::Handler;

    fn tokens(src: &str) -> Vec<Token> {
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
    fn plain_integer() {
        let toks = tokens("123");
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::IntegerLiteral);
        assert_eq!(toks[0].text(), "123");
    }

    #[test]
    fn real_literal_sub_tokens() {
        let toks = tokens("3.14");
        let kinds: Vec<_> = toks.iter().map(|t| (t.kind, t.text())).collect();
        assert_eq!(
            kinds,
            vec![
                (TokenKind::IntegerLiteral, "3"),
                (TokenKind::Punctuator, "."),
                (TokenKind::IntegerLiteral, "14"),
            ]
        );
    }

    #[test]
    fn dotdot_is_not_mistaken_for_a_fraction() {
        let toks = tokens("1..10");
        assert_eq!(toks[0].kind, TokenKind::IntegerLiteral);
        assert_eq!(toks[1].kind, TokenKind::Punctuator);
        assert_eq!(toks[1].text(), "..");
    }

    #[test]
    fn scaled_exponent_sub_tokens() {
        let toks = tokens("1e10");
        let kinds: Vec<_> = toks.iter().map(|t| (t.kind, t.text())).collect();
        assert_eq!(
            kinds,
            vec![
                (TokenKind::IntegerLiteral, "1"),
                (TokenKind::Identifier, "e"),
                (TokenKind::IntegerLiteral, "10"),
            ]
        );
    }

    #[test]
    fn negative_scaled_exponent() {
        let toks = tokens("2.5e-3");
        let kinds: Vec<_> = toks.iter().map(|t| (t.kind, t.text())).collect();
        assert_eq!(
            kinds,
            vec![
                (TokenKind::IntegerLiteral, "2"),
                (TokenKind::Punctuator, "."),
                (TokenKind::IntegerLiteral, "5"),
                (TokenKind::Identifier, "e"),
                (TokenKind::Sign, "-"),
                (TokenKind::IntegerLiteral, "3"),
            ]
        );
    }
}
