use super::Lexer;
use crate::token::{Token, TokenKind};

impl<'a> Lexer<'a> {
    /// `:` or `:=`.
    pub(crate) fn lex_colon(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.eat('=') {
            self.make(TokenKind::Punctuator, ":=")
        } else {
            self.make(TokenKind::Punctuator, ":")
        }
    }

    /// `.`, `..`, or the `.)` digraph closing a `(.` bracket.
    pub(crate) fn lex_dot(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.eat(')') {
            self.make(TokenKind::Punctuator, "]")
        } else if self.cursor.eat('.') {
            self.make(TokenKind::Punctuator, "..")
        } else {
            self.make(TokenKind::Punctuator, ".")
        }
    }

    /// Relational/multiplicative operators: `= <> < <= > >= * /`.
    pub(crate) fn lex_operator_char(&mut self) -> Token {
        let c = self.cursor.current_char();
        self.cursor.advance();
        match c {
            '=' => self.make(TokenKind::Operator, "="),
            '*' => self.make(TokenKind::Operator, "*"),
            '/' => self.make(TokenKind::Operator, "/"),
            '<' => {
                if self.cursor.eat('>') {
                    self.make(TokenKind::Operator, "<>")
                } else if self.cursor.eat('=') {
                    self.make(TokenKind::Operator, "<=")
                } else {
                    self.make(TokenKind::Operator, "<")
                }
            }
            '>' => {
                if self.cursor.eat('=') {
                    self.make(TokenKind::Operator, ">=")
                } else {
                    self.make(TokenKind::Operator, ">")
                }
            }
            _ => unreachable!("lex_operator_char dispatched on non-operator character"),
        }
    }

    /// `+` or `-`, always emitted as a `Sign` token (spec.md §4.1); the
    /// parser decides whether it is unary or additive.
    pub(crate) fn lex_sign(&mut self) -> Token {
        let c = self.cursor.current_char();
        self.cursor.advance();
        self.make(TokenKind::Sign, &c.to_string())
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
    fn two_char_operators() {
        let toks = tokens("<> <= >= :=");
        let texts: Vec<_> = toks.iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["<>", "<=", ">=", ":="]);
    }

    #[test]
    fn dot_dot_digraph_bracket_and_comment() {
        let toks = tokens("(. .) (* c *)");
        let texts: Vec<_> = toks.iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["[", "]"]);
    }

    #[test]
    fn at_sign_is_caret() {
        let toks = tokens("@x");
        assert_eq!(toks[0].text(), "^");
    }

    #[test]
    fn signs_are_their_own_kind() {
        let toks = tokens("+ -");
        assert_eq!(toks[0].kind, TokenKind::Sign);
        assert_eq!(toks[1].kind, TokenKind::Sign);
    }
}
