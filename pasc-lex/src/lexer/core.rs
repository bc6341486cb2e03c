use std::collections::VecDeque;

use pasc_util::diagnostic::DiagnosticBuilder;
use pasc_util::{Handler, Span, Symbol};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

/// The lexer for the source language (spec.md §4.1).
///
/// Runs as a cooperative producer: the parser pulls one token at a time
/// via [`Lexer::next_token`] (spec.md §5). A single call can enqueue more
/// than one token (e.g. real-literal sub-tokens, spec.md §4.1); those are
/// buffered in `pending` and drained before the cursor advances further.
pub struct Lexer<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) handler: &'a mut Handler,
    pub(crate) pending: VecDeque<Token>,
    pub(crate) token_start: usize,
    pub(crate) token_start_line: u32,
    pub(crate) token_start_column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, handler: &'a mut Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
            pending: VecDeque::new(),
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// Returns the next token, skipping whitespace and comments.
    pub fn next_token(&mut self) -> Token {
        if let Some(tok) = self.pending.pop_front() {
            return tok;
        }

        if let Some(err) = self.skip_whitespace_and_comments() {
            return err;
        }
        self.mark_token_start();

        if self.cursor.is_at_end() {
            return self.make(TokenKind::Eof, "");
        }

        match self.cursor.current_char() {
            '(' => self.lex_lparen_or_digraph(),
            ')' | '[' | ']' | ',' | ';' | '^' | '@' => self.lex_punctuator_char(),
            ':' => self.lex_colon(),
            '.' => self.lex_dot(),
            '=' | '<' | '>' | '*' | '/' => self.lex_operator_char(),
            '+' | '-' => self.lex_sign(),
            '\'' => self.lex_string(),
            c if c.is_ascii_digit() => self.lex_number(),
            c if c.is_ascii_alphabetic() => self.lex_identifier(),
            c => {
                self.cursor.advance();
                self.report_error(format!("unexpected character '{c}'"));
                self.make(TokenKind::Error, &c.to_string())
            }
        }
    }

    pub(crate) fn mark_token_start(&mut self) {
        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();
    }

    pub(crate) fn span(&self) -> Span {
        Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        )
    }

    pub(crate) fn make(&self, kind: TokenKind, value: &str) -> Token {
        Token::new(kind, self.span(), Symbol::intern(value))
    }

    pub(crate) fn report_error(&mut self, message: String) {
        DiagnosticBuilder::error(message).span(self.span()).emit(self.handler);
    }

    /// Gives the parser access to the same [`Handler`] the lexer reports
    /// into, so lexical and syntactic/semantic errors share one
    /// first-error-wins handler (spec.md §7).
    pub fn handler_mut(&mut self) -> &mut Handler {
        self.handler
    }

    /// `(` is either a plain left parenthesis or the `(.` digraph for `[`
    /// (spec.md §4.1). `(*` comments are already consumed by
    /// `skip_whitespace_and_comments` before dispatch reaches here.
    fn lex_lparen_or_digraph(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.current_char() == '.' {
            self.cursor.advance();
            self.make(TokenKind::Punctuator, "[")
        } else {
            self.make(TokenKind::Punctuator, "(")
        }
    }

    fn lex_punctuator_char(&mut self) -> Token {
        let c = self.cursor.current_char();
        self.cursor.advance();
        match c {
            '@' => self.make(TokenKind::Punctuator, "^"),
            other => self.make(TokenKind::Punctuator, &other.to_string()),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let tok = self.next_token();
        if tok.is_eof() {
            None
        } else {
            Some(tok)
        }
    }
}
