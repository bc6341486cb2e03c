//! Recursive-descent parser with semantic analysis interwoven (spec.md
//! §4.2, §5): each grammar production resolves names, checks types, and
//! builds the AST node in the same pass, rather than walking a separate
//! tree afterward.

mod decl;
mod expr;
mod stmt;
mod type_denoter;

use pasc_lex::{Lexer, Token, TokenKind};
use pasc_util::{Handler, Span, Symbol};

use crate::decl::Program;
use crate::scope::{BlockArena, BlockId};

/// Parse failure sentinel: the actual message has already been emitted to
/// the shared [`Handler`] (spec.md §7, first-error-abort). Callers
/// propagate with `?` and never inspect the `()`.
pub(crate) type PResult<T> = Result<T, ()>;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    arena: BlockArena,
    /// Names of the routine(s) currently being parsed, innermost last;
    /// used to recognize a function-return assignment (spec.md §4.2).
    enclosing_routines: Vec<crate::decl::RoutineRef>,
    /// Record variables opened by enclosing `with` statements, innermost
    /// last; their fields are visible as unqualified identifiers (spec.md
    /// §4.2, §9).
    with_scopes: Vec<crate::expr::Expression>,
}

/// The parsed program plus the block arena backing every [`BlockId`] it
/// contains; callers that walk the AST need both.
pub struct Ast {
    pub program: Program,
    pub arena: BlockArena,
}

pub fn parse(source: &str, handler: &mut Handler) -> Result<Ast, ()> {
    let lexer = Lexer::new(source, handler);
    let mut parser = Parser {
        lexer,
        current: Token::new(pasc_lex::TokenKind::Eof, Span::DUMMY, Symbol::intern("")),
        arena: BlockArena::new(),
        enclosing_routines: Vec::new(),
        with_scopes: Vec::new(),
    };
    parser.bump();
    let program = parser.parse_program()?;
    // A latched lexical error can otherwise go unnoticed if it happened
    // somewhere `bump` never turned into a `PResult::Err` (e.g. while
    // skipping a comment) and the token stream still reached a clean EOF.
    if parser.lexer.handler_mut().has_error() {
        return Err(());
    }
    Ok(Ast { program, arena: parser.arena })
}

impl<'a> Parser<'a> {
    fn bump(&mut self) -> Token {
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.current, next)
    }

    fn error<T>(&mut self, message: impl Into<String>) -> PResult<T> {
        pasc_util::diagnostic::DiagnosticBuilder::error(message.into())
            .span(self.current.span)
            .emit(self.lexer.handler_mut());
        Err(())
    }

    fn at_keyword(&self, text: &str) -> bool {
        self.current.is_keyword(text)
    }

    fn at_punct(&self, text: &str) -> bool {
        self.current.is_punct(text)
    }

    fn at_operator(&self, text: &str) -> bool {
        self.current.is_operator(text)
    }

    fn eat_keyword(&mut self, text: &str) -> bool {
        if self.at_keyword(text) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_punct(&mut self, text: &str) -> bool {
        if self.at_punct(text) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, text: &str) -> PResult<()> {
        if self.eat_keyword(text) {
            Ok(())
        } else {
            self.error(format!("expected \"{text}\", got \"{}\" instead", self.current.text()))
        }
    }

    fn expect_punct(&mut self, text: &str) -> PResult<()> {
        if self.eat_punct(text) {
            Ok(())
        } else {
            self.error(format!("expected \"{text}\", got \"{}\" instead", self.current.text()))
        }
    }

    /// Consumes an identifier, returning its folded [`Symbol`].
    fn expect_identifier(&mut self) -> PResult<Symbol> {
        if self.current.kind == TokenKind::Identifier {
            let sym = self.current.value;
            self.bump();
            Ok(sym)
        } else {
            self.error(format!("expected identifier, got \"{}\" instead", self.current.text()))
        }
    }

    fn expect_integer_literal(&mut self) -> PResult<i64> {
        if self.current.kind == TokenKind::IntegerLiteral {
            let text = self.current.text();
            let value: i64 = text.parse().map_err(|_| ())?;
            self.bump();
            Ok(value)
        } else {
            self.error(format!("expected an unsigned integer, got \"{}\" instead", self.current.text()))
        }
    }

    fn parse_program(&mut self) -> PResult<Program> {
        self.expect_keyword("program")?;
        let name = self.expect_identifier()?;
        let mut file_list = Vec::new();
        if self.eat_punct("(") {
            file_list.push(self.expect_identifier()?);
            while self.eat_punct(",") {
                file_list.push(self.expect_identifier()?);
            }
            self.expect_punct(")")?;
        }
        self.expect_punct(";")?;

        let root = self.arena.new_root();
        self.parse_block(root, None)?;
        self.expect_punct(".")?;
        if self.current.kind != TokenKind::Eof {
            return self.error(format!("unexpected \"{}\" after final \".\"", self.current.text()));
        }
        Ok(Program { name, file_list, root })
    }
}
