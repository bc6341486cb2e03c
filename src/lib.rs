//! pasc - translation core for an ISO-7185-style block-structured source
//! language (spec.md §1).
//!
//! Exposes a single pure function, [`translate`], that turns source text
//! into an [`pasc_par::Ast`] or the first error encountered. There is no
//! CLI, no file I/O, no persisted state here (spec.md §6) — reading the
//! source file and driving code generation from the returned AST are left
//! to external collaborators.

pub use pasc_lex::{Token, TokenKind};
pub use pasc_par::{decl, expr, scope, stmt, types, Ast};
pub use pasc_util::{Diagnostic, Level, Span};

/// Translates `source_text` (the contents of `file_name`) into an AST.
///
/// On success the AST's every expression carries its resolved type and
/// every variable reference its declaration back-link (spec.md §6). On
/// failure the first diagnostic encountered is rendered as
/// `"<file>:<line>: <message>"` (spec.md §6, §7) — parsing aborts on the
/// first error, so there is never a partial AST to inspect.
pub fn translate(file_name: &str, source_text: &str) -> Result<Ast, String> {
    let mut handler = pasc_util::Handler::new();
    match pasc_par::parse(source_text, &mut handler) {
        Ok(ast) => Ok(ast),
        Err(()) => {
            let diag = handler.take_error().expect("parse failure always emits a diagnostic");
            Err(diag.render(file_name, diag.span.line))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_program_parses() {
        let ast = translate("t.pas", "program test; begin end.").unwrap();
        assert_eq!(ast.program.name.as_str(), "test");
        let root = ast.arena.get(ast.program.root);
        assert!(root.variables.is_empty());
        assert!(root.statements.is_empty());
    }

    #[test]
    fn unknown_identifier_is_reported_with_location() {
        let err = translate("t.pas", "program test; var a : integer; begin a := 3; b := a end.").unwrap_err();
        assert!(err.starts_with("t.pas:1:"), "unexpected message: {err}");
        assert!(err.contains("unknown"), "unexpected message: {err}");
    }

    #[test]
    fn duplicate_const_is_reported() {
        let err = translate("t.pas", "program test; const foo = 1; foo = 2; begin end.").unwrap_err();
        assert!(err.contains("duplicate const identifier \"foo\""), "unexpected message: {err}");
    }

    #[test]
    fn packed_array_of_char_rejects_mismatched_length_string() {
        let err = translate(
            "t.pas",
            "program test; var s3 : packed array[1..3] of char; begin s3 := 'this is way too long' end.",
        )
        .unwrap_err();
        assert!(err.contains("cannot assign"), "unexpected message: {err}");
    }

    #[test]
    fn packed_array_of_char_accepts_matching_length_string() {
        let ast = translate(
            "t.pas",
            "program test; var s3 : packed array[1..3] of char; begin s3 := 'abc' end.",
        )
        .unwrap();
        assert_eq!(ast.arena.get(ast.program.root).statements.len(), 1);
    }

    #[test]
    fn duplicate_field_across_variant_arms_is_reported() {
        let err = translate(
            "t.pas",
            "program test; type r = record a : integer; case b : boolean of \
             true : (a : integer); false : (a : char) end; begin end.",
        )
        .unwrap_err();
        assert!(err.contains("duplicate field identifier \"a\""), "unexpected message: {err}");
    }

    #[test]
    fn forward_declared_procedure_resolves() {
        let ast = translate(
            "t.pas",
            "program test; procedure p; forward; procedure p; begin writeln(1) end; begin p end.",
        )
        .unwrap();
        let root = ast.arena.get(ast.program.root);
        let p = root.procedures.get(&pasc_util::Symbol::intern("p")).unwrap();
        assert!(!p.borrow().is_forward);
        assert!(p.borrow().body.is_some());
    }
}
