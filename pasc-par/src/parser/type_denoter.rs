//! Type-denoter grammar (spec.md §4.2 "Type parsing").

use pasc_util::Symbol;

use super::{PResult, Parser};
use crate::expr::ConstantValue;
use crate::scope::BlockId;
use crate::types::{empty_cell, filled_cell, Cell, Type, TypeKind, VariantArm, VariantPart};

/// A forward-referenced pointer target awaiting resolution at the end of
/// the enclosing type-definition region (spec.md §4.2, §9).
pub(super) struct PendingPointer {
    pub name: Symbol,
    pub cell: Cell,
}

impl<'a> Parser<'a> {
    /// Parses every `type` declaration in one block, then resolves any
    /// pointer whose target was forward-referenced (spec.md §4.2
    /// "Forward pointer resolution").
    pub(super) fn parse_type_section(&mut self, block: BlockId) -> PResult<()> {
        if !self.eat_keyword("type") {
            return Ok(());
        }
        let mut pending = Vec::new();
        while self.current.kind == pasc_lex::TokenKind::Identifier {
            let name = self.expect_identifier()?;
            self.expect_operator("=")?;
            let ty = self.parse_type_denoter(block, &mut pending)?;
            let named = ty.named(name);
            self.arena
                .add_type(block, name, crate::decl::TypeDecl { name, ty: named })
                .map_err(|e| self.emit_str(e))?;
            self.expect_punct(";")?;
        }
        for p in pending {
            match self.arena.find_type(block, p.name) {
                Some(decl) => *p.cell.borrow_mut() = Some(decl.ty.clone()),
                None => return self.error(format!("unknown type {}", p.name.as_str())),
            }
        }
        Ok(())
    }

    /// Parses a type denoter occurring outside a `type` definition region
    /// (a `var` declaration, a formal parameter, a function result): any
    /// `^Name` it contains must resolve immediately, since there is no
    /// later point in this region where a forward-referenced name would
    /// be completed (spec.md §4.2 "Forward pointer resolution").
    pub(super) fn parse_standalone_type_denoter(&mut self, block: BlockId) -> PResult<Type> {
        let mut pending = Vec::new();
        let ty = self.parse_type_denoter(block, &mut pending)?;
        for p in pending {
            match self.arena.find_type(block, p.name) {
                Some(decl) => *p.cell.borrow_mut() = Some(decl.ty.clone()),
                None => return self.error(format!("unknown type {}", p.name.as_str())),
            }
        }
        Ok(ty)
    }

    pub(super) fn expect_operator(&mut self, text: &str) -> PResult<()> {
        if self.at_operator(text) {
            self.bump();
            Ok(())
        } else {
            self.error(format!("expected \"{text}\", got \"{}\" instead", self.current.text()))
        }
    }

    pub(super) fn emit_str(&mut self, message: String) {
        pasc_util::diagnostic::DiagnosticBuilder::error(message).span(self.current.span).emit(self.lexer.handler_mut());
    }

    pub(super) fn parse_type_denoter(&mut self, block: BlockId, pending: &mut Vec<PendingPointer>) -> PResult<Type> {
        let packed = self.eat_keyword("packed");
        if self.eat_punct("^") {
            let name = self.expect_identifier()?;
            return match self.arena.find_type(block, name) {
                Some(decl) => Ok(Type::new(TypeKind::Pointer { target_name: Some(name), target: filled_cell(decl.ty.clone()) })),
                None => {
                    let cell = empty_cell();
                    pending.push(PendingPointer { name, cell: cell.clone() });
                    Ok(Type::new(TypeKind::Pointer { target_name: Some(name), target: cell }))
                }
            };
        }
        if self.eat_keyword("array") {
            self.expect_punct("[")?;
            let mut index_types = vec![self.parse_index_type(block, pending)?];
            while self.eat_punct(",") {
                index_types.push(self.parse_index_type(block, pending)?);
            }
            self.expect_punct("]")?;
            self.expect_keyword("of")?;
            let element = self.parse_type_denoter(block, pending)?;
            return Ok(Type::new(TypeKind::Array { index_types, element: Box::new(element), packed }));
        }
        if self.eat_keyword("record") {
            let mut seen_fields = Vec::new();
            let (fixed_fields, variant) = self.parse_field_list(block, pending, &mut seen_fields)?;
            self.expect_keyword("end")?;
            return Ok(Type::new(TypeKind::Record { fixed_fields, variant, packed }));
        }
        if self.eat_keyword("set") {
            self.expect_keyword("of")?;
            let element = self.parse_type_denoter(block, pending)?;
            return Ok(Type::new(TypeKind::Set { element: filled_cell(element), packed }));
        }
        if self.eat_keyword("file") {
            self.expect_keyword("of")?;
            let element = self.parse_type_denoter(block, pending)?;
            return Ok(Type::new(TypeKind::File { element: Box::new(element), packed }));
        }
        if self.at_punct("(") {
            return self.parse_enum_type(block);
        }
        self.parse_ordinal_or_named(block)
    }

    /// A simple type occurring where an array index or record tag type is
    /// expected: an inline enum, an inline subrange, or a named type that
    /// must resolve to something ordinal.
    fn parse_index_type(&mut self, block: BlockId, _pending: &mut Vec<PendingPointer>) -> PResult<Type> {
        if self.at_punct("(") {
            return self.parse_enum_type(block);
        }
        self.parse_ordinal_or_named(block)
    }

    fn parse_enum_type(&mut self, block: BlockId) -> PResult<Type> {
        self.expect_punct("(")?;
        let mut identifiers = vec![self.expect_identifier()?];
        while self.eat_punct(",") {
            identifiers.push(self.expect_identifier()?);
        }
        self.expect_punct(")")?;
        let ty = Type::new(TypeKind::Enum { identifiers: identifiers.clone() });
        for (ordinal, name) in identifiers.into_iter().enumerate() {
            let type_decl = std::rc::Rc::new(crate::decl::TypeDecl { name, ty: ty.clone() });
            self.arena.add_enum_value(block, name, type_decl, ordinal).map_err(|e| self.emit_str(e)).ok();
        }
        Ok(ty)
    }

    /// Either a bare named type, or a subrange `const .. const`. A literal
    /// or signed literal unambiguously starts a subrange; a bare
    /// identifier is ambiguous with one token of lookahead, so it is
    /// consumed first and then classified by what follows: `..` means it
    /// was the subrange's lower-bound constant, anything else means it
    /// was a type name (spec.md §4.2, §9).
    fn parse_ordinal_or_named(&mut self, block: BlockId) -> PResult<Type> {
        if self.current.kind == pasc_lex::TokenKind::Sign
            || self.current.kind == pasc_lex::TokenKind::IntegerLiteral
            || self.current.kind == pasc_lex::TokenKind::StringLiteral
        {
            let lower = self.parse_constant(block)?;
            return self.finish_subrange(block, lower);
        }
        let name = self.expect_identifier()?;
        if self.at_punct("..") {
            let lower = self.resolve_named_constant(block, name)?;
            return self.finish_subrange(block, lower);
        }
        match self.arena.find_type(block, name) {
            Some(decl) => Ok(decl.ty.clone()),
            None => match self.builtin_type_by_name(name) {
                Some(ty) => Ok(ty),
                None => self.error(format!("unknown type {}", name.as_str())),
            },
        }
    }

    fn finish_subrange(&mut self, block: BlockId, lower: ConstantValue) -> PResult<Type> {
        self.expect_punct("..")?;
        let upper = self.parse_constant(block)?;
        let (lower, upper) = match (lower, upper) {
            (ConstantValue::Integer(l), ConstantValue::Integer(u)) => (l, u),
            _ => return self.error("subrange bounds must be integer constants".to_string()),
        };
        if lower > upper {
            return self.error(format!("subrange lower bound {lower} exceeds upper bound {upper}"));
        }
        Ok(Type::new(TypeKind::Subrange { lower, upper, base: Box::new(Type::integer()) }))
    }

    fn resolve_named_constant(&mut self, block: BlockId, name: Symbol) -> PResult<ConstantValue> {
        self.resolve_constant_identifier(block, name)
    }

    pub(super) fn builtin_type_by_name(&self, name: Symbol) -> Option<Type> {
        crate::builtins::builtin_types().into_iter().find(|t| t.name == name.as_str()).map(|t| t.ty)
    }

    /// Parses a `record`'s field list: the fixed part, then an optional
    /// `case ... of` variant part (spec.md §3.3, §4.2). `seen_fields`
    /// accumulates every field name declared anywhere in the enclosing
    /// record — fixed fields, the variant tag, and every arm, including
    /// nested variants — so uniqueness is checked across the whole record
    /// rather than per field-list call (spec.md, field-name uniqueness).
    fn parse_field_list(
        &mut self,
        block: BlockId,
        pending: &mut Vec<PendingPointer>,
        seen_fields: &mut Vec<Symbol>,
    ) -> PResult<(Vec<(Symbol, Type)>, Option<VariantPart>)> {
        let mut fixed_fields = Vec::new();
        while !self.at_keyword("end") && !self.at_keyword("case") {
            let mut names = vec![self.expect_identifier()?];
            while self.eat_punct(",") {
                names.push(self.expect_identifier()?);
            }
            self.expect_punct(":")?;
            let ty = self.parse_type_denoter(block, pending)?;
            for n in names {
                if seen_fields.contains(&n) {
                    return self.error(format!("duplicate field identifier \"{}\"", n.as_str()));
                }
                seen_fields.push(n);
                fixed_fields.push((n, ty.clone()));
            }
            if !self.eat_punct(";") {
                break;
            }
        }
        let variant = if self.eat_keyword("case") {
            Some(self.parse_variant_part(block, pending, seen_fields)?)
        } else {
            None
        };
        Ok((fixed_fields, variant))
    }

    fn parse_variant_part(
        &mut self,
        block: BlockId,
        pending: &mut Vec<PendingPointer>,
        seen_fields: &mut Vec<Symbol>,
    ) -> PResult<VariantPart> {
        let first = self.expect_identifier()?;
        let (tag_field, tag_type) = if self.eat_punct(":") {
            let ty = self.parse_ordinal_or_named(block)?;
            (Some(first), ty)
        } else {
            match self.arena.find_type(block, first).or_else(|| self.builtin_type_by_name(first).map(|ty| std::rc::Rc::new(crate::decl::TypeDecl { name: first, ty }))) {
                Some(decl) => (None, decl.ty.clone()),
                None => return self.error(format!("unknown type {}", first.as_str())),
            }
        };
        if let Some(tag) = tag_field {
            if seen_fields.contains(&tag) {
                return self.error(format!("duplicate field identifier \"{}\"", tag.as_str()));
            }
            seen_fields.push(tag);
        }
        self.expect_keyword("of")?;
        let mut arms = Vec::new();
        loop {
            let mut labels = vec![self.parse_constant(block)?];
            while self.eat_punct(",") {
                labels.push(self.parse_constant(block)?);
            }
            self.expect_punct(":")?;
            self.expect_punct("(")?;
            let (fixed_fields, variant) = self.parse_field_list(block, pending, seen_fields)?;
            self.expect_punct(")")?;
            arms.push(VariantArm { labels, fields: Box::new(TypeKind::Record { fixed_fields, variant, packed: false }) });
            if !self.eat_punct(";") || self.at_keyword("end") {
                break;
            }
        }
        Ok(VariantPart { tag_field, tag_type, arms })
    }
}
