//! Block and declaration grammar (spec.md §4.2 "Declarations", "Procedure /
//! function declaration").

use std::cell::RefCell;
use std::rc::Rc;

use pasc_lex::TokenKind;

use super::{PResult, Parser};
use crate::decl::{ConstantDecl, Routine, RoutineRef, VariableDecl};
use crate::expr::ConstantValue;
use crate::scope::BlockId;
use crate::types::{FormalParameter, Type, TypeKind};

impl<'a> Parser<'a> {
    /// Parses one block's declarations in the fixed order spec.md §4.2
    /// requires — `label`, `const`, `type`, `var`, then an interleaved
    /// `procedure`/`function` sequence — followed by its statement part.
    pub(super) fn parse_block(&mut self, block: BlockId, routine: Option<RoutineRef>) -> PResult<()> {
        self.parse_label_section(block)?;
        self.parse_const_section(block)?;
        self.parse_type_section(block)?;
        self.parse_var_section(block)?;
        self.parse_routine_section(block)?;
        let body = self.parse_compound_statement(block)?;
        self.arena.get_mut(block).statements = body;
        if let Some(routine) = routine {
            routine.borrow_mut().body = Some(block);
        }
        Ok(())
    }

    fn parse_label_section(&mut self, block: BlockId) -> PResult<()> {
        if !self.eat_keyword("label") {
            return Ok(());
        }
        loop {
            let label = self.expect_integer_literal()?;
            if label < 0 {
                return self.error("label must be a non-negative integer".to_string());
            }
            self.arena.add_label(block, label as u64).map_err(|e| self.emit_str(e))?;
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(";")?;
        Ok(())
    }

    fn parse_const_section(&mut self, block: BlockId) -> PResult<()> {
        if !self.eat_keyword("const") {
            return Ok(());
        }
        while self.current.kind == TokenKind::Identifier {
            let name = self.expect_identifier()?;
            self.expect_operator("=")?;
            let value = self.parse_constant(block)?;
            let ty = self.type_of_constant(block, &value);
            self.arena.add_constant(block, name, ConstantDecl { name, ty, value }).map_err(|e| self.emit_str(e))?;
            self.expect_punct(";")?;
        }
        Ok(())
    }

    /// Infers a `const` declaration's type from its folded value. `Boolean`
    /// never actually arises here — the parser resolves `true`/`false`
    /// through the enum-value path — but the match must stay exhaustive.
    fn type_of_constant(&mut self, block: BlockId, value: &ConstantValue) -> Type {
        match value {
            ConstantValue::Integer(_) => Type::integer(),
            ConstantValue::Real(_) => Type::real(),
            ConstantValue::Boolean(_) => Type::boolean(),
            ConstantValue::Char(_) => Type::char(),
            ConstantValue::String(_) => Type::string(),
            ConstantValue::Enum { type_name, .. } => self
                .arena
                .find_type(block, *type_name)
                .map(|decl| decl.ty.clone())
                .or_else(|| self.builtin_type_by_name(*type_name))
                .unwrap_or_else(Type::boolean),
        }
    }

    fn parse_var_section(&mut self, block: BlockId) -> PResult<()> {
        if !self.eat_keyword("var") {
            return Ok(());
        }
        while self.current.kind == TokenKind::Identifier {
            let mut names = vec![self.expect_identifier()?];
            while self.eat_punct(",") {
                names.push(self.expect_identifier()?);
            }
            self.expect_punct(":")?;
            let ty = self.parse_standalone_type_denoter(block)?;
            for name in names {
                self.arena.add_variable(block, name, VariableDecl { name, ty: ty.clone() }).map_err(|e| self.emit_str(e))?;
            }
            self.expect_punct(";")?;
        }
        Ok(())
    }

    fn parse_routine_section(&mut self, block: BlockId) -> PResult<()> {
        loop {
            if self.eat_keyword("procedure") {
                self.parse_procedure_declaration(block)?;
            } else if self.eat_keyword("function") {
                self.parse_function_declaration(block)?;
            } else {
                break;
            }
            self.expect_punct(";")?;
        }
        Ok(())
    }

    fn parse_procedure_declaration(&mut self, block: BlockId) -> PResult<()> {
        let name = self.expect_identifier()?;
        let formals = self.parse_formal_parameters(block)?;
        self.expect_punct(";")?;
        if let Some(existing) = self.arena.find_local_procedure(block, name) {
            if !existing.borrow().is_forward {
                return self.error(format!("duplicate identifier \"{}\"", name.as_str()));
            }
            if existing.borrow().formals != formals {
                return self.error(format!("forward declaration of {} does not match its formal parameters", name.as_str()));
            }
            return self.parse_routine_body(block, existing);
        }
        if self.eat_keyword("forward") {
            let routine = Rc::new(RefCell::new(Routine { name, formals, return_type: None, body: None, is_forward: true }));
            return self.arena.add_procedure(block, name, routine).map_err(|e| self.emit_str(e));
        }
        let routine = Rc::new(RefCell::new(Routine { name, formals, return_type: None, body: None, is_forward: false }));
        self.arena.add_procedure(block, name, routine.clone()).map_err(|e| self.emit_str(e))?;
        self.parse_routine_body(block, routine)
    }

    fn parse_function_declaration(&mut self, block: BlockId) -> PResult<()> {
        let name = self.expect_identifier()?;
        let formals = self.parse_formal_parameters(block)?;
        self.expect_punct(":")?;
        let return_type = self.parse_standalone_type_denoter(block)?;
        self.expect_punct(";")?;
        if let Some(existing) = self.arena.find_local_function(block, name) {
            let signature_matches = existing.borrow().formals == formals
                && existing.borrow().return_type.as_ref().is_some_and(|t| t.equals(&return_type));
            if !existing.borrow().is_forward {
                return self.error(format!("duplicate identifier \"{}\"", name.as_str()));
            }
            if !signature_matches {
                return self.error(format!("forward declaration of {} does not match its signature", name.as_str()));
            }
            return self.parse_routine_body(block, existing);
        }
        if self.eat_keyword("forward") {
            let routine = Rc::new(RefCell::new(Routine { name, formals, return_type: Some(return_type), body: None, is_forward: true }));
            return self.arena.add_function(block, name, routine).map_err(|e| self.emit_str(e));
        }
        let routine = Rc::new(RefCell::new(Routine { name, formals, return_type: Some(return_type), body: None, is_forward: false }));
        self.arena.add_function(block, name, routine.clone()).map_err(|e| self.emit_str(e))?;
        self.parse_routine_body(block, routine)
    }

    /// Parses a non-forward routine's body block and wires it to `routine`,
    /// pushing/popping it onto `enclosing_routines` so function-return
    /// assignments inside the body resolve (spec.md §3.2, §4.2).
    fn parse_routine_body(&mut self, parent: BlockId, routine: RoutineRef) -> PResult<()> {
        routine.borrow_mut().is_forward = false;
        let body_block = self.arena.new_child(parent, Some(routine.clone()));
        self.enclosing_routines.push(routine.clone());
        let result = self.parse_block(body_block, Some(routine));
        self.enclosing_routines.pop();
        result
    }

    fn parse_formal_parameters(&mut self, block: BlockId) -> PResult<Vec<FormalParameter>> {
        let mut formals = Vec::new();
        if !self.eat_punct("(") {
            return Ok(formals);
        }
        if !self.at_punct(")") {
            loop {
                self.parse_formal_parameter_section(block, &mut formals)?;
                if !self.eat_punct(";") {
                    break;
                }
            }
        }
        self.expect_punct(")")?;
        Ok(formals)
    }

    /// One `;`-separated section of a formal-parameter list: a value
    /// section, a `var` (variable-parameter) section, or a nested
    /// procedural/functional parameter (spec.md §4.2 "Procedure / function
    /// declaration").
    fn parse_formal_parameter_section(&mut self, block: BlockId, formals: &mut Vec<FormalParameter>) -> PResult<()> {
        if self.eat_keyword("procedure") {
            let name = self.expect_identifier()?;
            let nested = self.parse_formal_parameters(block)?;
            formals.push(FormalParameter { name, ty: Type::new(TypeKind::Procedure { formals: nested }), by_reference: false });
            return Ok(());
        }
        if self.eat_keyword("function") {
            let name = self.expect_identifier()?;
            let nested = self.parse_formal_parameters(block)?;
            self.expect_punct(":")?;
            let ret = self.parse_standalone_type_denoter(block)?;
            formals.push(FormalParameter { name, ty: Type::new(TypeKind::Function { formals: nested, ret: Box::new(ret) }), by_reference: false });
            return Ok(());
        }
        let by_reference = self.eat_keyword("var");
        let mut names = vec![self.expect_identifier()?];
        while self.eat_punct(",") {
            names.push(self.expect_identifier()?);
        }
        self.expect_punct(":")?;
        let ty = self.parse_standalone_type_denoter(block)?;
        for name in names {
            formals.push(FormalParameter { name, ty: ty.clone(), by_reference });
        }
        Ok(())
    }
}
