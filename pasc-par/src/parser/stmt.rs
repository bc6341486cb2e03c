//! Statement grammar (spec.md §4.2 "Statement"), dispatched on the first
//! token of each statement.

use pasc_lex::TokenKind;
use pasc_util::{Span, Symbol};

use super::expr::{assignment_compatible, fix_empty_set_element};
use super::{PResult, Parser};
use crate::builtins::BuiltinProc;
use crate::expr::{ConstantValue, Expression};
use crate::scope::BlockId;
use crate::stmt::{CaseArm, Statement, StmtKind};
use crate::types::{Type, TypeKind};

impl<'a> Parser<'a> {
    pub(super) fn parse_compound_statement(&mut self, block: BlockId) -> PResult<Vec<Statement>> {
        self.expect_keyword("begin")?;
        let mut stmts = Vec::new();
        if !self.at_keyword("end") {
            stmts.push(self.parse_statement(block)?);
            while self.eat_punct(";") {
                if self.at_keyword("end") {
                    break;
                }
                stmts.push(self.parse_statement(block)?);
            }
        }
        self.expect_keyword("end")?;
        Ok(stmts)
    }

    fn parse_statement(&mut self, block: BlockId) -> PResult<Statement> {
        let start = self.current.span;
        let label = if self.current.kind == TokenKind::IntegerLiteral {
            let lbl = self.expect_integer_literal()? as u64;
            if !self.arena.is_valid_label(block, lbl) {
                return self.error(format!("label {lbl} was not declared in this block"));
            }
            self.expect_punct(":")?;
            Some(lbl)
        } else {
            None
        };
        let stmt = self.parse_unlabelled_statement(block, start)?;
        Ok(match label {
            Some(l) => stmt.with_label(l),
            None => stmt,
        })
    }

    fn parse_unlabelled_statement(&mut self, block: BlockId, start: Span) -> PResult<Statement> {
        if self.eat_keyword("goto") {
            let lbl = self.expect_integer_literal()? as u64;
            if !self.arena.is_valid_label(block, lbl) {
                return self.error(format!("goto to undeclared label {lbl}"));
            }
            return Ok(Statement::new(StmtKind::Goto(lbl), start));
        }
        if self.at_keyword("begin") {
            let stmts = self.parse_compound_statement(block)?;
            return Ok(Statement::new(StmtKind::Compound(stmts), start));
        }
        if self.eat_keyword("while") {
            let cond = self.parse_condition(block)?;
            self.expect_keyword("do")?;
            let body = Box::new(self.parse_statement(block)?);
            return Ok(Statement::new(StmtKind::While { cond, body }, start));
        }
        if self.eat_keyword("repeat") {
            let mut stmts = vec![self.parse_statement(block)?];
            while self.eat_punct(";") {
                if self.at_keyword("until") {
                    break;
                }
                stmts.push(self.parse_statement(block)?);
            }
            self.expect_keyword("until")?;
            let cond = self.parse_condition(block)?;
            return Ok(Statement::new(StmtKind::Repeat { body: stmts, cond }, start));
        }
        if self.eat_keyword("for") {
            return self.parse_for_statement(block, start);
        }
        if self.eat_keyword("if") {
            return self.parse_if_statement(block, start);
        }
        if self.eat_keyword("case") {
            return self.parse_case_statement(block, start);
        }
        if self.eat_keyword("with") {
            return self.parse_with_statement(block, start);
        }
        if self.current.kind == TokenKind::Identifier {
            return self.parse_identifier_led_statement(block, start);
        }
        Ok(Statement::new(StmtKind::Empty, start))
    }

    /// Parses an expression that must be boolean, emitting the stable
    /// `condition is not boolean, but <T>` phrase otherwise (spec.md §4.2
    /// error phrases).
    fn parse_condition(&mut self, block: BlockId) -> PResult<Expression> {
        let cond = self.parse_expression(block)?;
        if !matches!(*cond.ty.kind, TypeKind::Boolean) {
            return self.error(format!("condition is not boolean, but {}", cond.ty.type_string()));
        }
        Ok(cond)
    }

    fn parse_if_statement(&mut self, block: BlockId, start: Span) -> PResult<Statement> {
        let cond = self.parse_condition(block)?;
        self.expect_keyword("then")?;
        let then_branch = Box::new(self.parse_statement(block)?);
        let else_branch = if self.eat_keyword("else") {
            Some(Box::new(self.parse_statement(block)?))
        } else {
            None
        };
        Ok(Statement::new(StmtKind::If { cond, then_branch, else_branch }, start))
    }

    fn parse_for_statement(&mut self, block: BlockId, start: Span) -> PResult<Statement> {
        let name_span = self.current.span;
        let name = self.expect_identifier()?;
        let var = match self.resolve_variable_base(block, name, name_span)? {
            Some(b) => b,
            None => return self.error(format!("unknown variable {}", name.as_str())),
        };
        if !var.ty.is_ordinal() {
            return self.error(format!("for-loop control variable must be ordinal, got {} instead", var.ty.type_string()));
        }
        self.expect_punct(":=")?;
        let init = self.parse_expression(block)?;
        if !assignment_compatible(&var.ty, &init) {
            return self.error(format!(
                "for-loop initial value: expected {}, got {} instead",
                var.ty.type_string(),
                init.ty.type_string()
            ));
        }
        let downto = if self.eat_keyword("to") {
            false
        } else if self.eat_keyword("downto") {
            true
        } else {
            return self.error(format!("expected \"to\" or \"downto\", got \"{}\" instead", self.current.text()));
        };
        let final_ = self.parse_expression(block)?;
        if !assignment_compatible(&var.ty, &final_) {
            return self.error(format!(
                "for-loop final value: expected {}, got {} instead",
                var.ty.type_string(),
                final_.ty.type_string()
            ));
        }
        self.expect_keyword("do")?;
        let body = Box::new(self.parse_statement(block)?);
        Ok(Statement::new(StmtKind::For { var, init, final_, downto, body }, start))
    }

    fn parse_case_statement(&mut self, block: BlockId, start: Span) -> PResult<Statement> {
        let switch = self.parse_expression(block)?;
        self.expect_keyword("of")?;
        let mut arms = Vec::new();
        let mut seen_labels: Vec<ConstantValue> = Vec::new();
        loop {
            let mut labels = vec![self.parse_constant(block)?];
            while self.eat_punct(",") {
                labels.push(self.parse_constant(block)?);
            }
            for label in &labels {
                if !self.constant_matches_type(label, &switch.ty) {
                    return self.error(format!(
                        "case label {} doesn't match case expression type {}",
                        self.format_constant(block, label),
                        switch.ty.type_string()
                    ));
                }
                if seen_labels.contains(label) {
                    return self.error(format!("duplicate case label {}", self.format_constant(block, label)));
                }
                seen_labels.push(label.clone());
            }
            self.expect_punct(":")?;
            let body = self.parse_statement(block)?;
            arms.push(CaseArm { labels, body });
            if !self.eat_punct(";") || self.at_keyword("end") {
                break;
            }
        }
        self.expect_keyword("end")?;
        Ok(Statement::new(StmtKind::Case { switch, arms }, start))
    }

    fn constant_matches_type(&self, value: &ConstantValue, ty: &Type) -> bool {
        match value {
            ConstantValue::Integer(_) => ty.is_integer_like() || matches!(*ty.kind, TypeKind::Real),
            ConstantValue::Real(_) => matches!(*ty.kind, TypeKind::Real),
            ConstantValue::Boolean(_) => matches!(*ty.kind, TypeKind::Boolean),
            ConstantValue::Char(_) => matches!(*ty.kind, TypeKind::Char),
            ConstantValue::String(s) => {
                matches!(*ty.kind, TypeKind::String)
                    || (matches!(*ty.kind, TypeKind::Char) && s.as_str().chars().count() == 1)
            }
            ConstantValue::Enum { type_name, .. } => {
                (matches!(*ty.kind, TypeKind::Boolean) && type_name.as_str() == "boolean") || ty.type_name() == Some(*type_name)
            }
        }
    }

    fn format_constant(&self, block: BlockId, value: &ConstantValue) -> String {
        match value {
            ConstantValue::Integer(n) => n.to_string(),
            ConstantValue::Real(r) => r.to_string(),
            ConstantValue::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
            ConstantValue::Char(c) => format!("'{c}'"),
            ConstantValue::String(s) => format!("'{}'", s.as_str()),
            ConstantValue::Enum { type_name, ordinal } => self
                .arena
                .find_type(block, *type_name)
                .and_then(|decl| match &*decl.ty.kind {
                    TypeKind::Enum { identifiers } => identifiers.get(*ordinal).map(|s| s.as_str().to_string()),
                    _ => None,
                })
                .unwrap_or_else(|| format!("{}#{}", type_name.as_str(), ordinal)),
        }
    }

    /// Pushes each named record variable as a `with` scope, innermost
    /// last, so unqualified field access resolves through
    /// [`Parser::resolve_variable_base`]'s `with`-scope check (spec.md §9).
    fn parse_with_statement(&mut self, block: BlockId, start: Span) -> PResult<Statement> {
        let mut vars = Vec::new();
        loop {
            let var_span = self.current.span;
            let name = self.expect_identifier()?;
            let base = match self.resolve_variable_base(block, name, var_span)? {
                Some(b) => b,
                None => return self.error(format!("unknown identifier {}", name.as_str())),
            };
            let designator = self.parse_designator_suffixes(block, base)?;
            if !designator.ty.is_record() {
                return self.error(format!("with requires a record variable, got {} instead", designator.ty.type_string()));
            }
            vars.push(designator);
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_keyword("do")?;
        let pushed = vars.len();
        self.with_scopes.extend(vars.iter().cloned());
        let body = self.parse_statement(block);
        self.with_scopes.truncate(self.with_scopes.len() - pushed);
        let body = Box::new(body?);
        Ok(Statement::new(StmtKind::With { vars, body }, start))
    }

    fn parse_identifier_led_statement(&mut self, block: BlockId, start: Span) -> PResult<Statement> {
        let name = self.expect_identifier()?;
        if self.eat_punct(":=") {
            let target = match self.resolve_variable_base(block, name, start)? {
                Some(b) => b,
                None => return self.error(format!("unknown identifier {}", name.as_str())),
            };
            return self.finish_assignment(block, target, start);
        }
        if self.at_punct("[") || self.at_punct(".") || self.at_punct("^") {
            let base = match self.resolve_variable_base(block, name, start)? {
                Some(b) => b,
                None => return self.error(format!("unknown identifier {}", name.as_str())),
            };
            let target = self.parse_designator_suffixes(block, base)?;
            self.expect_punct(":=")?;
            return self.finish_assignment(block, target, start);
        }
        self.parse_procedure_call(block, name, start)
    }

    fn finish_assignment(&mut self, block: BlockId, target: Expression, start: Span) -> PResult<Statement> {
        let value = self.parse_expression(block)?;
        if !assignment_compatible(&target.ty, &value) {
            return self.error(format!(
                "cannot assign {} to {}",
                value.ty.type_string(),
                target.ty.type_string()
            ));
        }
        fix_empty_set_element(&target.ty, &value);
        Ok(Statement::new(StmtKind::Assignment { left: target, right: value }, start))
    }

    fn parse_procedure_call(&mut self, block: BlockId, name: Symbol, start: Span) -> PResult<Statement> {
        if let Some(routine) = self.arena.find_procedure(block, name) {
            let formals = routine.borrow().formals.clone();
            let actuals = self.parse_actuals(block, &formals, name)?;
            return Ok(Statement::new(StmtKind::ProcedureCall { name, actuals, formals }, start));
        }
        if let Some(proc) = crate::builtins::builtin_procedure(name) {
            return self.parse_builtin_procedure_call(block, name, proc, start);
        }
        self.error(format!("unknown identifier {}", name.as_str()))
    }

    /// Builtin procedures take context-sensitive actual lists rather than
    /// a fixed formals vector (spec.md §4.5), so each gets its own small
    /// parsing rule here.
    fn parse_builtin_procedure_call(&mut self, block: BlockId, name: Symbol, proc: BuiltinProc, start: Span) -> PResult<Statement> {
        use BuiltinProc::*;
        let actuals = match proc {
            Write | Writeln => self.parse_variadic_format_actuals(block)?,
            Read | Readln => self.parse_variadic_variable_actuals(block, name)?,
            New | Dispose => {
                self.expect_punct("(")?;
                let e = self.parse_expression(block)?;
                if !e.ty.is_pointer() {
                    return self.error(format!("{} expects a pointer variable, got {} instead", name.as_str(), e.ty.type_string()));
                }
                self.expect_punct(")")?;
                vec![e]
            }
            Get | Put | Reset | Rewrite => {
                self.expect_punct("(")?;
                let e = self.parse_expression(block)?;
                self.expect_punct(")")?;
                vec![e]
            }
            Pack | Unpack => {
                self.expect_punct("(")?;
                let a = self.parse_expression(block)?;
                self.expect_punct(",")?;
                let b = self.parse_expression(block)?;
                self.expect_punct(",")?;
                let c = self.parse_expression(block)?;
                self.expect_punct(")")?;
                vec![a, b, c]
            }
            Inc | Dec => {
                self.expect_punct("(")?;
                let v = self.parse_expression(block)?;
                if !v.is_variable() {
                    return self.error(format!("{} requires a variable actual", name.as_str()));
                }
                let mut actuals = vec![v];
                if self.eat_punct(",") {
                    actuals.push(self.parse_expression(block)?);
                }
                self.expect_punct(")")?;
                actuals
            }
        };
        Ok(Statement::new(StmtKind::ProcedureCall { name, actuals, formals: Vec::new() }, start))
    }

    fn parse_variadic_format_actuals(&mut self, block: BlockId) -> PResult<Vec<Expression>> {
        let mut actuals = Vec::new();
        if self.eat_punct("(") {
            if !self.at_punct(")") {
                loop {
                    actuals.push(self.parse_format_expr(block)?);
                    if !self.eat_punct(",") {
                        break;
                    }
                }
            }
            self.expect_punct(")")?;
        }
        Ok(actuals)
    }

    fn parse_variadic_variable_actuals(&mut self, block: BlockId, name: Symbol) -> PResult<Vec<Expression>> {
        let mut actuals = Vec::new();
        if self.eat_punct("(") {
            if !self.at_punct(")") {
                loop {
                    let e = self.parse_expression(block)?;
                    if !e.is_variable() {
                        return self.error(format!("{} requires a variable actual", name.as_str()));
                    }
                    actuals.push(e);
                    if !self.eat_punct(",") {
                        break;
                    }
                }
            }
            self.expect_punct(")")?;
        }
        Ok(actuals)
    }
}
