//! Expression grammar (spec.md §4.2 "Expression parsing"): the standard
//! precedence ladder, relational → simple → term → factor, with type
//! checking interwoven at every combining rule.

use std::rc::Rc;

use pasc_lex::TokenKind;
use pasc_util::{Span, Symbol};

use super::{PResult, Parser};
use crate::expr::{ConstantValue, ExprKind, Expression, VariableBinding};
use crate::scope::BlockId;
use crate::types::{
    additive_result, empty_cell, filled_cell, multiplicative_result, relational_result, AddOp,
    FormalParameter, MulOp, RelOp, Type, TypeKind,
};

/// Whether `value` may be assigned to a location of type `target`,
/// including the two context-sensitive narrowings spec.md §3.3 carves out
/// of plain [`Type::assignable_from`]: a length-1 string literal assigned
/// to a `char`, and a string literal assigned to a packed array of char
/// of the same length.
pub(super) fn assignment_compatible(target: &Type, value: &Expression) -> bool {
    if target.assignable_from(value.type_()) {
        return true;
    }
    if matches!(*target.kind, TypeKind::Char) {
        if let ExprKind::StringLiteral(sym) = &*value.kind {
            return sym.as_str().chars().count() == 1;
        }
    }
    if let TypeKind::Array { element, index_types, packed: true } = &*target.kind {
        if index_types.len() == 1 && matches!(*element.kind, TypeKind::Char) {
            if let ExprKind::StringLiteral(sym) = &*value.kind {
                if let TypeKind::Subrange { lower, upper, .. } = &*index_types[0].kind {
                    let len = (upper - lower + 1).max(0) as usize;
                    return sym.as_str().chars().count() == len;
                }
            }
        }
    }
    false
}

/// Retroactively fixes an empty-set literal's element type once it meets
/// an assignment or parameter-passing site with a known target (spec.md
/// §3.3, "write-once").
pub(super) fn fix_empty_set_element(target: &Type, value: &Expression) {
    if let (TypeKind::Set { element: target_elem, .. }, TypeKind::Set { element: value_elem, .. }) =
        (&*target.kind, &*value.ty.kind)
    {
        if value_elem.borrow().is_none() {
            if let Some(t) = target_elem.borrow().clone() {
                *value_elem.borrow_mut() = Some(t);
            }
        }
    }
}

impl<'a> Parser<'a> {
    pub(super) fn parse_expression(&mut self, block: BlockId) -> PResult<Expression> {
        let lhs = self.parse_simple_expression(block)?;
        let op = match self.current_relop() {
            Some(op) => op,
            None => return Ok(lhs),
        };
        self.bump();
        let rhs = self.parse_simple_expression(block)?;
        let ty = match relational_result(op, lhs.type_(), rhs.type_()) {
            Ok(t) => t,
            Err(e) => return self.error(e),
        };
        let span = lhs.span;
        Ok(Expression::new(ExprKind::Relational { op, lhs, rhs }, ty, span))
    }

    fn current_relop(&self) -> Option<RelOp> {
        if self.current.kind == TokenKind::Operator {
            return match self.current.text() {
                "=" => Some(RelOp::Eq),
                "<>" => Some(RelOp::Ne),
                "<" => Some(RelOp::Lt),
                "<=" => Some(RelOp::Le),
                ">" => Some(RelOp::Gt),
                ">=" => Some(RelOp::Ge),
                _ => None,
            };
        }
        if self.at_keyword("in") {
            Some(RelOp::In)
        } else {
            None
        }
    }

    pub(super) fn parse_simple_expression(&mut self, block: BlockId) -> PResult<Expression> {
        let start = self.current.span;
        let sign = if self.current.kind == TokenKind::Sign {
            let s = self.current.text().chars().next();
            self.bump();
            s
        } else {
            None
        };
        let first = self.parse_term(block)?;
        let mut ty = first.type_().clone();
        if let Some(s) = sign {
            if s == '-' && !(ty.is_integer_like() || matches!(*ty.kind, TypeKind::Real)) {
                return self.error(format!("can't negate {}", ty.type_string()));
            }
        }
        let mut tail = Vec::new();
        loop {
            let op = match self.current_addop() {
                Some(op) => op,
                None => break,
            };
            self.bump();
            let rhs = self.parse_term(block)?;
            ty = match additive_result(op, &ty, rhs.type_()) {
                Ok(t) => t,
                Err(e) => return self.error(e),
            };
            tail.push((op, rhs));
        }
        Ok(Expression::new(ExprKind::Simple { sign, first, tail }, ty, start))
    }

    fn current_addop(&self) -> Option<AddOp> {
        if self.current.kind == TokenKind::Sign {
            return match self.current.text() {
                "+" => Some(AddOp::Add),
                "-" => Some(AddOp::Sub),
                _ => None,
            };
        }
        if self.at_keyword("or") {
            Some(AddOp::Or)
        } else {
            None
        }
    }

    pub(super) fn parse_term(&mut self, block: BlockId) -> PResult<Expression> {
        let start = self.current.span;
        let first = self.parse_factor(block)?;
        let mut ty = first.type_().clone();
        let mut tail = Vec::new();
        loop {
            let op = match self.current_mulop() {
                Some(op) => op,
                None => break,
            };
            self.bump();
            let rhs = self.parse_factor(block)?;
            ty = match multiplicative_result(op, &ty, rhs.type_()) {
                Ok(t) => t,
                Err(e) => return self.error(e),
            };
            tail.push((op, rhs));
        }
        Ok(Expression::new(ExprKind::Term { first, tail }, ty, start))
    }

    fn current_mulop(&self) -> Option<MulOp> {
        if self.current.kind == TokenKind::Operator {
            return match self.current.text() {
                "*" => Some(MulOp::Mul),
                "/" => Some(MulOp::Div),
                _ => None,
            };
        }
        if self.at_keyword("div") {
            Some(MulOp::IntDiv)
        } else if self.at_keyword("mod") {
            Some(MulOp::Mod)
        } else if self.at_keyword("and") {
            Some(MulOp::And)
        } else {
            None
        }
    }

    fn parse_factor(&mut self, block: BlockId) -> PResult<Expression> {
        let start = self.current.span;
        if self.eat_keyword("not") {
            let inner = self.parse_factor(block)?;
            if !matches!(*inner.ty.kind, TypeKind::Boolean) {
                return self.error(format!("can't NOT {}", inner.ty.type_string()));
            }
            let ty = inner.ty.clone();
            return Ok(Expression::new(ExprKind::Not(inner), ty, start));
        }
        if self.eat_punct("(") {
            let inner = self.parse_expression(block)?;
            self.expect_punct(")")?;
            let ty = inner.ty.clone();
            return Ok(Expression::new(ExprKind::Sub(inner), ty, start));
        }
        if self.at_punct("[") {
            return self.parse_set_constructor(block);
        }
        if self.eat_keyword("nil") {
            return Ok(Expression::new(ExprKind::Nil, Type::nil_pointer(), start));
        }
        if self.current.kind == TokenKind::IntegerLiteral {
            return match self.parse_unsigned_number()? {
                ConstantValue::Integer(n) => Ok(Expression::new(ExprKind::IntegerLiteral(n), Type::integer(), start)),
                ConstantValue::Real(r) => Ok(Expression::new(ExprKind::RealLiteral(r), Type::real(), start)),
                _ => unreachable!("parse_unsigned_number only yields Integer or Real"),
            };
        }
        if self.current.kind == TokenKind::StringLiteral {
            let sym = self.current.value;
            self.bump();
            return Ok(if sym.as_str().chars().count() == 1 {
                Expression::new(ExprKind::CharLiteral(sym.as_str().chars().next().unwrap()), Type::char(), start)
            } else {
                Expression::new(ExprKind::StringLiteral(sym), Type::string(), start)
            });
        }
        if self.current.kind == TokenKind::Identifier {
            let name = self.expect_identifier()?;
            return self.resolve_name_factor(block, name, start);
        }
        self.error(format!("expected an expression, got \"{}\" instead", self.current.text()))
    }

    /// Assembles the sub-tokens the lexer splits a real literal into
    /// (spec.md §4.1): integer digits, optional `.` fraction, optional
    /// scaled `e`/`E` exponent.
    fn parse_unsigned_number(&mut self) -> PResult<ConstantValue> {
        let int_text = self.current.text().to_string();
        self.bump();
        let mut mantissa = int_text.clone();
        let mut is_real = false;
        if self.at_punct(".") {
            is_real = true;
            self.bump();
            mantissa.push('.');
            mantissa.push_str(&self.expect_digits()?);
        }
        let mut exponent = String::new();
        if self.current.kind == TokenKind::Identifier && self.current.text() == "e" {
            is_real = true;
            self.bump();
            let mut exp_sign = "";
            if self.current.kind == TokenKind::Sign {
                exp_sign = self.current.text();
                self.bump();
            }
            exponent = format!("e{exp_sign}{}", self.expect_digits()?);
        }
        if is_real {
            let text = format!("{mantissa}{exponent}");
            match text.parse::<f64>() {
                Ok(v) => Ok(ConstantValue::Real(v)),
                Err(_) => self.error(format!("invalid real literal \"{text}\"")),
            }
        } else {
            match int_text.parse::<i64>() {
                Ok(v) => Ok(ConstantValue::Integer(v)),
                Err(_) => self.error(format!("invalid integer literal \"{int_text}\"")),
            }
        }
    }

    fn expect_digits(&mut self) -> PResult<String> {
        if self.current.kind == TokenKind::IntegerLiteral {
            let text = self.current.text().to_string();
            self.bump();
            Ok(text)
        } else {
            self.error(format!("expected digits, got \"{}\" instead", self.current.text()))
        }
    }

    /// Optional sign, then identifier / integer / real / string literal
    /// (spec.md §4.2 "Constant"). Used by `const` declarations, case
    /// labels, record-variant labels, and subrange bounds.
    pub(super) fn parse_constant(&mut self, block: BlockId) -> PResult<ConstantValue> {
        let mut negate = false;
        if self.current.kind == TokenKind::Sign {
            negate = self.current.text() == "-";
            self.bump();
        }
        let value = if self.current.kind == TokenKind::IntegerLiteral {
            self.parse_unsigned_number()?
        } else if self.current.kind == TokenKind::StringLiteral {
            let sym = self.current.value;
            self.bump();
            if sym.as_str().chars().count() == 1 {
                ConstantValue::Char(sym.as_str().chars().next().unwrap())
            } else {
                ConstantValue::String(sym)
            }
        } else if self.current.kind == TokenKind::Identifier {
            let name = self.expect_identifier()?;
            self.resolve_constant_identifier(block, name)?
        } else {
            return self.error(format!("expected a constant, got \"{}\" instead", self.current.text()));
        };
        if negate {
            self.negate_constant(value)
        } else {
            Ok(value)
        }
    }

    fn negate_constant(&mut self, value: ConstantValue) -> PResult<ConstantValue> {
        match value {
            ConstantValue::Integer(n) => Ok(ConstantValue::Integer(-n)),
            ConstantValue::Real(r) => Ok(ConstantValue::Real(-r)),
            ConstantValue::String(s) => self.error(format!("can't negate string constant '{}'", s.as_str())),
            ConstantValue::Char(c) => self.error(format!("can't negate char constant '{c}'")),
            ConstantValue::Boolean(_) => self.error("can't negate a boolean constant".to_string()),
            ConstantValue::Enum { type_name, .. } => {
                self.error(format!("can't negate a value of enumerated type {}", type_name.as_str()))
            }
        }
    }

    pub(super) fn resolve_constant_identifier(&mut self, block: BlockId, name: Symbol) -> PResult<ConstantValue> {
        if let Some(decl) = self.arena.find_constant(block, name) {
            return Ok(decl.value.clone());
        }
        if let Some((type_decl, ordinal)) = self.arena.find_enum_value(block, name) {
            return Ok(ConstantValue::Enum { type_name: type_decl.name, ordinal });
        }
        if let Some((type_name, ordinal)) = crate::builtins::builtin_enum_value(name) {
            return Ok(ConstantValue::Enum { type_name: Symbol::intern(type_name), ordinal });
        }
        if name.as_str() == "maxint" {
            return Ok(ConstantValue::Integer(2147483647));
        }
        self.error(format!("unknown identifier {}", name.as_str()))
    }

    fn parse_set_constructor(&mut self, block: BlockId) -> PResult<Expression> {
        let start = self.current.span;
        self.expect_punct("[")?;
        let mut elements = Vec::new();
        if !self.at_punct("]") {
            loop {
                let first = self.parse_expression(block)?;
                let elem = if self.eat_punct("..") {
                    let upper = self.parse_expression(block)?;
                    let span = first.span;
                    let ty = first.ty.clone();
                    Expression::new(ExprKind::Range { lower: first, upper }, ty, span)
                } else {
                    first
                };
                elements.push(elem);
                if !self.eat_punct(",") {
                    break;
                }
            }
        }
        self.expect_punct("]")?;
        let cell = match elements.first() {
            Some(first) => filled_cell(first.ty.clone()),
            None => empty_cell(),
        };
        let ty = Type::new(TypeKind::Set { element: cell, packed: false });
        Ok(Expression::new(ExprKind::SetConstructor(elements), ty, start))
    }

    /// The four ways a name can denote an addressable location, shared
    /// between expression-factor resolution and statement-level
    /// assignment-target resolution (spec.md §3.2, §4.2 "Statement").
    pub(super) fn resolve_variable_base(&mut self, block: BlockId, name: Symbol, span: Span) -> PResult<Option<Expression>> {
        if let Some(base) = self.lookup_with_field(name, span)? {
            return Ok(Some(base));
        }
        if let Some(formal) = self.arena.find_formal_parameter(block, name) {
            let ty = formal.ty.clone();
            let binding = VariableBinding::Formal(Rc::new(formal));
            return Ok(Some(Expression::new(ExprKind::Variable { name, binding, is_return_value: false }, ty, span)));
        }
        if let Some(var) = self.arena.find_variable(block, name) {
            let ty = var.ty.clone();
            let binding = VariableBinding::Variable(var);
            return Ok(Some(Expression::new(ExprKind::Variable { name, binding, is_return_value: false }, ty, span)));
        }
        if let Some(routine) = self.arena.find_function_for_assignment(block, name) {
            let ty = routine.borrow().return_type.clone().expect("checked by find_function_for_assignment");
            let binding = VariableBinding::Variable(Rc::new(crate::decl::VariableDecl { name, ty: ty.clone() }));
            return Ok(Some(Expression::new(ExprKind::Variable { name, binding, is_return_value: true }, ty, span)));
        }
        Ok(None)
    }

    /// Resolves a bare identifier in expression position: first against
    /// any enclosing `with` scope's fields, then formal parameters,
    /// variables, a function-return assignment, constants, enum values,
    /// and finally user/builtin routine calls (spec.md §3.2 "Lookup
    /// rules", §4.2).
    fn resolve_name_factor(&mut self, block: BlockId, name: Symbol, span: Span) -> PResult<Expression> {
        if let Some(base) = self.resolve_variable_base(block, name, span)? {
            return self.parse_designator_suffixes(block, base);
        }
        if let Some(decl) = self.arena.find_constant(block, name) {
            let value = decl.value.clone();
            return Ok(Expression::new(ExprKind::Constant { name, value }, decl.ty.clone(), span));
        }
        if let Some((type_decl, ordinal)) = self.arena.find_enum_value(block, name) {
            return Ok(Expression::new(
                ExprKind::EnumValue { type_name: type_decl.name, name, ordinal },
                type_decl.ty.clone(),
                span,
            ));
        }
        if let Some((type_name, ordinal)) = crate::builtins::builtin_enum_value(name) {
            let ty = self.builtin_type_by_name(Symbol::intern(type_name)).expect("boolean is a builtin type");
            return Ok(Expression::new(ExprKind::EnumValue { type_name: Symbol::intern(type_name), name, ordinal }, ty, span));
        }
        if let Some(constant) = crate::builtins::builtin_constants().into_iter().find(|c| c.name == name.as_str()) {
            let value = if constant.name == "maxint" { ConstantValue::Integer(2147483647) } else { ConstantValue::Integer(0) };
            return Ok(Expression::new(ExprKind::Constant { name, value }, constant.ty, span));
        }
        if let Some(routine) = self.arena.find_function(block, name) {
            return self.parse_user_call(block, name, span, routine);
        }
        if let Some(func) = crate::builtins::builtin_function(name) {
            return self.parse_builtin_call(block, name, span, func);
        }
        self.error(format!("unknown identifier {}", name.as_str()))
    }

    fn lookup_with_field(&mut self, name: Symbol, span: Span) -> PResult<Option<Expression>> {
        for i in (0..self.with_scopes.len()).rev() {
            let base = self.with_scopes[i].clone();
            if field_exists(&base.ty, name) {
                let field_ty = self.field_type(&base.ty, name)?;
                return Ok(Some(Expression::new(ExprKind::FieldDesignator { base, field: name }, field_ty, span)));
            }
        }
        Ok(None)
    }

    /// `[`/`.`/`^` suffixes applied to a variable-like base expression
    /// (spec.md §3.4 IndexedVariable/FieldDesignator/Deref).
    pub(super) fn parse_designator_suffixes(&mut self, block: BlockId, mut base: Expression) -> PResult<Expression> {
        loop {
            if self.eat_punct("[") {
                let mut indices = vec![self.parse_expression(block)?];
                while self.eat_punct(",") {
                    indices.push(self.parse_expression(block)?);
                }
                self.expect_punct("]")?;
                let element_ty = match &*base.ty.kind {
                    TypeKind::Array { element, .. } => (**element).clone(),
                    TypeKind::String => Type::char(),
                    _ => return self.error("attempting to index a non-array".to_string()),
                };
                let span = base.span;
                base = Expression::new(ExprKind::IndexedVariable { base, indices }, element_ty, span);
                continue;
            }
            if self.eat_punct(".") {
                let field = self.expect_identifier()?;
                let field_ty = self.field_type(&base.ty, field)?;
                let span = base.span;
                base = Expression::new(ExprKind::FieldDesignator { base, field }, field_ty, span);
                continue;
            }
            if self.eat_punct("^") {
                let target_ty = match &*base.ty.kind {
                    TypeKind::Pointer { target, .. } => match target.borrow().as_ref() {
                        Some(t) => t.clone(),
                        None => return self.error("attempting to ^ an unresolved pointer type".to_string()),
                    },
                    _ => return self.error("attempting to ^ but expression is not a pointer type".to_string()),
                };
                let span = base.span;
                base = Expression::new(ExprKind::Deref(base), target_ty, span);
                continue;
            }
            break;
        }
        Ok(base)
    }

    fn field_type(&mut self, base_ty: &Type, field: Symbol) -> PResult<Type> {
        if field_exists(base_ty, field) {
            if let TypeKind::Record { fixed_fields, variant, .. } = &*base_ty.kind {
                if let Some((_, ty)) = fixed_fields.iter().find(|(n, _)| *n == field) {
                    return Ok(ty.clone());
                }
                if let Some(v) = variant {
                    for arm in &v.arms {
                        if let TypeKind::Record { fixed_fields, .. } = &*arm.fields {
                            if let Some((_, ty)) = fixed_fields.iter().find(|(n, _)| *n == field) {
                                return Ok(ty.clone());
                            }
                        }
                    }
                }
            }
            unreachable!("field_exists guarantees a match above");
        }
        match &*base_ty.kind {
            TypeKind::Record { .. } => self.error(format!("unknown field \"{}\"", field.as_str())),
            _ => self.error("attempting field access on a non-record".to_string()),
        }
    }

    fn parse_user_call(
        &mut self,
        block: BlockId,
        name: Symbol,
        span: Span,
        routine: crate::decl::RoutineRef,
    ) -> PResult<Expression> {
        let return_type = match routine.borrow().return_type.clone() {
            Some(t) => t,
            None => return self.error(format!("{} is a procedure, not a function", name.as_str())),
        };
        let formals = routine.borrow().formals.clone();
        let actuals = self.parse_actuals(block, &formals, name)?;
        Ok(Expression::new(ExprKind::FunctionCall { name, actuals, formals }, return_type, span))
    }

    pub(super) fn parse_actuals(
        &mut self,
        block: BlockId,
        formals: &[FormalParameter],
        name: Symbol,
    ) -> PResult<Vec<Expression>> {
        let mut actuals = Vec::new();
        if self.eat_punct("(") {
            if !self.at_punct(")") {
                loop {
                    actuals.push(self.parse_expression(block)?);
                    if !self.eat_punct(",") {
                        break;
                    }
                }
            }
            self.expect_punct(")")?;
        }
        if actuals.len() != formals.len() {
            return self.error(format!("wrong number of actual parameters to {}", name.as_str()));
        }
        for (actual, formal) in actuals.iter().zip(formals) {
            if !assignment_compatible(&formal.ty, actual) {
                return self.error(format!(
                    "parameter \"{}\" of {}: expected {}, got {} instead",
                    formal.name.as_str(),
                    name.as_str(),
                    formal.ty.type_string(),
                    actual.type_().type_string()
                ));
            }
            fix_empty_set_element(&formal.ty, actual);
            if formal.by_reference && !actual.is_variable() {
                return self.error(format!(
                    "variable parameter \"{}\" of {} requires a variable actual",
                    formal.name.as_str(),
                    name.as_str()
                ));
            }
        }
        Ok(actuals)
    }

    fn parse_builtin_call(
        &mut self,
        block: BlockId,
        name: Symbol,
        span: Span,
        func: crate::builtins::BuiltinFunc,
    ) -> PResult<Expression> {
        let actual = if func.arity() == 1 {
            self.expect_punct("(")?;
            let e = self.parse_expression(block)?;
            self.expect_punct(")")?;
            Some(e)
        } else {
            None
        };
        let ty = match func.result_type(actual.as_ref().map(|e| e.type_())) {
            Ok(t) => t,
            Err(e) => return self.error(e),
        };
        let actuals: Vec<Expression> = actual.into_iter().collect();
        Ok(Expression::new(ExprKind::FunctionCall { name, actuals, formals: Vec::new() }, ty, span))
    }

    /// `expr [: width [: decimals]]`, only valid inside `write`/`writeln`
    /// actuals (spec.md §4.5).
    pub(super) fn parse_format_expr(&mut self, block: BlockId) -> PResult<Expression> {
        let expr = self.parse_expression(block)?;
        if !self.eat_punct(":") {
            return Ok(expr);
        }
        let width = self.parse_expression(block)?;
        let is_real = matches!(*expr.ty.kind, TypeKind::Real);
        let decimals = if self.eat_punct(":") {
            let d = self.parse_expression(block)?;
            if !is_real {
                return self.error("decimal-places format with non-Real".to_string());
            }
            Some(d)
        } else {
            None
        };
        let span = expr.span;
        let ty = expr.ty.clone();
        Ok(Expression::new(ExprKind::Format { expr, width: Some(width), decimals }, ty, span))
    }
}

fn field_exists(base_ty: &Type, field: Symbol) -> bool {
    match &*base_ty.kind {
        TypeKind::Record { fixed_fields, variant, .. } => {
            fixed_fields.iter().any(|(n, _)| *n == field)
                || variant.as_ref().is_some_and(|v| {
                    v.arms.iter().any(|arm| {
                        matches!(&*arm.fields, TypeKind::Record { fixed_fields, .. } if fixed_fields.iter().any(|(n, _)| *n == field))
                    })
                })
        }
        _ => false,
    }
}
