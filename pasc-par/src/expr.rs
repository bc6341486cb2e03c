//! The expression model (spec.md §3.4).

use std::rc::Rc;

use pasc_util::{Span, Symbol};

use crate::types::{AddOp, FormalParameter, MulOp, RelOp, Type};

/// A folded constant value: what a `const` declaration, a case label, or
/// a record-variant label reduces to (spec.md §4.2 "Constant").
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantValue {
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Char(char),
    String(Symbol),
    Enum { type_name: Symbol, ordinal: usize },
}

/// What a [`ExprKind::Variable`] resolves to — the back-link spec.md §6
/// requires for every variable reference.
#[derive(Clone, Debug)]
pub enum VariableBinding {
    Variable(Rc<crate::decl::VariableDecl>),
    Formal(Rc<FormalParameter>),
}

/// An expression node. `type_` and `span` are computed once at
/// construction time by the parser; `is_variable`/`reduce` are derived
/// from `kind`.
#[derive(Clone, Debug)]
pub struct Expression {
    pub kind: Rc<ExprKind>,
    pub ty: Type,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Relational { op: RelOp, lhs: Expression, rhs: Expression },
    Simple { sign: Option<char>, first: Expression, tail: Vec<(AddOp, Expression)> },
    Term { first: Expression, tail: Vec<(MulOp, Expression)> },
    Not(Expression),
    Constant { name: Symbol, value: ConstantValue },
    Variable { name: Symbol, binding: VariableBinding, is_return_value: bool },
    IntegerLiteral(i64),
    RealLiteral(f64),
    StringLiteral(Symbol),
    CharLiteral(char),
    Nil,
    SetConstructor(Vec<Expression>),
    Range { lower: Expression, upper: Expression },
    Sub(Expression),
    IndexedVariable { base: Expression, indices: Vec<Expression> },
    FieldDesignator { base: Expression, field: Symbol },
    FunctionCall { name: Symbol, actuals: Vec<Expression>, formals: Vec<FormalParameter> },
    EnumValue { type_name: Symbol, name: Symbol, ordinal: usize },
    Deref(Expression),
    Format { expr: Expression, width: Option<Expression>, decimals: Option<Expression> },
}

impl Expression {
    pub fn new(kind: ExprKind, ty: Type, span: Span) -> Self {
        Self { kind: Rc::new(kind), ty, span }
    }

    pub fn type_(&self) -> &Type {
        &self.ty
    }

    /// True iff this expression denotes an addressable location: valid as
    /// an assignment target or a `var`-parameter actual (spec.md §3.4,
    /// Glossary "Variable expression").
    pub fn is_variable(&self) -> bool {
        match &*self.kind {
            ExprKind::Variable { .. }
            | ExprKind::IndexedVariable { .. }
            | ExprKind::FieldDesignator { .. }
            | ExprKind::Deref(_) => true,
            ExprKind::Sub(inner) => inner.is_variable(),
            _ => false,
        }
    }

    pub fn is_return_value(&self) -> bool {
        matches!(&*self.kind, ExprKind::Variable { is_return_value: true, .. })
    }

    /// Produces a semantically equivalent, simplified expression.
    /// Constant arithmetic on integer/real literals is folded; everything
    /// else is returned unchanged (spec.md §3.4).
    pub fn reduce(&self) -> Expression {
        match &*self.kind {
            ExprKind::Sub(inner) => inner.reduce(),
            ExprKind::Not(inner) => {
                let inner = inner.reduce();
                if let ExprKind::Constant { value: ConstantValue::Boolean(b), .. } = &*inner.kind {
                    return Expression::new(
                        ExprKind::Constant {
                            name: Symbol::intern(if *b { "false" } else { "true" }),
                            value: ConstantValue::Boolean(!b),
                        },
                        self.ty.clone(),
                        self.span,
                    );
                }
                self.clone()
            }
            ExprKind::Term { first, tail } if tail.is_empty() => first.reduce(),
            ExprKind::Simple { sign: None, first, tail } if tail.is_empty() => first.reduce(),
            ExprKind::Simple { sign: Some('-'), first, tail } if tail.is_empty() => {
                let inner = first.reduce();
                match &*inner.kind {
                    ExprKind::IntegerLiteral(n) => {
                        Expression::new(ExprKind::IntegerLiteral(-n), inner.ty.clone(), self.span)
                    }
                    ExprKind::RealLiteral(r) => {
                        Expression::new(ExprKind::RealLiteral(-r), inner.ty.clone(), self.span)
                    }
                    _ => self.clone(),
                }
            }
            ExprKind::Simple { first, tail, .. } => fold_numeric_chain(first, tail, self),
            _ => self.clone(),
        }
    }
}

fn as_number(e: &Expression) -> Option<Number> {
    match &*e.kind {
        ExprKind::IntegerLiteral(n) => Some(Number::Int(*n)),
        ExprKind::RealLiteral(r) => Some(Number::Real(*r)),
        _ => None,
    }
}

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Real(f64),
}

fn fold_numeric_chain(
    first: &Expression,
    tail: &[(AddOp, Expression)],
    original: &Expression,
) -> Expression {
    let Some(mut acc) = as_number(&first.reduce()) else { return original.clone() };
    for (op, term) in tail {
        let Some(rhs) = as_number(&term.reduce()) else { return original.clone() };
        if *op == AddOp::Or {
            return original.clone();
        }
        acc = match (acc, rhs, op) {
            (Number::Int(a), Number::Int(b), AddOp::Add) => Number::Int(a + b),
            (Number::Int(a), Number::Int(b), AddOp::Sub) => Number::Int(a - b),
            (a, b, op) => {
                let (a, b) = (to_f64(a), to_f64(b));
                match op {
                    AddOp::Add => Number::Real(a + b),
                    AddOp::Sub => Number::Real(a - b),
                    AddOp::Or => unreachable!(),
                }
            }
        };
    }
    match acc {
        Number::Int(n) => Expression::new(ExprKind::IntegerLiteral(n), original.ty.clone(), original.span),
        Number::Real(r) => Expression::new(ExprKind::RealLiteral(r), original.ty.clone(), original.span),
    }
}

fn to_f64(n: Number) -> f64 {
    match n {
        Number::Int(n) => n as f64,
        Number::Real(r) => r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasc_util::Span;

    fn int_lit(n: i64) -> Expression {
        Expression::new(ExprKind::IntegerLiteral(n), Type::integer(), Span::DUMMY)
    }

    #[test]
    fn reduce_folds_integer_addition() {
        let expr = Expression::new(
            ExprKind::Simple { sign: None, first: int_lit(2), tail: vec![(AddOp::Add, int_lit(3))] },
            Type::integer(),
            Span::DUMMY,
        );
        let reduced = expr.reduce();
        assert!(matches!(&*reduced.kind, ExprKind::IntegerLiteral(5)));
    }

    #[test]
    fn reduce_negates_leading_sign() {
        let expr = Expression::new(
            ExprKind::Simple { sign: Some('-'), first: int_lit(7), tail: vec![] },
            Type::integer(),
            Span::DUMMY,
        );
        assert!(matches!(&*expr.reduce().kind, ExprKind::IntegerLiteral(-7)));
    }

    #[test]
    fn is_variable_true_for_field_designator_not_for_literal() {
        let base = Expression::new(
            ExprKind::Variable {
                name: Symbol::intern("r"),
                binding: VariableBinding::Variable(Rc::new(crate::decl::VariableDecl {
                    name: Symbol::intern("r"),
                    ty: Type::integer(),
                })),
                is_return_value: false,
            },
            Type::integer(),
            Span::DUMMY,
        );
        let field = Expression::new(
            ExprKind::FieldDesignator { base, field: Symbol::intern("x") },
            Type::integer(),
            Span::DUMMY,
        );
        assert!(field.is_variable());
        assert!(!int_lit(1).is_variable());
    }
}
