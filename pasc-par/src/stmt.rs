//! The statement model (spec.md §3.5).

use pasc_util::Span;

use crate::expr::{ConstantValue, Expression};
use crate::types::FormalParameter;

#[derive(Clone, Debug)]
pub struct CaseArm {
    pub labels: Vec<ConstantValue>,
    pub body: Statement,
}

#[derive(Clone, Debug)]
pub enum StmtKind {
    Goto(u64),
    Assignment { left: Expression, right: Expression },
    ProcedureCall { name: pasc_util::Symbol, actuals: Vec<Expression>, formals: Vec<FormalParameter> },
    Compound(Vec<Statement>),
    While { cond: Expression, body: Box<Statement> },
    Repeat { body: Vec<Statement>, cond: Expression },
    For { var: Expression, init: Expression, final_: Expression, downto: bool, body: Box<Statement> },
    If { cond: Expression, then_branch: Box<Statement>, else_branch: Option<Box<Statement>> },
    Case { switch: Expression, arms: Vec<CaseArm> },
    With { vars: Vec<Expression>, body: Box<Statement> },
    /// A statement consisting of nothing (an empty label target, or the
    /// trailing empty statement a compound allows before `end`).
    Empty,
}

#[derive(Clone, Debug)]
pub struct Statement {
    pub label: Option<u64>,
    pub kind: StmtKind,
    pub span: Span,
}

impl Statement {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { label: None, kind, span }
    }

    pub fn with_label(mut self, label: u64) -> Self {
        self.label = Some(label);
        self
    }
}
