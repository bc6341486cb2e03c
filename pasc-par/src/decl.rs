//! Declaration entities referenced from the scope, the AST, and variable
//! back-links (spec.md §3.2, §6).

use std::cell::RefCell;
use std::rc::Rc;

use pasc_util::Symbol;

use crate::expr::ConstantValue;
use crate::scope::BlockId;
use crate::types::{FormalParameter, Type};

#[derive(Debug)]
pub struct VariableDecl {
    pub name: Symbol,
    pub ty: Type,
}

#[derive(Debug)]
pub struct ConstantDecl {
    pub name: Symbol,
    pub ty: Type,
    pub value: ConstantValue,
}

#[derive(Debug)]
pub struct TypeDecl {
    pub name: Symbol,
    pub ty: Type,
}

/// A procedure or function. Only `return_type` distinguishes the two
/// (Glossary "Routine"); `body` is filled in once, either immediately or
/// when a later declaration supplies the body of a `forward` header.
#[derive(Debug)]
pub struct Routine {
    pub name: Symbol,
    pub formals: Vec<FormalParameter>,
    pub return_type: Option<Type>,
    pub body: Option<BlockId>,
    pub is_forward: bool,
}

pub type RoutineRef = Rc<RefCell<Routine>>;

/// The AST root: a program name, its root block, and the optional
/// parenthesized file list from the program heading (spec.md §4.2,
/// accepted but not enforced).
#[derive(Debug)]
pub struct Program {
    pub name: Symbol,
    pub file_list: Vec<Symbol>,
    pub root: BlockId,
}
