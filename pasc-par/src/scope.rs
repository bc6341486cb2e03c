//! Block (lexical scope) model (spec.md §3.2, §4.4).
//!
//! `Block`s live in a `BlockArena` and refer to their parent by index
//! rather than by owning reference, so that a routine's body block can
//! point back at the block that declared the routine without an
//! ownership cycle (spec.md §9).

use std::rc::Rc;

use indexmap::IndexMap;
use pasc_util::{define_idx, IndexVec, Symbol};

use crate::decl::{ConstantDecl, RoutineRef, TypeDecl, VariableDecl};
use crate::stmt::Statement;
use crate::types::FormalParameter;

define_idx!(BlockId);

#[derive(Debug)]
pub struct EnumValueDecl {
    pub type_decl: Rc<TypeDecl>,
    pub ordinal: usize,
}

#[derive(Debug, Default)]
pub struct Block {
    pub parent: Option<BlockId>,
    pub routine: Option<RoutineRef>,
    pub labels: Vec<u64>,
    pub constants: IndexMap<Symbol, Rc<ConstantDecl>>,
    pub types: IndexMap<Symbol, Rc<TypeDecl>>,
    pub variables: IndexMap<Symbol, Rc<VariableDecl>>,
    pub procedures: IndexMap<Symbol, RoutineRef>,
    pub functions: IndexMap<Symbol, RoutineRef>,
    pub enum_values: IndexMap<Symbol, EnumValueDecl>,
    pub statements: Vec<Statement>,
}

impl Block {
    fn name_taken(&self, name: Symbol) -> bool {
        self.constants.contains_key(&name)
            || self.types.contains_key(&name)
            || self.variables.contains_key(&name)
            || self.procedures.contains_key(&name)
            || self.functions.contains_key(&name)
            || self.enum_values.contains_key(&name)
    }
}

pub struct BlockArena {
    blocks: IndexVec<BlockId, Block>,
}

impl BlockArena {
    pub fn new() -> Self {
        Self { blocks: IndexVec::new() }
    }

    pub fn new_root(&mut self) -> BlockId {
        self.blocks.push(Block::default())
    }

    pub fn new_child(&mut self, parent: BlockId, routine: Option<RoutineRef>) -> BlockId {
        self.blocks.push(Block { parent: Some(parent), routine, ..Block::default() })
    }

    pub fn get(&self, id: BlockId) -> &Block {
        &self.blocks[id]
    }

    pub fn get_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id]
    }

    pub fn add_label(&mut self, id: BlockId, label: u64) -> Result<(), String> {
        let block = self.get_mut(id);
        if block.labels.contains(&label) {
            return Err(format!("duplicate label {label}"));
        }
        block.labels.push(label);
        Ok(())
    }

    pub fn is_valid_label(&self, id: BlockId, label: u64) -> bool {
        self.get(id).labels.contains(&label)
    }

    pub fn add_constant(&mut self, id: BlockId, name: Symbol, decl: ConstantDecl) -> Result<(), String> {
        let block = self.get_mut(id);
        if block.name_taken(name) {
            return Err(format!("duplicate const identifier \"{name}\""));
        }
        block.constants.insert(name, Rc::new(decl));
        Ok(())
    }

    pub fn add_type(&mut self, id: BlockId, name: Symbol, decl: TypeDecl) -> Result<(), String> {
        let block = self.get_mut(id);
        if block.name_taken(name) {
            return Err(format!("duplicate type identifier \"{name}\""));
        }
        block.types.insert(name, Rc::new(decl));
        Ok(())
    }

    pub fn add_variable(&mut self, id: BlockId, name: Symbol, decl: VariableDecl) -> Result<(), String> {
        let block = self.get_mut(id);
        if block.name_taken(name) {
            return Err(format!("duplicate var identifier \"{name}\""));
        }
        block.variables.insert(name, Rc::new(decl));
        Ok(())
    }

    pub fn add_enum_value(&mut self, id: BlockId, name: Symbol, type_decl: Rc<TypeDecl>, ordinal: usize) -> Result<(), String> {
        let block = self.get_mut(id);
        if block.name_taken(name) {
            return Err(format!("duplicate identifier \"{name}\""));
        }
        block.enum_values.insert(name, EnumValueDecl { type_decl, ordinal });
        Ok(())
    }

    /// Declares a new procedure (including a `forward` header). Returns an
    /// error if the name is already taken in this block. A later
    /// definition that completes a `forward` header does not call this —
    /// the parser instead looks the routine up with
    /// [`find_local_procedure`](Self::find_local_procedure) and mutates it
    /// in place (spec.md §4.2).
    pub fn add_procedure(&mut self, id: BlockId, name: Symbol, routine: RoutineRef) -> Result<(), String> {
        let block = self.get_mut(id);
        if block.name_taken(name) {
            return Err(format!("duplicate identifier \"{name}\""));
        }
        block.procedures.insert(name, routine);
        Ok(())
    }

    pub fn add_function(&mut self, id: BlockId, name: Symbol, routine: RoutineRef) -> Result<(), String> {
        let block = self.get_mut(id);
        if block.name_taken(name) {
            return Err(format!("duplicate identifier \"{name}\""));
        }
        block.functions.insert(name, routine);
        Ok(())
    }

    /// Same-block-only procedure lookup, used by the parser to find a
    /// prior `forward` header to complete rather than chasing it through
    /// enclosing blocks.
    pub fn find_local_procedure(&self, id: BlockId, name: Symbol) -> Option<RoutineRef> {
        self.get(id).procedures.get(&name).cloned()
    }

    pub fn find_local_function(&self, id: BlockId, name: Symbol) -> Option<RoutineRef> {
        self.get(id).functions.get(&name).cloned()
    }

    pub fn find_constant(&self, mut id: BlockId, name: Symbol) -> Option<Rc<ConstantDecl>> {
        loop {
            let block = self.get(id);
            if let Some(c) = block.constants.get(&name) {
                return Some(c.clone());
            }
            id = block.parent?;
        }
    }

    pub fn find_variable(&self, mut id: BlockId, name: Symbol) -> Option<Rc<VariableDecl>> {
        loop {
            let block = self.get(id);
            if let Some(v) = block.variables.get(&name) {
                return Some(v.clone());
            }
            id = block.parent?;
        }
    }

    /// Formal parameters are scoped to the routine whose body the block
    /// belongs to; lookup does not continue past the innermost block that
    /// has an owning routine other than by walking to parents that share
    /// the same routine (nested statements reuse the same `BlockId`, so
    /// in practice this only ever inspects `id` itself).
    pub fn find_formal_parameter(&self, id: BlockId, name: Symbol) -> Option<FormalParameter> {
        let block = self.get(id);
        let routine = block.routine.as_ref()?;
        routine.borrow().formals.iter().find(|f| f.name == name).cloned()
    }

    pub fn find_procedure(&self, mut id: BlockId, name: Symbol) -> Option<RoutineRef> {
        loop {
            let block = self.get(id);
            if let Some(p) = block.procedures.get(&name) {
                return Some(p.clone());
            }
            id = block.parent?;
        }
    }

    pub fn find_function(&self, mut id: BlockId, name: Symbol) -> Option<RoutineRef> {
        loop {
            let block = self.get(id);
            if let Some(f) = block.functions.get(&name) {
                return Some(f.clone());
            }
            id = block.parent?;
        }
    }

    pub fn find_type(&self, mut id: BlockId, name: Symbol) -> Option<Rc<TypeDecl>> {
        loop {
            let block = self.get(id);
            if let Some(t) = block.types.get(&name) {
                return Some(t.clone());
            }
            id = block.parent?;
        }
    }

    pub fn find_enum_value(&self, mut id: BlockId, name: Symbol) -> Option<(Rc<TypeDecl>, usize)> {
        loop {
            let block = self.get(id);
            if let Some(e) = block.enum_values.get(&name) {
                return Some((e.type_decl.clone(), e.ordinal));
            }
            id = block.parent?;
        }
    }

    /// Only the enclosing routine's own name resolves for a
    /// function-return assignment (spec.md §3.2 "Lookup rules").
    pub fn find_function_for_assignment(&self, id: BlockId, name: Symbol) -> Option<RoutineRef> {
        let block = self.get(id);
        let routine = block.routine.as_ref()?;
        if routine.borrow().name == name && routine.borrow().return_type.is_some() {
            Some(routine.clone())
        } else {
            None
        }
    }
}

impl Default for BlockArena {
    fn default() -> Self {
        Self::new()
    }
}

