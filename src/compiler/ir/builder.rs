//! Incremental construction of an [`IrFunction`]
//!
//! Branches are emitted against [`Label`]s, which are reserved before the
//! target block exists and bound when it is appended. `finish` patches every
//! branch with its label's block position.

use super::instruction::{BlockId, IrInstruction, IrReg};
use super::program::{IrBlock, IrFunction};
use crate::error::{Error, Result};

/// Forward reference to a block that may not be appended yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label(usize);

/// Branch waiting for its label to be resolved
#[derive(Debug, Clone, Copy)]
struct Fixup {
    block: BlockId,
    index: usize,
    label: Label,
}

/// Placeholder target until `finish` rewrites it
const UNRESOLVED: BlockId = BlockId(usize::MAX);

/// Builder appending instructions to the current block of one function
pub struct FunctionBuilder {
    func: IrFunction,
    current: BlockId,
    labels: Vec<Option<BlockId>>,
    fixups: Vec<Fixup>,
}

impl FunctionBuilder {
    /// Start a function with its entry block current
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            func: IrFunction::new(name),
            current: BlockId(0),
            labels: Vec::new(),
            fixups: Vec::new(),
        }
    }

    /// Allocate a fresh virtual register
    pub fn alloc_reg(&mut self) -> IrReg {
        self.func.alloc_reg()
    }

    /// Append an instruction to the current block
    pub fn emit(&mut self, instr: IrInstruction) {
        self.func.blocks[self.current.0].instructions.push(instr);
    }

    /// Append a new block and make it current
    pub fn append_block(&mut self) -> BlockId {
        self.func.blocks.push(IrBlock::new());
        self.current = BlockId(self.func.blocks.len() - 1);
        self.current
    }

    /// Reserve a label for a block that will be appended later
    pub fn reserve_label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() - 1)
    }

    /// Append a new block, make it current and bind `label` to it
    pub fn bind_label(&mut self, label: Label) -> BlockId {
        let block = self.append_block();
        self.labels[label.0] = Some(block);
        block
    }

    /// Emit an unconditional branch to `label`
    pub fn emit_branch(&mut self, label: Label) {
        self.emit_fixup(IrInstruction::Branch(UNRESOLVED), label);
    }

    /// Emit a branch to `label` taken when `cond` is zero
    pub fn emit_branch_if_zero(&mut self, cond: IrReg, label: Label) {
        self.emit_fixup(IrInstruction::BranchIfZero(cond, UNRESOLVED), label);
    }

    fn emit_fixup(&mut self, instr: IrInstruction, label: Label) {
        let index = self.func.blocks[self.current.0].instructions.len();
        self.fixups.push(Fixup {
            block: self.current,
            index,
            label,
        });
        self.emit(instr);
    }

    /// Open a lexical scope
    pub fn begin_scope(&mut self) {
        self.func.scopes.begin_scope();
    }

    /// Close the innermost lexical scope
    pub fn end_scope(&mut self) {
        self.func.scopes.end_scope();
    }

    /// Bind a local in the innermost scope
    pub fn declare(&mut self, name: &str, reg: IrReg) {
        if self.func.scopes.declared_in_current_scope(name) {
            tracing::warn!(function = %self.func.name, variable = name, "redeclaration shadows local in the same scope");
        }
        self.func.scopes.declare(name, reg);
    }

    /// Resolve a local through the scope stack
    pub fn lookup(&self, name: &str) -> Option<IrReg> {
        self.func.scopes.lookup(name)
    }

    /// Resolve every branch and return the finished function
    pub fn finish(mut self) -> Result<IrFunction> {
        for fixup in &self.fixups {
            let target = self.labels[fixup.label.0].ok_or_else(|| Error::UnboundLabel {
                function: self.func.name.clone(),
            })?;
            self.func.blocks[fixup.block.0].instructions[fixup.index].retarget(target);
        }
        Ok(self.func)
    }
}
