//! IR module, function and basic block definitions

use super::instruction::{IrInstruction, IrReg};
use super::scope::ScopeStack;
use serde::{Deserialize, Serialize};

/// Straight-line instruction list, addressed by its position in the function
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrBlock {
    /// IR instructions in this block
    pub instructions: Vec<IrInstruction>,
}

impl IrBlock {
    /// Create an empty block
    pub fn new() -> Self {
        Self::default()
    }

    /// True when control can fall off the end of the block
    pub fn falls_through(&self) -> bool {
        self.instructions
            .last()
            .map_or(true, |instr| !instr.is_terminator())
    }
}

/// One lowered function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrFunction {
    /// Function name, also its assembly symbol
    pub name: String,
    /// Basic blocks; the entry block is first
    pub blocks: Vec<IrBlock>,
    /// Next unallocated register, equal to the number of registers used
    pub next_register: u32,
    /// Locals and scope markers, empty again once the body is lowered
    pub scopes: ScopeStack,
}

impl IrFunction {
    /// Create a function with a single empty entry block
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocks: vec![IrBlock::new()],
            next_register: 0,
            scopes: ScopeStack::new(),
        }
    }

    /// Allocate a fresh virtual register; registers are never reused
    pub fn alloc_reg(&mut self) -> IrReg {
        let reg = IrReg(self.next_register);
        self.next_register += 1;
        reg
    }

    /// Number of virtual registers, each owning one stack slot
    pub fn register_count(&self) -> u32 {
        self.next_register
    }

    /// All instructions in block order
    pub fn instructions(&self) -> impl Iterator<Item = &IrInstruction> {
        self.blocks.iter().flat_map(|block| block.instructions.iter())
    }
}

/// IR for one translation unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrModule {
    /// Functions in source order
    pub functions: Vec<IrFunction>,
}

impl IrModule {
    /// Create an empty module
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a function by name
    pub fn function(&self, name: &str) -> Option<&IrFunction> {
        self.functions.iter().find(|func| func.name == name)
    }
}
