//! IR instruction definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Virtual register (unbounded supply, one stack slot each during codegen)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IrReg(pub u32);

impl fmt::Display for IrReg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Position of a basic block inside its function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub usize);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// IR instruction (three-address code)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrInstruction {
    // Arithmetic (dst = src1 op src2)
    /// Addition: dst = lhs + rhs
    Add(IrReg, IrReg, IrReg),
    /// Subtraction: dst = lhs - rhs
    Sub(IrReg, IrReg, IrReg),
    /// Multiplication: dst = lhs * rhs
    Mul(IrReg, IrReg, IrReg),
    /// Signed division: dst = lhs / rhs
    Div(IrReg, IrReg, IrReg),

    // Register operations
    /// Load 32-bit integer constant into register
    Load(IrReg, i32),
    /// Copy register: dst = src
    Store(IrReg, IrReg),

    // Control flow
    /// Return the value in register
    Return(IrReg),
    /// Unconditional jump to block
    Branch(BlockId),
    /// Jump to block if register is zero, fall through otherwise
    BranchIfZero(IrReg, BlockId),
}

/// Operation tag of an [`IrInstruction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrOp {
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mul,
    /// Division
    Div,
    /// Constant load
    Load,
    /// Register copy
    Store,
    /// Function return
    Return,
    /// Unconditional branch
    Branch,
    /// Conditional branch
    BranchIfZero,
}

impl IrInstruction {
    /// Operation tag, without operands
    pub fn op(&self) -> IrOp {
        match self {
            IrInstruction::Add(..) => IrOp::Add,
            IrInstruction::Sub(..) => IrOp::Sub,
            IrInstruction::Mul(..) => IrOp::Mul,
            IrInstruction::Div(..) => IrOp::Div,
            IrInstruction::Load(..) => IrOp::Load,
            IrInstruction::Store(..) => IrOp::Store,
            IrInstruction::Return(_) => IrOp::Return,
            IrInstruction::Branch(_) => IrOp::Branch,
            IrInstruction::BranchIfZero(..) => IrOp::BranchIfZero,
        }
    }

    /// Register written by the instruction, if any
    pub fn dst(&self) -> Option<IrReg> {
        match self {
            IrInstruction::Add(dst, ..)
            | IrInstruction::Sub(dst, ..)
            | IrInstruction::Mul(dst, ..)
            | IrInstruction::Div(dst, ..)
            | IrInstruction::Load(dst, _)
            | IrInstruction::Store(dst, _) => Some(*dst),
            _ => None,
        }
    }

    /// Block targeted by a branch
    pub fn target(&self) -> Option<BlockId> {
        match self {
            IrInstruction::Branch(target) | IrInstruction::BranchIfZero(_, target) => {
                Some(*target)
            }
            _ => None,
        }
    }

    /// Rewrite the target of a branch; other instructions are unchanged
    pub(crate) fn retarget(&mut self, block: BlockId) {
        match self {
            IrInstruction::Branch(target) | IrInstruction::BranchIfZero(_, target) => {
                *target = block
            }
            _ => {}
        }
    }

    /// True for instructions after which control never falls through
    pub fn is_terminator(&self) -> bool {
        matches!(self, IrInstruction::Return(_) | IrInstruction::Branch(_))
    }
}

impl fmt::Display for IrInstruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IrInstruction::Add(dst, a, b) => write!(f, "{} = {} + {}", dst, a, b),
            IrInstruction::Sub(dst, a, b) => write!(f, "{} = {} - {}", dst, a, b),
            IrInstruction::Mul(dst, a, b) => write!(f, "{} = {} * {}", dst, a, b),
            IrInstruction::Div(dst, a, b) => write!(f, "{} = {} / {}", dst, a, b),
            IrInstruction::Load(dst, value) => write!(f, "{} = {}", dst, value),
            IrInstruction::Store(dst, src) => write!(f, "{} <- {}", dst, src),
            IrInstruction::Return(reg) => write!(f, "return {}", reg),
            IrInstruction::Branch(target) => write!(f, "jump {}", target),
            IrInstruction::BranchIfZero(cond, target) => {
                write!(f, "jump_if_zero {}, {}", cond, target)
            }
        }
    }
}
