//! # Intermediate Representation (IR) for minic
//!
//! Functions are lowered to a control-flow graph of basic blocks holding
//! three-address instructions over an unbounded supply of virtual registers.
//! The x86-64 backend gives every register its own stack slot.
//!
//! ## Module Structure
//!
//! ```text
//! ir/
//! ├── mod.rs          # This file - module definition and re-exports
//! ├── instruction.rs  # IrReg, BlockId, IrInstruction, IrOp
//! ├── program.rs      # IrBlock, IrFunction, IrModule
//! ├── scope.rs        # ScopeStack for lexically scoped locals
//! ├── builder.rs      # FunctionBuilder with forward-reference labels
//! └── generator.rs    # IrGenerator lowering the AST arena
//! ```

mod builder;
mod generator;
mod instruction;
mod program;
mod scope;

pub use builder::{FunctionBuilder, Label};
pub use generator::{generate, IrGenerator};
pub use instruction::{BlockId, IrInstruction, IrOp, IrReg};
pub use program::{IrBlock, IrFunction, IrModule};
pub use scope::{Local, ScopeStack};
