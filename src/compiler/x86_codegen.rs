//! x86-64 code generation (AT&T syntax, System V)
//!
//! Every virtual register owns an 8-byte stack slot below `%rbp`; `%eax` is
//! the only scratch register. Values are 32-bit, so arithmetic uses the
//! `l`-suffixed instructions.

use super::ir::{BlockId, IrFunction, IrInstruction, IrModule, IrReg};
use crate::error::Result;
use std::fmt::Write;

/// Bytes reserved per virtual register
pub const SLOT_SIZE: u32 = 8;

/// Stack alignment required at call boundaries
pub const STACK_ALIGN: u32 = 16;

/// Frame offset of a register's slot relative to `%rbp`
pub fn slot_offset(reg: IrReg) -> i64 {
    -(i64::from(reg.0) * i64::from(SLOT_SIZE) + i64::from(SLOT_SIZE))
}

/// Frame size for a function, one slot per register rounded up to 16
pub fn frame_size(func: &IrFunction) -> u32 {
    let raw = func.register_count() * SLOT_SIZE;
    raw.div_ceil(STACK_ALIGN) * STACK_ALIGN
}

/// Label placed before a block
pub fn block_label(func: &str, block: BlockId) -> String {
    format!(".L{}_bb{}", func, block.0)
}

/// Label of a function's shared epilogue
pub fn epilogue_label(func: &str) -> String {
    format!(".L{}_epilogue", func)
}

/// x86-64 code generator that renders an [`IrModule`] as assembly text
#[derive(Debug, Default)]
pub struct X86Codegen {
    out: String,
}

impl X86Codegen {
    /// Create a code generator with an empty listing
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the whole module
    pub fn generate(mut self, module: &IrModule) -> Result<String> {
        writeln!(self.out, "    .text")?;
        for func in &module.functions {
            self.emit_function(func)?;
        }
        writeln!(self.out, "    .section .note.GNU-stack,\"\",@progbits")?;

        tracing::debug!(bytes = self.out.len(), "emitted assembly");
        Ok(self.out)
    }

    fn emit_function(&mut self, func: &IrFunction) -> Result<()> {
        let name = &func.name;
        let frame = frame_size(func);

        // Prologue
        writeln!(self.out)?;
        writeln!(self.out, "    .globl {}", name)?;
        writeln!(self.out, "{}:", name)?;
        writeln!(self.out, "    pushq %rbp")?;
        writeln!(self.out, "    movq %rsp, %rbp")?;
        writeln!(self.out, "    subq ${}, %rsp", frame)?;

        for (index, block) in func.blocks.iter().enumerate() {
            writeln!(self.out, "{}:", block_label(name, BlockId(index)))?;
            for instr in &block.instructions {
                self.emit_instruction(name, instr)?;
            }
        }

        // Epilogue
        writeln!(self.out, "{}:", epilogue_label(name))?;
        writeln!(self.out, "    movq %rbp, %rsp")?;
        writeln!(self.out, "    popq %rbp")?;
        writeln!(self.out, "    ret")?;
        Ok(())
    }

    fn emit_instruction(&mut self, func: &str, instr: &IrInstruction) -> Result<()> {
        match *instr {
            IrInstruction::Add(dst, a, b) => self.emit_arith("addl", dst, a, b),
            IrInstruction::Sub(dst, a, b) => self.emit_arith("subl", dst, a, b),
            IrInstruction::Mul(dst, a, b) => self.emit_arith("imull", dst, a, b),
            IrInstruction::Div(dst, a, b) => {
                writeln!(self.out, "    movl {}(%rbp), %eax", slot_offset(a))?;
                writeln!(self.out, "    cltd")?;
                writeln!(self.out, "    idivl {}(%rbp)", slot_offset(b))?;
                writeln!(self.out, "    movl %eax, {}(%rbp)", slot_offset(dst))?;
                Ok(())
            }
            IrInstruction::Load(dst, value) => {
                writeln!(self.out, "    movl ${}, {}(%rbp)", value, slot_offset(dst))?;
                Ok(())
            }
            IrInstruction::Store(dst, src) => {
                writeln!(self.out, "    movl {}(%rbp), %eax", slot_offset(src))?;
                writeln!(self.out, "    movl %eax, {}(%rbp)", slot_offset(dst))?;
                Ok(())
            }
            IrInstruction::Return(reg) => {
                writeln!(self.out, "    movl {}(%rbp), %eax", slot_offset(reg))?;
                writeln!(self.out, "    jmp {}", epilogue_label(func))?;
                Ok(())
            }
            IrInstruction::Branch(target) => {
                writeln!(self.out, "    jmp {}", block_label(func, target))?;
                Ok(())
            }
            IrInstruction::BranchIfZero(cond, target) => {
                writeln!(self.out, "    movl {}(%rbp), %eax", slot_offset(cond))?;
                writeln!(self.out, "    testl %eax, %eax")?;
                writeln!(self.out, "    je {}", block_label(func, target))?;
                Ok(())
            }
        }
    }

    /// `dst = a op b` through `%eax`
    fn emit_arith(&mut self, mnemonic: &str, dst: IrReg, a: IrReg, b: IrReg) -> Result<()> {
        writeln!(self.out, "    movl {}(%rbp), %eax", slot_offset(a))?;
        writeln!(self.out, "    {} {}(%rbp), %eax", mnemonic, slot_offset(b))?;
        writeln!(self.out, "    movl %eax, {}(%rbp)", slot_offset(dst))?;
        Ok(())
    }
}

/// Render a module as assembly text
pub fn generate(module: &IrModule) -> Result<String> {
    X86Codegen::new().generate(module)
}
