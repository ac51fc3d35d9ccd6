//! # minic - A Small C-Like Language Compiled to x86-64
//!
//! A batch, single-pass compiler for a tiny C subset: `int` locals,
//! arithmetic, assignment, `if`/`else`, `while` and `return`, inside
//! parameterless functions. The output is textual x86-64 assembly in AT&T
//! syntax for the System V AMD64 ABI, ready for `as`/`cc`.
//!
//! ## Quick Start
//!
//! ```rust
//! use minic::{CompileOptions, Compiler};
//!
//! # fn main() -> minic::Result<()> {
//! let source = r#"
//!     int main() {
//!         int x = 2;
//!         int y = 3;
//!         return x + y;
//!     }
//! "#;
//!
//! let compiler = Compiler::new(CompileOptions::default());
//! let output = compiler.compile(source)?;
//!
//! assert!(output.assembly.contains(".globl main"));
//! assert!(output.assembly.contains("addl"));
//! # Ok(())
//! # }
//! ```
//!
//! ### Running the stages by hand
//!
//! ```rust
//! use minic::{IrGenerator, Parser, Scanner, X86Codegen};
//!
//! # fn main() -> minic::Result<()> {
//! let tokens = Scanner::new("int main() { return 42; }").scan_tokens()?;
//! let ast = Parser::new(tokens).parse()?;
//! let ir = IrGenerator::new(&ast).generate()?;
//! let asm = X86Codegen::new().generate(&ir)?;
//!
//! assert!(asm.contains("movl $42"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Language Overview
//!
//! - **Types**: `int` (32-bit); `float` is recognized but rejected by the backend
//! - **Operators**: `+ - * /` with the usual precedence, `=` as a statement
//! - **Control Flow**: `if (c) { } else if (d) { } else { }`, `while (c) { }`
//! - **Comments**: `// line` and `/* block */`
//!
//! A condition is true when it is non-zero.
//!
//! ## Architecture
//!
//! ```text
//! Source → Lexer → Tokens → Parser → AST arena → IR Generator → IR → x86 Codegen → Assembly
//! ```
//!
//! - [`lexer`] - tokenization with line/column tracking
//! - [`parser`] - recursive descent with precedence climbing into an [`Ast`] arena
//! - [`compiler::ir`] - basic blocks of virtual-register three-address code
//! - [`compiler::x86_codegen`] - stack-slot x86-64 emission
//!
//! ## Error Handling
//!
//! Every stage returns [`Result`]; the first error stops compilation.
//!
//! ```rust
//! use minic::{CompileOptions, Compiler, Error};
//!
//! let compiler = Compiler::new(CompileOptions::default());
//! match compiler.compile("int main() { return y; }") {
//!     Err(Error::UndefinedVariable { name }) => assert_eq!(name, "y"),
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```
//!
//! ## Logging
//!
//! Stage summaries and suspicious-but-legal input are reported through
//! [`tracing`]. The library never installs a subscriber.

#![warn(missing_docs)]

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod parser;

// Re-export main types
pub use compiler::{CompileOptions, CompileOutput, Compiler, DumpFlags};
pub use compiler::{IrGenerator, IrModule, X86Codegen};
pub use error::{Error, ErrorCategory, Result};
pub use lexer::{Scanner, Token, TokenKind};
pub use parser::{Ast, Node, NodeId, Parser};
