//! # minic Compiler - C subset to x86-64 assembly
//!
//! This module drives the whole pipeline and owns the backend stages.
//!
//! ## Architecture
//!
//! ```text
//! Source → Tokens → AST → IR (basic blocks) → x86-64 assembly (AT&T)
//! ```
//!
//! ## Usage
//!
//! ```
//! use minic::compiler::{CompileOptions, Compiler};
//!
//! let compiler = Compiler::new(CompileOptions::default());
//! let output = compiler.compile("int main() { return 6 / 2; }").unwrap();
//! assert!(output.assembly.contains("idivl"));
//! ```

pub mod debug;
pub mod ir;
pub mod x86_codegen;

pub use debug::{format_ast, format_ir, format_nodes, format_tokens, to_json};
pub use ir::{IrFunction, IrGenerator, IrInstruction, IrModule, IrReg};
pub use x86_codegen::X86Codegen;

use crate::error::{Error, Result};
use crate::lexer::{Scanner, Token};
use crate::parser::{Ast, Parser, DEFAULT_MAX_DEPTH};
use std::path::Path;

/// Which intermediate artifacts to render after compiling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpFlags {
    /// Print a per-stage summary
    pub debug: bool,
    /// Print the AST as a tree
    pub ast: bool,
    /// Print the token stream
    pub tokens: bool,
    /// Print the flat arena node listing
    pub nodes: bool,
    /// Print the IR
    pub ir: bool,
    /// Write the assembly file
    pub asm: bool,
}

impl DumpFlags {
    /// True when no flag is set
    pub fn is_empty(&self) -> bool {
        *self == DumpFlags::default()
    }

    /// Flags in command-line spelling, in a fixed order
    pub fn names(&self) -> Vec<&'static str> {
        [
            (self.debug, "-d"),
            (self.ast, "-t"),
            (self.tokens, "-tk"),
            (self.nodes, "-n"),
            (self.ir, "-ir"),
            (self.asm, "-a"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect()
    }
}

/// Compilation options
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Dumps requested by the caller
    pub flags: DumpFlags,
    /// Hard ceiling on AST nodes, unbounded when `None`
    pub node_limit: Option<usize>,
    /// Deepest nesting of blocks, `if` chains and expressions
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            flags: DumpFlags::default(),
            node_limit: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Every artifact produced by one compilation
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// Token stream
    pub tokens: Vec<Token>,
    /// Parsed arena
    pub ast: Ast,
    /// Lowered IR
    pub ir: IrModule,
    /// Assembly listing
    pub assembly: String,
}

impl CompileOutput {
    /// Render the dumps selected by `flags`, in pipeline order
    pub fn render_dumps(&self, flags: &DumpFlags) -> String {
        let mut out = String::new();
        if flags.debug {
            let instructions: usize = self
                .ir
                .functions
                .iter()
                .map(|func| func.instructions().count())
                .sum();
            out.push_str(&format!(
                "tokens: {}, nodes: {}, functions: {}, ir instructions: {}, assembly bytes: {}\n",
                self.tokens.len(),
                self.ast.len(),
                self.ir.functions.len(),
                instructions,
                self.assembly.len()
            ));
        }
        if flags.tokens {
            out.push_str(&format_tokens(&self.tokens));
        }
        if flags.nodes {
            out.push_str(&format_nodes(&self.ast));
        }
        if flags.ast {
            out.push_str(&format_ast(&self.ast));
        }
        if flags.ir {
            out.push_str(&format_ir(&self.ir));
        }
        out
    }
}

/// minic source to x86-64 assembly compiler
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    /// Create a new compiler with options
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Options this compiler runs with
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile source text, stopping at the first error
    pub fn compile(&self, source: &str) -> Result<CompileOutput> {
        // Phase 1: Lex
        let tokens = Scanner::new(source).scan_tokens()?;

        // Phase 2: Parse
        let parser = match self.options.node_limit {
            Some(limit) => Parser::with_node_limit(tokens.clone(), limit),
            None => Parser::new(tokens.clone()),
        };
        let ast = parser.with_max_depth(self.options.max_depth).parse()?;

        // Phase 3: Lower to IR
        let ir = IrGenerator::new(&ast).generate()?;

        // Phase 4: Emit assembly
        let assembly = X86Codegen::new().generate(&ir)?;

        Ok(CompileOutput {
            tokens,
            ast,
            ir,
            assembly,
        })
    }

    /// Read a source file and compile it
    pub fn compile_file(&self, path: &Path) -> Result<CompileOutput> {
        let source = read_source(path)?;
        self.compile(&source)
    }
}

/// Read a whole file and decode it as UTF-8
pub fn read_source(path: &Path) -> Result<String> {
    let display = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|err| Error::io(display.clone(), &err))?;
    String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8 { path: display })
}

/// Default assembly path: the input path with its extension replaced by `s`
pub fn default_output_path(input: &Path) -> std::path::PathBuf {
    input.with_extension("s")
}
