//! Debug utilities for minic compilation
//!
//! Human-readable renderings of every intermediate artifact. All of them are
//! deterministic: the same input always renders to the same text.

use super::ir::{BlockId, IrFunction, IrInstruction, IrModule, IrOp};
use crate::error::Result;
use crate::lexer::Token;
use crate::parser::{Ast, Literal, Node, NodeId};
use serde::Serialize;

const INDENT: &str = "    ";

/// Format the token stream, one token per line with its position
pub fn format_tokens(tokens: &[Token]) -> String {
    let mut out = format!("Tokens: {}\n", tokens.len());
    for token in tokens {
        out.push_str(&format!("{:>4}:{:<4} {}", token.line, token.column, token.kind));
        if let Some(text) = &token.text {
            out.push_str(&format!(" '{}'", text));
        }
        out.push('\n');
    }
    out
}

/// Format the AST as an indented tree rooted at the translation unit
pub fn format_ast(ast: &Ast) -> String {
    let mut out = String::new();
    if let Some(root) = ast.root() {
        format_node(ast, root, 0, &mut out);
    }
    out
}

fn format_node(ast: &Ast, id: NodeId, depth: usize, out: &mut String) {
    out.push_str(&INDENT.repeat(depth));
    let node = &ast[id];
    match node {
        Node::TranslationUnit { .. } => out.push_str("Translation Unit"),
        Node::Function {
            name, return_type, ..
        } => {
            out.push_str(&format!("Function: [name= {}, return_type= {}]", name, return_type));
        }
        Node::Compound { .. } => out.push_str("Compound"),
        Node::VarDecl {
            name,
            declared_type,
            ..
        } => {
            out.push_str(&format!("Var Declaration: [type= {}, name= {}]", declared_type, name));
        }
        Node::If { if_false, .. } => {
            if if_false.is_some() {
                out.push_str("If: [cond, true, false]");
            } else {
                out.push_str("If: [cond, true]");
            }
        }
        Node::While { .. } => out.push_str("While: [cond, body]"),
        Node::Return { .. } => out.push_str("Return"),
        Node::Binary { op, .. } => {
            out.push_str(&format!("Binary: [op= {}]", op));
        }
        Node::Literal(literal) => {
            out.push_str(&format!("Literal: [type= {}, value= {}]", literal_type(literal), literal));
        }
        Node::Identifier { name } => {
            out.push_str(&format!("Identifier: [name= {}]", name));
        }
    }
    out.push('\n');

    for child in node.children() {
        format_node(ast, child, depth + 1, out);
    }
}

fn literal_type(literal: &Literal) -> &'static str {
    match literal {
        Literal::Int(_) => "int",
        Literal::Float(_) => "float",
    }
}

/// Format every arena node in allocation order, children by id
pub fn format_nodes(ast: &Ast) -> String {
    let mut out = String::new();
    for (id, node) in ast.iter() {
        out.push_str(&format!("{} {}", id, node.kind_name()));
        match node {
            Node::Function {
                name, return_type, ..
            } => {
                out.push_str(&format!(" name={} return_type={}", name, return_type));
            }
            Node::VarDecl {
                name,
                declared_type,
                ..
            } => {
                out.push_str(&format!(" name={} type={}", name, declared_type));
            }
            Node::Binary { op, .. } => {
                out.push_str(&format!(" op={}", op));
            }
            Node::Literal(literal) => {
                out.push_str(&format!(" value={}", literal));
            }
            Node::Identifier { name } => {
                out.push_str(&format!(" name={}", name));
            }
            _ => {}
        }

        let children = node.children();
        if !children.is_empty() {
            let ids: Vec<String> = children.iter().map(ToString::to_string).collect();
            out.push_str(&format!(" -> [{}]", ids.join(", ")));
        }
        out.push('\n');
    }
    out
}

/// Format a single IR instruction
pub fn format_ir_instr(instr: &IrInstruction) -> String {
    format!("{:<6} {}", op_mnemonic(instr.op()), instr)
}

fn op_mnemonic(op: IrOp) -> &'static str {
    match op {
        IrOp::Add => "ADD",
        IrOp::Sub => "SUB",
        IrOp::Mul => "MUL",
        IrOp::Div => "DIV",
        IrOp::Load => "LOAD",
        IrOp::Store => "STORE",
        IrOp::Return => "RET",
        IrOp::Branch => "BR",
        IrOp::BranchIfZero => "BRZ",
    }
}

/// Format one IR function with its blocks
pub fn format_ir_function(func: &IrFunction) -> String {
    let mut out = format!(
        "{}: ({} registers, {} blocks)\n",
        func.name,
        func.register_count(),
        func.blocks.len()
    );
    for (index, block) in func.blocks.iter().enumerate() {
        out.push_str(&format!("  {}:\n", BlockId(index)));
        for instr in &block.instructions {
            out.push_str(&format!("{}{}\n", INDENT, format_ir_instr(instr)));
        }
    }
    out
}

/// Format a whole IR module
pub fn format_ir(module: &IrModule) -> String {
    module
        .functions
        .iter()
        .map(format_ir_function)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Structured JSON dump of any serializable artifact
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
