//! minic Parser Module
//!
//! Parses the token stream into an arena-backed Abstract Syntax Tree (AST).

mod ast;
mod descent_parser;

pub use ast::{Ast, BinaryOp, Literal, Node, NodeId, TypeName};
pub use descent_parser::{parse, Parser, DEFAULT_MAX_DEPTH};
