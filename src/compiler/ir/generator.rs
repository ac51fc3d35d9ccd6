//! IR Generator - lowers the AST to basic blocks of virtual-register code
//!
//! Every function gets its own [`FunctionBuilder`]. Expressions evaluate into
//! fresh registers, locals are bound to a register when declared and resolved
//! through the builder's scope stack, and control flow splits the function
//! into positional blocks.
//!
//! ## Control-flow shapes
//!
//! | Statement | Blocks appended |
//! |-----------|-----------------|
//! | `if` | true arm, merge |
//! | `if`/`else` | true arm, false arm, merge |
//! | `while` | header, body, exit |

use super::builder::FunctionBuilder;
use super::instruction::{IrInstruction, IrReg};
use super::program::{IrFunction, IrModule};
use crate::error::{Error, Result};
use crate::parser::{Ast, BinaryOp, Literal, Node, NodeId, TypeName};

/// IR Generator - transforms the AST arena into an [`IrModule`]
pub struct IrGenerator<'a> {
    ast: &'a Ast,
}

impl<'a> IrGenerator<'a> {
    /// Create a generator over a parsed arena
    pub fn new(ast: &'a Ast) -> Self {
        Self { ast }
    }

    /// Generate IR for every function in the translation unit
    pub fn generate(&self) -> Result<IrModule> {
        let root = self.ast.root().ok_or(Error::EmptyTranslationUnit)?;
        let declarations = match self.node(root)? {
            Node::TranslationUnit { declarations } => declarations,
            other => {
                return Err(Error::UnsupportedStatement {
                    kind: format!("{} as translation unit", other.kind_name()),
                })
            }
        };

        let mut module = IrModule::new();
        for &decl in declarations {
            match self.node(decl)? {
                Node::Function {
                    name,
                    return_type,
                    body,
                } => {
                    if *return_type == TypeName::Float {
                        return Err(Error::UnsupportedFloat {
                            context: format!("return type of '{}'", name),
                        });
                    }
                    module.functions.push(self.generate_function(name, *body)?);
                }
                Node::VarDecl { name, .. } => {
                    return Err(Error::GlobalVariable { name: name.clone() })
                }
                other => {
                    return Err(Error::UnsupportedStatement {
                        kind: format!("top-level {}", other.kind_name()),
                    })
                }
            }
        }

        tracing::debug!(functions = module.functions.len(), "generated IR module");
        Ok(module)
    }

    fn generate_function(&self, name: &str, body: NodeId) -> Result<IrFunction> {
        if !matches!(self.node(body)?, Node::Compound { .. }) {
            return Err(Error::MalformedFunction {
                name: name.to_string(),
            });
        }

        let mut builder = FunctionBuilder::new(name);
        self.generate_statement(&mut builder, body)?;
        let func = builder.finish()?;

        if func.blocks.last().map_or(true, |block| block.falls_through()) {
            tracing::warn!(function = name, "control can reach the end of the function without a return");
        }
        tracing::trace!(
            function = name,
            blocks = func.blocks.len(),
            registers = func.register_count(),
            "lowered function"
        );
        Ok(func)
    }

    fn generate_statement(&self, builder: &mut FunctionBuilder, id: NodeId) -> Result<()> {
        match self.node(id)? {
            Node::VarDecl {
                name,
                declared_type,
                initializer,
            } => {
                if *declared_type == TypeName::Float {
                    return Err(Error::UnsupportedFloat {
                        context: format!("declaration of '{}'", name),
                    });
                }

                // The name is visible from here on, including in its own initializer
                let reg = builder.alloc_reg();
                builder.declare(name, reg);
                if let Some(init) = initializer {
                    let value = self.generate_expr(builder, *init)?;
                    builder.emit(IrInstruction::Store(reg, value));
                }
                Ok(())
            }

            Node::Binary {
                op: BinaryOp::Assign,
                lhs,
                rhs,
            } => {
                let name = match self.node(*lhs)? {
                    Node::Identifier { name } => name,
                    other => {
                        return Err(Error::UnsupportedStatement {
                            kind: format!("assignment to {}", other.kind_name()),
                        })
                    }
                };
                let reg = self.resolve(builder, name)?;
                let value = self.generate_expr(builder, *rhs)?;
                builder.emit(IrInstruction::Store(reg, value));
                Ok(())
            }

            Node::Return { expr } => {
                let value = self.generate_expr(builder, *expr)?;
                builder.emit(IrInstruction::Return(value));
                Ok(())
            }

            Node::Compound { statements } => {
                builder.begin_scope();
                for &statement in statements {
                    self.generate_statement(builder, statement)?;
                }
                builder.end_scope();
                Ok(())
            }

            Node::If {
                cond,
                if_true,
                if_false,
            } => {
                let cond_reg = self.generate_expr(builder, *cond)?;
                let false_label = builder.reserve_label();
                builder.emit_branch_if_zero(cond_reg, false_label);

                // True arm
                builder.append_block();
                self.generate_statement(builder, *if_true)?;

                match if_false {
                    None => {
                        builder.emit_branch(false_label);
                        builder.bind_label(false_label);
                    }
                    Some(else_arm) => {
                        let merge_label = builder.reserve_label();
                        builder.emit_branch(merge_label);

                        builder.bind_label(false_label);
                        self.generate_statement(builder, *else_arm)?;

                        // False arm falls through into the merge block
                        builder.bind_label(merge_label);
                    }
                }
                Ok(())
            }

            Node::While { cond, body } => {
                let header_label = builder.reserve_label();
                let exit_label = builder.reserve_label();

                // Loop header
                builder.bind_label(header_label);
                let cond_reg = self.generate_expr(builder, *cond)?;
                builder.emit_branch_if_zero(cond_reg, exit_label);

                // Body
                builder.append_block();
                self.generate_statement(builder, *body)?;
                builder.emit_branch(header_label);

                // End
                builder.bind_label(exit_label);
                Ok(())
            }

            Node::Literal(_) | Node::Identifier { .. } | Node::Binary { .. } => {
                Err(Error::UnsupportedStatement {
                    kind: "expression statement".to_string(),
                })
            }

            other => Err(Error::UnsupportedStatement {
                kind: format!("nested {}", other.kind_name()),
            }),
        }
    }

    fn generate_expr(&self, builder: &mut FunctionBuilder, id: NodeId) -> Result<IrReg> {
        match self.node(id)? {
            Node::Literal(Literal::Int(value)) => {
                let dst = builder.alloc_reg();
                builder.emit(IrInstruction::Load(dst, *value));
                Ok(dst)
            }

            Node::Literal(Literal::Float(_)) => Err(Error::UnsupportedFloat {
                context: "expression".to_string(),
            }),

            Node::Identifier { name } => self.resolve(builder, name),

            Node::Binary { op, lhs, rhs } => {
                let make: fn(IrReg, IrReg, IrReg) -> IrInstruction = match op {
                    BinaryOp::Add => IrInstruction::Add,
                    BinaryOp::Sub => IrInstruction::Sub,
                    BinaryOp::Mul => IrInstruction::Mul,
                    BinaryOp::Div => IrInstruction::Div,
                    BinaryOp::Pow | BinaryOp::Assign => {
                        return Err(Error::UnsupportedOperator { op: op.to_string() })
                    }
                };

                let a = self.generate_expr(builder, *lhs)?;
                let b = self.generate_expr(builder, *rhs)?;
                let dst = builder.alloc_reg();
                builder.emit(make(dst, a, b));
                Ok(dst)
            }

            other => Err(Error::UnsupportedStatement {
                kind: format!("{} used as expression", other.kind_name()),
            }),
        }
    }

    fn node(&self, id: NodeId) -> Result<&'a Node> {
        self.ast
            .get(id)
            .ok_or(Error::DanglingNode { child: id.0 })
    }

    fn resolve(&self, builder: &FunctionBuilder, name: &str) -> Result<IrReg> {
        builder.lookup(name).ok_or_else(|| Error::UndefinedVariable {
            name: name.to_string(),
        })
    }
}

/// Lower a parsed arena to IR
pub fn generate(ast: &Ast) -> Result<IrModule> {
    IrGenerator::new(ast).generate()
}
