use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

use crate::error::{Error, Result};

/// Index of a node inside an [`Ast`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Declarable types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeName {
    /// 32-bit signed integer
    Int,
    /// Floating point (parsed, never lowered)
    Float,
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeName::Int => write!(f, "int"),
            TypeName::Float => write!(f, "float"),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Addition operator (+)
    Add,
    /// Subtraction operator (-)
    Sub,
    /// Multiplication operator (*)
    Mul,
    /// Division operator (/)
    Div,
    /// Power operator (^)
    Pow,
    /// Assignment (=), only produced by assignment statements
    Assign,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Pow => write!(f, "^"),
            BinaryOp::Assign => write!(f, "="),
        }
    }
}

/// Literal values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Integer literal
    Int(i32),
    /// Floating-point literal
    Float(f64),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Float(x) => write!(f, "{:?}", x),
        }
    }
}

/// AST nodes
///
/// Children are referenced by [`NodeId`] and always live earlier in the
/// arena than their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Root of a source file
    TranslationUnit {
        /// Functions and (rejected later) globals, in source order
        declarations: Vec<NodeId>,
    },

    /// Function definition
    Function {
        /// Function name
        name: String,
        /// Declared return type
        return_type: TypeName,
        /// Body, a `Compound` when produced by the parser
        body: NodeId,
    },

    /// Braced statement list
    Compound {
        /// Statements in source order
        statements: Vec<NodeId>,
    },

    /// Variable declaration: `int x = expr;`
    VarDecl {
        /// Variable name
        name: String,
        /// Declared type
        declared_type: TypeName,
        /// Optional initializer expression
        initializer: Option<NodeId>,
    },

    /// If statement
    If {
        /// Condition expression
        cond: NodeId,
        /// Compound taken when the condition is non-zero
        if_true: NodeId,
        /// Optional `else` arm, a Compound or another If
        if_false: Option<NodeId>,
    },

    /// While loop
    While {
        /// Loop condition, re-evaluated before every iteration
        cond: NodeId,
        /// Loop body
        body: NodeId,
    },

    /// Return statement
    Return {
        /// Returned value
        expr: NodeId,
    },

    /// Binary expression, or an assignment when `op` is `Assign`
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        lhs: NodeId,
        /// Right operand
        rhs: NodeId,
    },

    /// Literal value
    Literal(Literal),

    /// Variable reference
    Identifier {
        /// Variable name
        name: String,
    },
}

impl Node {
    /// Short tag naming the node variant
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::TranslationUnit { .. } => "TranslationUnit",
            Node::Function { .. } => "Function",
            Node::Compound { .. } => "Compound",
            Node::VarDecl { .. } => "VarDecl",
            Node::If { .. } => "If",
            Node::While { .. } => "While",
            Node::Return { .. } => "Return",
            Node::Binary { .. } => "Binary",
            Node::Literal(_) => "Literal",
            Node::Identifier { .. } => "Identifier",
        }
    }

    /// Direct children in evaluation order
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Node::TranslationUnit { declarations } => declarations.clone(),
            Node::Function { body, .. } => vec![*body],
            Node::Compound { statements } => statements.clone(),
            Node::VarDecl { initializer, .. } => initializer.iter().copied().collect(),
            Node::If {
                cond,
                if_true,
                if_false,
            } => {
                let mut children = vec![*cond, *if_true];
                children.extend(if_false.iter().copied());
                children
            }
            Node::While { cond, body } => vec![*cond, *body],
            Node::Return { expr } => vec![*expr],
            Node::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            Node::Literal(_) | Node::Identifier { .. } => Vec::new(),
        }
    }
}

/// Arena owning every node of one compilation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ast {
    nodes: Vec<Node>,
    limit: Option<usize>,
    root: Option<NodeId>,
}

impl Ast {
    /// Creates an empty, unbounded arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty arena that refuses to grow past `limit` nodes
    pub fn with_limit(limit: usize) -> Self {
        Ast {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Appends a node and returns its id
    ///
    /// Children must already be in the arena, so every child id is lower
    /// than its parent's.
    pub fn push(&mut self, node: Node) -> Result<NodeId> {
        if let Some(limit) = self.limit {
            if self.nodes.len() >= limit {
                return Err(Error::NodeLimitExceeded { limit });
            }
        }
        if let Some(child) = node
            .children()
            .into_iter()
            .find(|child| child.index() >= self.nodes.len())
        {
            return Err(Error::DanglingNode { child: child.0 });
        }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        Ok(id)
    }

    /// Look up a node
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no node has been pushed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The translation unit, once parsing has finished
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Mark the translation unit
    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Nodes in allocation order with their ids
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_index() {
        let mut ast = Ast::new();
        let one = ast.push(Node::Literal(Literal::Int(1))).unwrap();
        let x = ast
            .push(Node::Identifier {
                name: "x".to_string(),
            })
            .unwrap();
        let sum = ast
            .push(Node::Binary {
                op: BinaryOp::Add,
                lhs: x,
                rhs: one,
            })
            .unwrap();

        assert_eq!(ast.len(), 3);
        assert_eq!(ast[one], Node::Literal(Literal::Int(1)));
        assert_eq!(ast[sum].children(), vec![x, one]);
        assert_eq!(ast[sum].kind_name(), "Binary");
        assert!(ast.get(NodeId(3)).is_none());
    }

    #[test]
    fn test_node_limit() {
        let mut ast = Ast::with_limit(2);
        ast.push(Node::Literal(Literal::Int(1))).unwrap();
        ast.push(Node::Literal(Literal::Int(2))).unwrap();
        assert_eq!(
            ast.push(Node::Literal(Literal::Int(3))),
            Err(Error::NodeLimitExceeded { limit: 2 })
        );
        assert_eq!(ast.len(), 2);
    }

    #[test]
    fn test_push_rejects_forward_child() {
        let mut ast = Ast::new();
        let one = ast.push(Node::Literal(Literal::Int(1))).unwrap();
        assert_eq!(
            ast.push(Node::Return { expr: NodeId(5) }),
            Err(Error::DanglingNode { child: 5 })
        );
        assert_eq!(
            ast.push(Node::Binary {
                op: BinaryOp::Add,
                lhs: one,
                rhs: NodeId(1),
            }),
            Err(Error::DanglingNode { child: 1 })
        );
        assert_eq!(ast.len(), 1);
    }

    #[test]
    fn test_if_children_include_else() {
        let node = Node::If {
            cond: NodeId(0),
            if_true: NodeId(1),
            if_false: Some(NodeId(2)),
        };
        assert_eq!(node.children(), vec![NodeId(0), NodeId(1), NodeId(2)]);
    }
}
