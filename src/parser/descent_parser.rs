//! Recursive-descent parser with precedence climbing for expressions

use super::ast::{Ast, BinaryOp, Literal, Node, NodeId, TypeName};
use crate::error::{Error, Result};
use crate::lexer::{classify_numeric, NumericKind, Token, TokenKind};

/// Lowest precedence in the operator table
const MIN_PRECEDENCE: u8 = 0;

/// Nesting ceiling used unless the caller picks another
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Parser turning a token sequence into an [`Ast`]
///
/// Blocks, `if` chains and expressions recurse, so both the recursion depth
/// and the height of the resulting tree are capped by `max_depth`.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    ast: Ast,
    depth: usize,
    max_depth: usize,
    /// Subtree height per arena node
    heights: Vec<usize>,
}

impl Parser {
    /// Creates a new parser from tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_arena(tokens, Ast::new())
    }

    /// Creates a parser whose arena holds at most `limit` nodes
    pub fn with_node_limit(tokens: Vec<Token>, limit: usize) -> Self {
        Self::with_arena(tokens, Ast::with_limit(limit))
    }

    fn with_arena(tokens: Vec<Token>, ast: Ast) -> Self {
        Parser {
            tokens,
            current: 0,
            ast,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            heights: Vec::new(),
        }
    }

    /// Sets the nesting ceiling
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parses the whole token sequence into a translation unit
    pub fn parse(mut self) -> Result<Ast> {
        if self.tokens.is_empty() {
            return Err(Error::EmptyTranslationUnit);
        }

        let mut declarations = Vec::new();
        while !self.is_at_end() {
            declarations.push(self.parse_declaration()?);
        }

        let root = self.push(Node::TranslationUnit { declarations })?;
        self.ast.set_root(root);

        tracing::debug!(nodes = self.ast.len(), "parsed translation unit");
        Ok(self.ast)
    }

    /// `(type) identifier (` starts a function, anything else a declaration
    fn is_function_ahead(&self) -> bool {
        matches!(
            (self.peek_kind(0), self.peek_kind(1), self.peek_kind(2)),
            (Some(kind), Some(TokenKind::Identifier), Some(TokenKind::LeftParen)) if kind.is_type()
        )
    }

    fn parse_declaration(&mut self) -> Result<NodeId> {
        if self.is_function_ahead() {
            self.parse_function()
        } else {
            self.parse_var_decl()
        }
    }

    /// `(type) identifier ( ... ) { statement* }`
    ///
    /// Parameter tokens are skipped, functions take no arguments.
    fn parse_function(&mut self) -> Result<NodeId> {
        let return_type = self.parse_type()?;
        let name = self.expect_identifier()?;
        self.consume(TokenKind::LeftParen)?;

        let mut skipped = 0;
        while !self.is_at_end() && !self.check(TokenKind::RightParen) {
            self.advance();
            skipped += 1;
        }
        if skipped > 0 {
            tracing::warn!(function = %name, tokens = skipped, "ignoring parameter list");
        }
        self.consume(TokenKind::RightParen)?;

        let body = self.parse_compound()?;
        self.push(Node::Function {
            name,
            return_type,
            body,
        })
    }

    fn parse_compound(&mut self) -> Result<NodeId> {
        self.nested(Self::parse_block)
    }

    fn parse_block(&mut self) -> Result<NodeId> {
        self.consume(TokenKind::LeftBrace)?;

        let mut statements = Vec::new();
        let mut returned = false;
        while !self.check(TokenKind::RightBrace) {
            if self.is_at_end() {
                return Err(self.expected_error(&TokenKind::RightBrace.to_string()));
            }

            let statement = self.parse_statement()?;
            if returned {
                tracing::warn!(node = %statement, "unreachable statement after return");
            }
            returned |= matches!(self.ast[statement], Node::Return { .. });
            statements.push(statement);
        }

        self.consume(TokenKind::RightBrace)?;
        self.push(Node::Compound { statements })
    }

    fn parse_statement(&mut self) -> Result<NodeId> {
        match self.peek_kind(0) {
            None => Err(self.expected_error("statement")),
            Some(TokenKind::Int | TokenKind::Float) => self.parse_var_decl(),
            Some(TokenKind::If) => self.parse_if(),
            Some(TokenKind::While) => self.parse_while(),
            Some(TokenKind::Return) => self.parse_return(),
            Some(TokenKind::Identifier) => self.parse_assignment(),
            Some(TokenKind::LeftBrace) => self.parse_compound(),
            Some(_) => {
                let expr = self.parse_expression(MIN_PRECEDENCE)?;
                self.consume(TokenKind::Semicolon)?;
                Ok(expr)
            }
        }
    }

    /// `(type) identifier [= expr]? ;`
    fn parse_var_decl(&mut self) -> Result<NodeId> {
        let declared_type = self.parse_type()?;
        let name = self.expect_identifier()?;

        let initializer = if self.match_kind(TokenKind::Assign) {
            Some(self.parse_expression(MIN_PRECEDENCE)?)
        } else {
            None
        };

        self.consume(TokenKind::Semicolon)?;
        self.push(Node::VarDecl {
            name,
            declared_type,
            initializer,
        })
    }

    fn parse_if(&mut self) -> Result<NodeId> {
        self.nested(Self::parse_if_chain)
    }

    /// `if ( expr ) { ... } [else (if ... | { ... })]?`
    fn parse_if_chain(&mut self) -> Result<NodeId> {
        self.consume(TokenKind::If)?;
        self.consume(TokenKind::LeftParen)?;
        let cond = self.parse_expression(MIN_PRECEDENCE)?;
        self.consume(TokenKind::RightParen)?;
        let if_true = self.parse_compound()?;

        let if_false = if self.match_kind(TokenKind::Else) {
            if self.check(TokenKind::If) {
                Some(self.parse_if()?)
            } else {
                Some(self.parse_compound()?)
            }
        } else {
            None
        };

        self.push(Node::If {
            cond,
            if_true,
            if_false,
        })
    }

    /// `while ( expr ) { ... }`
    fn parse_while(&mut self) -> Result<NodeId> {
        self.consume(TokenKind::While)?;
        self.consume(TokenKind::LeftParen)?;
        let cond = self.parse_expression(MIN_PRECEDENCE)?;
        self.consume(TokenKind::RightParen)?;
        let body = self.parse_compound()?;
        self.push(Node::While { cond, body })
    }

    fn parse_return(&mut self) -> Result<NodeId> {
        self.consume(TokenKind::Return)?;
        let expr = self.parse_expression(MIN_PRECEDENCE)?;
        self.consume(TokenKind::Semicolon)?;
        self.push(Node::Return { expr })
    }

    /// `identifier = expr ;`
    fn parse_assignment(&mut self) -> Result<NodeId> {
        let lhs = self.parse_term()?;
        self.consume(TokenKind::Assign)?;
        let rhs = self.parse_expression(MIN_PRECEDENCE)?;
        self.consume(TokenKind::Semicolon)?;
        self.push(Node::Binary {
            op: BinaryOp::Assign,
            lhs,
            rhs,
        })
    }

    fn parse_expression(&mut self, min_prec: u8) -> Result<NodeId> {
        self.nested(|parser| parser.parse_binary(min_prec))
    }

    /// Precedence climbing
    ///
    /// Folds operators binding at least as tightly as `min_prec`. The right
    /// operand is parsed at `prec + 1` for left-associative operators and at
    /// `prec` for right-associative ones.
    fn parse_binary(&mut self, min_prec: u8) -> Result<NodeId> {
        let mut lhs = self.parse_term()?;

        while let Some(kind) = self.peek_kind(0) {
            let (prec, assoc) = match (kind.precedence(), kind.associativity()) {
                (Some(prec), Some(assoc)) if prec >= min_prec => (prec, assoc),
                _ => break,
            };
            let op = Self::binary_op(kind)?;
            self.advance();

            let rhs = self.parse_expression(prec + assoc.delta())?;
            lhs = self.push(Node::Binary { op, lhs, rhs })?;
        }

        Ok(lhs)
    }

    /// `literal`, `identifier` or `( expr )`
    fn parse_term(&mut self) -> Result<NodeId> {
        let token = match self.peek() {
            Some(token) => token.clone(),
            None => return Err(self.expected_error("expression")),
        };

        match token.kind {
            TokenKind::IntLiteral => {
                self.advance();
                let value = Self::int_literal(token.text())?;
                self.push(Node::Literal(Literal::Int(value)))
            }
            TokenKind::FloatLiteral => {
                self.advance();
                let value = Self::float_literal(token.text())?;
                self.push(Node::Literal(Literal::Float(value)))
            }
            TokenKind::Identifier => {
                self.advance();
                self.push(Node::Identifier {
                    name: token.text().to_string(),
                })
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression(MIN_PRECEDENCE)?;
                self.consume(TokenKind::RightParen)?;
                Ok(expr)
            }
            other => Err(Error::ExpectedExpression {
                got: other.to_string(),
                line: token.line,
                column: token.column,
            }),
        }
    }

    fn parse_type(&mut self) -> Result<TypeName> {
        let type_name = match self.peek_kind(0) {
            Some(TokenKind::Int) => TypeName::Int,
            Some(TokenKind::Float) => TypeName::Float,
            _ => return Err(self.expected_error("type name")),
        };
        self.advance();
        Ok(type_name)
    }

    fn int_literal(text: &str) -> Result<i32> {
        let invalid = || Error::InvalidLiteral {
            text: text.to_string(),
        };
        if classify_numeric(text) != Some(NumericKind::Int) {
            return Err(invalid());
        }
        text.parse::<i32>().map_err(|_| invalid())
    }

    fn float_literal(text: &str) -> Result<f64> {
        let invalid = || Error::InvalidLiteral {
            text: text.to_string(),
        };
        if classify_numeric(text) != Some(NumericKind::Float) {
            return Err(invalid());
        }
        text.parse::<f64>().map_err(|_| invalid())
    }

    fn binary_op(kind: TokenKind) -> Result<BinaryOp> {
        match kind {
            TokenKind::Plus => Ok(BinaryOp::Add),
            TokenKind::Minus => Ok(BinaryOp::Sub),
            TokenKind::Star => Ok(BinaryOp::Mul),
            TokenKind::Slash => Ok(BinaryOp::Div),
            TokenKind::Caret => Ok(BinaryOp::Pow),
            other => Err(Error::UnsupportedOperator {
                op: other.to_string(),
            }),
        }
    }

    // Helper methods

    /// Runs one level of recursive descent under the nesting ceiling
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.max_depth {
            return Err(Error::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Left-leaning chains such as `1 + 2 + ...` are parsed iteratively, so
    /// the tree height is checked separately from the recursion depth
    fn push(&mut self, node: Node) -> Result<NodeId> {
        let height = 1 + node
            .children()
            .iter()
            .filter_map(|child| self.heights.get(child.index()))
            .max()
            .copied()
            .unwrap_or(0);
        if height > self.max_depth {
            return Err(Error::NestingTooDeep {
                limit: self.max_depth,
            });
        }

        let id = self.ast.push(node)?;
        self.heights.push(height);
        Ok(id)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.current + offset).map(|t| t.kind)
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind(0) == Some(kind)
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind) -> Result<()> {
        if self.match_kind(kind) {
            Ok(())
        } else {
            Err(self.expected_error(&kind.to_string()))
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Identifier => {
                let name = token.text().to_string();
                self.advance();
                Ok(name)
            }
            _ => Err(self.expected_error(&TokenKind::Identifier.to_string())),
        }
    }

    /// Helper to create an expected/got error at the current position
    fn expected_error(&self, expected: &str) -> Error {
        match self.peek() {
            Some(token) => Error::UnexpectedToken {
                expected: expected.to_string(),
                got: token.kind.to_string(),
                line: token.line,
                column: token.column,
            },
            None => Error::UnexpectedEof {
                expected: expected.to_string(),
            },
        }
    }
}

/// Parse a token sequence into an unbounded arena
pub fn parse(tokens: Vec<Token>) -> Result<Ast> {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_source(source: &str) -> Result<Ast> {
        parse(tokenize(source)?)
    }

    /// Id of the first return statement's expression
    fn return_expr(ast: &Ast) -> NodeId {
        let (_, node) = ast
            .iter()
            .find(|(_, node)| matches!(node, Node::Return { .. }))
            .unwrap();
        match node {
            Node::Return { expr } => *expr,
            _ => unreachable!(),
        }
    }

    fn render(ast: &Ast, id: NodeId) -> String {
        match &ast[id] {
            Node::Binary { op, lhs, rhs } => {
                format!("({} {} {})", op, render(ast, *lhs), render(ast, *rhs))
            }
            Node::Literal(lit) => lit.to_string(),
            Node::Identifier { name } => name.clone(),
            other => other.kind_name().to_string(),
        }
    }

    fn expr(source: &str) -> String {
        let ast = parse_source(&format!("int main() {{ return {}; }}", source)).unwrap();
        render(&ast, return_expr(&ast))
    }

    #[test]
    fn test_precedence() {
        assert_eq!(expr("1+2*3"), "(+ 1 (* 2 3))");
        assert_eq!(expr("1*2+3"), "(+ (* 1 2) 3)");
        assert_eq!(expr("(1+2)*3"), "(* (+ 1 2) 3)");
    }

    #[test]
    fn test_associativity() {
        assert_eq!(expr("2^3^2"), "(^ 2 (^ 3 2))");
        assert_eq!(expr("8-4-2"), "(- (- 8 4) 2)");
        assert_eq!(expr("8/4/2"), "(/ (/ 8 4) 2)");
    }

    #[test]
    fn test_function_shape() {
        let ast = parse_source("int main() { int x = 1; return x; }").unwrap();
        let root = ast.root().unwrap();
        let declarations = match &ast[root] {
            Node::TranslationUnit { declarations } => declarations.clone(),
            other => panic!("unexpected root {:?}", other),
        };
        assert_eq!(declarations.len(), 1);

        match &ast[declarations[0]] {
            Node::Function {
                name,
                return_type,
                body,
            } => {
                assert_eq!(name, "main");
                assert_eq!(*return_type, TypeName::Int);
                assert_eq!(ast[*body].children().len(), 2);
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_parameters_skipped() {
        let ast = parse_source("int f(int a, int b) { return 1; }").unwrap();
        assert!(ast
            .iter()
            .all(|(_, node)| !matches!(node, Node::VarDecl { .. })));
    }

    #[test]
    fn test_global_declaration_parses() {
        let ast = parse_source("int g = 4; float h;").unwrap();
        let decls: Vec<_> = ast
            .iter()
            .filter(|(_, node)| matches!(node, Node::VarDecl { .. }))
            .collect();
        assert_eq!(decls.len(), 2);
    }

    #[test]
    fn test_if_else_chain() {
        let ast = parse_source(
            "int main() { if (a) { b = 1; } else if (c) { b = 2; } else { b = 3; } return b; }",
        )
        .unwrap();
        let ifs = ast
            .iter()
            .filter(|(_, node)| matches!(node, Node::If { .. }))
            .count();
        assert_eq!(ifs, 2);
    }

    #[test]
    fn test_assignment_is_binary_assign() {
        let ast = parse_source("int main() { x = 1 + 2; return x; }").unwrap();
        assert!(ast.iter().any(|(_, node)| matches!(
            node,
            Node::Binary {
                op: BinaryOp::Assign,
                ..
            }
        )));
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse_source("int main() { return 1 }").unwrap_err();
        assert_eq!(
            err,
            Error::UnexpectedToken {
                expected: "';'".to_string(),
                got: "'}'".to_string(),
                line: 1,
                column: 23,
            }
        );
        assert_eq!(
            err.to_string(),
            "Expected ';' got '}' at line 1, column 23"
        );
    }

    #[test]
    fn test_unexpected_eof() {
        assert_eq!(
            parse_source("int main() { return 1;").unwrap_err(),
            Error::UnexpectedEof {
                expected: "'}'".to_string()
            }
        );
    }

    #[test]
    fn test_expected_expression() {
        assert!(matches!(
            parse_source("int main() { return ; }"),
            Err(Error::ExpectedExpression { .. })
        ));
    }

    #[test]
    fn test_bare_expression_statement_needs_semicolon() {
        assert!(parse_source("int main() { 1 + 2; return 0; }").is_ok());
        assert!(matches!(
            parse_source("int main() { 1 + 2 return 0; }"),
            Err(Error::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_int_literal_overflow() {
        assert_eq!(
            parse_source("int main() { return 99999999999; }").unwrap_err(),
            Error::InvalidLiteral {
                text: "99999999999".to_string()
            }
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(Vec::new()).unwrap_err(), Error::EmptyTranslationUnit);
    }

    #[test]
    fn test_node_limit() {
        let tokens = tokenize("int main() { return 1 + 2 + 3; }").unwrap();
        assert_eq!(
            Parser::with_node_limit(tokens, 3).parse().unwrap_err(),
            Error::NodeLimitExceeded { limit: 3 }
        );
    }

    #[test]
    fn test_deep_parentheses_rejected() {
        let depth = 100_000;
        let source = format!(
            "int main() {{ return {}1{}; }}",
            "(".repeat(depth),
            ")".repeat(depth)
        );
        assert_eq!(
            parse_source(&source).unwrap_err(),
            Error::NestingTooDeep {
                limit: DEFAULT_MAX_DEPTH
            }
        );
    }

    #[test]
    fn test_deep_blocks_rejected() {
        let depth = 200_000;
        let source = format!(
            "int main() {} return 1; {} }}",
            "{ ".repeat(depth + 1),
            "} ".repeat(depth)
        );
        assert_eq!(
            parse_source(&source).unwrap_err(),
            Error::NestingTooDeep {
                limit: DEFAULT_MAX_DEPTH
            }
        );
    }

    #[test]
    fn test_long_else_if_chain_rejected() {
        let mut source = String::from("int main() { int a = 0; ");
        for _ in 0..10_000 {
            source.push_str("if (a) { a = 1; } else ");
        }
        source.push_str("{ a = 2; } return a; }");
        assert!(matches!(
            parse_source(&source),
            Err(Error::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn test_tree_height_capped_for_flat_chains() {
        let terms = vec!["1"; 50].join(" + ");
        let source = format!("int main() {{ return {}; }}", terms);

        assert!(parse_source(&source).is_ok());
        assert_eq!(
            Parser::new(tokenize(&source).unwrap())
                .with_max_depth(16)
                .parse()
                .unwrap_err(),
            Error::NestingTooDeep { limit: 16 }
        );
    }

    #[test]
    fn test_nesting_within_limit() {
        let source = format!(
            "int main() {{ return {}1{}; }}",
            "(".repeat(100),
            ")".repeat(100)
        );
        let tokens = tokenize(&source).unwrap();
        assert!(Parser::new(tokens.clone()).parse().is_ok());
        assert!(matches!(
            Parser::new(tokens).with_max_depth(50).parse(),
            Err(Error::NestingTooDeep { limit: 50 })
        ));
    }
}
