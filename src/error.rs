//! Error types for the minic compiler

use thiserror::Error;

/// Compilation errors
///
/// Every error is fatal: the stage that detects it returns it up the call
/// chain and the whole compilation stops.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // I/O errors
    /// Source file could not be read or output could not be written
    #[error("I/O error on {path}: {message}")]
    Io {
        /// Path of the file involved
        path: String,
        /// Underlying error description
        message: String,
    },

    /// Source file is not valid UTF-8
    #[error("Source file {path} is not valid UTF-8")]
    InvalidUtf8 {
        /// Path of the offending file
        path: String,
    },

    // Lexical errors
    /// Character with no token mapping
    ///
    /// **Triggered by:** any character outside the language's alphabet
    /// **Example:** `10.` (the `.` is left over after the integer)
    #[error("Unexpected character '{ch}' at line {line}, column {column}")]
    UnexpectedCharacter {
        /// The offending character
        ch: char,
        /// Line number (1-indexed)
        line: usize,
        /// Column number (1-indexed)
        column: usize,
    },

    /// A `/*` comment that never reaches `*/`
    #[error("Unterminated block comment starting at line {line}, column {column}")]
    UnterminatedComment {
        /// Line of the opening `/*`
        line: usize,
        /// Column of the opening `/*`
        column: usize,
    },

    // Syntax errors
    /// Token kind mismatch at an expectation point
    ///
    /// **Triggered by:** missing `;`, unmatched `)`, and similar
    /// **Example:** `int x = 1` followed by `}`
    #[error("Expected {expected} got {got} at line {line}, column {column}")]
    UnexpectedToken {
        /// Expected token description
        expected: String,
        /// Actual token received
        got: String,
        /// Line number of the actual token
        line: usize,
        /// Column number of the actual token
        column: usize,
    },

    /// Token stream ran out at an expectation point
    #[error("Expected {expected} got end of input")]
    UnexpectedEof {
        /// Expected token description
        expected: String,
    },

    /// A term was required but the token cannot start one
    #[error("Expected expression got {got} at line {line}, column {column}")]
    ExpectedExpression {
        /// Actual token received
        got: String,
        /// Line number of the actual token
        line: usize,
        /// Column number of the actual token
        column: usize,
    },

    /// Literal token whose text is not a valid number of its kind
    #[error("Invalid numeric literal: {text}")]
    InvalidLiteral {
        /// Literal text as scanned
        text: String,
    },

    /// Parser was handed no tokens at all
    #[error("The token stream is empty, nothing to compile")]
    EmptyTranslationUnit,

    // Semantic errors
    /// Identifier not bound in any enclosing scope
    ///
    /// **Triggered by:** reading or assigning a local before declaring it, or
    /// after the compound that declared it has closed
    #[error("Undefined local variable '{name}'")]
    UndefinedVariable {
        /// Variable name
        name: String,
    },

    /// Floating point value reached a stage that only handles integers
    #[error("Floating point is not supported in {context}, only integers")]
    UnsupportedFloat {
        /// Where the float was found
        context: String,
    },

    /// Binary operator with no IR instruction
    #[error("Unsupported operator for binary op: {op}")]
    UnsupportedOperator {
        /// Operator symbol
        op: String,
    },

    /// Statement shape the IR builder cannot lower
    #[error("Unsupported statement: {kind}")]
    UnsupportedStatement {
        /// Description of the statement
        kind: String,
    },

    /// Function whose body is not a compound statement
    #[error("Function '{name}' body is not a compound statement")]
    MalformedFunction {
        /// Function name
        name: String,
    },

    /// Top-level variable declaration
    #[error("Global variable '{name}' is not supported, declare it inside a function")]
    GlobalVariable {
        /// Variable name
        name: String,
    },

    // Internal/resource errors
    /// The AST arena reached its configured ceiling
    #[error("Node arena overflow (limit: {limit} nodes)")]
    NodeLimitExceeded {
        /// Configured node ceiling
        limit: usize,
    },

    /// Blocks, conditions or parentheses nested past the configured depth
    #[error("Nesting too deep (limit: {limit} levels)")]
    NestingTooDeep {
        /// Configured nesting ceiling
        limit: usize,
    },

    /// A node names a child that is not in the arena yet
    #[error("Node refers to missing child #{child}")]
    DanglingNode {
        /// Offending child index
        child: u32,
    },

    /// A branch refers to a block label that was never placed
    #[error("Unbound block label in function '{function}'")]
    UnboundLabel {
        /// Function being built
        function: String,
    },

    /// Writing assembly text failed
    #[error("Failed to emit assembly: {0}")]
    Emit(#[from] std::fmt::Error),

    /// A structured dump could not be serialized
    #[error("Serialization error: {message}")]
    Serialization {
        /// Serializer error description
        message: String,
    },
}

/// Error category, mirroring the pipeline stage that can raise it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// File missing, unreadable or undecodable
    Io,
    /// Raised by the lexer
    Lexical,
    /// Raised by the parser
    Syntax,
    /// Raised by the IR builder
    Semantic,
    /// Resource exhaustion or a broken internal invariant
    Internal,
}

impl Error {
    /// Create an I/O error for a path
    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Classify the error by the stage that raised it
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Io { .. } | Error::InvalidUtf8 { .. } => ErrorCategory::Io,

            Error::UnexpectedCharacter { .. } | Error::UnterminatedComment { .. } => {
                ErrorCategory::Lexical
            }

            Error::UnexpectedToken { .. }
            | Error::UnexpectedEof { .. }
            | Error::ExpectedExpression { .. }
            | Error::InvalidLiteral { .. }
            | Error::EmptyTranslationUnit => ErrorCategory::Syntax,

            Error::UndefinedVariable { .. }
            | Error::UnsupportedFloat { .. }
            | Error::UnsupportedOperator { .. }
            | Error::UnsupportedStatement { .. }
            | Error::MalformedFunction { .. }
            | Error::GlobalVariable { .. } => ErrorCategory::Semantic,

            Error::NodeLimitExceeded { .. }
            | Error::NestingTooDeep { .. }
            | Error::DanglingNode { .. }
            | Error::UnboundLabel { .. }
            | Error::Emit(_)
            | Error::Serialization { .. } => ErrorCategory::Internal,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type for minic operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let err = Error::UndefinedVariable {
            name: "x".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Semantic);
        assert_eq!(err.to_string(), "Undefined local variable 'x'");

        let err = Error::UnexpectedEof {
            expected: "';'".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Syntax);
        assert_eq!(Error::Emit(std::fmt::Error).category(), ErrorCategory::Internal);
        assert_eq!(
            Error::NestingTooDeep { limit: 8 }.category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn test_io_error_message() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::io("main.c", &io);
        assert_eq!(err.category(), ErrorCategory::Io);
        assert!(err.to_string().contains("main.c"));
    }
}
