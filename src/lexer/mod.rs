//! Lexical analysis for minic
//!
//! Converts source text into a flat sequence of tokens.

mod scanner;
mod token;

pub use scanner::{classify_numeric, tokenize, NumericKind, Scanner};
pub use token::{Associativity, Token, TokenKind, KEYWORDS};
