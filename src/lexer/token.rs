use serde::{Deserialize, Serialize};

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Lexeme for literals and identifiers, `None` for keywords and punctuation
    pub text: Option<String>,
    /// Line number where token appears (1-indexed)
    pub line: usize,
    /// Column number where token starts (1-indexed)
    pub column: usize,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, text: Option<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            text,
            line,
            column,
        }
    }

    /// Text of the token, empty for keywords and punctuation
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// All possible token types
///
/// The keyword variants come first and in the same order as [`KEYWORDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Keywords
    /// `else`
    Else,
    /// `exit`
    Exit,
    /// `if`
    If,
    /// `int`
    Int,
    /// `float`
    Float,
    /// `return`
    Return,
    /// `void`
    Void,
    /// `while`
    While,

    // Punctuation
    /// `;`
    Semicolon,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `^`
    Caret,
    /// `=`
    Assign,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `,`
    Comma,

    // Literals and names
    /// Integer literal
    IntLiteral,
    /// Floating-point literal
    FloatLiteral,
    /// Identifier
    Identifier,
}

/// Keyword table, indexed in [`TokenKind`] declaration order
pub const KEYWORDS: [(&str, TokenKind); 8] = [
    ("else", TokenKind::Else),
    ("exit", TokenKind::Exit),
    ("if", TokenKind::If),
    ("int", TokenKind::Int),
    ("float", TokenKind::Float),
    ("return", TokenKind::Return),
    ("void", TokenKind::Void),
    ("while", TokenKind::While),
];

/// Operator associativity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// `a - b - c` is `(a - b) - c`
    Left,
    /// `a ^ b ^ c` is `a ^ (b ^ c)`
    Right,
}

impl Associativity {
    /// Amount added to an operator's precedence for its right operand
    pub fn delta(self) -> u8 {
        match self {
            Associativity::Left => 1,
            Associativity::Right => 0,
        }
    }
}

impl TokenKind {
    /// Get keyword from string
    pub fn keyword(s: &str) -> Option<TokenKind> {
        KEYWORDS
            .iter()
            .find(|(word, _)| *word == s)
            .map(|(_, kind)| *kind)
    }

    /// Map a single punctuation character to its token kind
    pub fn punctuation(c: char) -> Option<TokenKind> {
        let kind = match c {
            ';' => TokenKind::Semicolon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '^' => TokenKind::Caret,
            '=' => TokenKind::Assign,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            ',' => TokenKind::Comma,
            _ => return None,
        };
        Some(kind)
    }

    /// Check if token is a keyword
    pub fn is_keyword(&self) -> bool {
        KEYWORDS.iter().any(|(_, kind)| kind == self)
    }

    /// Check if token names a declarable type (`int` or `float`)
    pub fn is_type(&self) -> bool {
        matches!(self, TokenKind::Int | TokenKind::Float)
    }

    /// Check if token is an infix arithmetic operator
    pub fn is_binary_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus | TokenKind::Minus | TokenKind::Star | TokenKind::Slash | TokenKind::Caret
        )
    }

    /// Binding strength of a binary operator, `None` for anything else
    pub fn precedence(&self) -> Option<u8> {
        match self {
            TokenKind::Plus | TokenKind::Minus => Some(0),
            TokenKind::Star | TokenKind::Slash => Some(1),
            TokenKind::Caret => Some(2),
            _ => None,
        }
    }

    /// Associativity of a binary operator, `None` for anything else
    pub fn associativity(&self) -> Option<Associativity> {
        match self {
            TokenKind::Plus | TokenKind::Minus | TokenKind::Star | TokenKind::Slash => {
                Some(Associativity::Left)
            }
            TokenKind::Caret => Some(Associativity::Right),
            _ => None,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            TokenKind::Else => "Else",
            TokenKind::Exit => "Exit",
            TokenKind::If => "If",
            TokenKind::Int => "Int",
            TokenKind::Float => "Float",
            TokenKind::Return => "Return",
            TokenKind::Void => "Void",
            TokenKind::While => "While",
            TokenKind::Semicolon => "';'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Caret => "'^'",
            TokenKind::Assign => "'='",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::IntLiteral => "Int Literal",
            TokenKind::FloatLiteral => "Float Literal",
            TokenKind::Identifier => "Identifier",
        };
        f.write_str(name)
    }
}
