use super::token::{Token, TokenKind};
use crate::error::{Error, Result};

/// Shape of a well-formed numeric lexeme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    /// Digits only
    Int,
    /// Digits, one interior `.`, digits
    Float,
}

/// Classify a numeric string
///
/// Returns `None` for the empty string, anything containing a non-digit other
/// than a single `.`, and for a `.` in first or last position.
pub fn classify_numeric(text: &str) -> Option<NumericKind> {
    let bytes = text.as_bytes();
    let mut found_decimal = false;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'0'..=b'9' => {}
            b'.' if !found_decimal => {
                if i == 0 || i + 1 == bytes.len() {
                    return None;
                }
                found_decimal = true;
            }
            _ => return None,
        }
    }

    if bytes.is_empty() {
        None
    } else if found_decimal {
        Some(NumericKind::Float)
    } else {
        Some(NumericKind::Int)
    }
}

/// Scanner for minic source text
pub struct Scanner {
    /// Source code as character vector
    source: Vec<char>,
    /// Accumulated tokens
    tokens: Vec<Token>,
    /// Start position of current token
    start: usize,
    /// Current position in source
    current: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
    /// Position of the current token's first character
    start_line: usize,
    start_column: usize,
}

impl Scanner {
    /// Creates a new scanner over source code
    pub fn new(source: &str) -> Self {
        Scanner {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
        }
    }

    /// Scans all tokens from source code
    ///
    /// The scanner is consumed: a token sequence is produced once per buffer.
    pub fn scan_tokens(mut self) -> Result<Vec<Token>> {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_line = self.line;
            self.start_column = self.column;
            self.scan_token()?;
        }

        tracing::debug!(tokens = self.tokens.len(), "scanned source");
        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<()> {
        let c = self.advance();

        match c {
            ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c' => {}

            '/' => {
                if self.match_char('/') {
                    self.skip_line_comment();
                } else if self.match_char('*') {
                    self.skip_block_comment()?;
                } else {
                    self.add_token(TokenKind::Slash, None);
                }
            }

            c if c.is_ascii_digit() => self.scan_number(),

            c if c.is_ascii_alphabetic() => self.scan_identifier_or_keyword(),

            c => match TokenKind::punctuation(c) {
                Some(kind) => self.add_token(kind, None),
                None => {
                    return Err(Error::UnexpectedCharacter {
                        ch: c,
                        line: self.start_line,
                        column: self.start_column,
                    });
                }
            },
        }

        Ok(())
    }

    fn skip_line_comment(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        while !self.is_at_end() {
            if self.peek() == '*' && self.peek_next() == '/' {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(Error::UnterminatedComment {
            line: self.start_line,
            column: self.start_column,
        })
    }

    fn scan_number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // A '.' only belongs to the number when a digit follows it
        let mut kind = TokenKind::IntLiteral;
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            kind = TokenKind::FloatLiteral;
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text = self.lexeme();
        self.add_token(kind, Some(text));
    }

    fn scan_identifier_or_keyword(&mut self) {
        while self.peek().is_ascii_alphanumeric() {
            self.advance();
        }

        let text = self.lexeme();
        match TokenKind::keyword(&text) {
            Some(kind) => self.add_token(kind, None),
            None => self.add_token(TokenKind::Identifier, Some(text)),
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.source.len() {
            '\0'
        } else {
            self.source[self.current + 1]
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn add_token(&mut self, kind: TokenKind, text: Option<String>) {
        self.tokens
            .push(Token::new(kind, text, self.start_line, self.start_column));
    }
}

/// Tokenize a whole buffer
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Scanner::new(source).scan_tokens()
}
