//! Tokenizer - converts license expression text into a token stream
//!
//! Handles: words (license identifiers or fragments of informal names),
//! the operators AND / OR / WITH (case-insensitive), `+`, parentheses,
//! and `LicenseRef-` / `DocumentRef-` references.
//!
//! Guarantees:
//! - Deterministic: same input always produces same token stream
//! - Total: every input tokenizes; deciding whether a word is a valid
//!   license is left to the normalizer and parser

use std::fmt;

/// Token types for license expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Operators
    And,
    Or,
    With,
    Plus, // +

    // Symbols
    LParen, // (
    RParen, // )

    // Words
    Word(String),
    LicenseRef(String),
    DocumentRef(String),

    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::With => write!(f, "WITH"),
            Token::Plus => write!(f, "+"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Word(w) | Token::LicenseRef(w) | Token::DocumentRef(w) => write!(f, "{}", w),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// Position in source text for error reporting
///
/// Expressions are single-line, so only the column is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub column: usize,
    pub offset: usize,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "column {}", self.column)
    }
}

/// Token with source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Lazy tokenizer over license expression text
pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
}

impl Tokenizer {
    /// Create a new tokenizer for the given input text
    pub fn new(text: &str) -> Self {
        Tokenizer {
            input: text.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the entire input into a stream of spanned tokens,
    /// terminated by a single `Eof`
    pub fn tokenize(&mut self) -> Vec<SpannedToken> {
        let mut tokens = Vec::new();
        loop {
            let next = self.next_token();
            let done = next.token == Token::Eof;
            tokens.push(next);
            if done {
                break;
            }
        }
        tokens
    }

    /// Produce the next token; returns `Eof` forever once input is exhausted
    pub fn next_token(&mut self) -> SpannedToken {
        self.skip_whitespace();

        let span = self.current_span();
        let ch = match self.peek() {
            Some(c) => c,
            None => {
                return SpannedToken {
                    token: Token::Eof,
                    span,
                }
            }
        };

        let token = match ch {
            '(' => { self.advance(); Token::LParen }
            ')' => { self.advance(); Token::RParen }
            '+' => { self.advance(); Token::Plus }
            _ => self.read_word(),
        };

        SpannedToken { token, span }
    }

    // ── Character helpers ──────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.position += 1;
        }
        ch
    }

    fn current_span(&self) -> Span {
        Span {
            column: self.position + 1,
            offset: self.position,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    // ── Words & Keywords ───────────────────────────────────

    fn read_word(&mut self) -> Token {
        let start = self.position;

        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || is_structural(ch) {
                break;
            }
            self.advance();
        }

        let text: String = self.input[start..self.position].iter().collect();
        classify_word(text)
    }
}

fn is_structural(ch: char) -> bool {
    matches!(ch, '(' | ')' | '+')
}

fn classify_word(text: String) -> Token {
    let upper = text.to_ascii_uppercase();
    match upper.as_str() {
        "AND" => Token::And,
        "OR" => Token::Or,
        "WITH" => Token::With,
        _ if upper.starts_with("DOCUMENTREF-") => Token::DocumentRef(text),
        _ if upper.starts_with("LICENSEREF-") => Token::LicenseRef(text),
        _ => Token::Word(text),
    }
}
