//! Token model shared by the lexer and parser.

use std::fmt;

/// Kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// End of input.
    Eof,
    /// End of line, the statement boundary.
    Eol,
    /// The `set` keyword.
    Set,
    /// A bare word.
    Word,
    /// A quoted string.
    Str,
    /// A word made entirely of ASCII digits.
    Number,
    /// A lexer error; the token text holds the message.
    Error,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Eof => "EOF",
            TokenKind::Eol => "EOL",
            TokenKind::Set => "SET",
            TokenKind::Word => "WORD",
            TokenKind::Str => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// A single token with its source position (1-based line, column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
            column,
        }
    }
}
