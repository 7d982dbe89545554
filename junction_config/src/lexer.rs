//! Lexer for set-style configuration text.
//!
//! The lexer never fails: invalid input becomes an `Error` token that the
//! parser turns into a positioned diagnostic.

use std::str::Chars;

use crate::token::{Token, TokenKind};

/// Streaming lexer over configuration text.
pub struct Lexer<'a> {
    chars: Chars<'a>,
    ch: Option<char>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer {
            chars: input.chars(),
            ch: None,
            line: 1,
            column: 0,
        };
        lexer.read_char();
        lexer
    }

    /// Returns the next token from the input.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let (line, column) = (self.line, self.column);
        match self.ch {
            None => Token::new(TokenKind::Eof, "", line, column),
            Some('\n') => {
                self.read_char();
                Token::new(TokenKind::Eol, "", line, column)
            }
            Some('#') => {
                self.skip_line();
                self.next_token()
            }
            Some('"') => self.read_string(line, column),
            Some(ch) if is_word_char(ch) => self.read_word(line, column),
            Some(ch) => {
                self.read_char();
                Token::new(
                    TokenKind::Error,
                    format!("unexpected character: {ch}"),
                    line,
                    column,
                )
            }
        }
    }

    fn read_char(&mut self) {
        self.ch = self.chars.next();
        match self.ch {
            Some('\n') => {
                self.line += 1;
                self.column = 0;
            }
            Some(_) => self.column += 1,
            None => {}
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, Some(c) if c.is_whitespace() && c != '\n') {
            self.read_char();
        }
    }

    fn skip_line(&mut self) {
        while matches!(self.ch, Some(c) if c != '\n') {
            self.read_char();
        }
        if self.ch == Some('\n') {
            self.read_char();
        }
    }

    fn read_word(&mut self, line: usize, column: usize) -> Token {
        let mut text = String::new();
        while let Some(ch) = self.ch {
            if !is_word_char(ch) {
                break;
            }
            text.push(ch);
            self.read_char();
        }

        let kind = if text == "set" {
            TokenKind::Set
        } else if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
            TokenKind::Number
        } else {
            TokenKind::Word
        };
        Token::new(kind, text, line, column)
    }

    fn read_string(&mut self, line: usize, column: usize) -> Token {
        let mut text = String::new();

        // Skip opening quote.
        self.read_char();

        loop {
            match self.ch {
                None => return Token::new(TokenKind::Error, "unterminated string", line, column),
                Some('"') => break,
                Some('\\') => {
                    self.read_char();
                    let Some(escaped) = self.ch else {
                        return Token::new(
                            TokenKind::Error,
                            "unexpected EOF in string",
                            line,
                            column,
                        );
                    };
                    match escaped {
                        'n' => text.push('\n'),
                        't' => text.push('\t'),
                        '"' => text.push('"'),
                        '\\' => text.push('\\'),
                        other => text.push(other),
                    }
                    self.read_char();
                }
                Some(ch) => {
                    text.push(ch);
                    self.read_char();
                }
            }
        }

        // Skip closing quote.
        self.read_char();
        Token::new(TokenKind::Str, text, line, column)
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '-' | '_' | '/' | '.' | ':')
}
