pub mod tokens;

use crate::ConfigError;
use crate::lexer::tokens::{Loc, Token, TokenType};
use std::iter::Peekable;
use std::str::Chars;

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.chars().peekable(),
            line: 1,
            col: 1,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.input.next();
        if let Some(c) = c {
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        c
    }

    fn peek(&mut self) -> Option<&char> {
        self.input.peek()
    }

    fn current_loc(&self) -> Loc {
        Loc {
            line: self.line,
            col: self.col,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, ConfigError> {
        let mut tokens = Vec::new();

        while let Some(&c) = self.peek() {
            let loc = self.current_loc();

            match c {
                '#' => self.skip_comment(),
                ';' => {
                    tokens.push(Token { kind: TokenType::Semicolon, loc });
                    self.advance();
                }
                '{' => {
                    tokens.push(Token { kind: TokenType::LBrace, loc });
                    self.advance();
                }
                '}' => {
                    tokens.push(Token { kind: TokenType::RBrace, loc });
                    self.advance();
                }
                q if q == '"' || q == '\'' => {
                    tokens.push(Token {
                        kind: TokenType::Word(self.read_quoted(q)?),
                        loc,
                    });
                }
                '/' => {
                    // Either the start of a // comment or of a bare path
                    self.advance();
                    if self.peek() == Some(&'/') {
                        self.skip_comment();
                    } else {
                        let mut word = String::from("/");
                        self.read_word_into(&mut word);
                        tokens.push(Token { kind: TokenType::Word(word), loc });
                    }
                }
                w if w.is_whitespace() => {
                    self.advance();
                }
                _ => {
                    let mut word = String::new();
                    self.read_word_into(&mut word);
                    tokens.push(Token { kind: TokenType::Word(word), loc });
                }
            }
        }

        Ok(tokens)
    }

    fn skip_comment(&mut self) {
        while let Some(&c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn read_quoted(&mut self, quote_char: char) -> Result<String, ConfigError> {
        let open = self.current_loc();
        self.advance(); // opening quote
        let mut val = String::new();

        loop {
            match self.advance() {
                Some(c) if c == quote_char => return Ok(val),
                Some(c) => val.push(c),
                None => {
                    return Err(ConfigError::Generic(format!(
                        "Unterminated quoted string starting at {open}"
                    )));
                }
            }
        }
    }

    // Accumulates a bare word; a '//' sequence inside one starts a comment,
    // matching how inline comments are stripped by the reference dialect.
    fn read_word_into(&mut self, word: &mut String) {
        while let Some(&c) = self.peek() {
            if c.is_whitespace() || c == ';' || c == '{' || c == '}' || c == '#' || c == '"' || c == '\'' {
                break;
            }
            if c == '/' {
                self.advance();
                if self.peek() == Some(&'/') {
                    self.skip_comment();
                    break;
                }
                word.push('/');
                continue;
            }
            word.push(c);
            self.advance();
        }
    }
}
