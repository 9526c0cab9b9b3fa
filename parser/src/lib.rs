pub mod lexer;

use crate::lexer::Lexer;
use crate::lexer::tokens::{Loc, Token, TokenType};
use std::error::Error;
use std::fmt;

/// One `name arg arg ... ;` line.
#[derive(Debug, Clone)]
pub struct Statement {
    pub name: String,
    pub args: Vec<String>,
    pub loc: Loc,
}

/// One `name arg ... { ... }` block.
#[derive(Debug, Clone)]
pub struct Block {
    pub name: String,
    pub args: Vec<String>,
    pub items: Vec<Item>,
    pub loc: Loc,
}

#[derive(Debug, Clone)]
pub enum Item {
    Statement(Statement),
    Block(Block),
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSemicolon { directive: String, loc: Loc },
    UnclosedBlock { block: String, loc: Loc },
    UnexpectedToken { found: String, loc: Loc },
    Generic(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingSemicolon { directive, loc } => {
                write!(f, "Directive '{directive}' at {loc} must end with ';'")
            }
            ConfigError::UnclosedBlock { block, loc } => {
                write!(f, "Block '{block}' opened at {loc} is never closed")
            }
            ConfigError::UnexpectedToken { found, loc } => {
                write!(f, "Unexpected {found} at {loc}")
            }
            ConfigError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl Error for ConfigError {}

/// Parses a directive-oriented config source into a generic tree.
/// The caller gives the directives meaning; this layer only knows the shape:
/// words, `;`-terminated statements, and `{}`-delimited blocks.
pub fn parse(source: &str) -> Result<Vec<Item>, ConfigError> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_items(None)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    // Parses items until EOF (enclosing == None) or a matching '}'.
    fn parse_items(&mut self, enclosing: Option<(&str, Loc)>) -> Result<Vec<Item>, ConfigError> {
        let mut items = Vec::new();

        loop {
            match self.peek() {
                None => {
                    if let Some((name, loc)) = enclosing {
                        return Err(ConfigError::UnclosedBlock {
                            block: name.to_string(),
                            loc,
                        });
                    }
                    return Ok(items);
                }
                Some(tok) if tok.kind == TokenType::RBrace => {
                    let loc = tok.loc;
                    if enclosing.is_none() {
                        return Err(ConfigError::UnexpectedToken {
                            found: "'}'".to_string(),
                            loc,
                        });
                    }
                    self.advance();
                    return Ok(items);
                }
                Some(tok) if tok.kind == TokenType::Semicolon => {
                    // stray ';' is harmless
                    self.advance();
                }
                _ => items.push(self.parse_item()?),
            }
        }
    }

    fn parse_item(&mut self) -> Result<Item, ConfigError> {
        let first = self.advance().expect("caller checked peek");
        let loc = first.loc;
        let name = match first.kind {
            TokenType::Word(w) => w,
            other => {
                return Err(ConfigError::UnexpectedToken {
                    found: format!("'{other}'"),
                    loc,
                });
            }
        };

        let mut args = Vec::new();
        loop {
            match self.peek() {
                Some(tok) => match &tok.kind {
                    TokenType::Word(w) => {
                        args.push(w.clone());
                        self.advance();
                    }
                    TokenType::Semicolon => {
                        self.advance();
                        return Ok(Item::Statement(Statement { name, args, loc }));
                    }
                    TokenType::LBrace => {
                        self.advance();
                        let items = self.parse_items(Some((name.as_str(), loc)))?;
                        return Ok(Item::Block(Block {
                            name,
                            args,
                            items,
                            loc,
                        }));
                    }
                    TokenType::RBrace => {
                        return Err(ConfigError::MissingSemicolon {
                            directive: name,
                            loc,
                        });
                    }
                },
                None => {
                    return Err(ConfigError::MissingSemicolon {
                        directive: name,
                        loc,
                    });
                }
            }
        }
    }
}
