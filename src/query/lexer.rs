//! Criteria Lexer
//!
//! Tokenizes search-criteria text. The lexer is a three-state machine
//! (expecting a property, an operator, or a value), so each token class is
//! only admitted where the grammar allows it, and misplaced input fails
//! naming the offending fragment.

use crate::error::{Error, Result};

/// Comparison operators of the criteria grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
    DoesNotContain,
    DerivedFrom,
    Exists,
}

impl CompareOp {
    pub(crate) fn from_token(s: &str) -> Option<Self> {
        match s {
            "=" => Some(CompareOp::Eq),
            "!=" => Some(CompareOp::Neq),
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Le),
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Ge),
            "contains" => Some(CompareOp::Contains),
            "doesNotContain" => Some(CompareOp::DoesNotContain),
            // Both spellings circulate in the wild
            "derivedfrom" | "derivedFrom" => Some(CompareOp::DerivedFrom),
            "exists" => Some(CompareOp::Exists),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Neq => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Contains => "contains",
            CompareOp::DoesNotContain => "doesNotContain",
            CompareOp::DerivedFrom => "derivedfrom",
            CompareOp::Exists => "exists",
        }
    }
}

/// Criteria token types.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Property(String),
    Compare(CompareOp),
    And,
    Or,
    Value(String),
    LeftParen,
    RightParen,
}

/// What the grammar expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Property,
    Operator,
    Value,
}

/// Criteria lexer.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    state: State,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            state: State::Property,
        }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }
    }

    /// Get the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace();
        let c = match self.peek() {
            Some(c) => c,
            None => {
                // Trailing operators or dangling values are incomplete input
                return match self.state {
                    State::Value => Err(Error::malformed("expected a value at end of input")),
                    _ => Ok(None),
                };
            }
        };

        match self.state {
            State::Property => match c {
                '(' => {
                    self.advance(1);
                    Ok(Some(Token::LeftParen))
                }
                ')' => Err(Error::malformed("expected a property, found `)`")),
                '"' => Err(Error::malformed("expected a property, found a quoted value")),
                _ => {
                    let word = self.read_bare_token();
                    self.state = State::Operator;
                    Ok(Some(Token::Property(word.to_string())))
                }
            },
            State::Operator => match c {
                ')' => {
                    self.advance(1);
                    Ok(Some(Token::RightParen))
                }
                '(' => Err(Error::malformed("expected an operator, found `(`")),
                '"' => Err(Error::malformed("expected an operator, found a quoted value")),
                _ => {
                    let word = self.read_bare_token();
                    match word {
                        "and" => {
                            self.state = State::Property;
                            Ok(Some(Token::And))
                        }
                        "or" => {
                            self.state = State::Property;
                            Ok(Some(Token::Or))
                        }
                        _ => match CompareOp::from_token(word) {
                            Some(op) => {
                                self.state = State::Value;
                                Ok(Some(Token::Compare(op)))
                            }
                            None => Err(Error::malformed(format!(
                                "expected an operator, found `{}`",
                                word
                            ))),
                        },
                    }
                }
            },
            State::Value => {
                let value = if c == '"' {
                    self.read_quoted_value()?
                } else {
                    let word = self.read_bare_token();
                    if word.is_empty() {
                        return Err(Error::malformed(format!(
                            "expected a value, found `{}`",
                            c
                        )));
                    }
                    word.to_string()
                };
                self.state = State::Operator;
                Ok(Some(Token::Value(value)))
            }
        }
    }

    /// Read a token delimited by whitespace, parens, or a quote.
    fn read_bare_token(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '(' || c == ')' || c == '"' {
                break;
            }
            self.advance(c.len_utf8());
        }
        &self.input[start..self.pos]
    }

    /// Read a double-quoted value, scanning to the first unescaped closing
    /// quote. `\\` and `\"` unescape; any other backslash passes through.
    fn read_quoted_value(&mut self) -> Result<String> {
        self.advance(1); // opening quote
        let mut value = String::new();
        while let Some(c) = self.peek() {
            match c {
                '"' => {
                    self.advance(1);
                    return Ok(value);
                }
                '\\' => {
                    self.advance(1);
                    match self.peek() {
                        Some(escaped @ ('\\' | '"')) => {
                            value.push(escaped);
                            self.advance(1);
                        }
                        Some(other) => {
                            value.push('\\');
                            value.push(other);
                            self.advance(other.len_utf8());
                        }
                        None => break,
                    }
                }
                _ => {
                    value.push(c);
                    self.advance(c.len_utf8());
                }
            }
        }
        Err(Error::malformed("unterminated quoted value"))
    }

    /// Tokenize the entire input.
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}
