//! tokenizer converts an expression source string into a stream of lexemes.
//!
//! Ported from `get_token` in the original implementation: a single
//! forward-only scan over the expression bytes, classifying by leading
//! character.

use crate::error::Error;
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Lexeme is a raw token straight off the scanner, before literal interning
/// and paren elision (performed by [`crate::expr::compiler`]).
#[derive(Clone, Debug, PartialEq)]
pub enum Lexeme {
    Number(i32),
    Variable(u8),
    Literal(String),
    Plus,
    Minus,
    Times,
    Divide,
    Mod,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Xor,
    IsNumeric,
    StartsWith,
    LParen,
    RParen,
}

lazy_static! {
    /// KEYWORDS maps bareword spellings to their keyword lexeme, mirroring
    /// the source's first-character dispatch in `get_token`.
    static ref KEYWORDS: HashMap<&'static str, Lexeme> = {
        let mut m = HashMap::new();
        m.insert("isnumeric", Lexeme::IsNumeric);
        m.insert("startswith", Lexeme::StartsWith);
        m.insert("and", Lexeme::And);
        m.insert("or", Lexeme::Or);
        m.insert("xor", Lexeme::Xor);
        m
    };
}

/// Tokenizer scans an expression source string into a `Lexeme` sequence.
pub struct Tokenizer<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: Option<usize>,
}

impl<'a> Tokenizer<'a> {
    /// new constructs a tokenizer over `src`, reporting `line` in any error.
    pub fn new(src: &'a str, line: Option<usize>) -> Tokenizer<'a> {
        Tokenizer {
            bytes: src.as_bytes(),
            pos: 0,
            line,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// next_lexeme returns the next lexeme, or `None` at end of input.
    pub fn next_lexeme(&mut self) -> Result<Option<Lexeme>, Error> {
        while self.peek() == Some(b' ') {
            self.pos += 1;
        }

        let c = match self.peek() {
            None => return Ok(None),
            Some(c) => c,
        };

        let lexeme = match c {
            b'(' => {
                self.bump();
                Lexeme::LParen
            }
            b')' => {
                self.bump();
                Lexeme::RParen
            }
            b'+' => {
                self.bump();
                Lexeme::Plus
            }
            b'-' => {
                self.bump();
                Lexeme::Minus
            }
            b'*' => {
                self.bump();
                Lexeme::Times
            }
            b'/' => {
                self.bump();
                Lexeme::Divide
            }
            b'%' => {
                self.bump();
                Lexeme::Mod
            }
            b'<' => {
                self.bump();
                match self.peek() {
                    Some(b'=') => {
                        self.bump();
                        Lexeme::Le
                    }
                    Some(b'>') => {
                        self.bump();
                        Lexeme::Ne
                    }
                    _ => Lexeme::Lt,
                }
            }
            b'>' => {
                self.bump();
                match self.peek() {
                    Some(b'=') => {
                        self.bump();
                        Lexeme::Ge
                    }
                    _ => Lexeme::Gt,
                }
            }
            b'=' => {
                self.bump();
                Lexeme::Eq
            }
            b'$' => {
                self.bump();
                match self.peek() {
                    Some(b'$') => {
                        self.bump();
                        Lexeme::Literal("$".to_string())
                    }
                    Some(d) if d.is_ascii_digit() => {
                        let mut digits = String::new();
                        while let Some(d) = self.peek() {
                            if !d.is_ascii_digit() {
                                break;
                            }
                            digits.push(d as char);
                            self.bump();
                        }
                        let n: u32 = digits.parse().map_err(|_| {
                            Error::InvalidExpression(
                                self.line,
                                "malformed variable reference".to_string(),
                            )
                        })?;
                        if n > 9 {
                            return Err(Error::InvalidExpression(
                                self.line,
                                format!("binding slot ${} out of range", n),
                            ));
                        }
                        Lexeme::Variable(n as u8)
                    }
                    _ => {
                        return Err(Error::InvalidExpression(
                            self.line,
                            "expected a digit or '$' after '$'".to_string(),
                        ))
                    }
                }
            }
            b'"' | b'\'' => {
                let terminator = c;
                self.bump();
                let mut out = String::new();
                loop {
                    match self.peek() {
                        Some(b) if b == terminator => {
                            self.bump();
                            break;
                        }
                        Some(b) => {
                            out.push(b as char);
                            self.bump();
                        }
                        None => {
                            return Err(Error::InvalidExpression(
                                self.line,
                                "unterminated quoted literal".to_string(),
                            ))
                        }
                    }
                }
                Lexeme::Literal(out)
            }
            c if c.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(d) = self.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    digits.push(d as char);
                    self.bump();
                }
                let n: i32 = digits.parse().map_err(|_| {
                    Error::InvalidExpression(self.line, "malformed number".to_string())
                })?;
                Lexeme::Number(n)
            }
            _ => {
                let mut word = String::new();
                while let Some(b) = self.peek() {
                    if b == b' ' || b == b')' {
                        break;
                    }
                    word.push(b as char);
                    self.bump();
                }
                match KEYWORDS.get(word.as_str()) {
                    Some(kw) => kw.clone(),
                    None => Lexeme::Literal(word),
                }
            }
        };

        Ok(Some(lexeme))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(src: &str) -> Vec<Lexeme> {
        let mut t = Tokenizer::new(src, None);
        let mut out = Vec::new();
        while let Some(l) = t.next_lexeme().unwrap() {
            out.push(l);
        }
        out
    }

    #[test]
    fn tokenizes_numbers_and_variables() {
        assert_eq!(
            lex_all("$1 + 1"),
            vec![Lexeme::Variable(1), Lexeme::Plus, Lexeme::Number(1)]
        );
    }

    #[test]
    fn tokenizes_keywords_and_builtins() {
        assert_eq!(
            lex_all("isnumeric $1 and $1 = 0"),
            vec![
                Lexeme::IsNumeric,
                Lexeme::Variable(1),
                Lexeme::And,
                Lexeme::Variable(1),
                Lexeme::Eq,
                Lexeme::Number(0),
            ]
        );
    }

    #[test]
    fn tokenizes_quoted_and_dollar_literal() {
        assert_eq!(
            lex_all("\"hl\" $$ 'bc'"),
            vec![
                Lexeme::Literal("hl".to_string()),
                Lexeme::Literal("$".to_string()),
                Lexeme::Literal("bc".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_out_of_range_variable() {
        let mut t = Tokenizer::new("$a", None);
        assert!(t.next_lexeme().is_err());
    }
}
