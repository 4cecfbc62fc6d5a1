//! Tokenizer for Turtle BASIC source lines
//!
//! Splits a statement into tokens. Whitespace and operator characters are
//! boundaries, double-quoted strings are kept whole, and a leading `REM` or a
//! `'` ends the line.

use crate::error::{BasicError, Result};
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// Represents a single token in a statement
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal, decimal or `0x` hexadecimal
    Number(f64),
    /// String literal with the quotes stripped
    String(String),
    /// Keyword or variable name, upper-cased
    Identifier(String),
    /// Arithmetic or relational operator, or a parenthesis
    Operator(&'static str),
    /// Separators (`,` and `;`)
    Separator(char),
    /// Word that starts like a number but is not one
    BadNumber(String),
    /// Character with no meaning in the dialect
    Unknown(char),
}

impl Token {
    /// True if this token is the given keyword
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Identifier(name) if name == keyword)
    }

    /// True if this token is the given operator
    pub fn is_operator(&self, op: &str) -> bool {
        matches!(self, Token::Operator(o) if *o == op)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::String(s) => write!(f, "\"{}\"", s),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Operator(op) => write!(f, "{}", op),
            Token::Separator(c) | Token::Unknown(c) => write!(f, "{}", c),
            Token::BadNumber(raw) => write!(f, "{}", raw),
        }
    }
}

/// The tokens of one statement
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TokenizedLine {
    pub tokens: Vec<Token>,
}

impl TokenizedLine {
    /// Create a new tokenized line
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Leading keyword, if the statement starts with a word
    pub fn keyword(&self) -> Option<&str> {
        match self.tokens.first() {
            Some(Token::Identifier(name)) => Some(name),
            _ => None,
        }
    }
}

/// Tokenize one statement (without its line number)
pub fn tokenize(source: &str) -> Result<TokenizedLine> {
    let mut chars = source.chars().peekable();
    let mut tokens = Vec::new();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '\'' => break,
            '"' => {
                chars.next();
                tokens.push(string_literal(&mut chars)?);
            }
            c if c.is_ascii_digit() || c == '.' => tokens.push(number(&mut chars)),
            c if c.is_ascii_alphabetic() => {
                let word = identifier(&mut chars);
                let is_comment = tokens.is_empty() && word == "REM";
                tokens.push(Token::Identifier(word));
                if is_comment {
                    break;
                }
            }
            ',' | ';' => {
                chars.next();
                tokens.push(Token::Separator(c));
            }
            _ => {
                chars.next();
                tokens.push(operator(c, &mut chars));
            }
        }
    }

    Ok(TokenizedLine::new(tokens))
}

fn string_literal(chars: &mut Peekable<Chars<'_>>) -> Result<Token> {
    let mut text = String::new();
    for c in chars.by_ref() {
        if c == '"' {
            return Ok(Token::String(text));
        }
        text.push(c);
    }
    Err(BasicError::Lex("unterminated string".to_string()))
}

fn number(chars: &mut Peekable<Chars<'_>>) -> Token {
    let mut raw = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
            raw.push(c);
            chars.next();
        } else {
            break;
        }
    }

    match parse_number(&raw) {
        Some(value) => Token::Number(value),
        None => Token::BadNumber(raw),
    }
}

/// Parse a decimal or `0x` hexadecimal literal
pub fn parse_number(raw: &str) -> Option<f64> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        if hex.is_empty() {
            return None;
        }
        return u64::from_str_radix(hex, 16).ok().map(|v| v as f64);
    }

    let valid_shape = raw.chars().any(|c| c.is_ascii_digit())
        && raw.chars().all(|c| c.is_ascii_digit() || c == '.')
        && raw.matches('.').count() <= 1;
    if !valid_shape {
        return None;
    }
    raw.parse::<f64>().ok()
}

fn identifier(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut word = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '_' {
            word.push(c.to_ascii_uppercase());
            chars.next();
        } else {
            break;
        }
    }
    if chars.peek() == Some(&'$') {
        word.push('$');
        chars.next();
    }
    word
}

fn operator(c: char, chars: &mut Peekable<Chars<'_>>) -> Token {
    match c {
        '+' => Token::Operator("+"),
        '-' => Token::Operator("-"),
        '*' => Token::Operator("*"),
        '/' => Token::Operator("/"),
        '(' => Token::Operator("("),
        ')' => Token::Operator(")"),
        '=' => Token::Operator("="),
        '<' => match chars.peek() {
            Some('=') => {
                chars.next();
                Token::Operator("<=")
            }
            Some('>') => {
                chars.next();
                Token::Operator("<>")
            }
            _ => Token::Operator("<"),
        },
        '>' => match chars.peek() {
            Some('=') => {
                chars.next();
                Token::Operator(">=")
            }
            _ => Token::Operator(">"),
        },
        other => Token::Unknown(other),
    }
}
