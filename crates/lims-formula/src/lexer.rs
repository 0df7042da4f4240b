//! Tokenizer
//!
//! Positions are character offsets, not byte offsets, so error positions
//! line up with what the user typed even for non-ASCII variable names.

use crate::error::{FormulaError, Result};

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    Comma,
}

impl Token {
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Number(n) => format!("number {n}"),
            Self::Ident(name) => format!("'{name}'"),
            Self::Plus => "'+'".into(),
            Self::Minus => "'-'".into(),
            Self::Star => "'*'".into(),
            Self::Slash => "'/'".into(),
            Self::Percent => "'%'".into(),
            Self::Caret => "'^'".into(),
            Self::LParen => "'('".into(),
            Self::RParen => "')'".into(),
            Self::Comma => "','".into(),
        }
    }
}

/// Token with its starting character offset
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub(crate) token: Token,
    pub(crate) position: usize,
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            c if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) => {
                let (value, end) = scan_number(&chars, i)?;
                tokens.push(Spanned {
                    token: Token::Number(value),
                    position: start,
                });
                i = end;
                continue;
            }
            c if c.is_alphabetic() || c == '_' => {
                let end = chars[i..]
                    .iter()
                    .position(|c| !(c.is_alphanumeric() || *c == '_'))
                    .map_or(chars.len(), |offset| i + offset);
                tokens.push(Spanned {
                    token: Token::Ident(chars[i..end].iter().collect()),
                    position: start,
                });
                i = end;
                continue;
            }
            other => {
                return Err(FormulaError::parse(
                    start,
                    format!("unexpected character '{other}'"),
                ))
            }
        };

        tokens.push(Spanned {
            token,
            position: start,
        });
        i += 1;
    }

    Ok(tokens)
}

/// Decimal literal with optional fraction and exponent
fn scan_number(chars: &[char], start: usize) -> Result<(f64, usize)> {
    let mut end = start;
    let digits = |end: &mut usize| {
        while chars.get(*end).is_some_and(char::is_ascii_digit) {
            *end += 1;
        }
    };

    digits(&mut end);
    if chars.get(end) == Some(&'.') {
        end += 1;
        digits(&mut end);
    }

    if matches!(chars.get(end), Some('e' | 'E')) {
        let mut exp_end = end + 1;
        if matches!(chars.get(exp_end), Some('+' | '-')) {
            exp_end += 1;
        }
        if !chars.get(exp_end).is_some_and(char::is_ascii_digit) {
            return Err(FormulaError::parse(end, "exponent has no digits"));
        }
        end = exp_end;
        digits(&mut end);
    }

    let text: String = chars[start..end].iter().collect();
    text.parse::<f64>()
        .map(|value| (value, end))
        .map_err(|_| FormulaError::parse(start, format!("invalid number '{text}'")))
}
