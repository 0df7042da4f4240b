//! Recursive-descent parser
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('^' unary)?
//! primary := NUMBER | IDENT | IDENT '(' expr (',' expr)* ')' | '(' expr ')'
//! ```

use crate::ast::{BinaryOp, Expr, Function, UnaryOp};
use crate::error::{FormulaError, Result};
use crate::lexer::{Spanned, Token};

pub(crate) struct Parser<'t> {
    tokens: &'t [Spanned],
    cursor: usize,
    depth: usize,
    max_depth: usize,
    end: usize,
}

impl<'t> Parser<'t> {
    /// `end` is the character length of the source, used for end-of-input errors
    pub(crate) fn new(tokens: &'t [Spanned], end: usize, max_depth: usize) -> Self {
        Self {
            tokens,
            cursor: 0,
            depth: 0,
            max_depth,
            end,
        }
    }

    pub(crate) fn parse(mut self) -> Result<Expr> {
        if self.tokens.is_empty() {
            return Err(FormulaError::parse(0, "formula is empty"));
        }
        let expr = self.expr()?;
        match self.tokens.get(self.cursor) {
            None => Ok(expr),
            Some(extra) => Err(FormulaError::parse(
                extra.position,
                format!("unexpected {}", extra.token.describe()),
            )),
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.cursor).map(|s| &s.token)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.cursor).map_or(self.end, |s| s.position)
    }

    fn advance(&mut self) -> Option<&'t Spanned> {
        let next = self.tokens.get(self.cursor);
        self.cursor += 1;
        next
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        match self.advance() {
            Some(spanned) if &spanned.token == expected => Ok(()),
            Some(spanned) => Err(FormulaError::parse(
                spanned.position,
                format!(
                    "expected {}, found {}",
                    expected.describe(),
                    spanned.token.describe()
                ),
            )),
            None => Err(FormulaError::parse(
                self.end,
                format!("expected {}, found end of formula", expected.describe()),
            )),
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FormulaError::parse(
                self.position(),
                format!("nesting deeper than {}", self.max_depth),
            ));
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.cursor += 1;
            let rhs = self.term()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn term(&mut self) -> Result<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => return Ok(lhs),
            };
            self.cursor += 1;
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn unary(&mut self) -> Result<Expr> {
        self.enter()?;
        let op = match self.peek() {
            Some(Token::Plus) => Some(UnaryOp::Plus),
            Some(Token::Minus) => Some(UnaryOp::Neg),
            _ => None,
        };

        let expr = match op {
            Some(op) => {
                self.cursor += 1;
                Expr::Unary {
                    op,
                    operand: Box::new(self.unary()?),
                }
            }
            None => self.power()?,
        };
        self.depth -= 1;
        Ok(expr)
    }

    fn power(&mut self) -> Result<Expr> {
        let base = self.primary()?;
        if self.peek() == Some(&Token::Caret) {
            self.cursor += 1;
            // Right operand goes back through unary: 2^-1 and 2^3^2 = 2^(3^2)
            let exponent = self.unary()?;
            return Ok(binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr> {
        let position = self.position();
        let Some(spanned) = self.advance() else {
            return Err(FormulaError::parse(position, "unexpected end of formula"));
        };

        match &spanned.token {
            Token::Number(value) => Ok(Expr::Number(*value)),
            Token::Ident(name) if self.peek() == Some(&Token::LParen) => {
                self.call(name, spanned.position)
            }
            Token::Ident(name) => Ok(Expr::Variable(name.clone())),
            Token::LParen => {
                let inner = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            other => Err(FormulaError::parse(
                spanned.position,
                format!("unexpected {}", other.describe()),
            )),
        }
    }

    fn call(&mut self, name: &str, position: usize) -> Result<Expr> {
        let function = Function::from_name(name).ok_or_else(|| FormulaError::DisallowedFunction {
            name: name.to_string(),
        })?;
        self.expect(&Token::LParen)?;

        let mut args = Vec::new();
        if self.peek() != Some(&Token::RParen) {
            loop {
                args.push(self.expr()?);
                if self.peek() == Some(&Token::Comma) {
                    self.cursor += 1;
                } else {
                    break;
                }
            }
        }
        self.expect(&Token::RParen)?;

        function.check_arity(args.len(), position)?;
        Ok(Expr::Call { function, args })
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}
