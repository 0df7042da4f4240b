//! Closed expression tree
//!
//! Calls can only name a [`Function`], so a tree that parsed cannot reach
//! anything outside the allow-list.

use crate::error::{FormulaError, Result};
use std::fmt;

/// Allow-listed functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    /// Largest argument
    Max,
    /// Smallest argument
    Min,
    /// Round half away from zero, optionally to N decimal places
    Round,
    /// Absolute value
    Abs,
    /// Round up
    Ceil,
    /// Round down
    Floor,
}

impl Function {
    /// Every allow-listed function
    pub const ALL: [Self; 6] = [
        Self::Max,
        Self::Min,
        Self::Round,
        Self::Abs,
        Self::Ceil,
        Self::Floor,
    ];

    /// Most decimal places `round` accepts
    pub const MAX_ROUND_PLACES: f64 = 15.0;

    /// Look up by exact (lowercase) name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Name as written in formulas
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Min => "min",
            Self::Round => "round",
            Self::Abs => "abs",
            Self::Ceil => "ceil",
            Self::Floor => "floor",
        }
    }

    /// Check the argument count
    pub(crate) fn check_arity(&self, count: usize, position: usize) -> Result<()> {
        let ok = match self {
            Self::Max | Self::Min => count >= 1,
            Self::Abs | Self::Ceil | Self::Floor => count == 1,
            Self::Round => count == 1 || count == 2,
        };
        if ok {
            return Ok(());
        }

        let expected = match self {
            Self::Max | Self::Min => "at least 1 argument",
            Self::Abs | Self::Ceil | Self::Floor => "exactly 1 argument",
            Self::Round => "1 or 2 arguments",
        };
        Err(FormulaError::parse(
            position,
            format!("{}() takes {expected}, got {count}", self.name()),
        ))
    }

    pub(crate) fn apply(&self, args: &[f64]) -> Result<f64> {
        match (self, args) {
            (Self::Max, [first, rest @ ..]) => Ok(rest.iter().copied().fold(*first, f64::max)),
            (Self::Min, [first, rest @ ..]) => Ok(rest.iter().copied().fold(*first, f64::min)),
            (Self::Abs, [x]) => Ok(x.abs()),
            (Self::Ceil, [x]) => Ok(x.ceil()),
            (Self::Floor, [x]) => Ok(x.floor()),
            (Self::Round, [x]) => Ok(x.round()),
            (Self::Round, [x, places]) => round_to(*x, *places),
            // Arity is checked at parse time
            _ => Err(FormulaError::non_numeric(format!(
                "{}() called with {} arguments",
                self.name(),
                args.len()
            ))),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn round_to(x: f64, places: f64) -> Result<f64> {
    if places.fract() != 0.0 || !(0.0..=Function::MAX_ROUND_PLACES).contains(&places) {
        return Err(FormulaError::non_numeric(format!(
            "round() places must be a whole number between 0 and {}, got {places}",
            Function::MAX_ROUND_PLACES
        )));
    }
    let scale = 10f64.powi(places as i32);
    Ok((x * scale).round() / scale)
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `+x`
    Plus,
    /// `-x`
    Neg,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `^`
    Pow,
}

impl BinaryOp {
    pub(crate) fn apply(self, lhs: f64, rhs: f64) -> Result<f64> {
        match self {
            Self::Add => Ok(lhs + rhs),
            Self::Sub => Ok(lhs - rhs),
            Self::Mul => Ok(lhs * rhs),
            Self::Div | Self::Rem if rhs == 0.0 => {
                Err(FormulaError::non_numeric("division by zero"))
            }
            Self::Div => Ok(lhs / rhs),
            Self::Rem => Ok(lhs % rhs),
            Self::Pow => Ok(lhs.powf(rhs)),
        }
    }
}

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal
    Number(f64),
    /// Variable reference
    Variable(String),
    /// Unary operation
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: Box<Expr>,
    },
    /// Binary operation
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        lhs: Box<Expr>,
        /// Right operand
        rhs: Box<Expr>,
    },
    /// Allow-listed function call
    Call {
        /// Function
        function: Function,
        /// Arguments
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Visit every variable reference, left to right
    pub fn for_each_variable<'a>(&'a self, visit: &mut impl FnMut(&'a str)) {
        match self {
            Self::Number(_) => {}
            Self::Variable(name) => visit(name),
            Self::Unary { operand, .. } => operand.for_each_variable(visit),
            Self::Binary { lhs, rhs, .. } => {
                lhs.for_each_variable(visit);
                rhs.for_each_variable(visit);
            }
            Self::Call { args, .. } => args.iter().for_each(|arg| arg.for_each_variable(visit)),
        }
    }
}
