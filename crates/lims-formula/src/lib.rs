//! LIMS Formula
//!
//! Restricted arithmetic for derived measurement fields.
//!
//! # Overview
//!
//! Template authors write formulas such as `round(浓度 * 体积 / 660, 2)`.
//! Before a formula is trusted it must:
//!
//! - fit the length limit (500 characters by default)
//! - call nothing but `max`, `min`, `round`, `abs`, `ceil`, `floor`
//! - parse into the closed [`Expr`] tree
//!
//! Evaluation then resolves every other identifier against the supplied
//! variables and must produce a finite number.
//!
//! # Example
//!
//! ```rust
//! use lims_formula::{calculate_formula, FormulaErrorKind};
//! use std::collections::HashMap;
//!
//! let vars = HashMap::from([("a".to_string(), 3.0), ("b".to_string(), 7.0)]);
//! assert_eq!(calculate_formula("max(a, b)", &vars).unwrap(), 7.0);
//!
//! let err = calculate_formula("exec(1)", &vars).unwrap_err();
//! assert_eq!(err.kind(), FormulaErrorKind::DisallowedFunction);
//! ```

#![warn(missing_docs)]

pub mod ast;
pub mod error;
mod lexer;
mod parser;
pub mod sandbox;

// Re-exports
pub use ast::{BinaryOp, Expr, Function, UnaryOp};
pub use error::{FormulaError, FormulaErrorKind, Result};
pub use sandbox::{
    calculate_formula, CompiledFormula, FormulaSandbox, Variables, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_LENGTH,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
