//! Formula sandbox
//!
//! Every evaluation runs the full check sequence: length limit, allow-list
//! scan over call candidates, parse into the closed [`Expr`] tree, then
//! evaluation. There is no path that skips a check.

use crate::ast::{Expr, UnaryOp};
use crate::error::{FormulaError, Result};
use crate::lexer::{tokenize, Spanned, Token};
use crate::parser::Parser;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::BuildHasher;

/// Default formula length limit, in characters
pub const DEFAULT_MAX_LENGTH: usize = 500;

/// Default nesting limit
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Variable lookup for evaluation
pub trait Variables {
    /// Value bound to `name`
    fn lookup(&self, name: &str) -> Option<f64>;
}

impl<S: BuildHasher> Variables for HashMap<String, f64, S> {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl Variables for BTreeMap<String, f64> {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl Variables for [(&str, f64)] {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.iter().find(|(key, _)| *key == name).map(|(_, value)| *value)
    }
}

impl<const N: usize> Variables for [(&str, f64); N] {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.as_slice().lookup(name)
    }
}

impl<V: Variables + ?Sized> Variables for &V {
    fn lookup(&self, name: &str) -> Option<f64> {
        (**self).lookup(name)
    }
}

/// Restricted formula evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulaSandbox {
    max_length: usize,
    max_depth: usize,
}

impl FormulaSandbox {
    /// Create sandbox with default limits
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// With length limit (characters)
    #[inline]
    #[must_use]
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// With nesting limit
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Length limit
    #[inline]
    #[must_use]
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Check a formula without evaluating it
    ///
    /// # Errors
    /// `TooLong`, `DisallowedFunction` or `ParseError`.
    pub fn compile(&self, formula: &str) -> Result<CompiledFormula> {
        let result = self.check(formula);
        if let Err(e) = &result {
            tracing::warn!(formula, error = %e, "formula rejected");
        }
        result
    }

    /// Check and evaluate a formula
    ///
    /// # Errors
    /// Any [`FormulaError`]; evaluation never falls back to anything looser.
    pub fn evaluate(&self, formula: &str, variables: &impl Variables) -> Result<f64> {
        let result = self
            .check(formula)
            .and_then(|compiled| compiled.evaluate(variables));

        match &result {
            Ok(value) => tracing::debug!(formula, value, "formula evaluated"),
            Err(e) => tracing::warn!(formula, error = %e, "formula rejected"),
        }
        result
    }

    fn check(&self, formula: &str) -> Result<CompiledFormula> {
        let length = formula.chars().count();
        if length > self.max_length {
            return Err(FormulaError::TooLong {
                length,
                limit: self.max_length,
            });
        }

        let tokens = tokenize(formula)?;
        reject_disallowed_calls(&tokens)?;

        let expr = Parser::new(&tokens, length, self.max_depth).parse()?;
        Ok(CompiledFormula {
            source: formula.to_string(),
            expr,
        })
    }
}

impl Default for FormulaSandbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Any identifier directly followed by `(` is a call candidate and must be
/// on the allow-list, wherever it appears.
fn reject_disallowed_calls(tokens: &[Spanned]) -> Result<()> {
    for pair in tokens.windows(2) {
        if let (Token::Ident(name), Token::LParen) = (&pair[0].token, &pair[1].token) {
            if crate::ast::Function::from_name(name).is_none() {
                return Err(FormulaError::DisallowedFunction { name: name.clone() });
            }
        }
    }
    Ok(())
}

/// Formula that passed every static check
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFormula {
    source: String,
    expr: Expr,
}

impl CompiledFormula {
    /// Original formula text
    #[inline]
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parsed tree
    #[inline]
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Distinct variable names the formula reads, sorted
    #[must_use]
    pub fn referenced_variables(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.expr.for_each_variable(&mut |name| {
            names.insert(name);
        });
        names
    }

    /// Evaluate against variables
    ///
    /// # Errors
    /// `UnresolvedVariable` or `NonNumericResult`.
    pub fn evaluate(&self, variables: &impl Variables) -> Result<f64> {
        eval(&self.expr, variables)
    }
}

fn eval(expr: &Expr, variables: &impl Variables) -> Result<f64> {
    let value = match expr {
        Expr::Number(value) => *value,
        Expr::Variable(name) => variables
            .lookup(name)
            .ok_or_else(|| FormulaError::UnresolvedVariable { name: name.clone() })?,
        Expr::Unary { op, operand } => {
            let value = eval(operand, variables)?;
            match op {
                UnaryOp::Plus => value,
                UnaryOp::Neg => -value,
            }
        }
        Expr::Binary { op, lhs, rhs } => {
            op.apply(eval(lhs, variables)?, eval(rhs, variables)?)?
        }
        Expr::Call { function, args } => {
            let values = args
                .iter()
                .map(|arg| eval(arg, variables))
                .collect::<Result<Vec<_>>>()?;
            function.apply(&values)?
        }
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormulaError::non_numeric(format!("intermediate value {value}")))
    }
}

/// Evaluate with the default sandbox
///
/// # Errors
/// Any [`FormulaError`].
pub fn calculate_formula(formula: &str, variables: &impl Variables) -> Result<f64> {
    FormulaSandbox::default().evaluate(formula, variables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormulaErrorKind;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[test]
    fn max_of_two_variables() {
        let v = vars(&[("a", 3.0), ("b", 7.0)]);
        assert_eq!(calculate_formula("max(a,b)", &v).unwrap(), 7.0);
    }

    #[test]
    fn arithmetic_with_non_ascii_names() {
        let v = vars(&[("末修产物浓度", 100.5), ("上机文库体积", 20.0)]);
        let result = calculate_formula("末修产物浓度 * 上机文库体积 / 660", &v).unwrap();
        assert!((result - 100.5 * 20.0 / 660.0).abs() < 1e-12);
    }

    #[test]
    fn allow_listed_functions() {
        let v = vars(&[("x", 125.5678), ("t", 100.0), ("a", 95.0)]);
        assert_eq!(calculate_formula("round(x, 2)", &v).unwrap(), 125.57);
        assert_eq!(calculate_formula("round(x, 0)", &v).unwrap(), 126.0);
        assert_eq!(calculate_formula("abs(a - t)", &v).unwrap(), 5.0);
        assert_eq!(calculate_formula("ceil(10.2)", &v).unwrap(), 11.0);
        assert_eq!(calculate_formula("floor(10.8)", &v).unwrap(), 10.0);
        assert_eq!(calculate_formula("min(3, 1, 2)", &v).unwrap(), 1.0);
        assert_eq!(calculate_formula("2 ^ 3 ^ 2", &v).unwrap(), 512.0);
        assert_eq!(calculate_formula("-2 ^ 2", &v).unwrap(), -4.0);
        assert_eq!(calculate_formula("7 % 4", &v).unwrap(), 3.0);
    }

    #[test]
    fn disallowed_function_is_rejected_anywhere() {
        let v = vars(&[("a", 1.0)]);
        for formula in ["exec(1)", "max(a, eval(a))", "a + system ( 1 )", "MAX(a)", "exec(1"] {
            let err = calculate_formula(formula, &v).unwrap_err();
            assert_eq!(err.kind(), FormulaErrorKind::DisallowedFunction, "{formula}");
        }
    }

    #[test]
    fn length_limit_counts_characters() {
        let v = vars(&[]);
        let long = format!("1{}", "+1".repeat(250));
        assert_eq!(long.chars().count(), 501);
        assert_eq!(
            calculate_formula(&long, &v),
            Err(FormulaError::TooLong {
                length: 501,
                limit: 500
            })
        );

        let exactly = format!("1{}", "+1".repeat(249));
        assert_eq!(calculate_formula(&format!("{exactly}+"), &v).unwrap_err().kind(), FormulaErrorKind::ParseError);
        assert_eq!(calculate_formula(&exactly, &v).unwrap(), 250.0);

        let sandbox = FormulaSandbox::new().with_max_length(5);
        assert_eq!(sandbox.evaluate("1+2+3", &v).unwrap(), 6.0);
        assert_eq!(sandbox.evaluate("1+2+34", &v).unwrap_err().kind(), FormulaErrorKind::TooLong);
    }

    #[test]
    fn length_is_checked_before_allow_list() {
        let v = vars(&[]);
        let formula = format!("exec(1){}", " ".repeat(500));
        assert_eq!(calculate_formula(&formula, &v).unwrap_err().kind(), FormulaErrorKind::TooLong);
    }

    #[test]
    fn runtime_failures() {
        let v = vars(&[("a", 1.0), ("zero", 0.0)]);
        assert_eq!(
            calculate_formula("a + missing", &v),
            Err(FormulaError::UnresolvedVariable {
                name: "missing".into()
            })
        );
        assert_eq!(calculate_formula("a / zero", &v).unwrap_err().kind(), FormulaErrorKind::NonNumericResult);
        assert_eq!(calculate_formula("(0 - 1) ^ 0.5", &v).unwrap_err().kind(), FormulaErrorKind::NonNumericResult);
        assert_eq!(calculate_formula("10 ^ 400", &v).unwrap_err().kind(), FormulaErrorKind::NonNumericResult);
        assert_eq!(calculate_formula("   ", &v).unwrap_err().kind(), FormulaErrorKind::ParseError);
    }

    #[test]
    fn compile_lists_variables() {
        let compiled = FormulaSandbox::new().compile("round(b * a + b, 2) / c").unwrap();
        assert_eq!(compiled.referenced_variables().into_iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(compiled.source(), "round(b * a + b, 2) / c");

        let bound = [("a", 2.0), ("b", 3.0), ("c", 3.0)];
        assert_eq!(compiled.evaluate(&bound).unwrap(), 3.0);
    }

    #[test]
    fn compile_reports_static_errors_only() {
        let sandbox = FormulaSandbox::new();
        assert!(sandbox.compile("unknown_var * 2").is_ok());
        assert!(sandbox.compile("open(1)").unwrap_err().is_static());
        assert!(sandbox.compile("1 +* 2").unwrap_err().is_static());
    }
}
