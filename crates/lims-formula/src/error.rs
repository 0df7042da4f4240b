//! Error types for the formula sandbox

/// Coarse reason a formula was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormulaErrorKind {
    /// Formula exceeds the length limit
    TooLong,
    /// Formula calls a function outside the allow-list
    DisallowedFunction,
    /// Formula is not a well-formed expression
    ParseError,
    /// Formula references a variable that was not supplied
    UnresolvedVariable,
    /// Evaluation did not produce a finite number
    NonNumericResult,
}

/// Formula rejection
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormulaError {
    /// Formula exceeds the length limit
    #[error("formula is {length} characters long, limit is {limit}")]
    TooLong {
        /// Length in characters
        length: usize,
        /// Configured limit
        limit: usize,
    },

    /// Formula calls a function outside the allow-list
    #[error("function '{name}' is not allowed")]
    DisallowedFunction {
        /// Called name
        name: String,
    },

    /// Formula is not a well-formed expression
    #[error("parse error at {position}: {message}")]
    ParseError {
        /// Character offset of the offending token
        position: usize,
        /// What was wrong
        message: String,
    },

    /// Formula references a variable that was not supplied
    #[error("unresolved variable '{name}'")]
    UnresolvedVariable {
        /// Variable name
        name: String,
    },

    /// Evaluation did not produce a finite number
    #[error("formula did not produce a number: {detail}")]
    NonNumericResult {
        /// What went wrong
        detail: String,
    },
}

impl FormulaError {
    /// Coarse reason
    #[must_use]
    pub fn kind(&self) -> FormulaErrorKind {
        match self {
            Self::TooLong { .. } => FormulaErrorKind::TooLong,
            Self::DisallowedFunction { .. } => FormulaErrorKind::DisallowedFunction,
            Self::ParseError { .. } => FormulaErrorKind::ParseError,
            Self::UnresolvedVariable { .. } => FormulaErrorKind::UnresolvedVariable,
            Self::NonNumericResult { .. } => FormulaErrorKind::NonNumericResult,
        }
    }

    /// Whether the formula text itself is at fault, independent of inputs
    #[inline]
    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            Self::TooLong { .. } | Self::DisallowedFunction { .. } | Self::ParseError { .. }
        )
    }

    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn non_numeric(detail: impl Into<String>) -> Self {
        Self::NonNumericResult {
            detail: detail.into(),
        }
    }
}

/// Result alias for formula operations
pub type Result<T> = std::result::Result<T, FormulaError>;
