//! Error types for stores and their collaborators

use lims_batch::ReconcileError;

/// Envelope code for success
pub const CODE_OK: i32 = 200;

/// Envelope code for an expired or missing session
pub const CODE_UNAUTHORIZED: i32 = 401;

/// Failure reported by the backend collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Request never produced a response
    #[error("transport error: {0}")]
    Transport(String),

    /// Envelope carried a non-success code
    #[error("backend error {code}: {message}")]
    Backend {
        /// Envelope code
        code: i32,
        /// Envelope message
        message: String,
    },

    /// Session is missing or expired
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Response did not have the expected shape
    #[error("undecodable response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Map an envelope failure code
    #[must_use]
    pub fn from_code(code: i32, message: impl Into<String>) -> Self {
        match code {
            CODE_UNAUTHORIZED => Self::Unauthorized(message.into()),
            code => Self::Backend {
                code,
                message: message.into(),
            },
        }
    }

    /// Check if retrying the same request might succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Store operation failure; local state is unchanged when one is returned
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// Backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Backend answered with a report that cannot be applied
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

impl StoreError {
    /// Check if the session needs to be re-established
    #[inline]
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(ApiError::Unauthorized(_)))
    }
}

/// Result alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
