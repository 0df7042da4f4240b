//! Reconciliation errors

/// Batch report that cannot be aligned with the submitted items
///
/// State is never touched when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// Report shape is inconsistent with the request
    #[error("malformed batch report: {0}")]
    MalformedReport(String),
}

impl ReconcileError {
    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedReport(detail.into())
    }
}

/// Result alias for reconciliation
pub type Result<T> = std::result::Result<T, ReconcileError>;
