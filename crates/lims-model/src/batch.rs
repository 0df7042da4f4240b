//! Batch request and report types
//!
//! Two layers:
//! - Wire types ([`BatchRequest`], [`WireBatchReport`], [`WireOutcome`]) mirror
//!   the batch endpoints exactly, including their loosely-typed outcome shape
//! - [`BatchReport`] is the normalized, index-aligned report whose outcome
//!   branch is a tagged union ([`ItemStatus`])

use serde::{Deserialize, Serialize};

/// How the backend treats failures inside one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Items are applied independently; mixed outcomes are normal
    #[default]
    Partial,
    /// All items succeed or none are applied
    Atomic,
}

impl FailureMode {
    /// Whether this is the all-or-nothing mode
    #[inline]
    #[must_use]
    pub fn is_atomic(&self) -> bool {
        matches!(self, Self::Atomic)
    }
}

impl std::fmt::Display for FailureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Partial => f.write_str("partial"),
            Self::Atomic => f.write_str("atomic"),
        }
    }
}

/// Body of a batch endpoint call: `{items, atomic?}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest<T> {
    /// Submitted items, in row order
    pub items: Vec<T>,
    /// All-or-nothing flag
    #[serde(default)]
    pub atomic: bool,
}

impl<T> BatchRequest<T> {
    /// Create new request
    #[inline]
    #[must_use]
    pub fn new(items: Vec<T>, mode: FailureMode) -> Self {
        Self {
            items,
            atomic: mode.is_atomic(),
        }
    }

    /// Failure mode of the request
    #[inline]
    #[must_use]
    pub fn mode(&self) -> FailureMode {
        if self.atomic {
            FailureMode::Atomic
        } else {
            FailureMode::Partial
        }
    }

    /// Number of submitted items
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing was submitted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One outcome exactly as the backend reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireOutcome<T> {
    /// Row of the submitted item; absent means "same as array position"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Whether the item was applied
    pub success: bool,
    /// Resulting record, for successes
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Failure reason, for failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> WireOutcome<T> {
    /// Successful outcome
    #[inline]
    #[must_use]
    pub fn ok(index: usize, data: Option<T>) -> Self {
        Self {
            index: Some(index),
            success: true,
            data,
            error: None,
        }
    }

    /// Failed outcome
    #[inline]
    #[must_use]
    pub fn err(index: usize, error: impl Into<String>) -> Self {
        Self {
            index: Some(index),
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Batch endpoint response: `{successCount, failureCount, results}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireBatchReport<T> {
    /// Server-claimed success count
    #[serde(default)]
    pub success_count: usize,
    /// Server-claimed failure count
    #[serde(default)]
    pub failure_count: usize,
    /// Outcomes in server order
    #[serde(default = "Vec::new")]
    pub results: Vec<WireOutcome<T>>,
}

impl<T> WireBatchReport<T> {
    /// Build report, deriving the counts from the outcomes
    #[must_use]
    pub fn from_results(results: Vec<WireOutcome<T>>) -> Self {
        let success_count = results.iter().filter(|r| r.success).count();
        Self {
            success_count,
            failure_count: results.len() - success_count,
            results,
        }
    }
}

/// Success/failure branch of one normalized outcome
#[derive(Debug, Clone, PartialEq)]
pub enum ItemStatus<T> {
    /// Item applied; `data` is the server's resulting record when returned
    Succeeded {
        /// Resulting record
        data: Option<T>,
    },
    /// Item not applied
    Failed {
        /// Reason shown next to the offending row
        error: String,
    },
}

/// Normalized outcome of one submitted item
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItemOutcome<T> {
    /// Row of the submitted item
    pub index: usize,
    /// What happened to it
    pub status: ItemStatus<T>,
}

impl<T> BatchItemOutcome<T> {
    /// Successful outcome
    #[inline]
    #[must_use]
    pub fn succeeded(index: usize, data: Option<T>) -> Self {
        Self {
            index,
            status: ItemStatus::Succeeded { data },
        }
    }

    /// Failed outcome
    #[inline]
    #[must_use]
    pub fn failed(index: usize, error: impl Into<String>) -> Self {
        Self {
            index,
            status: ItemStatus::Failed {
                error: error.into(),
            },
        }
    }

    /// Whether the item was applied
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.status, ItemStatus::Succeeded { .. })
    }

    /// Resulting record of a success
    #[inline]
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match &self.status {
            ItemStatus::Succeeded { data } => data.as_ref(),
            ItemStatus::Failed { .. } => None,
        }
    }

    /// Failure reason
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ItemStatus::Succeeded { .. } => None,
            ItemStatus::Failed { error } => Some(error),
        }
    }
}

/// Index-aligned report: exactly one outcome per submitted item
///
/// The counts are always derived from the outcomes, so
/// `success_count + failure_count == outcomes.len()` holds by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport<T> {
    success_count: usize,
    failure_count: usize,
    outcomes: Vec<BatchItemOutcome<T>>,
}

impl<T> BatchReport<T> {
    /// Build report from outcomes already ordered by index
    #[must_use]
    pub fn from_outcomes(outcomes: Vec<BatchItemOutcome<T>>) -> Self {
        let success_count = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            success_count,
            failure_count: outcomes.len() - success_count,
            outcomes,
        }
    }

    /// Number of applied items
    #[inline]
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.success_count
    }

    /// Number of rejected items
    #[inline]
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failure_count
    }

    /// Outcomes ordered by index
    #[inline]
    #[must_use]
    pub fn outcomes(&self) -> &[BatchItemOutcome<T>] {
        &self.outcomes
    }

    /// Number of outcomes (equals the submitted item count)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the report is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Whether every item was applied
    #[inline]
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failure_count == 0
    }

    /// Outcome for one submitted row
    #[inline]
    #[must_use]
    pub fn outcome(&self, index: usize) -> Option<&BatchItemOutcome<T>> {
        self.outcomes.get(index)
    }

    /// Consume into outcomes
    #[inline]
    #[must_use]
    pub fn into_outcomes(self) -> Vec<BatchItemOutcome<T>> {
        self.outcomes
    }
}
