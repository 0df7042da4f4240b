//! LIMS Batch
//!
//! Reconciles batch create / status-update / delete results against the
//! locally held page of records, so the list reflects the backend without a
//! refetch.
//!
//! # Overview
//!
//! - **CollectionState**: items on the current page plus the paging context
//! - **BatchReconciler**: normalizes a wire report into one outcome per
//!   submitted row, then applies the successes
//!
//! Under [`FailureMode::Atomic`](lims_model::FailureMode::Atomic) one failed
//! row means no row is applied and every row is reported failed. Under
//! `Partial` each row stands on its own.
//!
//! # Example
//!
//! ```rust
//! use lims_batch::{BatchReconciler, CollectionState};
//! use lims_model::{FailureMode, Sample, WireBatchReport, WireOutcome};
//!
//! let mut state: CollectionState<Sample> = CollectionState::empty(20);
//! let wire: WireBatchReport<Sample> = WireBatchReport::from_results(vec![
//!     WireOutcome::err(0, "duplicate sample code"),
//! ]);
//!
//! let summary = BatchReconciler::new(FailureMode::Partial)
//!     .reconcile_create(&mut state, 1, wire)
//!     .unwrap();
//!
//! assert_eq!(summary.failure_count(), 1);
//! assert!(state.items.is_empty());
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod reconciler;
pub mod state;

// Re-exports
pub use error::{ReconcileError, Result};
pub use reconciler::{BatchReconciler, BatchSummary, NO_OUTCOME};
pub use state::CollectionState;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
