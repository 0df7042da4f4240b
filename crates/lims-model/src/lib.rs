//! LIMS Model
//!
//! Shared data model for the sample-tracking client.
//!
//! # Overview
//!
//! - **Entities**: [`Sample`] and [`Task`] records mirrored from the backend,
//!   addressed by typed ids ([`SampleId`], [`TaskId`])
//! - **Field specs**: [`FieldSpec`] / [`FieldType`] / [`ValidationRule`] as
//!   declared by node templates
//! - **Batches**: wire-level batch requests and reports plus the
//!   index-aligned [`BatchReport`] the reconciler produces
//! - **Pages**: the canonical [`Page`] every pagination envelope is
//!   translated into
//!
//! # Example
//!
//! ```rust
//! use lims_model::{BatchItemOutcome, BatchReport};
//!
//! let report: BatchReport<u32> = BatchReport::from_outcomes(vec![
//!     BatchItemOutcome::succeeded(0, Some(7)),
//!     BatchItemOutcome::failed(1, "duplicate sample code"),
//! ]);
//!
//! assert_eq!(report.success_count(), 1);
//! assert_eq!(report.failure_count(), 1);
//! ```

#![warn(missing_docs)]

pub mod batch;
pub mod entity;
pub mod field;
pub mod page;
pub mod sample;
pub mod task;

// Re-exports
pub use batch::{
    BatchItemOutcome, BatchReport, BatchRequest, FailureMode, ItemStatus, WireBatchReport,
    WireOutcome,
};
pub use entity::{Entity, HasStatus};
pub use field::{FieldOption, FieldSpec, FieldType, ValidationRule};
pub use page::{Page, PageQuery};
pub use sample::{Sample, SampleDraft, SampleId, SamplePatch, SampleStatus, SampleType};
pub use task::{Task, TaskCompletion, TaskId};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the LIMS model
    pub use crate::{
        BatchItemOutcome, BatchReport, BatchRequest, Entity, FailureMode, FieldSpec, FieldType,
        HasStatus, ItemStatus, Page, PageQuery, Sample, SampleId, SampleStatus, Task, TaskId,
        ValidationRule,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
