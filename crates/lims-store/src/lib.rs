//! LIMS Store
//!
//! Injectable collection stores that keep the visible page of samples or
//! tasks in step with the backend.
//!
//! # Overview
//!
//! - **CollectionStore**: snapshot reads, one async method per mutation;
//!   [`SampleStore`] and [`TaskStore`] are its two instantiations
//! - **Collaborators**: [`PagedSource`], [`SampleApi`], [`TaskApi`] abstract
//!   the backend; [`envelope`] holds the wire shapes adapters decode
//! - **Configuration**: [`ClientConfig`] from TOML
//! - **Local storage**: [`ClientStorage`] over memory or a JSON file
//!
//! A failed call leaves state exactly as it was and always clears the
//! loading flag.
//!
//! # Example
//!
//! ```rust,ignore
//! use lims_model::{FailureMode, PageQuery, SampleDraft, SampleType};
//! use lims_store::SampleStore;
//!
//! let store = SampleStore::new(api, 20);
//! store.fetch(PageQuery::new(1, 20)).await?;
//!
//! let drafts = vec![SampleDraft::new("S-1", "p-1", SampleType::PlasmidPlate)];
//! let summary = store.batch_create(drafts, FailureMode::Atomic).await?;
//! println!("{} created, {} failed", summary.success_count(), summary.failure_count());
//! ```

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod envelope;
pub mod error;
mod samples;
pub mod storage;
pub mod store;
mod tasks;

// Re-exports
pub use api::{Ack, PagedSource, SampleApi, StatusBatchRequest, TaskApi};
pub use config::{ClientConfig, ConfigError};
pub use envelope::{ApiResponse, ContentPage, RecordsPage};
pub use error::{ApiError, Result, StoreError};
pub use samples::SampleStore;
pub use storage::{ClientStorage, JsonFileStorage, KeyValueStore, MemoryStorage, StorageError};
pub use store::{CollectionStore, FetchOutcome};
pub use tasks::TaskStore;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with stores
    pub use crate::{
        ApiError, ClientConfig, CollectionStore, FetchOutcome, PagedSource, SampleApi,
        SampleStore, StoreError, TaskApi, TaskStore,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
