//! Testing utilities for the LIMS workspace
//!
//! Fixtures plus in-memory backends implementing the store collaborator
//! traits.

#![allow(missing_docs)]

mod fake_samples;
mod fake_tasks;
mod fixtures;

pub use fake_samples::FakeSampleApi;
pub use fake_tasks::FakeTaskApi;
pub use fixtures::{
    create_draft, create_drafts, create_measurement_template, create_sample, create_samples,
    create_task, create_tasks,
};

use lims_store::{SampleStore, TaskStore};

/// Store over a backend seeded with `count` samples, not yet fetched
pub fn setup_sample_store(count: usize, page_size: u32) -> SampleStore<FakeSampleApi> {
    SampleStore::new(FakeSampleApi::with_samples(create_samples(count)), page_size)
}

/// Store over a backend seeded with `count` tasks, not yet fetched
pub fn setup_task_store(count: usize, page_size: u32) -> TaskStore<FakeTaskApi> {
    TaskStore::new(FakeTaskApi::with_tasks(create_tasks(count)), page_size)
}
