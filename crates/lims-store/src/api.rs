//! Backend collaborator traits
//!
//! Transport is somebody else's job; implementations translate their wire
//! envelopes into these canonical shapes (see [`crate::envelope`]).

use crate::error::ApiError;
use lims_model::{
    BatchRequest, Entity, FailureMode, Page, PageQuery, Sample, SampleDraft, SampleId,
    SamplePatch, SampleStatus, Task, TaskCompletion, TaskId, WireBatchReport,
};
use serde::{Deserialize, Serialize};

/// Outcome payload of batches whose successes carry nothing the client uses
pub type Ack = serde_json::Value;

/// Paged listing and lookup of one entity family
#[async_trait::async_trait]
pub trait PagedSource<E: Entity>: Send + Sync {
    /// One page of records
    async fn list(&self, query: &PageQuery) -> Result<Page<E>, ApiError>;

    /// One record by id
    async fn get(&self, id: &E::Id) -> Result<E, ApiError>;
}

/// Body of the batch status endpoint: `{sampleIds, status, atomic}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBatchRequest {
    /// Samples to update, in row order
    pub sample_ids: Vec<SampleId>,
    /// New status
    pub status: SampleStatus,
    /// All-or-nothing flag
    #[serde(default)]
    pub atomic: bool,
}

impl StatusBatchRequest {
    /// Create new request
    #[must_use]
    pub fn new(sample_ids: Vec<SampleId>, status: SampleStatus, mode: FailureMode) -> Self {
        Self {
            sample_ids,
            status,
            atomic: mode.is_atomic(),
        }
    }
}

/// Sample endpoints
#[async_trait::async_trait]
pub trait SampleApi: PagedSource<Sample> {
    /// Create one sample
    async fn create(&self, draft: &SampleDraft) -> Result<Sample, ApiError>;

    /// Update one sample
    async fn update(&self, id: &SampleId, patch: &SamplePatch) -> Result<Sample, ApiError>;

    /// Delete one sample
    async fn delete(&self, id: &SampleId) -> Result<(), ApiError>;

    /// Create many samples
    async fn batch_create(
        &self,
        request: &BatchRequest<SampleDraft>,
    ) -> Result<WireBatchReport<Sample>, ApiError>;

    /// Set the status of many samples
    async fn batch_update_status(
        &self,
        request: &StatusBatchRequest,
    ) -> Result<WireBatchReport<Ack>, ApiError>;

    /// Delete many samples
    async fn batch_delete(
        &self,
        request: &BatchRequest<SampleId>,
    ) -> Result<WireBatchReport<Ack>, ApiError>;
}

/// Workflow task endpoints
#[async_trait::async_trait]
pub trait TaskApi: PagedSource<Task> {
    /// Complete one task with its form data
    async fn complete(&self, completion: &TaskCompletion) -> Result<(), ApiError>;

    /// Complete many tasks
    async fn batch_complete(
        &self,
        request: &BatchRequest<TaskCompletion>,
    ) -> Result<WireBatchReport<Ack>, ApiError>;

    /// Assign a task to a user
    async fn claim(&self, id: &TaskId, user_id: &str) -> Result<(), ApiError>;
}
