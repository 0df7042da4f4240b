//! Sample operations

use crate::api::{SampleApi, StatusBatchRequest};
use crate::error::Result;
use crate::store::CollectionStore;
use lims_batch::{BatchReconciler, BatchSummary};
use lims_model::{
    BatchRequest, FailureMode, Sample, SampleDraft, SampleId, SamplePatch, SampleStatus,
};

/// Store of samples
pub type SampleStore<A> = CollectionStore<Sample, A>;

impl<A: SampleApi> CollectionStore<Sample, A> {
    /// Create one sample and show it at the top of the page
    ///
    /// # Errors
    /// `StoreError::Api`; state is unchanged.
    pub async fn create(&self, draft: &SampleDraft) -> Result<Sample> {
        let _loading = self.loading();
        let created = self.api.create(draft).await?;

        tracing::info!(sample = %created.id, code = %created.sample_code, "sample created");
        self.state.write().collection.unshift(created.clone());
        Ok(created)
    }

    /// Update one sample in place, including the opened record
    ///
    /// # Errors
    /// `StoreError::Api`; state is unchanged.
    pub async fn update(&self, id: &SampleId, patch: &SamplePatch) -> Result<Sample> {
        let _loading = self.loading();
        let updated = self.api.update(id, patch).await?;

        let mut state = self.state.write();
        state.collection.replace(updated.clone());
        Self::update_current(&mut state, id, |current| *current = Some(updated.clone()));
        Ok(updated)
    }

    /// Delete one sample
    ///
    /// # Errors
    /// `StoreError::Api`; state is unchanged.
    pub async fn delete(&self, id: &SampleId) -> Result<()> {
        let _loading = self.loading();
        self.api.delete(id).await?;

        tracing::info!(sample = %id, "sample deleted");
        let mut state = self.state.write();
        state.collection.remove(id);
        Self::update_current(&mut state, id, |current| *current = None);
        Ok(())
    }

    /// Create many samples
    ///
    /// # Errors
    /// `StoreError::Api` or `StoreError::Reconcile`; state is unchanged.
    pub async fn batch_create(
        &self,
        drafts: Vec<SampleDraft>,
        mode: FailureMode,
    ) -> Result<BatchSummary<Sample>> {
        let _loading = self.loading();
        let request = BatchRequest::new(drafts, mode);
        let wire = self.api.batch_create(&request).await?;

        let mut state = self.state.write();
        let summary = BatchReconciler::new(mode).reconcile_create(
            &mut state.collection,
            request.len(),
            wire,
        )?;
        Ok(summary)
    }

    /// Set the status of many samples
    ///
    /// # Errors
    /// `StoreError::Api` or `StoreError::Reconcile`; state is unchanged.
    pub async fn batch_update_status(
        &self,
        ids: Vec<SampleId>,
        status: SampleStatus,
        mode: FailureMode,
    ) -> Result<BatchSummary<crate::api::Ack>> {
        let _loading = self.loading();
        let request = StatusBatchRequest::new(ids, status, mode);
        let wire = self.api.batch_update_status(&request).await?;

        let mut state = self.state.write();
        let summary = BatchReconciler::new(mode).reconcile_status(
            &mut state.collection,
            &request.sample_ids,
            &status,
            wire,
        )?;

        if summary.applied {
            for outcome in summary.report.outcomes().iter().filter(|o| o.is_success()) {
                if let Some(id) = request.sample_ids.get(outcome.index) {
                    Self::update_current(&mut state, id, |current| {
                        if let Some(sample) = current {
                            sample.status = status;
                        }
                    });
                }
            }
        }
        Ok(summary)
    }

    /// Delete many samples
    ///
    /// # Errors
    /// `StoreError::Api` or `StoreError::Reconcile`; state is unchanged.
    pub async fn batch_delete(
        &self,
        ids: Vec<SampleId>,
        mode: FailureMode,
    ) -> Result<BatchSummary<crate::api::Ack>> {
        let _loading = self.loading();
        let request = BatchRequest::new(ids, mode);
        let wire = self.api.batch_delete(&request).await?;

        let mut state = self.state.write();
        let summary =
            BatchReconciler::new(mode).reconcile_delete(&mut state.collection, &request.items, wire)?;

        if summary.applied {
            for outcome in summary.report.outcomes().iter().filter(|o| o.is_success()) {
                if let Some(id) = request.items.get(outcome.index) {
                    Self::update_current(&mut state, id, |current| *current = None);
                }
            }
        }
        Ok(summary)
    }
}
