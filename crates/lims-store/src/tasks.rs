//! Task operations

use crate::api::{Ack, TaskApi};
use crate::error::Result;
use crate::store::CollectionStore;
use lims_batch::{BatchReconciler, BatchSummary};
use lims_model::{BatchRequest, FailureMode, Task, TaskCompletion, TaskId};

/// Store of workflow tasks
pub type TaskStore<A> = CollectionStore<Task, A>;

impl<A: TaskApi> CollectionStore<Task, A> {
    /// Complete one task and drop it from the list
    ///
    /// # Errors
    /// `StoreError::Api`; state is unchanged.
    pub async fn complete(&self, completion: &TaskCompletion) -> Result<()> {
        let _loading = self.loading();
        self.api.complete(completion).await?;

        tracing::info!(task = %completion.task_id, "task completed");
        let mut state = self.state.write();
        state.collection.remove(&completion.task_id);
        Self::update_current(&mut state, &completion.task_id, |current| *current = None);
        Ok(())
    }

    /// Complete many tasks; only the ones the backend completed leave the list
    ///
    /// # Errors
    /// `StoreError::Api` or `StoreError::Reconcile`; state is unchanged.
    pub async fn batch_complete(
        &self,
        completions: Vec<TaskCompletion>,
        mode: FailureMode,
    ) -> Result<BatchSummary<Ack>> {
        let _loading = self.loading();
        let ids: Vec<TaskId> = completions.iter().map(|c| c.task_id.clone()).collect();
        let request = BatchRequest::new(completions, mode);
        let wire = self.api.batch_complete(&request).await?;

        let mut state = self.state.write();
        let summary = BatchReconciler::new(mode).reconcile_delete(&mut state.collection, &ids, wire)?;
        if summary.applied {
            for outcome in summary.report.outcomes().iter().filter(|o| o.is_success()) {
                if let Some(id) = ids.get(outcome.index) {
                    Self::update_current(&mut state, id, |current| *current = None);
                }
            }
        }
        Ok(summary)
    }

    /// Assign a task to a user
    ///
    /// # Errors
    /// `StoreError::Api`; state is unchanged.
    pub async fn claim(&self, id: &TaskId, user_id: &str) -> Result<()> {
        let _loading = self.loading();
        self.api.claim(id, user_id).await?;

        tracing::info!(task = %id, user = user_id, "task claimed");
        let mut state = self.state.write();
        if let Some(task) = state.collection.find_mut(id) {
            task.assignee = Some(user_id.to_string());
        }
        Self::update_current(&mut state, id, |current| {
            if let Some(task) = current {
                task.assignee = Some(user_id.to_string());
            }
        });
        Ok(())
    }
}
