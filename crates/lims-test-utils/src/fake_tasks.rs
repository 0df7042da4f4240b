//! In-memory task backend; pages come back 0-based like the engine's

use async_trait::async_trait;
use lims_model::{BatchRequest, Page, PageQuery, Task, TaskCompletion, TaskId, WireBatchReport, WireOutcome};
use lims_store::{Ack, ApiError, ApiResponse, ContentPage, PagedSource, TaskApi};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct FakeTaskApi {
    tasks: Mutex<Vec<Task>>,
    rejected_ids: Mutex<HashSet<TaskId>>,
    completed: Mutex<Vec<TaskCompletion>>,
    offline: AtomicBool,
}

impl FakeTaskApi {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let api = Self::default();
        *api.tasks.lock() = tasks;
        api
    }

    /// Completing this task fails
    pub fn reject_id(&self, id: &str) {
        self.rejected_ids.lock().insert(TaskId::new(id));
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    /// Completions the backend accepted, in arrival order
    pub fn completed(&self) -> Vec<TaskCompletion> {
        self.completed.lock().clone()
    }

    fn gate(&self) -> Result<(), ApiError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    fn finish(&self, completion: &TaskCompletion) -> Result<(), String> {
        if self.rejected_ids.lock().contains(&completion.task_id) {
            return Err(format!("task {} failed validation", completion.task_id));
        }
        let mut tasks = self.tasks.lock();
        let before = tasks.len();
        tasks.retain(|t| t.id != completion.task_id);
        if tasks.len() == before {
            return Err(format!("task {} not found", completion.task_id));
        }
        self.completed.lock().push(completion.clone());
        Ok(())
    }
}

#[async_trait]
impl PagedSource<Task> for FakeTaskApi {
    async fn list(&self, query: &PageQuery) -> Result<Page<Task>, ApiError> {
        self.gate()?;
        let tasks = self.tasks.lock().clone();
        let size = query.page_size.max(1) as usize;
        let number = query.page.max(1) - 1;
        let envelope = ApiResponse::ok(ContentPage {
            total_elements: tasks.len() as u64,
            content: tasks.into_iter().skip(number as usize * size).take(size).collect(),
            number,
            size: None,
        });
        envelope.into_result().map(|page| page.into_page(query.page_size))
    }

    async fn get(&self, id: &TaskId) -> Result<Task, ApiError> {
        self.gate()?;
        let found = self.tasks.lock().iter().find(|t| &t.id == id).cloned();
        found.ok_or_else(|| ApiError::from_code(404, format!("task {id} not found")))
    }
}

#[async_trait]
impl TaskApi for FakeTaskApi {
    async fn complete(&self, completion: &TaskCompletion) -> Result<(), ApiError> {
        self.gate()?;
        self.finish(completion)
            .map_err(|message| ApiError::from_code(500, message))
    }

    async fn batch_complete(
        &self,
        request: &BatchRequest<TaskCompletion>,
    ) -> Result<WireBatchReport<Ack>, ApiError> {
        self.gate()?;
        if request.atomic {
            let rejected = self.rejected_ids.lock().clone();
            if let Some(index) = request.items.iter().position(|c| rejected.contains(&c.task_id)) {
                let results = (0..=index)
                    .map(|i| {
                        if i == index {
                            WireOutcome::err(i, "task failed validation")
                        } else {
                            WireOutcome::ok(i, None)
                        }
                    })
                    .collect();
                return Ok(WireBatchReport::from_results(results));
            }
        }

        let results = request
            .items
            .iter()
            .enumerate()
            .map(|(index, completion)| match self.finish(completion) {
                Ok(()) => WireOutcome::ok(index, None),
                Err(error) => WireOutcome::err(index, error),
            })
            .collect();
        Ok(WireBatchReport::from_results(results))
    }

    async fn claim(&self, id: &TaskId, user_id: &str) -> Result<(), ApiError> {
        self.gate()?;
        let mut tasks = self.tasks.lock();
        let task = tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| ApiError::from_code(404, format!("task {id} not found")))?;
        if let Some(owner) = task.assignee.as_deref().filter(|owner| *owner != user_id) {
            return Err(ApiError::from_code(400, format!("task {id} is claimed by {owner}")));
        }
        task.assignee = Some(user_id.to_string());
        Ok(())
    }
}
