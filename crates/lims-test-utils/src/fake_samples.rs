//! In-memory sample backend
//!
//! Answers through the same envelopes a real adapter decodes, so store
//! tests exercise the wire translation too.

use async_trait::async_trait;
use lims_model::{
    BatchRequest, Page, PageQuery, Sample, SampleDraft, SampleId, SamplePatch, WireBatchReport,
    WireOutcome,
};
use lims_store::{Ack, ApiError, ApiResponse, PagedSource, RecordsPage, SampleApi, StatusBatchRequest};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct FakeSampleApi {
    samples: Mutex<Vec<Sample>>,
    next_id: AtomicUsize,
    rejected_names: Mutex<HashSet<String>>,
    rejected_ids: Mutex<HashSet<SampleId>>,
    list_delays: Mutex<VecDeque<Duration>>,
    offline: AtomicBool,
    session_expired: AtomicBool,
}

impl FakeSampleApi {
    /// Backend holding `samples`, newest first
    pub fn with_samples(samples: Vec<Sample>) -> Self {
        let api = Self::default();
        api.next_id.store(samples.len() + 1000, Ordering::SeqCst);
        *api.samples.lock() = samples;
        api
    }

    /// Creating a draft with this name fails
    pub fn reject_name(&self, name: &str) {
        self.rejected_names.lock().insert(name.to_string());
    }

    /// Updating or deleting this id fails
    pub fn reject_id(&self, id: &str) {
        self.rejected_ids.lock().insert(SampleId::new(id));
    }

    /// Delay the next `list` calls, one entry per call
    pub fn delay_lists(&self, delays: impl IntoIterator<Item = Duration>) {
        self.list_delays.lock().extend(delays);
    }

    /// Every call fails at the transport level
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    /// Every call answers with code 401
    pub fn expire_session(&self) {
        self.session_expired.store(true, Ordering::SeqCst);
    }

    pub fn stored(&self) -> Vec<Sample> {
        self.samples.lock().clone()
    }

    fn gate(&self) -> Result<(), ApiError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        if self.session_expired.load(Ordering::SeqCst) {
            return ApiResponse::<()>::failure(401, "token expired").into_data().map(drop);
        }
        Ok(())
    }

    fn materialize(&self, draft: &SampleDraft) -> Sample {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut sample = crate::create_sample(n);
        sample.sample_name = draft.sample_name.clone();
        sample.project_id = draft.project_id.clone();
        sample.sample_type = draft.sample_type;
        sample.container_id = draft.container_id.clone();
        sample.position = draft.position.clone();
        sample
    }

    fn draft_error(&self, draft: &SampleDraft) -> Option<String> {
        self.rejected_names
            .lock()
            .contains(&draft.sample_name)
            .then(|| format!("sample name '{}' already exists", draft.sample_name))
    }

    fn id_error(&self, id: &SampleId) -> Option<String> {
        self.rejected_ids
            .lock()
            .contains(id)
            .then(|| format!("sample {id} is locked"))
    }
}

/// Outcomes of an id-addressed batch; atomic batches stop at the first failure
/// and apply nothing
fn id_batch(
    ids: &[SampleId],
    atomic: bool,
    error_for: impl Fn(&SampleId) -> Option<String>,
    mut apply: impl FnMut(&[&SampleId]),
) -> WireBatchReport<Ack> {
    let mut results = Vec::new();
    let mut succeeded = Vec::new();
    for (index, id) in ids.iter().enumerate() {
        match error_for(id) {
            Some(error) => {
                results.push(WireOutcome::err(index, error));
                if atomic {
                    return WireBatchReport::from_results(results);
                }
            }
            None => {
                results.push(WireOutcome::ok(index, None));
                succeeded.push(id);
            }
        }
    }
    apply(&succeeded);
    WireBatchReport::from_results(results)
}

#[async_trait]
impl PagedSource<Sample> for FakeSampleApi {
    async fn list(&self, query: &PageQuery) -> Result<Page<Sample>, ApiError> {
        let delay = self.list_delays.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.gate()?;

        let status = query.filters.get("status").cloned();
        let matching: Vec<Sample> = self
            .samples
            .lock()
            .iter()
            .filter(|s| status.as_deref().map_or(true, |st| s.status.as_str() == st))
            .cloned()
            .collect();

        let size = query.page_size.max(1) as usize;
        let skip = (query.page.max(1) as usize - 1) * size;
        let envelope = ApiResponse::ok(RecordsPage {
            total: matching.len() as u64,
            records: matching.into_iter().skip(skip).take(size).collect(),
            current: query.page.max(1),
            size: query.page_size,
        });
        envelope.into_result().map(Page::from)
    }

    async fn get(&self, id: &SampleId) -> Result<Sample, ApiError> {
        self.gate()?;
        let found = self.samples.lock().iter().find(|s| &s.id == id).cloned();
        let envelope = match found {
            Some(sample) => ApiResponse::ok(sample),
            None => ApiResponse::failure(404, format!("sample {id} not found")),
        };
        envelope.into_result()
    }
}

#[async_trait]
impl SampleApi for FakeSampleApi {
    async fn create(&self, draft: &SampleDraft) -> Result<Sample, ApiError> {
        self.gate()?;
        if let Some(error) = self.draft_error(draft) {
            return ApiResponse::<Sample>::failure(500, error).into_result();
        }
        let sample = self.materialize(draft);
        self.samples.lock().insert(0, sample.clone());
        ApiResponse::ok(sample).into_result()
    }

    async fn update(&self, id: &SampleId, patch: &SamplePatch) -> Result<Sample, ApiError> {
        self.gate()?;
        if let Some(error) = self.id_error(id) {
            return ApiResponse::<Sample>::failure(500, error).into_result();
        }
        let mut samples = self.samples.lock();
        let Some(sample) = samples.iter_mut().find(|s| &s.id == id) else {
            return ApiResponse::<Sample>::failure(404, format!("sample {id} not found")).into_result();
        };
        if let Some(name) = &patch.sample_name {
            sample.sample_name = name.clone();
        }
        if let Some(status) = patch.status {
            sample.status = status;
        }
        if let Some(container) = &patch.container_id {
            sample.container_id = Some(container.clone());
        }
        if let Some(position) = &patch.position {
            sample.position = Some(position.clone());
        }
        ApiResponse::ok(sample.clone()).into_result()
    }

    async fn delete(&self, id: &SampleId) -> Result<(), ApiError> {
        self.gate()?;
        if let Some(error) = self.id_error(id) {
            return ApiResponse::<()>::failure(500, error).into_data().map(drop);
        }
        self.samples.lock().retain(|s| &s.id != id);
        Ok(())
    }

    async fn batch_create(
        &self,
        request: &BatchRequest<SampleDraft>,
    ) -> Result<WireBatchReport<Sample>, ApiError> {
        self.gate()?;
        let mut results = Vec::new();
        let mut created = Vec::new();
        for (index, draft) in request.items.iter().enumerate() {
            match self.draft_error(draft) {
                Some(error) => {
                    results.push(WireOutcome::err(index, error));
                    if request.atomic {
                        return ApiResponse::ok(WireBatchReport::from_results(results)).into_result();
                    }
                }
                None => {
                    let sample = self.materialize(draft);
                    created.push(sample.clone());
                    results.push(WireOutcome::ok(index, Some(sample)));
                }
            }
        }
        let mut samples = self.samples.lock();
        for sample in created {
            samples.insert(0, sample);
        }
        ApiResponse::ok(WireBatchReport::from_results(results)).into_result()
    }

    async fn batch_update_status(
        &self,
        request: &StatusBatchRequest,
    ) -> Result<WireBatchReport<Ack>, ApiError> {
        self.gate()?;
        let report = id_batch(
            &request.sample_ids,
            request.atomic,
            |id| self.id_error(id),
            |ids| {
                for sample in self.samples.lock().iter_mut() {
                    if ids.contains(&&sample.id) {
                        sample.status = request.status;
                    }
                }
            },
        );
        ApiResponse::ok(report).into_result()
    }

    async fn batch_delete(
        &self,
        request: &BatchRequest<SampleId>,
    ) -> Result<WireBatchReport<Ack>, ApiError> {
        self.gate()?;
        let report = id_batch(
            &request.items,
            request.atomic,
            |id| self.id_error(id),
            |ids| self.samples.lock().retain(|s| !ids.contains(&&s.id)),
        );
        ApiResponse::ok(report).into_result()
    }
}
