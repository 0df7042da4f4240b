//! Generic collection store
//!
//! One store owns the visible page of one entity family plus the record
//! currently opened in a detail view. Reads hand out clones; every mutation
//! goes through a method that first awaits the backend and only then takes
//! the write lock, so the lock is never held across an `.await`.

use crate::api::PagedSource;
use crate::error::Result;
use lims_batch::CollectionState;
use lims_model::{Entity, PageQuery};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Whether a fetched page made it into state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page replaced the state
    Applied,
    /// A newer fetch was issued while this one was in flight; page discarded
    Superseded,
}

#[derive(Debug)]
pub(crate) struct StoreState<E> {
    pub(crate) collection: CollectionState<E>,
    pub(crate) current: Option<E>,
    pub(crate) filters: BTreeMap<String, String>,
}

/// Keeps the loading flag raised while alive
pub(crate) struct LoadingGuard<'a> {
    in_flight: &'a AtomicUsize,
}

impl<'a> LoadingGuard<'a> {
    fn new(in_flight: &'a AtomicUsize) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self { in_flight }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Owned, injectable store for one entity family
pub struct CollectionStore<E: Entity, A> {
    pub(crate) api: A,
    pub(crate) state: RwLock<StoreState<E>>,
    in_flight: AtomicUsize,
    fetch_seq: AtomicU64,
}

impl<E: Entity, A> CollectionStore<E, A> {
    /// Create store with an empty first page
    #[must_use]
    pub fn new(api: A, page_size: u32) -> Self {
        Self {
            api,
            state: RwLock::new(StoreState {
                collection: CollectionState::empty(page_size),
                current: None,
                filters: BTreeMap::new(),
            }),
            in_flight: AtomicUsize::new(0),
            fetch_seq: AtomicU64::new(0),
        }
    }

    /// Backend collaborator
    #[inline]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Copy of the visible page
    #[must_use]
    pub fn snapshot(&self) -> CollectionState<E> {
        self.state.read().collection.clone()
    }

    /// Record opened in the detail view
    #[must_use]
    pub fn current(&self) -> Option<E> {
        self.state.read().current.clone()
    }

    /// Whether any backend call is in flight
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Number of pages for the server-reported total
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.state.read().collection.total_pages()
    }

    /// Whether the visible page holds anything
    #[must_use]
    pub fn has_items(&self) -> bool {
        !self.state.read().collection.items.is_empty()
    }

    /// Move to another page; takes effect on the next [`refresh`](Self::refresh)
    pub fn set_page(&self, page: u32) {
        self.state.write().collection.page = page.max(1);
    }

    /// Change the page size and go back to page 1
    pub fn set_page_size(&self, page_size: u32) {
        let mut state = self.state.write();
        state.collection.page_size = page_size;
        state.collection.page = 1;
    }

    /// Drop everything, including the current record and filters
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.collection.clear();
        state.current = None;
        state.filters.clear();
    }

    pub(crate) fn loading(&self) -> LoadingGuard<'_> {
        LoadingGuard::new(&self.in_flight)
    }

    /// Apply a change to the current record when it has `id`
    pub(crate) fn update_current(state: &mut StoreState<E>, id: &E::Id, f: impl FnOnce(&mut Option<E>)) {
        if state.current.as_ref().is_some_and(|current| current.id() == id) {
            f(&mut state.current);
        }
    }
}

impl<E: Entity, A: PagedSource<E>> CollectionStore<E, A> {
    /// Fetch a page and replace the state with it
    ///
    /// Only the most recently issued fetch may write; an older response that
    /// arrives late is discarded.
    ///
    /// # Errors
    /// `StoreError::Api`; state is unchanged.
    pub async fn fetch(&self, query: PageQuery) -> Result<FetchOutcome> {
        let seq = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = self.loading();

        let page = self.api.list(&query).await?;

        // Checked under the write lock so a newer fetch cannot land in between
        let mut state = self.state.write();
        if self.fetch_seq.load(Ordering::SeqCst) != seq {
            tracing::warn!(kind = E::KIND, page = query.page, "discarding superseded page");
            return Ok(FetchOutcome::Superseded);
        }

        tracing::debug!(
            kind = E::KIND,
            page = page.page_index,
            items = page.items.len(),
            total = page.total,
            "page fetched"
        );
        state.collection.replace_with_page(page);
        state.filters = query.filters;
        Ok(FetchOutcome::Applied)
    }

    /// Fetch the current page again with the last filters
    ///
    /// # Errors
    /// `StoreError::Api`; state is unchanged.
    pub async fn refresh(&self) -> Result<FetchOutcome> {
        let query = {
            let state = self.state.read();
            PageQuery {
                page: state.collection.page,
                page_size: state.collection.page_size,
                filters: state.filters.clone(),
            }
        };
        self.fetch(query).await
    }

    /// Load one record into the detail view
    ///
    /// # Errors
    /// `StoreError::Api`; the current record is unchanged.
    pub async fn fetch_by_id(&self, id: &E::Id) -> Result<E> {
        let _loading = self.loading();
        let record = self.api.get(id).await?;
        self.state.write().current = Some(record.clone());
        Ok(record)
    }
}
