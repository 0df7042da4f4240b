//! Sample store flows against the in-memory backend

use lims_model::{FailureMode, PageQuery, SampleId, SamplePatch, SampleStatus};
use lims_store::{ApiError, FetchOutcome, SampleStore, StoreError};
use lims_test_utils::{create_draft, create_drafts, create_samples, setup_sample_store, FakeSampleApi};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn ids(store: &SampleStore<FakeSampleApi>) -> Vec<String> {
    store
        .snapshot()
        .items
        .iter()
        .map(|s| s.id.to_string())
        .collect()
}

#[tokio::test]
async fn fetch_fills_the_page() {
    let store = setup_sample_store(25, 10);
    assert!(!store.has_items());

    let outcome = store.fetch(PageQuery::new(2, 10)).await.unwrap();
    assert_eq!(outcome, FetchOutcome::Applied);

    let state = store.snapshot();
    assert_eq!(state.items.len(), 10);
    assert_eq!(state.items[0].id, SampleId::new("s-11"));
    assert_eq!(state.total, 25);
    assert_eq!(state.page, 2);
    assert_eq!(store.total_pages(), 3);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn refresh_reuses_the_last_filters() {
    let mut samples = create_samples(6);
    samples[1].status = SampleStatus::Completed;
    samples[4].status = SampleStatus::Completed;
    let store = SampleStore::new(FakeSampleApi::with_samples(samples), 10);

    store
        .fetch(PageQuery::new(1, 10).with_filter("status", "completed"))
        .await
        .unwrap();
    assert_eq!(ids(&store), vec!["s-2", "s-5"]);

    store.refresh().await.unwrap();
    assert_eq!(ids(&store), vec!["s-2", "s-5"]);
    assert_eq!(store.snapshot().total, 2);
}

#[tokio::test]
async fn create_prepends_and_keeps_the_page_size() {
    let store = setup_sample_store(3, 3);
    store.refresh().await.unwrap();

    let created = store.create(&create_draft("fresh")).await.unwrap();
    assert_eq!(created.sample_name, "fresh");

    let state = store.snapshot();
    assert_eq!(state.items.len(), 3);
    assert_eq!(state.items[0], created);
    assert_eq!(state.total, 4);
}

#[tokio::test]
async fn update_replaces_list_entry_and_current_record() {
    let store = setup_sample_store(3, 10);
    store.refresh().await.unwrap();
    store.fetch_by_id(&SampleId::new("s-2")).await.unwrap();

    let patch = SamplePatch {
        sample_name: Some("renamed".to_string()),
        ..SamplePatch::default()
    };
    store.update(&SampleId::new("s-2"), &patch).await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.items[1].sample_name, "renamed");
    assert_eq!(store.current().map(|s| s.sample_name).as_deref(), Some("renamed"));
}

#[tokio::test]
async fn delete_removes_and_clears_the_detail_view() {
    let store = setup_sample_store(3, 10);
    store.refresh().await.unwrap();
    store.fetch_by_id(&SampleId::new("s-3")).await.unwrap();

    store.delete(&SampleId::new("s-3")).await.unwrap();

    assert_eq!(ids(&store), vec!["s-1", "s-2"]);
    assert_eq!(store.snapshot().total, 2);
    assert_eq!(store.current(), None);
    assert_eq!(store.api().stored().len(), 2);
}

#[tokio::test]
async fn partial_batch_create_applies_the_successes() {
    let store = setup_sample_store(2, 10);
    store.refresh().await.unwrap();
    store.api().reject_name("dup");

    let summary = store
        .batch_create(create_drafts(&["a", "dup", "c"]), FailureMode::Partial)
        .await
        .unwrap();

    assert!(summary.applied);
    assert_eq!(summary.success_count(), 2);
    assert_eq!(summary.failure_count(), 1);
    assert_eq!(
        summary.failures.get(&1).map(String::as_str),
        Some("sample name 'dup' already exists")
    );

    let state = store.snapshot();
    let names: Vec<&str> = state.items.iter().map(|s| s.sample_name.as_str()).collect();
    assert_eq!(names, vec!["a", "c", "sample 1", "sample 2"]);
    assert_eq!(state.total, 4);
}

#[tokio::test]
async fn batch_create_onto_a_full_page_shows_the_new_samples() {
    let store = setup_sample_store(3, 3);
    store.refresh().await.unwrap();
    store.api().reject_name("dup");

    store
        .batch_create(create_drafts(&["a", "dup", "c"]), FailureMode::Partial)
        .await
        .unwrap();

    let state = store.snapshot();
    let names: Vec<&str> = state.items.iter().map(|s| s.sample_name.as_str()).collect();
    assert_eq!(names, vec!["a", "c", "sample 1"]);
    assert_eq!(state.total, 5);
}

#[tokio::test]
async fn atomic_batch_create_changes_nothing_on_failure() {
    let store = setup_sample_store(2, 10);
    store.refresh().await.unwrap();
    store.api().reject_name("dup");
    let before = store.snapshot();

    let summary = store
        .batch_create(create_drafts(&["a", "dup", "c"]), FailureMode::Atomic)
        .await
        .unwrap();

    assert!(!summary.applied);
    assert_eq!(summary.success_count(), 0);
    assert_eq!(summary.failure_count(), 3);
    assert_eq!(
        summary.failures.get(&0).map(String::as_str),
        Some("rolled back: row 1 failed (sample name 'dup' already exists)")
    );
    assert_eq!(store.snapshot(), before);
    assert_eq!(store.api().stored().len(), 2);
}

#[tokio::test]
async fn batch_status_updates_succeeded_rows_only() {
    let store = setup_sample_store(3, 10);
    store.refresh().await.unwrap();
    store.fetch_by_id(&SampleId::new("s-1")).await.unwrap();
    store.api().reject_id("s-2");

    let summary = store
        .batch_update_status(
            vec![SampleId::new("s-1"), SampleId::new("s-2"), SampleId::new("s-9")],
            SampleStatus::InProgress,
            FailureMode::Partial,
        )
        .await
        .unwrap();

    assert_eq!(summary.success_count(), 2);
    let statuses: Vec<SampleStatus> = store.snapshot().items.iter().map(|s| s.status).collect();
    assert_eq!(
        statuses,
        vec![SampleStatus::InProgress, SampleStatus::Pending, SampleStatus::Pending]
    );
    assert_eq!(store.current().map(|s| s.status), Some(SampleStatus::InProgress));
}

#[tokio::test]
async fn atomic_batch_delete_keeps_everything_on_failure() {
    let store = setup_sample_store(3, 10);
    store.refresh().await.unwrap();
    store.api().reject_id("s-3");

    let summary = store
        .batch_delete(
            vec![SampleId::new("s-1"), SampleId::new("s-3")],
            FailureMode::Atomic,
        )
        .await
        .unwrap();
    assert!(!summary.applied);
    assert_eq!(ids(&store), vec!["s-1", "s-2", "s-3"]);

    let summary = store
        .batch_delete(
            vec![SampleId::new("s-1"), SampleId::new("s-3")],
            FailureMode::Partial,
        )
        .await
        .unwrap();
    assert!(summary.applied);
    assert_eq!(ids(&store), vec!["s-2", "s-3"]);
    assert_eq!(store.snapshot().total, 2);
}

#[tokio::test]
async fn failed_calls_leave_state_alone() {
    let store = setup_sample_store(3, 10);
    store.refresh().await.unwrap();
    let before = store.snapshot();
    store.api().go_offline();

    let error = store.create(&create_draft("x")).await.unwrap_err();
    assert!(matches!(error, StoreError::Api(ApiError::Transport(_))));
    assert!(!error.is_unauthorized());

    assert!(store.refresh().await.is_err());
    assert!(store
        .batch_delete(vec![SampleId::new("s-1")], FailureMode::Partial)
        .await
        .is_err());

    assert_eq!(store.snapshot(), before);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn expired_session_is_reported_as_unauthorized() {
    let store = setup_sample_store(3, 10);
    store.api().expire_session();

    let error = store.refresh().await.unwrap_err();
    assert!(error.is_unauthorized());
    assert!(!store.has_items());
}

#[tokio::test]
async fn late_response_of_an_older_fetch_is_discarded() {
    let store = setup_sample_store(30, 10);
    store
        .api()
        .delay_lists([Duration::from_millis(150), Duration::from_millis(0)]);

    let (slow, fast) = tokio::join!(
        store.fetch(PageQuery::new(1, 10)),
        store.fetch(PageQuery::new(3, 10)),
    );

    assert_eq!(slow.unwrap(), FetchOutcome::Superseded);
    assert_eq!(fast.unwrap(), FetchOutcome::Applied);
    let state = store.snapshot();
    assert_eq!(state.page, 3);
    assert_eq!(state.items[0].id, SampleId::new("s-21"));
    assert!(!store.is_loading());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stale_page_never_overwrites_a_newer_one_across_threads() {
    for _ in 0..20 {
        let store = Arc::new(setup_sample_store(30, 10));
        store
            .api()
            .delay_lists([Duration::from_millis(20), Duration::from_millis(0)]);

        let slow = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.fetch(PageQuery::new(1, 10)).await }
        });
        while !store.is_loading() {
            tokio::task::yield_now().await;
        }
        let fast = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.fetch(PageQuery::new(3, 10)).await }
        });

        assert_eq!(fast.await.unwrap().unwrap(), FetchOutcome::Applied);
        assert_eq!(slow.await.unwrap().unwrap(), FetchOutcome::Superseded);
        assert_eq!(store.snapshot().page, 3);
        assert_eq!(store.snapshot().items[0].id, SampleId::new("s-21"));
    }
}

#[tokio::test]
async fn page_size_change_goes_back_to_the_first_page() {
    let store = setup_sample_store(30, 10);
    store.fetch(PageQuery::new(3, 10)).await.unwrap();

    store.set_page_size(5);
    store.refresh().await.unwrap();
    let state = store.snapshot();
    assert_eq!((state.page, state.page_size, state.items.len()), (1, 5, 5));

    store.reset();
    assert!(!store.has_items());
    assert_eq!(store.snapshot().total, 0);
}
