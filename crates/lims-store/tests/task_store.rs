//! Task store flows against the in-memory backend

use lims_model::{FailureMode, PageQuery, TaskCompletion, TaskId};
use lims_store::ApiError;
use lims_store::StoreError;
use lims_test_utils::setup_task_store;
use pretty_assertions::assert_eq;
use serde_json::json;

fn completion(id: &str) -> TaskCompletion {
    TaskCompletion::new(TaskId::new(id)).with_value("concentration", json!(120.5))
}

#[tokio::test]
async fn zero_based_pages_are_shown_one_based() {
    let store = setup_task_store(7, 5);
    store.fetch(PageQuery::new(2, 5)).await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.page, 2);
    assert_eq!(state.total, 7);
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.items[0].id, TaskId::new("t-6"));
}

#[tokio::test]
async fn completing_removes_the_task() {
    let store = setup_task_store(3, 10);
    store.refresh().await.unwrap();
    store.fetch_by_id(&TaskId::new("t-2")).await.unwrap();

    store.complete(&completion("t-2")).await.unwrap();

    let ids: Vec<TaskId> = store.snapshot().items.into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![TaskId::new("t-1"), TaskId::new("t-3")]);
    assert_eq!(store.current(), None);
    assert_eq!(store.api().completed(), vec![completion("t-2")]);
}

#[tokio::test]
async fn batch_complete_removes_only_finished_tasks() {
    let store = setup_task_store(4, 10);
    store.refresh().await.unwrap();
    store.api().reject_id("t-3");

    let summary = store
        .batch_complete(
            vec![completion("t-1"), completion("t-3"), completion("t-4")],
            FailureMode::Partial,
        )
        .await
        .unwrap();

    assert_eq!(summary.success_count(), 2);
    assert_eq!(summary.failures.keys().copied().collect::<Vec<_>>(), vec![1]);
    let ids: Vec<TaskId> = store.snapshot().items.into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![TaskId::new("t-2"), TaskId::new("t-3")]);
    assert_eq!(store.snapshot().total, 2);
}

#[tokio::test]
async fn atomic_batch_complete_rolls_back() {
    let store = setup_task_store(3, 10);
    store.refresh().await.unwrap();
    store.api().reject_id("t-2");
    let before = store.snapshot();

    let summary = store
        .batch_complete(vec![completion("t-1"), completion("t-2")], FailureMode::Atomic)
        .await
        .unwrap();

    assert!(!summary.applied);
    assert_eq!(summary.failure_count(), 2);
    assert_eq!(store.snapshot(), before);
    assert!(store.api().completed().is_empty());
}

#[tokio::test]
async fn claim_sets_the_assignee() {
    let store = setup_task_store(2, 10);
    store.refresh().await.unwrap();
    store.fetch_by_id(&TaskId::new("t-1")).await.unwrap();

    store.claim(&TaskId::new("t-1"), "alice").await.unwrap();

    assert_eq!(store.snapshot().items[0].assignee.as_deref(), Some("alice"));
    assert_eq!(
        store.current().and_then(|t| t.assignee).as_deref(),
        Some("alice")
    );

    let error = store.claim(&TaskId::new("t-1"), "bob").await.unwrap_err();
    assert!(matches!(
        error,
        StoreError::Api(ApiError::Backend { code: 400, .. })
    ));
    assert_eq!(store.snapshot().items[0].assignee.as_deref(), Some("alice"));
}

#[tokio::test]
async fn offline_backend_fails_without_touching_state() {
    let store = setup_task_store(2, 10);
    store.refresh().await.unwrap();
    store.api().go_offline();

    assert!(store.complete(&completion("t-1")).await.is_err());
    assert_eq!(store.snapshot().items.len(), 2);
    assert!(!store.is_loading());
}
