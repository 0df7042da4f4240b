//! Batch reconciliation
//!
//! A batch response is first normalized into an index-aligned
//! [`BatchReport`]: exactly one outcome per submitted row, counts derived from
//! the outcomes. Only then is local state touched, and only for rows that
//! succeeded. In atomic mode a single failure means nothing is touched.

use crate::error::{ReconcileError, Result};
use crate::state::CollectionState;
use lims_model::{
    BatchItemOutcome, BatchReport, Entity, FailureMode, HasStatus, WireBatchReport,
};
use std::collections::BTreeMap;

/// Error attached to rows that never reached the backend's report
pub const NO_OUTCOME: &str = "no outcome reported";

/// What the UI needs after a batch call
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary<T> {
    /// Mode the batch ran under
    pub mode: FailureMode,
    /// Index-aligned outcomes
    pub report: BatchReport<T>,
    /// Row index to failure reason
    pub failures: BTreeMap<usize, String>,
    /// Whether local state was changed
    pub applied: bool,
}

impl<T> BatchSummary<T> {
    fn new(mode: FailureMode, report: BatchReport<T>, applied: bool) -> Self {
        let failures = report
            .outcomes()
            .iter()
            .filter_map(|o| o.error().map(|e| (o.index, e.to_string())))
            .collect();
        Self {
            mode,
            report,
            failures,
            applied,
        }
    }

    /// Number of applied rows
    #[inline]
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.report.success_count()
    }

    /// Number of rejected rows
    #[inline]
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.report.failure_count()
    }
}

/// Report aligned to the input, remembering the backend's order of successes
struct Normalized<T> {
    report: BatchReport<T>,
    success_order: Vec<usize>,
}

/// Applies batch reports to a [`CollectionState`] under one failure mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchReconciler {
    mode: FailureMode,
}

impl BatchReconciler {
    /// Create reconciler
    #[inline]
    #[must_use]
    pub fn new(mode: FailureMode) -> Self {
        Self { mode }
    }

    /// Failure mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> FailureMode {
        self.mode
    }

    /// Align a wire report with `input_len` submitted rows
    ///
    /// In atomic mode a report with any failure comes back with every row
    /// failed, since none of them were applied.
    ///
    /// # Errors
    /// `ReconcileError::MalformedReport` for out-of-range or duplicated
    /// indices, or a success without data when `require_data` is set.
    pub fn normalize<T>(
        &self,
        input_len: usize,
        wire: WireBatchReport<T>,
        require_data: bool,
    ) -> Result<BatchReport<T>> {
        self.align(input_len, wire, require_data)
            .map(|normalized| normalized.report)
    }

    /// Reconcile a batch create
    ///
    /// Created records go to the top of the page in the order the backend
    /// reported them, ahead of the existing items, so trimming the page back
    /// to its size drops the old tail rather than the new records.
    ///
    /// # Errors
    /// `ReconcileError::MalformedReport`; state is untouched.
    pub fn reconcile_create<E: Entity>(
        &self,
        state: &mut CollectionState<E>,
        input_len: usize,
        wire: WireBatchReport<E>,
    ) -> Result<BatchSummary<E>> {
        let Normalized {
            report,
            success_order,
        } = self.align(input_len, wire, true)?;

        let applied = self.should_apply(&report);
        if applied {
            let existing = std::mem::take(&mut state.items);
            state.items = success_order
                .iter()
                .filter_map(|index| report.outcome(*index).and_then(BatchItemOutcome::data))
                .cloned()
                .chain(existing)
                .collect();
            state.total += report.success_count() as u64;
            state.trim_to_page_size();
        }

        Ok(self.finish("create", report, applied))
    }

    /// Reconcile a batch status update
    ///
    /// Each succeeded row sets `status` on the local item whose id was
    /// submitted at that row. Ids not on the current page are skipped.
    ///
    /// # Errors
    /// `ReconcileError::MalformedReport`; state is untouched.
    pub fn reconcile_status<E: HasStatus, T>(
        &self,
        state: &mut CollectionState<E>,
        ids: &[E::Id],
        status: &E::Status,
        wire: WireBatchReport<T>,
    ) -> Result<BatchSummary<T>> {
        let Normalized { report, .. } = self.align(ids.len(), wire, false)?;

        let applied = self.should_apply(&report);
        if applied {
            for outcome in report.outcomes().iter().filter(|o| o.is_success()) {
                if let Some(item) = ids.get(outcome.index).and_then(|id| state.find_mut(id)) {
                    item.set_status(status.clone());
                }
            }
        }

        Ok(self.finish("status update", report, applied))
    }

    /// Reconcile a batch delete (or any batch that removes items, such as
    /// completing tasks)
    ///
    /// # Errors
    /// `ReconcileError::MalformedReport`; state is untouched.
    pub fn reconcile_delete<E: Entity, T>(
        &self,
        state: &mut CollectionState<E>,
        ids: &[E::Id],
        wire: WireBatchReport<T>,
    ) -> Result<BatchSummary<T>> {
        let Normalized { report, .. } = self.align(ids.len(), wire, false)?;

        let applied = self.should_apply(&report);
        if applied {
            let removed: Vec<&E::Id> = report
                .outcomes()
                .iter()
                .filter(|o| o.is_success())
                .filter_map(|o| ids.get(o.index))
                .collect();
            state.items.retain(|item| !removed.contains(&item.id()));
            state.total = state.total.saturating_sub(report.success_count() as u64);
        }

        Ok(self.finish("delete", report, applied))
    }

    fn should_apply<T>(&self, report: &BatchReport<T>) -> bool {
        !(self.mode.is_atomic() && report.failure_count() > 0)
    }

    fn finish<T>(&self, operation: &str, report: BatchReport<T>, applied: bool) -> BatchSummary<T> {
        let summary = BatchSummary::new(self.mode, report, applied);
        tracing::info!(
            operation,
            mode = %self.mode,
            succeeded = summary.success_count(),
            failed = summary.failure_count(),
            applied,
            "batch reconciled"
        );
        for (index, error) in &summary.failures {
            tracing::warn!(operation, row = index, error = %error, "batch row failed");
        }
        summary
    }

    fn align<T>(
        &self,
        input_len: usize,
        wire: WireBatchReport<T>,
        require_data: bool,
    ) -> Result<Normalized<T>> {
        let claimed = (wire.success_count, wire.failure_count);
        let mut slots: Vec<Option<BatchItemOutcome<T>>> = (0..input_len).map(|_| None).collect();
        let mut success_order = Vec::new();

        for (position, outcome) in wire.results.into_iter().enumerate() {
            let index = outcome.index.unwrap_or(position);
            let Some(slot) = slots.get_mut(index) else {
                return Err(ReconcileError::malformed(format!(
                    "outcome index {index} is outside the {input_len} submitted items"
                )));
            };
            if slot.is_some() {
                return Err(ReconcileError::malformed(format!(
                    "outcome index {index} is reported more than once"
                )));
            }

            *slot = Some(if outcome.success {
                if require_data && outcome.data.is_none() {
                    return Err(ReconcileError::malformed(format!(
                        "successful outcome {index} carries no data"
                    )));
                }
                success_order.push(index);
                BatchItemOutcome::succeeded(index, outcome.data)
            } else {
                BatchItemOutcome::failed(
                    index,
                    outcome.error.unwrap_or_else(|| "failed without a reason".to_string()),
                )
            });
        }

        let outcomes: Vec<BatchItemOutcome<T>> = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.unwrap_or_else(|| BatchItemOutcome::failed(index, NO_OUTCOME)))
            .collect();
        let mut report = BatchReport::from_outcomes(outcomes);

        if claimed != (report.success_count(), report.failure_count()) {
            tracing::warn!(
                claimed_success = claimed.0,
                claimed_failure = claimed.1,
                success = report.success_count(),
                failure = report.failure_count(),
                "batch report counts disagree with its outcomes"
            );
        }

        if !self.should_apply(&report) {
            report = roll_back(report);
            success_order.clear();
        }

        Ok(Normalized {
            report,
            success_order,
        })
    }
}

/// Atomic failure: every row is reported failed
fn roll_back<T>(report: BatchReport<T>) -> BatchReport<T> {
    let first_failure = report
        .outcomes()
        .iter()
        .find_map(|o| o.error().map(|e| (o.index, e.to_string())));
    let Some((failed_row, reason)) = first_failure else {
        return report;
    };

    let outcomes = report
        .into_outcomes()
        .into_iter()
        .map(|outcome| {
            if outcome.is_success() {
                BatchItemOutcome::failed(
                    outcome.index,
                    format!("rolled back: row {failed_row} failed ({reason})"),
                )
            } else {
                outcome
            }
        })
        .collect();
    BatchReport::from_outcomes(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lims_model::{Page, WireOutcome};
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        done: bool,
    }

    impl Entity for Item {
        type Id = String;
        const KIND: &'static str = "item";

        fn id(&self) -> &String {
            &self.id
        }
    }

    impl HasStatus for Item {
        type Status = bool;

        fn status(&self) -> &bool {
            &self.done
        }

        fn set_status(&mut self, status: bool) {
            self.done = status;
        }
    }

    fn item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            done: false,
        }
    }

    fn state(ids: &[&str], total: u64, page_size: u32) -> CollectionState<Item> {
        let mut state = CollectionState::empty(page_size);
        state.replace_with_page(Page::new(ids.iter().map(|id| item(id)).collect(), total, 1, page_size));
        state
    }

    fn ids(state: &CollectionState<Item>) -> Vec<&str> {
        state.items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn partial_create_prepends_in_wire_order() {
        let mut state = state(&["a"], 1, 10);
        let wire = WireBatchReport::from_results(vec![
            WireOutcome::ok(2, Some(item("n2"))),
            WireOutcome::err(1, "duplicate code"),
            WireOutcome::ok(0, Some(item("n0"))),
        ]);

        let summary = BatchReconciler::new(FailureMode::Partial)
            .reconcile_create(&mut state, 3, wire)
            .unwrap();

        assert!(summary.applied);
        assert_eq!(ids(&state), vec!["n2", "n0", "a"]);
        assert_eq!(state.total, 3);
        assert_eq!(summary.failures, BTreeMap::from([(1, "duplicate code".to_string())]));
        assert_eq!(summary.report.outcome(1).map(|o| o.index), Some(1));
    }

    #[test]
    fn create_trims_the_old_tail() {
        let mut state = state(&["a", "b"], 2, 3);
        let wire = WireBatchReport::from_results(vec![
            WireOutcome::ok(0, Some(item("n0"))),
            WireOutcome::ok(1, Some(item("n1"))),
        ]);
        BatchReconciler::default()
            .reconcile_create(&mut state, 2, wire)
            .unwrap();

        assert_eq!(ids(&state), vec!["n0", "n1", "a"]);
        assert_eq!(state.total, 4);
    }

    #[test]
    fn create_onto_a_full_page_keeps_the_new_records() {
        let mut state = state(&["1", "2", "3"], 3, 3);
        let wire = WireBatchReport::from_results(vec![
            WireOutcome::ok(0, Some(item("100"))),
            WireOutcome::err(1, "duplicate code"),
            WireOutcome::ok(2, Some(item("102"))),
        ]);

        let summary = BatchReconciler::new(FailureMode::Partial)
            .reconcile_create(&mut state, 3, wire)
            .unwrap();

        assert!(summary.applied);
        assert_eq!(ids(&state), vec!["100", "102", "1"]);
        assert_eq!(state.total, 5);
    }

    #[test]
    fn atomic_failure_changes_nothing() {
        let mut state = state(&["a"], 1, 10);
        let before = state.clone();
        let wire = WireBatchReport::from_results(vec![
            WireOutcome::ok(0, Some(item("n0"))),
            WireOutcome::err(1, "position occupied"),
            WireOutcome::ok(2, Some(item("n2"))),
        ]);

        let summary = BatchReconciler::new(FailureMode::Atomic)
            .reconcile_create(&mut state, 3, wire)
            .unwrap();

        assert_eq!(state, before);
        assert!(!summary.applied);
        assert_eq!(summary.success_count(), 0);
        assert_eq!(summary.failure_count(), 3);
        assert_eq!(summary.failures[&1], "position occupied");
        assert_eq!(summary.failures[&0], "rolled back: row 1 failed (position occupied)");
    }

    #[test]
    fn missing_rows_fail_and_counts_are_recomputed() {
        let mut state = state(&[], 0, 10);
        let wire = WireBatchReport {
            success_count: 3,
            failure_count: 0,
            results: vec![WireOutcome {
                index: None,
                success: true,
                data: Some(item("n0")),
                error: None,
            }],
        };

        let summary = BatchReconciler::default()
            .reconcile_create(&mut state, 3, wire)
            .unwrap();

        assert_eq!(summary.success_count(), 1);
        assert_eq!(summary.failure_count(), 2);
        assert_eq!(summary.failures[&2], NO_OUTCOME);
        assert_eq!(state.total, 1);
    }

    #[test]
    fn malformed_reports_leave_state_untouched() {
        let reconciler = BatchReconciler::default();
        let mut state = state(&["a"], 1, 10);
        let before = state.clone();

        let out_of_range = WireBatchReport::from_results(vec![WireOutcome::ok(5, Some(item("x")))]);
        assert!(reconciler.reconcile_create(&mut state, 2, out_of_range).is_err());

        let duplicated = WireBatchReport::from_results(vec![
            WireOutcome::ok(0, Some(item("x"))),
            WireOutcome::ok(0, Some(item("y"))),
        ]);
        assert!(reconciler.reconcile_create(&mut state, 2, duplicated).is_err());

        let no_data = WireBatchReport::from_results(vec![WireOutcome::<Item>::ok(0, None)]);
        assert!(matches!(
            reconciler.reconcile_create(&mut state, 1, no_data),
            Err(ReconcileError::MalformedReport(_))
        ));

        assert_eq!(state, before);
    }

    #[test]
    fn status_update_mutates_in_place() {
        let mut state = state(&["a", "b", "c"], 3, 10);
        let submitted = vec!["a".to_string(), "b".to_string(), "zz".to_string()];
        let wire = WireBatchReport::<()>::from_results(vec![
            WireOutcome::ok(0, None),
            WireOutcome::err(1, "locked"),
            WireOutcome::ok(2, None),
        ]);

        let summary = BatchReconciler::default()
            .reconcile_status(&mut state, &submitted, &true, wire)
            .unwrap();

        assert_eq!(summary.success_count(), 2);
        assert_eq!(
            state.items.iter().map(|i| i.done).collect::<Vec<_>>(),
            vec![true, false, false]
        );
        assert_eq!(ids(&state), vec!["a", "b", "c"]);
    }

    #[test]
    fn delete_removes_only_successes() {
        let mut state = state(&["x", "y", "z"], 3, 10);
        let submitted = vec!["x".to_string(), "y".to_string()];
        let wire = WireBatchReport::<()>::from_results(vec![
            WireOutcome::ok(0, None),
            WireOutcome::err(1, "in use"),
        ]);

        let summary = BatchReconciler::default()
            .reconcile_delete(&mut state, &submitted, wire)
            .unwrap();

        assert_eq!(ids(&state), vec!["y", "z"]);
        assert_eq!(state.total, 2);
        assert_eq!(summary.failures[&1], "in use");
    }

    #[test]
    fn duplicate_ids_keep_one_outcome_each() {
        let mut state = state(&["x"], 1, 10);
        let submitted = vec!["x".to_string(), "x".to_string()];
        let wire = WireBatchReport::<()>::from_results(vec![
            WireOutcome::ok(0, None),
            WireOutcome::err(1, "already deleted"),
        ]);

        let summary = BatchReconciler::default()
            .reconcile_delete(&mut state, &submitted, wire)
            .unwrap();

        assert_eq!(summary.report.len(), 2);
        assert!(state.items.is_empty());
        assert_eq!(state.total, 0);
    }
}
