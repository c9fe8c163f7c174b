//! The filter engine: visibility subsets over the raw dataset.
//!
//! Filtering is a stable subset of the raw order, never a re-sort; the
//! orchestration re-applies the active sort afterwards so a filter change
//! never perturbs the ordering the user chose.

use crate::model::ReportModel;
use crate::prefs::PreferenceStore;
use crate::sort::{self, SortState};
use crate::{Outcome, TestRecord};
use std::collections::BTreeSet;

/// The ordered subset of `all` whose result is in the visible set. Order is
/// preserved from the input.
pub fn visible_subset(all: &[TestRecord], visible: &BTreeSet<Outcome>) -> Vec<TestRecord> {
    all.iter()
        .filter(|test| visible.contains(&test.result))
        .cloned()
        .collect()
}

/// Re-apply the session's per-record collapsed state to a recomputed
/// subset. Records cloned from `raw` carry load-time flags; the session set
/// is the live source of truth.
pub(crate) fn overlay_collapsed(tests: &mut [TestRecord], collapsed_ids: &BTreeSet<String>) {
    for test in tests {
        test.collapsed = collapsed_ids.contains(&test.id);
    }
}

/// Bootstrap-time filter restoration: compute the subset for the persisted
/// visible set and install it.
pub fn init_filter(model: &mut ReportModel, prefs: &PreferenceStore) {
    let visible = prefs.visible_outcomes();
    let mut subset = visible_subset(model.all_tests(), &visible);
    overlay_collapsed(&mut subset, &prefs.collapsed_ids());
    model.set_render(subset);
}

/// One filter-checkbox change.
///
/// Updates the preference store, recomputes the subset against the raw
/// dataset, re-applies the active sort (when one is in effect), and
/// installs the result. A no-op change (showing an already-visible outcome)
/// follows the same single path: exactly one `set_render` call.
pub fn apply_filter(
    model: &mut ReportModel,
    prefs: &mut PreferenceStore,
    state: SortState,
    outcome: Outcome,
    show: bool,
) {
    if show {
        prefs.show_category(outcome);
    } else {
        prefs.hide_category(outcome);
    }

    let visible = prefs.visible_outcomes();
    let mut subset = visible_subset(model.all_tests(), &visible);
    overlay_collapsed(&mut subset, &prefs.collapsed_ids());
    if let Some((key, ascending)) = state.current() {
        sort::sort_records(&mut subset, key, ascending);
    }
    model.set_render(subset);
}
