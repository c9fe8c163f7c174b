//! The report view model: raw data vs. rendered subset.
//!
//! `raw` is the report exactly as loaded and is never mutated after
//! initialization. `render` is the working copy whose `tests` sequence is
//! replaced wholesale by every filter/sort/collapse operation. Every
//! mutator preserves the invariant that `render.tests` is a
//! permutation-and/or-subset of `raw.tests`.

use crate::duration;
use crate::prefs::PreferenceStore;
use crate::{ReportData, TestRecord, RUNNING_STATE_FINISHED};
use std::collections::BTreeSet;

/// Owner of the immutable raw dataset and the derived render dataset.
#[derive(Debug, Clone)]
pub struct ReportModel {
    raw: ReportData,
    render: ReportData,
}

impl ReportModel {
    /// One-time initializer (the manager-seeding step).
    ///
    /// Normalizes `tests` into a flat indexed sequence, assigns synthetic
    /// ids in original order, computes each record's initial `collapsed`
    /// flag from the collapsed-category resolution, and seeds both `raw`
    /// and `render` with the normalized copy. The collapsed-id persistence
    /// set is seeded from the ids so computed; a collapsed-id set already
    /// present in the session (same-session restore) wins over the
    /// category default.
    pub fn new(mut report: ReportData, prefs: &mut PreferenceStore) -> Self {
        let categories = prefs.collapsed_categories(report.render_collapsed.as_deref());
        let restored = prefs.has_collapsed_ids().then(|| prefs.collapsed_ids());

        for (index, test) in report.tests.iter_mut().enumerate() {
            test.id = format!("test_{index}");
            test.collapsed = match &restored {
                Some(ids) => ids.contains(&test.id),
                None => categories.contains(&test.result),
            };
        }

        if restored.is_none() {
            let collapsed_ids: BTreeSet<String> = report
                .tests
                .iter()
                .filter(|test| test.collapsed)
                .map(|test| test.id.clone())
                .collect();
            prefs.set_collapsed_ids(&collapsed_ids);
        }

        Self {
            raw: report.clone(),
            render: report,
        }
    }

    /// Discard any filter/sort in effect: `render.tests` goes back to the
    /// raw ordering and membership.
    pub fn reset_render(&mut self) {
        self.render.tests = self.raw.tests.clone();
    }

    /// Install a computed subset as the render dataset. `raw` is untouched.
    pub fn set_render(&mut self, tests: Vec<TestRecord>) {
        self.render.tests = tests;
    }

    /// Flip the `collapsed` flag of the matching render record. Returns the
    /// new state, or `None` if the id is not in the render subset (a stale
    /// id after a filter change is a silent no-op, never a crash).
    pub fn toggle_collapsed(&mut self, id: &str) -> Option<bool> {
        let test = self.render.tests.iter_mut().find(|test| test.id == id)?;
        test.collapsed = !test.collapsed;
        Some(test.collapsed)
    }

    /// Force every render record to the given collapsed state in one pass.
    pub fn set_all_collapsed(&mut self, collapsed: bool) {
        for test in &mut self.render.tests {
            test.collapsed = collapsed;
        }
    }

    // ─── read accessors ──────────────────────────────────────────────────

    /// The currently rendered, possibly filtered-and-sorted subset.
    pub fn test_subset(&self) -> &[TestRecord] {
        &self.render.tests
    }

    /// The complete raw dataset, in load order.
    pub fn all_tests(&self) -> &[TestRecord] {
        &self.raw.tests
    }

    pub fn title(&self) -> &str {
        &self.render.title
    }

    pub fn environment(&self) -> &std::collections::BTreeMap<String, serde_json::Value> {
        &self.render.environment
    }

    pub fn collected_items(&self) -> usize {
        self.render.collected_items
    }

    pub fn initial_sort(&self) -> Option<&str> {
        self.raw.initial_sort.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        self.raw.running_state == RUNNING_STATE_FINISHED
    }

    /// Total elapsed milliseconds: the producer's stamp when present,
    /// otherwise the sum of record durations.
    pub fn total_duration_millis(&self) -> f64 {
        match self.raw.total_duration {
            Some(seconds) => seconds * 1000.0,
            None => self
                .raw
                .tests
                .iter()
                .filter_map(|test| duration::millis_of(&test.duration))
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DurationValue, Outcome};

    fn record(result: Outcome, name: &str) -> TestRecord {
        TestRecord {
            id: String::new(),
            result,
            name: name.to_string(),
            duration: DurationValue::Seconds(0.5),
            log: None,
            extras: Vec::new(),
            collapsed: false,
        }
    }

    fn report() -> ReportData {
        ReportData {
            tests: vec![
                record(Outcome::Passed, "a"),
                record(Outcome::Failed, "b"),
                record(Outcome::Passed, "c"),
            ],
            ..ReportData::default()
        }
    }

    #[test]
    fn ids_are_assigned_in_original_order() {
        let mut prefs = PreferenceStore::new();
        let model = ReportModel::new(report(), &mut prefs);
        let ids: Vec<&str> = model.all_tests().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["test_0", "test_1", "test_2"]);
    }

    #[test]
    fn collapsed_seeded_from_default_category() {
        let mut prefs = PreferenceStore::new();
        let model = ReportModel::new(report(), &mut prefs);
        // default collapsed category is {passed}
        let collapsed: Vec<bool> = model.all_tests().iter().map(|t| t.collapsed).collect();
        assert_eq!(collapsed, [true, false, true]);
        // the persistence set was seeded from the same ids
        let ids = prefs.collapsed_ids();
        assert!(ids.contains("test_0"));
        assert!(!ids.contains("test_1"));
        assert!(ids.contains("test_2"));
    }

    #[test]
    fn session_collapsed_ids_win_over_categories() {
        let mut prefs = PreferenceStore::new();
        let ids: std::collections::BTreeSet<String> = std::iter::once("test_1".to_string()).collect();
        prefs.set_collapsed_ids(&ids);
        let model = ReportModel::new(report(), &mut prefs);
        let collapsed: Vec<bool> = model.all_tests().iter().map(|t| t.collapsed).collect();
        assert_eq!(collapsed, [false, true, false]);
    }

    #[test]
    fn set_render_replaces_subset_without_touching_raw() {
        let mut prefs = PreferenceStore::new();
        let mut model = ReportModel::new(report(), &mut prefs);
        let failed_only: Vec<TestRecord> = model
            .all_tests()
            .iter()
            .filter(|t| t.result == Outcome::Failed)
            .cloned()
            .collect();
        model.set_render(failed_only);
        assert_eq!(model.test_subset().len(), 1);
        assert_eq!(model.all_tests().len(), 3);

        model.reset_render();
        assert_eq!(model.test_subset().len(), 3);
    }

    #[test]
    fn toggle_collapsed_flips_render_only() {
        let mut prefs = PreferenceStore::new();
        let mut model = ReportModel::new(report(), &mut prefs);
        assert_eq!(model.toggle_collapsed("test_1"), Some(true));
        assert!(model.test_subset()[1].collapsed);
        assert!(!model.all_tests()[1].collapsed);
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let mut prefs = PreferenceStore::new();
        let mut model = ReportModel::new(report(), &mut prefs);
        let before: Vec<bool> = model.test_subset().iter().map(|t| t.collapsed).collect();
        assert_eq!(model.toggle_collapsed("test_99"), None);
        let after: Vec<bool> = model.test_subset().iter().map(|t| t.collapsed).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn set_all_collapsed_forces_every_record() {
        let mut prefs = PreferenceStore::new();
        let mut model = ReportModel::new(report(), &mut prefs);
        model.set_all_collapsed(false);
        assert!(model.test_subset().iter().all(|t| !t.collapsed));
        model.set_all_collapsed(true);
        assert!(model.test_subset().iter().all(|t| t.collapsed));
        // raw stays at its load-time state
        assert!(!model.all_tests()[1].collapsed);
    }

    #[test]
    fn finished_sentinel() {
        let mut prefs = PreferenceStore::new();
        let mut data = report();
        assert!(!ReportModel::new(data.clone(), &mut prefs).is_finished());
        data.running_state = RUNNING_STATE_FINISHED.to_string();
        assert!(ReportModel::new(data, &mut PreferenceStore::new()).is_finished());
    }

    #[test]
    fn total_duration_falls_back_to_summing_records() {
        let mut prefs = PreferenceStore::new();
        let mut data = report();
        assert_eq!(
            ReportModel::new(data.clone(), &mut prefs).total_duration_millis(),
            1500.0
        );
        data.total_duration = Some(2.5);
        assert_eq!(
            ReportModel::new(data, &mut PreferenceStore::new()).total_duration_millis(),
            2500.0
        );
    }
}
