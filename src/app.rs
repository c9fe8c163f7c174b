//! Bootstrap and event entry points.
//!
//! `ReportApp` is the single owner of mutable view state: the view model,
//! the preference store, and the active sort. Every event entry point runs
//! synchronously to completion, leaving the raw/render invariant intact
//! before control returns to the host's event loop.

use crate::filter;
use crate::model::ReportModel;
use crate::prefs::PreferenceStore;
use crate::render::{self, PageView};
use crate::sort::{self, SortKey, SortState};
use crate::{Outcome, ReportData, ReportError};

/// The report application context.
#[derive(Debug)]
pub struct ReportApp {
    model: ReportModel,
    prefs: PreferenceStore,
    sort: SortState,
}

impl ReportApp {
    /// Parse the embedded JSON blob (exactly once) and bootstrap with
    /// default preferences.
    pub fn from_json(blob: &str) -> Result<Self, ReportError> {
        Self::from_json_with_prefs(blob, PreferenceStore::new())
    }

    /// Parse the blob and bootstrap with preferences restored from the URL
    /// query string and session storage.
    pub fn from_json_with_prefs(blob: &str, prefs: PreferenceStore) -> Result<Self, ReportError> {
        let report: ReportData = serde_json::from_str(blob)?;
        Ok(Self::from_report(report, prefs))
    }

    /// Bootstrap from already-parsed report data: seed the view model,
    /// restore the filter, then the sort.
    pub fn from_report(report: ReportData, mut prefs: PreferenceStore) -> Self {
        let mut model = ReportModel::new(report, &mut prefs);
        filter::init_filter(&mut model, &prefs);
        let sort = sort::init_sort(&mut model, &prefs);
        Self { model, prefs, sort }
    }

    /// Recompute the page view from current state. Idempotent; the host
    /// replaces its whole fragment with the result after every event.
    pub fn page(&self) -> PageView {
        render::build_page(&self.model, &self.prefs, self.sort)
    }

    /// A click on a sortable column header.
    pub fn cycle_sort(&mut self, key: SortKey) {
        self.sort = sort::cycle_sort(&mut self.model, &mut self.prefs, self.sort, key);
    }

    /// A filter-checkbox change.
    pub fn toggle_filter(&mut self, outcome: Outcome, show: bool) {
        filter::apply_filter(&mut self.model, &mut self.prefs, self.sort, outcome, show);
    }

    /// A per-row collapse toggle. Persists the new state in the session's
    /// collapsed-id set; a stale id is a silent no-op.
    pub fn toggle_row(&mut self, id: &str) {
        let Some(collapsed) = self.model.toggle_collapsed(id) else {
            return;
        };
        let mut ids = self.prefs.collapsed_ids();
        if collapsed {
            ids.insert(id.to_string());
        } else {
            ids.remove(id);
        }
        self.prefs.set_collapsed_ids(&ids);
    }

    /// The global show-all/hide-all control. Rewrites the collapsed-id set
    /// wholesale so the session overlay matches the forced state.
    pub fn set_all_collapsed(&mut self, collapsed: bool) {
        self.model.set_all_collapsed(collapsed);
        let ids = if collapsed {
            self.model
                .all_tests()
                .iter()
                .map(|test| test.id.clone())
                .collect()
        } else {
            Default::default()
        };
        self.prefs.set_collapsed_ids(&ids);
    }

    pub fn model(&self) -> &ReportModel {
        &self.model
    }

    pub fn prefs(&self) -> &PreferenceStore {
        &self.prefs
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    /// The canonical query string for the host to push into the URL.
    pub fn query_string(&self) -> String {
        self.prefs.query_string()
    }

    /// The session store's JSON form for the host to stash.
    pub fn session_json(&self) -> String {
        self.prefs.session().to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOB: &str = r#"{
        "title": "demo",
        "collectedItems": 4,
        "runningState": "Finished",
        "tests": [
            {"result": "passed", "name": "tests/test_a.py::test_one", "duration": 0.5},
            {"result": "failed", "name": "tests/test_a.py::test_two", "duration": 2.0,
             "log": "assert 1 == 2"},
            {"result": "error", "name": "tests/test_b.py::test_three", "duration": 0.1},
            {"result": "passed", "name": "tests/test_b.py::test_four", "duration": 1.0}
        ]
    }"#;

    #[test]
    fn bootstrap_parses_once_and_sorts_canonically() {
        let app = ReportApp::from_json(BLOB).unwrap();
        // default sort: result column, canonical order
        let names: Vec<&str> = app
            .model()
            .test_subset()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(
            names,
            [
                "tests/test_b.py::test_three",
                "tests/test_a.py::test_two",
                "tests/test_a.py::test_one",
                "tests/test_b.py::test_four"
            ]
        );
    }

    #[test]
    fn invalid_blob_is_a_data_error() {
        let err = ReportApp::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ReportError::Data(_)));
    }

    #[test]
    fn toggle_row_persists_collapsed_id() {
        let mut app = ReportApp::from_json(BLOB).unwrap();
        // failed row starts expanded (default collapsed category is passed)
        assert!(app.prefs().collapsed_ids().contains("test_0"));
        assert!(!app.prefs().collapsed_ids().contains("test_1"));

        app.toggle_row("test_1");
        assert!(app.prefs().collapsed_ids().contains("test_1"));

        app.toggle_row("test_1");
        assert!(!app.prefs().collapsed_ids().contains("test_1"));

        // stale ids never crash
        app.toggle_row("test_99");
    }

    #[test]
    fn set_all_collapsed_rewrites_session_set() {
        let mut app = ReportApp::from_json(BLOB).unwrap();
        app.set_all_collapsed(true);
        assert_eq!(app.prefs().collapsed_ids().len(), 4);
        app.set_all_collapsed(false);
        assert!(app.prefs().collapsed_ids().is_empty());
    }

    #[test]
    fn filter_then_sort_flow_keeps_invariant() {
        let mut app = ReportApp::from_json(BLOB).unwrap();
        app.toggle_filter(Outcome::Passed, false);
        assert_eq!(app.model().test_subset().len(), 2);
        app.cycle_sort(SortKey::Duration);
        let raw_ids: std::collections::BTreeSet<&str> = app
            .model()
            .all_tests()
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        for test in app.model().test_subset() {
            assert!(raw_ids.contains(test.id.as_str()));
        }
        assert_eq!(app.model().all_tests().len(), 4);
    }

    #[test]
    fn query_string_reflects_interactions() {
        let mut app = ReportApp::from_json(BLOB).unwrap();
        app.toggle_filter(Outcome::Passed, false);
        app.cycle_sort(SortKey::Name);
        let query = app.query_string();
        assert!(query.contains("sort=name"));
        assert!(query.contains("visible=error,failed,rerun,xfailed,xpassed,skipped"));
    }

    #[test]
    fn page_is_stable_across_repeated_calls() {
        let app = ReportApp::from_json(BLOB).unwrap();
        assert_eq!(app.page(), app.page());
    }
}
