//! The render pipeline: view models first, markup second.
//!
//! `build_page` translates the view model + preference state into plain
//! data structures; the [`html`] adapter turns those into markup. Tests
//! assert on the data structures, the adapter is tested separately.

pub mod html;

use crate::duration;
use crate::model::ReportModel;
use crate::prefs::PreferenceStore;
use crate::sort::{HeaderState, SortKey, SortState};
use crate::{ExtraKind, Outcome, TestRecord};

/// One environment-table row.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvRow {
    pub key: String,
    pub value: EnvDisplay,
}

/// Environment values are either plain text or an item list (nested
/// mappings and arrays render as lists).
#[derive(Debug, Clone, PartialEq)]
pub enum EnvDisplay {
    Text(String),
    Items(Vec<String>),
}

/// One filter checkbox: checked follows the visible set, disabled follows
/// the observed count (an outcome with no records cannot be toggled).
#[derive(Debug, Clone, PartialEq)]
pub struct FilterControl {
    pub outcome: Outcome,
    pub label: &'static str,
    pub count: usize,
    pub checked: bool,
    pub disabled: bool,
}

/// One sortable column header with its visual sort state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderCell {
    pub key: SortKey,
    pub label: &'static str,
    pub state: HeaderState,
}

/// One attachment link on a row.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentView {
    pub name: String,
    pub kind: ExtraKind,
    pub href: String,
    /// Preview source for image attachments
    pub inline_image: Option<String>,
}

/// One results-table row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: String,
    pub result: Outcome,
    pub name: String,
    pub duration_text: String,
    pub log: Option<String>,
    pub attachments: Vec<AttachmentView>,
    pub collapsed: bool,
}

/// The complete plain-data description of the report body. Rebuilt
/// wholesale on every redraw; the adapter replaces the whole subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub title: String,
    pub environment: Vec<EnvRow>,
    /// "N of M tests done" while running, "N tests ran in T" once finished
    pub progress: String,
    pub filters: Vec<FilterControl>,
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<RowView>,
}

impl PageView {
    /// True when the empty-state fragment must be shown instead of rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The single redraw entry point: a pure function of the view model, the
/// preference store, and the sort state. Safe to call repeatedly from any
/// state.
pub fn build_page(model: &ReportModel, prefs: &PreferenceStore, sort: SortState) -> PageView {
    PageView {
        title: model.title().to_string(),
        environment: build_environment(model),
        progress: build_progress(model),
        filters: build_filters(model, prefs),
        headers: build_headers(sort),
        rows: model.test_subset().iter().map(build_row).collect(),
    }
}

fn build_environment(model: &ReportModel) -> Vec<EnvRow> {
    model
        .environment()
        .iter()
        .map(|(key, value)| EnvRow {
            key: key.clone(),
            value: env_display(value),
        })
        .collect()
}

fn env_display(value: &serde_json::Value) -> EnvDisplay {
    match value {
        serde_json::Value::Object(map) => EnvDisplay::Items(
            map.iter()
                .map(|(k, v)| format!("{k}: {}", scalar_text(v)))
                .collect(),
        ),
        serde_json::Value::Array(items) => {
            EnvDisplay::Items(items.iter().map(scalar_text).collect())
        }
        other => EnvDisplay::Text(scalar_text(other)),
    }
}

fn scalar_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn build_progress(model: &ReportModel) -> String {
    let ran = model.all_tests().len();
    if model.is_finished() {
        let elapsed = duration::format_millis(model.total_duration_millis());
        format!("{ran} tests ran in {elapsed}")
    } else {
        format!("{ran} of {} tests done", model.collected_items())
    }
}

fn build_filters(model: &ReportModel, prefs: &PreferenceStore) -> Vec<FilterControl> {
    let visible = prefs.visible_outcomes();
    Outcome::ALL
        .into_iter()
        .map(|outcome| {
            let count = model
                .all_tests()
                .iter()
                .filter(|test| test.result == outcome)
                .count();
            FilterControl {
                outcome,
                label: outcome.label(),
                count,
                checked: visible.contains(&outcome),
                disabled: count == 0,
            }
        })
        .collect()
}

fn build_headers(sort: SortState) -> Vec<HeaderCell> {
    SortKey::SORTABLE
        .into_iter()
        .map(|key| HeaderCell {
            key,
            label: key.label(),
            state: sort.header_state(key),
        })
        .collect()
}

fn build_row(test: &TestRecord) -> RowView {
    let attachments = test
        .extras
        .iter()
        .filter(|extra| !extra.content.is_empty())
        .map(|extra| {
            let href = if extra.format_type.is_asset() {
                format!("assets/{}", extra.content)
            } else {
                extra.content.clone()
            };
            AttachmentView {
                name: extra.name.clone(),
                kind: extra.format_type,
                inline_image: (extra.format_type == ExtraKind::Image).then(|| href.clone()),
                href,
            }
        })
        .collect();

    RowView {
        id: test.id.clone(),
        result: test.result,
        name: test.name.clone(),
        duration_text: duration::display(&test.duration),
        log: test.log.clone().filter(|log| !log.is_empty()),
        attachments,
        collapsed: test.collapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReportModel;
    use crate::{filter, DurationValue, Extra, ReportData};

    fn record(result: Outcome, name: &str) -> TestRecord {
        TestRecord {
            id: String::new(),
            result,
            name: name.to_string(),
            duration: DurationValue::Seconds(0.25),
            log: None,
            extras: Vec::new(),
            collapsed: false,
        }
    }

    fn page_for(report: ReportData, prefs: &mut PreferenceStore) -> PageView {
        let mut model = ReportModel::new(report, prefs);
        filter::init_filter(&mut model, prefs);
        build_page(&model, prefs, SortState::inactive())
    }

    #[test]
    fn empty_subset_is_explicit_empty_state() {
        let mut prefs = PreferenceStore::from_query("visible=");
        let report = ReportData {
            tests: vec![record(Outcome::Passed, "a")],
            ..ReportData::default()
        };
        let page = page_for(report, &mut prefs);
        assert!(page.is_empty());
        // filters still describe the raw data
        let passed = page
            .filters
            .iter()
            .find(|f| f.outcome == Outcome::Passed)
            .unwrap();
        assert_eq!(passed.count, 1);
        assert!(!passed.checked);
    }

    #[test]
    fn zero_count_outcome_is_disabled() {
        let mut prefs = PreferenceStore::new();
        let report = ReportData {
            tests: vec![record(Outcome::Passed, "a")],
            ..ReportData::default()
        };
        let page = page_for(report, &mut prefs);
        let rerun = page
            .filters
            .iter()
            .find(|f| f.outcome == Outcome::Rerun)
            .unwrap();
        assert!(rerun.disabled);
        assert_eq!(rerun.count, 0);
        let passed = page
            .filters
            .iter()
            .find(|f| f.outcome == Outcome::Passed)
            .unwrap();
        assert!(!passed.disabled);
        assert!(passed.checked);
    }

    #[test]
    fn header_carries_sort_indicator() {
        let mut prefs = PreferenceStore::new();
        let report = ReportData {
            tests: vec![record(Outcome::Passed, "a")],
            ..ReportData::default()
        };
        let mut model = ReportModel::new(report, &mut prefs);
        filter::init_filter(&mut model, &prefs);
        let page = build_page(&model, &prefs, SortState::active(SortKey::Duration, true));
        let duration = page
            .headers
            .iter()
            .find(|h| h.key == SortKey::Duration)
            .unwrap();
        assert_eq!(duration.state, HeaderState::Ascending);
        let result = page.headers.iter().find(|h| h.key == SortKey::Result).unwrap();
        assert_eq!(result.state, HeaderState::Inactive);
    }

    #[test]
    fn progress_switches_on_finished() {
        let mut prefs = PreferenceStore::new();
        let mut report = ReportData {
            collected_items: 5,
            tests: vec![record(Outcome::Passed, "a"), record(Outcome::Failed, "b")],
            ..ReportData::default()
        };
        let page = page_for(report.clone(), &mut prefs);
        assert_eq!(page.progress, "2 of 5 tests done");

        report.running_state = crate::RUNNING_STATE_FINISHED.to_string();
        report.total_duration = Some(61.0);
        let page = page_for(report, &mut PreferenceStore::new());
        assert_eq!(page.progress, "2 tests ran in 00:01:01");
    }

    #[test]
    fn row_omits_empty_log_and_attachments() {
        let mut prefs = PreferenceStore::new();
        let mut test = record(Outcome::Failed, "f");
        test.log = Some(String::new());
        test.extras = vec![
            Extra {
                name: "screenshot".into(),
                format_type: ExtraKind::Image,
                content: "shot.png".into(),
            },
            Extra {
                name: "empty".into(),
                format_type: ExtraKind::Text,
                content: String::new(),
            },
            Extra {
                name: "docs".into(),
                format_type: ExtraKind::Url,
                content: "https://example.com".into(),
            },
        ];
        let report = ReportData {
            tests: vec![test],
            ..ReportData::default()
        };
        let page = page_for(report, &mut prefs);
        let row = &page.rows[0];
        assert!(row.log.is_none());
        assert_eq!(row.attachments.len(), 2);
        assert_eq!(row.attachments[0].href, "assets/shot.png");
        assert_eq!(
            row.attachments[0].inline_image.as_deref(),
            Some("assets/shot.png")
        );
        assert_eq!(row.attachments[1].href, "https://example.com");
        assert!(row.attachments[1].inline_image.is_none());
    }

    #[test]
    fn environment_renders_nested_values_as_items() {
        let mut prefs = PreferenceStore::new();
        let mut report = ReportData {
            tests: vec![record(Outcome::Passed, "a")],
            ..ReportData::default()
        };
        report
            .environment
            .insert("Python".to_string(), serde_json::json!("3.12.1"));
        report.environment.insert(
            "Packages".to_string(),
            serde_json::json!({"pytest": "8.0", "pluggy": "1.4"}),
        );
        let page = page_for(report, &mut prefs);
        let packages = page.environment.iter().find(|r| r.key == "Packages").unwrap();
        assert_eq!(
            packages.value,
            EnvDisplay::Items(vec!["pluggy: 1.4".into(), "pytest: 8.0".into()])
        );
        let python = page.environment.iter().find(|r| r.key == "Python").unwrap();
        assert_eq!(python.value, EnvDisplay::Text("3.12.1".into()));
    }

    #[test]
    fn redraw_is_idempotent_for_fixed_state() {
        let mut prefs = PreferenceStore::from_query("visible=failed&sort=result");
        let report = ReportData {
            tests: vec![
                record(Outcome::Passed, "a"),
                record(Outcome::Failed, "b"),
                record(Outcome::Failed, "c"),
            ],
            ..ReportData::default()
        };
        let mut model = ReportModel::new(report, &mut prefs);
        filter::init_filter(&mut model, &prefs);
        let state = crate::sort::init_sort(&mut model, &prefs);
        let first = build_page(&model, &prefs, state);
        let second = build_page(&model, &prefs, state);
        assert_eq!(first, second);
    }
}
