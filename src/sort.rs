//! The sort engine: stable comparator sorts over the render subset.
//!
//! Sorting never compares formatted duration strings lexically and never
//! reorders equal keys (Rust's `sort_by` is stable, which is the original
//! relative-order tiebreak the report relies on). The result column uses a
//! custom outcome ordering instead of lexical order.

use crate::duration;
use crate::filter;
use crate::model::ReportModel;
use crate::prefs::PreferenceStore;
use crate::{Outcome, ReportError, TestRecord};
use std::cmp::Ordering;
use std::str::FromStr;

/// Canonical result ordering: most severe first. `ascending=false` presents
/// this order; `ascending=true` reverses it.
pub const RESULT_ORDER: [Outcome; 7] = Outcome::ALL;

/// A sortable column key. `Original` is the literal "no sort" key that
/// restores raw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Result,
    Name,
    Duration,
    Original,
}

impl SortKey {
    pub const SORTABLE: [SortKey; 3] = [SortKey::Result, SortKey::Name, SortKey::Duration];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Result => "result",
            SortKey::Name => "name",
            SortKey::Duration => "duration",
            SortKey::Original => "original",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Result => "Result",
            SortKey::Name => "Test",
            SortKey::Duration => "Duration",
            SortKey::Original => "Original",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "result" => Ok(SortKey::Result),
            "name" => Ok(SortKey::Name),
            "duration" => Ok(SortKey::Duration),
            "original" => Ok(SortKey::Original),
            other => Err(ReportError::UnknownSortKey(other.to_string())),
        }
    }
}

/// Visual state of one sortable column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderState {
    Inactive,
    Ascending,
    Descending,
}

impl HeaderState {
    /// CSS class the adapter puts on the header cell.
    pub fn css_class(self) -> &'static str {
        match self {
            HeaderState::Inactive => "inactive",
            HeaderState::Ascending => "asc",
            HeaderState::Descending => "desc",
        }
    }
}

/// The single active-column pointer. At most one column is sorted at a
/// time; all other headers are inactive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    active: Option<(SortKey, bool)>,
}

impl SortState {
    pub fn active(key: SortKey, ascending: bool) -> Self {
        Self {
            active: Some((key, ascending)),
        }
    }

    pub fn inactive() -> Self {
        Self { active: None }
    }

    /// The active key and ascending flag, if a sort is in effect.
    pub fn current(&self) -> Option<(SortKey, bool)> {
        self.active
    }

    pub fn header_state(&self, key: SortKey) -> HeaderState {
        match self.active {
            Some((active, true)) if active == key => HeaderState::Ascending,
            Some((active, false)) if active == key => HeaderState::Descending,
            _ => HeaderState::Inactive,
        }
    }
}

/// Default direction for a newly-activated column. The result column
/// defaults to descending, which presents the canonical severity-first
/// ordering; the rest default to ascending.
pub fn default_ascending(key: SortKey) -> bool {
    !matches!(key, SortKey::Result)
}

/// Stable sort by column value: custom outcome order for the result key,
/// case-insensitive lexical order for names.
pub fn generic_sort(tests: &mut [TestRecord], key: SortKey, ascending: bool) {
    match key {
        SortKey::Result => {
            let rank = |test: &TestRecord| {
                RESULT_ORDER
                    .iter()
                    .position(|outcome| *outcome == test.result)
                    .unwrap_or(RESULT_ORDER.len())
            };
            tests.sort_by(|a, b| orient_result(rank(a).cmp(&rank(b)), ascending));
        }
        SortKey::Name => {
            tests.sort_by(|a, b| {
                orient(
                    a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                    ascending,
                )
            });
        }
        SortKey::Duration => duration_sort(tests, ascending),
        SortKey::Original => {}
    }
}

/// Stable sort on normalized milliseconds. Values that parse from neither
/// numeric nor clock form rank as zero.
pub fn duration_sort(tests: &mut [TestRecord], ascending: bool) {
    let millis = |test: &TestRecord| duration::millis_of(&test.duration).unwrap_or(0.0);
    tests.sort_by(|a, b| orient(millis(a).total_cmp(&millis(b)), ascending));
}

fn orient(ordering: Ordering, ascending: bool) -> Ordering {
    if ascending {
        ordering
    } else {
        ordering.reverse()
    }
}

// The canonical result order is the descending presentation, so the flag is
// applied inverted for the result key.
fn orient_result(ordering: Ordering, ascending: bool) -> Ordering {
    orient(ordering, !ascending)
}

/// Dispatch one sort pass over a subset.
pub fn sort_records(tests: &mut [TestRecord], key: SortKey, ascending: bool) {
    match key {
        SortKey::Duration => duration_sort(tests, ascending),
        SortKey::Original => {}
        _ => generic_sort(tests, key, ascending),
    }
}

/// Bootstrap-time sort restoration.
///
/// Reads the persisted key (falling back to the author's initial column,
/// then to the result column) and direction (session flag, then the column
/// default). The literal `original` key short-circuits without sorting.
pub fn init_sort(model: &mut ReportModel, prefs: &PreferenceStore) -> SortState {
    let fallback = model
        .initial_sort()
        .and_then(|key| key.parse::<SortKey>().ok())
        .unwrap_or(SortKey::Result);
    let key = prefs
        .sort_key()
        .and_then(|key| key.parse::<SortKey>().ok())
        .unwrap_or(fallback);

    if key == SortKey::Original {
        return SortState::inactive();
    }

    let ascending = prefs.sort_ascending().unwrap_or_else(|| default_ascending(key));
    let mut tests = model.test_subset().to_vec();
    sort_records(&mut tests, key, ascending);
    model.set_render(tests);
    SortState::active(key, ascending)
}

/// One header click.
///
/// Cycles the clicked column through inactive → default direction →
/// opposite → inactive; clicking a different column activates it at its
/// default direction and resets the rest. The inactive state persists the
/// literal `original` key and restores raw order with the filter
/// re-applied.
pub fn cycle_sort(
    model: &mut ReportModel,
    prefs: &mut PreferenceStore,
    state: SortState,
    key: SortKey,
) -> SortState {
    let next = match state.current() {
        Some((active, ascending)) if active == key => {
            if ascending == default_ascending(key) {
                Some(!ascending)
            } else {
                None
            }
        }
        _ => Some(default_ascending(key)),
    };

    match next {
        Some(ascending) => {
            prefs.set_sort_key(key.as_str());
            prefs.set_sort_ascending(ascending);
            let mut tests = model.test_subset().to_vec();
            sort_records(&mut tests, key, ascending);
            model.set_render(tests);
            SortState::active(key, ascending)
        }
        None => {
            prefs.set_sort_key(SortKey::Original.as_str());
            let visible = prefs.visible_outcomes();
            let mut subset = filter::visible_subset(model.all_tests(), &visible);
            filter::overlay_collapsed(&mut subset, &prefs.collapsed_ids());
            model.set_render(subset);
            SortState::inactive()
        }
    }
}
