//! View preference persistence.
//!
//! The source of truth for shareable view state is the query string
//! (`visible`, `sort`, `collapsed`); ephemeral per-session state lives in
//! the session store (`sortAsc`, `collapsedIds`). This store never errors:
//! malformed values are treated as absent and fall back to defaults.

mod query;
mod session;

pub use query::QueryParams;
pub use session::{SessionStore, KEY_COLLAPSED_IDS, KEY_SORT_ASC};

use crate::Outcome;
use std::collections::BTreeSet;

const PARAM_VISIBLE: &str = "visible";
const PARAM_SORT: &str = "sort";
const PARAM_COLLAPSED: &str = "collapsed";

/// Facade over the two persistence channels.
#[derive(Debug, Clone, Default)]
pub struct PreferenceStore {
    query: QueryParams,
    session: SessionStore,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(query: QueryParams, session: SessionStore) -> Self {
        Self { query, session }
    }

    /// Parse a query string into a store with an empty session.
    pub fn from_query(query: &str) -> Self {
        Self {
            query: QueryParams::parse(query),
            session: SessionStore::new(),
        }
    }

    // ─── visible set ─────────────────────────────────────────────────────

    /// The set of outcomes currently permitted to appear.
    ///
    /// No parameter means "show everything"; a present-but-blank parameter
    /// means "show nothing". Unrecognized tokens are silently dropped.
    pub fn visible_outcomes(&self) -> BTreeSet<Outcome> {
        match self.query.get(PARAM_VISIBLE) {
            None => Outcome::ALL.into_iter().collect(),
            Some(value) => parse_outcome_list(value),
        }
    }

    /// Add one outcome to the visible set and write it back. A resulting
    /// full set removes the parameter entirely (canonical "no filter").
    pub fn show_category(&mut self, outcome: Outcome) {
        let mut visible = self.visible_outcomes();
        visible.insert(outcome);
        self.write_visible(&visible);
    }

    /// Remove one outcome from the visible set and write it back.
    pub fn hide_category(&mut self, outcome: Outcome) {
        let mut visible = self.visible_outcomes();
        visible.remove(&outcome);
        self.write_visible(&visible);
    }

    fn write_visible(&mut self, visible: &BTreeSet<Outcome>) {
        if visible.len() == Outcome::ALL.len() {
            self.query.remove(PARAM_VISIBLE);
        } else {
            self.query.set(PARAM_VISIBLE, &outcome_list(visible));
        }
    }

    // ─── sort column and direction ───────────────────────────────────────

    /// The persisted sort column key, if any. Interpretation (including the
    /// literal `original`) belongs to the sort engine.
    pub fn sort_key(&self) -> Option<&str> {
        self.query.get(PARAM_SORT).filter(|key| !key.is_empty())
    }

    pub fn set_sort_key(&mut self, key: &str) {
        self.query.set(PARAM_SORT, key);
    }

    /// The persisted ascending flag. Absent or malformed means "unset".
    pub fn sort_ascending(&self) -> Option<bool> {
        match self.session.get_item(KEY_SORT_ASC) {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }

    pub fn set_sort_ascending(&mut self, ascending: bool) {
        self.session
            .set_item(KEY_SORT_ASC, if ascending { "true" } else { "false" });
    }

    // ─── collapsed categories and ids ────────────────────────────────────

    /// Resolve the collapsed outcome categories.
    ///
    /// Precedence: explicit `collapsed` parameter, then the author default,
    /// then `{passed}`. The literal `all` (from either source) expands to
    /// every outcome; an explicitly empty value collapses nothing.
    pub fn collapsed_categories(&self, author_default: Option<&[String]>) -> BTreeSet<Outcome> {
        if let Some(value) = self.query.get(PARAM_COLLAPSED) {
            return parse_outcome_list(value);
        }
        match author_default {
            Some(tokens) => parse_outcome_list(&tokens.join(",")),
            None => std::iter::once(Outcome::Passed).collect(),
        }
    }

    /// Per-record collapsed state; absent or malformed storage is empty.
    pub fn collapsed_ids(&self) -> BTreeSet<String> {
        self.session
            .get_item(KEY_COLLAPSED_IDS)
            .and_then(|json| serde_json::from_str::<Vec<String>>(json).ok())
            .map(|ids| ids.into_iter().collect())
            .unwrap_or_default()
    }

    /// True once the collapsed-id set has been seeded for this session.
    pub fn has_collapsed_ids(&self) -> bool {
        self.session.contains(KEY_COLLAPSED_IDS)
    }

    pub fn set_collapsed_ids(&mut self, ids: &BTreeSet<String>) {
        let ids: Vec<&String> = ids.iter().collect();
        let json = serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string());
        self.session.set_item(KEY_COLLAPSED_IDS, &json);
    }

    // ─── channel access for hosts ────────────────────────────────────────

    /// The canonical query string for the host to install in the URL.
    pub fn query_string(&self) -> String {
        self.query.to_query_string()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionStore {
        &mut self.session
    }
}

/// Parse a comma-separated, case-insensitive outcome list. `all` expands to
/// the full set; unknown tokens are dropped; blank input is the empty set.
fn parse_outcome_list(value: &str) -> BTreeSet<Outcome> {
    let mut outcomes = BTreeSet::new();
    for token in value.split(',') {
        let token = token.trim();
        if token.eq_ignore_ascii_case("all") {
            return Outcome::ALL.into_iter().collect();
        }
        if let Ok(outcome) = token.parse::<Outcome>() {
            outcomes.insert(outcome);
        }
    }
    outcomes
}

/// Serialize a set of outcomes in canonical order.
fn outcome_list(outcomes: &BTreeSet<Outcome>) -> String {
    Outcome::ALL
        .into_iter()
        .filter(|outcome| outcomes.contains(outcome))
        .map(Outcome::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
