//! Session-scoped preference channel.
//!
//! Holds the view state that is intentionally not shareable: the sort
//! direction flag and the per-record collapsed-id set. The store is an
//! in-memory string map with a JSON round-trip so a host (or the CLI's
//! `--state-file`) can stash and restore it for the lifetime of a session.

use std::collections::BTreeMap;

/// Key for the ascending-sort flag, stored as `"true"`/`"false"`
pub const KEY_SORT_ASC: &str = "sortAsc";
/// Key for the collapsed record ids, stored as a JSON string array
pub const KEY_COLLAPSED_IDS: &str = "collapsedIds";

/// In-memory session storage with string keys and string values.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    entries: BTreeMap<String, String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set_item(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    pub fn remove_item(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Restore a store from its JSON form. Malformed input yields an empty
    /// store; a broken session must not block rendering.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<BTreeMap<String, String>>(json) {
            Ok(entries) => Self { entries },
            Err(_) => Self::default(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.entries).unwrap_or_else(|_| "{}".to_string())
    }
}
