//! Verdict: interactive test report view model and renderer
//!
//! This library models the interaction logic of a self-contained HTML test
//! report: filtering, sorting, and collapsing test records, with view
//! preferences persisted through a URL-style query string and a
//! session-scoped store. Rendering is split in two: the render pipeline
//! produces plain view-model data structures, and an HTML adapter turns
//! them into markup.

pub mod app;
pub mod duration;
pub mod filter;
pub mod model;
pub mod prefs;
pub mod render;
pub mod sort;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors surfaced at the library boundary. Preference parsing never
/// produces these; malformed preferences degrade to defaults instead.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The embedded JSON blob did not match the report data contract
    #[error("invalid report data: {0}")]
    Data(#[from] serde_json::Error),
    /// An outcome string outside the fixed set, at the data boundary
    #[error("unknown outcome: {0}")]
    UnknownOutcome(String),
    /// A sort column key outside the fixed set
    #[error("unknown sort key: {0}")]
    UnknownSortKey(String),
}

/// The categorical verdict of one test execution.
///
/// Case-insensitive at every boundary; the canonical form is lower-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    Error,
    Failed,
    Rerun,
    XFailed,
    XPassed,
    Skipped,
    Passed,
}

impl Outcome {
    /// Every outcome, in the canonical result ordering used by the sort
    /// engine (most severe first).
    pub const ALL: [Outcome; 7] = [
        Outcome::Error,
        Outcome::Failed,
        Outcome::Rerun,
        Outcome::XFailed,
        Outcome::XPassed,
        Outcome::Skipped,
        Outcome::Passed,
    ];

    /// Canonical lower-case form, used for comparisons, serialization, and
    /// CSS class names.
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Error => "error",
            Outcome::Failed => "failed",
            Outcome::Rerun => "rerun",
            Outcome::XFailed => "xfailed",
            Outcome::XPassed => "xpassed",
            Outcome::Skipped => "skipped",
            Outcome::Passed => "passed",
        }
    }

    /// Human label for summary lines and filter controls.
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Error => "Errors",
            Outcome::Failed => "Failed",
            Outcome::Rerun => "Reruns",
            Outcome::XFailed => "Unexpected failures",
            Outcome::XPassed => "Unexpected passes",
            Outcome::Skipped => "Skipped",
            Outcome::Passed => "Passed",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Outcome::Error),
            "failed" => Ok(Outcome::Failed),
            "rerun" => Ok(Outcome::Rerun),
            "xfailed" => Ok(Outcome::XFailed),
            "xpassed" => Ok(Outcome::XPassed),
            "skipped" => Ok(Outcome::Skipped),
            "passed" => Ok(Outcome::Passed),
            other => Err(ReportError::UnknownOutcome(other.to_string())),
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A test duration as it appears in the data blob: either raw seconds from
/// the producer, or a pre-formatted string (`HH:MM:SS[.fff]` or raw
/// milliseconds). Normalization lives in [`duration`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(f64),
    Text(String),
}

impl Default for DurationValue {
    fn default() -> Self {
        DurationValue::Seconds(0.0)
    }
}

/// Attachment format; controls link class and asset-folder resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraKind {
    Image,
    Video,
    Text,
    Html,
    Json,
    Url,
}

impl ExtraKind {
    /// Asset-folder formats are linked relative to `assets/`; URLs are not.
    pub fn is_asset(self) -> bool {
        !matches!(self, ExtraKind::Url)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExtraKind::Image => "image",
            ExtraKind::Video => "video",
            ExtraKind::Text => "text",
            ExtraKind::Html => "html",
            ExtraKind::Json => "json",
            ExtraKind::Url => "url",
        }
    }
}

/// One attachment descriptor on a test record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extra {
    pub name: String,
    #[serde(rename = "format_type", alias = "formatType")]
    pub format_type: ExtraKind,
    pub content: String,
}

/// One row of test-execution data.
///
/// `id` is a synthetic identifier assigned exactly once at load time
/// (`test_<index>`); it is the join key between the render subset and the
/// collapsed-id persistence set and is never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "outcome")]
    pub result: Outcome,
    #[serde(alias = "nodeid", alias = "testId")]
    pub name: String,
    #[serde(default)]
    pub duration: DurationValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<Extra>,
    /// Whether the detail/log section is hidden. Defaulted at load from the
    /// collapsed-category resolution; not part of the data contract.
    #[serde(skip)]
    pub collapsed: bool,
}

/// Terminal value of `runningState`
pub const RUNNING_STATE_FINISHED: &str = "Finished";

/// The whole-report envelope, as embedded in the page by the producer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub environment: BTreeMap<String, serde_json::Value>,
    /// Expected total test count (the run may still be in progress)
    #[serde(default)]
    pub collected_items: usize,
    #[serde(default)]
    pub running_state: String,
    /// Total elapsed seconds as stamped by the producer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<f64>,
    #[serde(default)]
    pub tests: Vec<TestRecord>,
    /// Author-supplied initial sort column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_sort: Option<String>,
    /// Author-supplied collapsed outcome categories (may be `["all"]`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_collapsed: Option<Vec<String>>,
}

fn default_title() -> String {
    "Test Report".to_string()
}

impl Default for ReportData {
    fn default() -> Self {
        Self {
            title: default_title(),
            environment: BTreeMap::new(),
            collected_items: 0,
            running_state: String::new(),
            total_duration: None,
            tests: Vec::new(),
            initial_sort: None,
            render_collapsed: None,
        }
    }
}
