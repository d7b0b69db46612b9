//! Session block records and their validation boundary.
//!
//! Block files are parsed into a permissive [`RawBlock`] and then validated into a
//! [`Block`]. Everything downstream works with `Block` only, so the questions "is
//! this field present" and "is this timestamp parseable" are answered here and
//! nowhere else.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Why a block file was quarantined.
#[derive(Debug, Error)]
pub enum BlockError {
    #[error("failed to read block file: {0}")]
    Io(#[from] std::io::Error),
    #[error("block is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("block is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("block timestamp `{0}` is not ISO 8601")]
    InvalidTimestamp(String),
}

/// One session capture as it appears on disk. Every field is optional here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBlock {
    pub timestamp: Option<String>,
    pub project: Option<String>,
    pub worktree: Option<String>,
    pub branch: Option<String>,
    pub summary: Option<String>,
    pub accomplished: Option<Vec<String>>,
    pub pending: Option<Vec<String>>,
    pub pending_threads: Option<BTreeMap<String, String>>,
}

/// A validated, immutable session record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Session capture time.
    pub timestamp: DateTime<Utc>,
    /// Logical project name (compared case-insensitively).
    pub project: String,
    /// Worktree within the project, if the session ran in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worktree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub summary: String,
    pub accomplished: Vec<String>,
    pub pending: Vec<String>,
    /// Exact pending text → thread slug.
    pub pending_threads: BTreeMap<String, String>,
    /// File the block was loaded from; `None` for blocks built in memory.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Block {
    /// Case-insensitive project comparison used by every filter and join.
    pub fn is_project(&self, project: &str) -> bool {
        self.project.to_lowercase() == project.trim().to_lowercase()
    }
}

impl TryFrom<RawBlock> for Block {
    type Error = BlockError;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        let timestamp_str = non_blank(raw.timestamp).ok_or(BlockError::MissingField("timestamp"))?;
        let timestamp = parse_timestamp(&timestamp_str)
            .ok_or_else(|| BlockError::InvalidTimestamp(timestamp_str.clone()))?;
        let project = non_blank(raw.project).ok_or(BlockError::MissingField("project"))?;

        Ok(Block {
            timestamp,
            project,
            worktree: non_blank(raw.worktree),
            branch: non_blank(raw.branch),
            summary: raw.summary.map(|s| s.trim().to_string()).unwrap_or_default(),
            accomplished: clean_list(raw.accomplished),
            pending: clean_list(raw.pending),
            pending_threads: raw
                .pending_threads
                .unwrap_or_default()
                .into_iter()
                .filter_map(|(text, slug)| {
                    let slug = slug.trim();
                    (!slug.is_empty()).then(|| (text.trim().to_string(), slug.to_string()))
                })
                .collect(),
            source: None,
        })
    }
}

/// Parse a block from JSON text, validating it.
pub fn parse_block(json: &str) -> Result<Block, BlockError> {
    let raw: RawBlock = serde_json::from_str(json)?;
    Block::try_from(raw)
}

/// Accepts RFC 3339, offset-less date-times (taken as UTC), and bare dates.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(items: Option<Vec<String>>) -> Vec<String> {
    items
        .unwrap_or_default()
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_block() {
        let block = parse_block(
            r#"{
                "timestamp": "2026-03-01T10:00:00Z",
                "project": "demo",
                "worktree": "feature-x",
                "branch": "main",
                "summary": "Wired up auth",
                "accomplished": ["Added login form"],
                "pending": ["Add unit tests", "  "],
                "pendingThreads": {"Add unit tests": "auth-system"}
            }"#,
        )
        .unwrap();

        assert_eq!(block.project, "demo");
        assert_eq!(block.worktree.as_deref(), Some("feature-x"));
        assert_eq!(block.pending, vec!["Add unit tests".to_string()]);
        assert_eq!(
            block.pending_threads.get("Add unit tests").map(String::as_str),
            Some("auth-system")
        );
    }

    #[test]
    fn test_optional_fields_default() {
        let block =
            parse_block(r#"{"timestamp": "2026-03-01T10:00:00Z", "project": "demo"}"#).unwrap();
        assert!(block.worktree.is_none());
        assert!(block.branch.is_none());
        assert!(block.summary.is_empty());
        assert!(block.accomplished.is_empty());
        assert!(block.pending.is_empty());
        assert!(block.pending_threads.is_empty());
    }

    #[test]
    fn test_blank_worktree_is_absent() {
        let block = parse_block(
            r#"{"timestamp": "2026-03-01T10:00:00Z", "project": "demo", "worktree": "  "}"#,
        )
        .unwrap();
        assert!(block.worktree.is_none());
    }

    #[test]
    fn test_missing_project_rejected() {
        let err = parse_block(r#"{"timestamp": "2026-03-01T10:00:00Z"}"#).unwrap_err();
        assert!(matches!(err, BlockError::MissingField("project")));
    }

    #[test]
    fn test_missing_timestamp_rejected() {
        let err = parse_block(r#"{"project": "demo"}"#).unwrap_err();
        assert!(matches!(err, BlockError::MissingField("timestamp")));
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let err = parse_block(r#"{"timestamp": "last tuesday", "project": "demo"}"#).unwrap_err();
        assert!(matches!(err, BlockError::InvalidTimestamp(_)));
    }

    #[test]
    fn test_not_json_rejected() {
        let err = parse_block("{ not json").unwrap_err();
        assert!(matches!(err, BlockError::Json(_)));
    }

    #[test]
    fn test_timestamp_formats() {
        let with_offset = parse_timestamp("2026-03-01T12:00:00+02:00").unwrap();
        assert_eq!(with_offset.to_rfc3339(), "2026-03-01T10:00:00+00:00");

        let naive = parse_timestamp("2026-03-01T10:00:00.250").unwrap();
        assert_eq!(naive.timestamp_millis() % 1000, 250);

        let date = parse_timestamp("2026-03-01").unwrap();
        assert_eq!(date.to_rfc3339(), "2026-03-01T00:00:00+00:00");
    }

    #[test]
    fn test_is_project_case_insensitive() {
        let block =
            parse_block(r#"{"timestamp": "2026-03-01T10:00:00Z", "project": "Demo"}"#).unwrap();
        assert!(block.is_project("demo"));
        assert!(block.is_project(" DEMO "));
        assert!(!block.is_project("demo-2"));
    }
}
