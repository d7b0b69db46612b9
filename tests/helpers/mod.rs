#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Fixed clock shared by every integration test.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 15, 12, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

/// Builder for a block JSON file.
pub struct BlockSpec {
    pub project: String,
    pub days_ago: i64,
    pub worktree: Option<String>,
    pub summary: String,
    pub accomplished: Vec<String>,
    pub pending: Vec<String>,
    pub threads: Vec<(String, String)>,
}

pub fn block(project: &str, days_ago: i64) -> BlockSpec {
    BlockSpec {
        project: project.to_string(),
        days_ago,
        worktree: None,
        summary: format!("session {days_ago} days ago"),
        accomplished: Vec::new(),
        pending: Vec::new(),
        threads: Vec::new(),
    }
}

impl BlockSpec {
    pub fn pending(mut self, items: &[&str]) -> Self {
        self.pending = items.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn accomplished(mut self, items: &[&str]) -> Self {
        self.accomplished = items.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn thread(mut self, text: &str, slug: &str) -> Self {
        self.threads.push((text.to_string(), slug.to_string()));
        self
    }

    pub fn worktree(mut self, name: &str) -> Self {
        self.worktree = Some(name.to_string());
        self
    }

    /// Write as `<dir>/<name>.json`. Returns the file path.
    pub fn write(self, dir: &Path, name: &str) -> PathBuf {
        let threads: serde_json::Map<String, serde_json::Value> = self
            .threads
            .into_iter()
            .map(|(t, s)| (t, json!(s)))
            .collect();
        let value = json!({
            "timestamp": days_ago(self.days_ago).to_rfc3339(),
            "project": self.project,
            "worktree": self.worktree,
            "summary": self.summary,
            "accomplished": self.accomplished,
            "pending": self.pending,
            "pendingThreads": threads,
        });
        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join(format!("{name}.json"));
        std::fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
        path
    }
}
