//! Catch-up view: where the last session left off and what is still open.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::blocks::{Block, BlockSet};
use crate::pending::{
    aggregate_pending, group_by_thread, unresolved, PendingItem, ThreadIndex,
    STALE_THRESHOLD_DAYS,
};
use crate::resolution::Overlay;

/// The most recent session in the window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastSession {
    pub timestamp: DateTime<Utc>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worktree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub pending_count: usize,
}

impl From<&Block> for LastSession {
    fn from(block: &Block) -> Self {
        Self {
            timestamp: block.timestamp,
            summary: block.summary.clone(),
            worktree: block.worktree.clone(),
            branch: block.branch.clone(),
            pending_count: block.pending.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchUp {
    pub project: String,
    pub window_days: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_session: Option<LastSession>,
    /// Unresolved items, thread-grouped.
    pub pending: Vec<PendingItem>,
    pub stale_count: usize,
    pub warnings: Vec<String>,
}

/// Build the catch-up view for one project.
///
/// `history` may hold every block; the project's full slice of it is used for
/// thread lookup. The window (`worktree`, if given, and `days` back from `now`)
/// decides which sessions contribute pending items and which one is "last".
pub fn catch_up(
    project: &str,
    worktree: Option<&str>,
    history: &BlockSet,
    overlay: &Overlay,
    days: i64,
    now: DateTime<Utc>,
) -> CatchUp {
    let history = history.filter_by_project(project);
    let window = history
        .filter_by_worktree(worktree)
        .filter_by_date_range(days, now);
    let threads = ThreadIndex::build(&history);

    let items = aggregate_pending(&window, &threads, overlay, now);
    let open = group_by_thread(unresolved(&items));
    let stale_count = open.iter().filter(|i| i.is_stale).count();

    let mut warnings = Vec::new();
    if stale_count > 0 {
        warnings.push(format!(
            "{stale_count} pending item{} older than {STALE_THRESHOLD_DAYS} days",
            if stale_count == 1 { " is" } else { "s are" }
        ));
    }

    CatchUp {
        project: project.to_string(),
        window_days: days,
        last_session: window.latest().map(LastSession::from),
        pending: open,
        stale_count,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pending::PendingKey;
    use crate::resolution::{Resolution, ResolutionMethod};
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn block(days_ago: i64, summary: &str, pending: &[&str]) -> Block {
        Block {
            timestamp: now() - Duration::days(days_ago),
            project: "demo".to_string(),
            worktree: None,
            branch: Some("main".to_string()),
            summary: summary.to_string(),
            accomplished: Vec::new(),
            pending: pending.iter().map(|s| s.to_string()).collect(),
            pending_threads: BTreeMap::new(),
            source: None,
        }
    }

    #[test]
    fn test_catch_up_reports_last_session_and_stale() {
        let history = BlockSet::new(vec![
            block(20, "started checkout", &["Add E2E tests"]),
            block(2, "fixed cart totals", &["Add E2E tests", "Update changelog"]),
        ]);
        let view = catch_up("demo", None, &history, &Overlay::default(), 30, now());

        let last = view.last_session.unwrap();
        assert_eq!(last.summary, "fixed cart totals");
        assert_eq!(last.pending_count, 2);
        assert_eq!(view.pending.len(), 2);
        assert_eq!(view.stale_count, 1);
        assert_eq!(view.warnings, vec!["1 pending item is older than 14 days"]);
    }

    #[test]
    fn test_catch_up_hides_resolved_items() {
        let history = BlockSet::new(vec![block(1, "s", &["Write docs", "Ship it"])]);
        let overlay = Overlay {
            resolutions: vec![Resolution {
                pending_key: PendingKey::new("demo", "ship it"),
                pending_text: "Ship it".into(),
                project: "demo".into(),
                resolved_by: "shipped".into(),
                resolved_at: now(),
                thread: None,
                method: ResolutionMethod::Explicit,
            }],
        };
        let view = catch_up("demo", None, &history, &overlay, 30, now());
        let texts: Vec<&str> = view.pending.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["Write docs"]);
        assert!(view.warnings.is_empty());
    }

    #[test]
    fn test_catch_up_empty_window() {
        let history = BlockSet::new(vec![block(90, "long ago", &["Old thing"])]);
        let view = catch_up("demo", None, &history, &Overlay::default(), 7, now());
        assert!(view.last_session.is_none());
        assert!(view.pending.is_empty());
        assert_eq!(view.stale_count, 0);
    }
}
