//! Pending Aggregator — one deduplicated, aged view of outstanding work.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

use super::key::PendingKey;
use super::staleness::is_stale;
use super::threads::ThreadIndex;
use crate::blocks::BlockSet;
use crate::resolution::{Overlay, Resolution};

/// A pending item derived from one or more blocks. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingItem {
    pub key: PendingKey,
    /// Wording of the earliest occurrence.
    pub text: String,
    /// Project of the block that introduced the item.
    pub project: String,
    pub first_seen: DateTime<Utc>,
    pub age_in_days: i64,
    pub is_stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl PendingItem {
    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }
}

/// Whole days between `first_seen` and `now`, floored, never negative.
pub fn age_in_days(first_seen: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - first_seen).num_days().max(0)
}

/// Aggregate pending items across `blocks`.
///
/// Blocks are walked oldest first, so the first time a key is met is its earliest
/// occurrence and later restatements never refresh its age. Identity is the
/// [`PendingKey`] of (project, text), so identical wording in two projects stays
/// two items. Output is oldest first.
pub fn aggregate_pending(
    blocks: &BlockSet,
    threads: &ThreadIndex,
    overlay: &Overlay,
    now: DateTime<Utc>,
) -> Vec<PendingItem> {
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for block in blocks.oldest_first() {
        for text in &block.pending {
            let key = PendingKey::new(&block.project, text);
            if !seen.insert(key.clone()) {
                continue;
            }

            let age = age_in_days(block.timestamp, now);
            items.push(PendingItem {
                thread: threads.get(&block.project, text).map(String::from),
                resolution: overlay.get(&key).cloned(),
                key,
                text: text.clone(),
                project: block.project.clone(),
                first_seen: block.timestamp,
                age_in_days: age,
                is_stale: is_stale(age),
            });
        }
    }

    items.sort_by(|a, b| {
        b.age_in_days
            .cmp(&a.age_in_days)
            .then_with(|| a.first_seen.cmp(&b.first_seen))
            .then_with(|| a.key.cmp(&b.key))
    });
    items
}

/// Aggregate one project's pending items, optionally narrowed to a worktree and
/// a window of `days`.
///
/// `history` holds every block of the project. Thread labels are looked up across
/// all of it, so a label recorded in another worktree or before the window still
/// applies.
pub fn aggregate_scoped(
    history: &BlockSet,
    worktree: Option<&str>,
    days: Option<i64>,
    overlay: &Overlay,
    now: DateTime<Utc>,
) -> Vec<PendingItem> {
    let threads = ThreadIndex::build(history);
    let scoped = history.filter_by_worktree(worktree);
    let window = match days {
        Some(d) => scoped.filter_by_date_range(d, now),
        None => scoped,
    };
    aggregate_pending(&window, &threads, overlay, now)
}

/// Items without a resolution, order kept.
pub fn unresolved(items: &[PendingItem]) -> Vec<PendingItem> {
    items.iter().filter(|i| !i.is_resolved()).cloned().collect()
}
