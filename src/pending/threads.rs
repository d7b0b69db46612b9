//! Thread Grouper — joins pending text to thread slugs recorded on blocks.
//!
//! Slugs are assigned upstream when a session's pending list decomposes one larger
//! goal. Nothing here infers threads; it only looks them up and orders by them.

use std::collections::HashMap;

use super::aggregate::PendingItem;
use crate::blocks::{Block, BlockSet};

/// First `pendingThreads[text]` entry among blocks of `project`.
pub fn get_thread_for_pending(text: &str, project: &str, blocks: &[Block]) -> Option<String> {
    blocks
        .iter()
        .filter(|b| b.is_project(project))
        .find_map(|b| b.pending_threads.get(text.trim()).cloned())
}

/// Precomputed `(project, text) → slug` join over a set of blocks.
#[derive(Debug, Clone, Default)]
pub struct ThreadIndex {
    slugs: HashMap<(String, String), String>,
}

impl ThreadIndex {
    /// Index every thread label; the newest block wins when labels disagree.
    pub fn build(blocks: &BlockSet) -> Self {
        let mut slugs = HashMap::new();
        for block in blocks.newest_first() {
            let project = block.project.to_lowercase();
            for (text, slug) in &block.pending_threads {
                slugs
                    .entry((project.clone(), text.clone()))
                    .or_insert_with(|| slug.clone());
            }
        }
        Self { slugs }
    }

    pub fn get(&self, project: &str, text: &str) -> Option<&str> {
        self.slugs
            .get(&(project.trim().to_lowercase(), text.trim().to_string()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }
}

/// Display order: same-thread items adjacent, groups ranked by their oldest member.
///
/// An unthreaded item is a group of one. Within a group the incoming order (age
/// descending from aggregation) is kept.
pub fn group_by_thread(items: Vec<PendingItem>) -> Vec<PendingItem> {
    let mut group_rank: HashMap<(String, String), i64> = HashMap::new();
    for item in &items {
        if let Some(thread) = &item.thread {
            let rank = group_rank
                .entry((item.project.to_lowercase(), thread.clone()))
                .or_insert(item.age_in_days);
            *rank = (*rank).max(item.age_in_days);
        }
    }

    let mut indexed: Vec<(usize, PendingItem)> = items.into_iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| {
        let rank = |item: &PendingItem| match &item.thread {
            Some(t) => group_rank[&(item.project.to_lowercase(), t.clone())],
            None => item.age_in_days,
        };
        let group = |item: &PendingItem| {
            item.thread
                .as_ref()
                .map(|t| (item.project.to_lowercase(), t.clone()))
        };
        rank(b)
            .cmp(&rank(a))
            // equal ranks: threaded groups first, then by slug so groups never interleave
            .then_with(|| group(b).is_some().cmp(&group(a).is_some()))
            .then_with(|| group(a).cmp(&group(b)))
            .then_with(|| ia.cmp(ib))
    });
    indexed.into_iter().map(|(_, item)| item).collect()
}
