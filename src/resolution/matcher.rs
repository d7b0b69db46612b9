//! Resolution Matcher — proposes, records, and reverts resolutions.
//!
//! [`find_resolution_candidates`] is a pure ranking over pending and accomplished
//! items. [`ResolutionMatcher`] wraps it with an injected [`ResolutionStore`] and
//! owns every overlay write: explicit resolve, confirmation of a candidate, and undo.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

use super::score::overlap_score;
use super::store::ResolutionStore;
use super::types::{Resolution, ResolutionMethod};
use crate::blocks::AccomplishedItem;
use crate::config::MatchingConfig;
use crate::pending::{PendingItem, PendingKey};

/// `resolvedBy` for an explicit resolution recorded without a note.
pub const DEFAULT_RESOLVED_BY: &str = "resolved manually";

/// A proposed (pending, accomplished) pair awaiting a verdict.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionCandidate {
    pub pending: PendingItem,
    pub accomplished: AccomplishedItem,
    pub score: f64,
}

/// Rank every plausible (pending, accomplished) pair.
///
/// Only pending items whose key is not in `resolved_keys` take part. An
/// accomplished item can only resolve pending work of the same project that was
/// already outstanding when its session ran. Pairs must score above
/// `config.min_score`; the best `config.max_candidates` are returned.
pub fn find_resolution_candidates(
    pending: &[PendingItem],
    accomplished: &[AccomplishedItem],
    resolved_keys: &HashSet<PendingKey>,
    config: &MatchingConfig,
) -> Vec<ResolutionCandidate> {
    let mut candidates = Vec::new();

    for item in pending.iter().filter(|p| !resolved_keys.contains(&p.key)) {
        let project = item.project.to_lowercase();
        for done in accomplished {
            if done.project.to_lowercase() != project || done.timestamp < item.first_seen {
                continue;
            }
            let score = overlap_score(&item.text, &done.text);
            if score > config.min_score {
                candidates.push(ResolutionCandidate {
                    pending: item.clone(),
                    accomplished: done.clone(),
                    score,
                });
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.pending.first_seen.cmp(&b.pending.first_seen))
            .then_with(|| a.accomplished.text.cmp(&b.accomplished.text))
    });
    candidates.truncate(config.max_candidates);
    candidates
}

/// Overlay-backed resolution operations over an injected store.
pub struct ResolutionMatcher<S: ResolutionStore> {
    store: S,
    config: MatchingConfig,
}

impl<S: ResolutionStore> ResolutionMatcher<S> {
    pub fn new(store: S, config: MatchingConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Candidates for every pending item the overlay has not resolved yet.
    pub fn candidates(
        &self,
        pending: &[PendingItem],
        accomplished: &[AccomplishedItem],
    ) -> Result<Vec<ResolutionCandidate>> {
        let overlay = self.store.load()?;
        let resolved: HashSet<PendingKey> = overlay.keys().cloned().collect();
        Ok(find_resolution_candidates(
            pending,
            accomplished,
            &resolved,
            &self.config,
        ))
    }

    /// Record an explicit resolution from user input.
    ///
    /// The pending item does not need to exist in any block right now; the entry
    /// applies whenever an item with the same key is aggregated.
    pub fn resolve(
        &self,
        pending_text: &str,
        project: &str,
        note: Option<&str>,
        thread: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Resolution> {
        let resolved_by = note
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_RESOLVED_BY);
        let resolution = Resolution {
            pending_key: PendingKey::new(project, pending_text),
            pending_text: pending_text.trim().to_string(),
            project: project.trim().to_string(),
            resolved_by: resolved_by.to_string(),
            resolved_at: now,
            thread: thread.map(String::from),
            method: ResolutionMethod::Explicit,
        };
        self.record(resolution)
    }

    /// Record a candidate that an external judge confirmed.
    pub fn confirm(&self, candidate: &ResolutionCandidate, now: DateTime<Utc>) -> Result<Resolution> {
        let pending = &candidate.pending;
        let resolution = Resolution {
            pending_key: pending.key.clone(),
            pending_text: pending.text.clone(),
            project: pending.project.clone(),
            resolved_by: candidate.accomplished.text.clone(),
            resolved_at: now,
            thread: pending.thread.clone(),
            method: ResolutionMethod::Auto,
        };
        self.record(resolution)
    }

    /// Remove the resolution for `(project, pending_text)`. Returns whether one existed.
    pub fn undo(&self, pending_text: &str, project: &str) -> Result<bool> {
        let key = PendingKey::new(project, pending_text);
        let removed = self.store.modify(|overlay| overlay.remove(&key))?;
        if removed {
            info!(key = %key, "resolution removed");
        }
        Ok(removed)
    }

    /// Every recorded resolution, most recent first.
    pub fn list_resolved(&self) -> Result<Vec<Resolution>> {
        let mut resolutions = self.store.load()?.resolutions;
        resolutions.sort_by(|a, b| b.resolved_at.cmp(&a.resolved_at));
        Ok(resolutions)
    }

    fn record(&self, resolution: Resolution) -> Result<Resolution> {
        let stored = resolution.clone();
        self.store.modify(move |overlay| overlay.upsert(stored))?;
        info!(
            key = %resolution.pending_key,
            method = %resolution.method,
            "resolution recorded"
        );
        Ok(resolution)
    }
}
