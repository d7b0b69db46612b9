//! Read-only access to the blocks directory.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::types::{parse_block, Block, BlockError};

/// An accomplished item, flattened out of its block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccomplishedItem {
    pub text: String,
    pub project: String,
    /// Timestamp of the session that accomplished it.
    pub timestamp: DateTime<Utc>,
}

/// Blocks in canonical order: newest first.
///
/// The order is established once, when the set is built, and every filter
/// preserves it. Consumers that need chronological order ask for
/// [`BlockSet::oldest_first`] instead of reversing by convention.
#[derive(Debug, Clone, Default)]
pub struct BlockSet {
    blocks: Vec<Block>,
}

impl BlockSet {
    /// Build a set from blocks in any order.
    pub fn new(mut blocks: Vec<Block>) -> Self {
        blocks.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.source.cmp(&b.source))
        });
        Self { blocks }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn newest_first(&self) -> impl DoubleEndedIterator<Item = &Block> + '_ {
        self.blocks.iter()
    }

    pub fn oldest_first(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.iter().rev()
    }

    /// The most recent session in the set.
    pub fn latest(&self) -> Option<&Block> {
        self.blocks.first()
    }

    pub fn as_slice(&self) -> &[Block] {
        &self.blocks
    }

    /// Case-insensitive exact match on project.
    pub fn filter_by_project(&self, project: &str) -> BlockSet {
        self.retain(|b| b.is_project(project))
    }

    /// `None` passes every block through; worktree filtering is opt-in.
    pub fn filter_by_worktree(&self, worktree: Option<&str>) -> BlockSet {
        match worktree {
            None => self.clone(),
            Some(wt) => {
                let wanted = wt.trim().to_lowercase();
                self.retain(|b| {
                    b.worktree
                        .as_deref()
                        .is_some_and(|w| w.to_lowercase() == wanted)
                })
            }
        }
    }

    /// Keeps blocks with `timestamp >= now - days`.
    ///
    /// A window too wide to represent reaches back to the beginning and keeps
    /// every block.
    pub fn filter_by_date_range(&self, days: i64, now: DateTime<Utc>) -> BlockSet {
        let cutoff = Duration::try_days(days).and_then(|span| now.checked_sub_signed(span));
        match cutoff {
            Some(cutoff) => self.retain(|b| b.timestamp >= cutoff),
            None => self.clone(),
        }
    }

    /// All accomplished items, newest session first.
    pub fn accomplished_items(&self) -> Vec<AccomplishedItem> {
        self.blocks
            .iter()
            .flat_map(|block| {
                block.accomplished.iter().map(move |text| AccomplishedItem {
                    text: text.clone(),
                    project: block.project.clone(),
                    timestamp: block.timestamp,
                })
            })
            .collect()
    }

    fn retain(&self, keep: impl Fn(&Block) -> bool) -> BlockSet {
        BlockSet {
            blocks: self.blocks.iter().filter(|&b| keep(b)).cloned().collect(),
        }
    }
}

impl From<Vec<Block>> for BlockSet {
    fn from(blocks: Vec<Block>) -> Self {
        BlockSet::new(blocks)
    }
}

/// A block file that failed validation.
#[derive(Debug)]
pub struct SkippedBlock {
    pub path: PathBuf,
    pub error: BlockError,
}

/// Result of a full directory scan, including quarantined files.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub blocks: BlockSet,
    pub skipped: Vec<SkippedBlock>,
}

/// Directory of immutable JSON session blocks.
#[derive(Debug, Clone)]
pub struct BlockStore {
    dir: PathBuf,
}

impl BlockStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load every valid block, newest first. Malformed files are skipped.
    pub fn load_all_blocks(&self) -> Result<BlockSet> {
        Ok(self.load_with_report()?.blocks)
    }

    /// Load every block and report the files that were quarantined.
    ///
    /// A missing directory is an empty store. Failing to list an existing
    /// directory is a hard error; failing to read or validate one file is not.
    pub fn load_with_report(&self) -> Result<LoadReport> {
        if !self.dir.exists() {
            debug!(dir = %self.dir.display(), "blocks directory does not exist");
            return Ok(LoadReport::default());
        }

        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("failed to list blocks directory {}", self.dir.display()))?;

        let mut blocks = Vec::new();
        let mut skipped = Vec::new();

        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!(dir = %self.dir.display(), error = %e, "unreadable directory entry");
                    continue;
                }
            };
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match read_block(&path) {
                Ok(block) => blocks.push(block),
                Err(error) => {
                    warn!(path = %path.display(), error = %error, "skipping malformed block");
                    skipped.push(SkippedBlock { path, error });
                }
            }
        }

        debug!(
            dir = %self.dir.display(),
            loaded = blocks.len(),
            skipped = skipped.len(),
            "blocks loaded"
        );

        Ok(LoadReport {
            blocks: BlockSet::new(blocks),
            skipped,
        })
    }
}

fn read_block(path: &Path) -> Result<Block, BlockError> {
    let json = std::fs::read_to_string(path)?;
    let mut block = parse_block(&json)?;
    block.source = Some(path.to_path_buf());
    Ok(block)
}
