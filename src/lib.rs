//! Session continuity for AI coding assistants.
//!
//! Chronicle reads a directory of immutable session records ("blocks") and turns
//! them into a deduplicated, time-aware view of outstanding work. Each block
//! captures one session: its project, worktree, branch, what was accomplished,
//! and what was left pending.
//!
//! | Concern | Behavior |
//! |---------|----------|
//! | **Identity** | Pending items are keyed by normalized (project, text) |
//! | **Age** | An item's age is measured from its *earliest* occurrence |
//! | **Staleness** | Older than [`pending::STALE_THRESHOLD_DAYS`] (14) days |
//! | **Threads** | Slugs recorded on blocks group sub-tasks of one goal |
//! | **Resolution** | Recorded in a separate overlay file; blocks are never edited |
//!
//! # Architecture
//!
//! - **Storage**: one JSON file per block, one JSON overlay for resolutions
//! - **Matching**: token-set Jaccard overlap proposes (pending, accomplished)
//!   pairs for an external judge; confirmed pairs are written back as `auto`
//!   resolutions
//! - **Scope**: project, worktree and branch detected from the working directory
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`blocks`] — Block validation and the newest-first [`blocks::BlockSet`]
//! - [`pending`] — Aggregation, staleness, and thread grouping
//! - [`resolution`] — Overlay store, lexical matcher, resolve and undo
//! - [`context`] — Working directory to (project, worktree, branch)
//! - [`catchup`] — Last session plus open work for one project

pub mod blocks;
pub mod catchup;
pub mod config;
pub mod context;
pub mod pending;
pub mod resolution;
