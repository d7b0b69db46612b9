pub mod catchup;
pub mod check;
pub mod pending;
pub mod resolve;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

use chronicle::blocks::{BlockSet, BlockStore};
use chronicle::config::ChronicleConfig;
use chronicle::context::{detect_context, SessionContext};
use chronicle::pending::PendingItem;
use chronicle::resolution::{JsonFileStore, ResolutionMatcher};

/// Detect the session context of the current directory.
fn current_context(config: &ChronicleConfig) -> Result<SessionContext> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(detect_context(&cwd, &config.context))
}

/// The explicit project if given, otherwise the detected one.
fn project_or_detect(config: &ChronicleConfig, project: Option<&str>) -> Result<String> {
    match project {
        Some(p) => Ok(p.trim().to_string()),
        None => Ok(current_context(config)?.project),
    }
}

fn load_blocks(config: &ChronicleConfig) -> Result<BlockSet> {
    BlockStore::new(config.resolved_blocks_dir()).load_all_blocks()
}

fn matcher(config: &ChronicleConfig) -> ResolutionMatcher<JsonFileStore> {
    ResolutionMatcher::new(
        JsonFileStore::new(config.resolved_overlay_path()),
        config.matching.clone(),
    )
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

/// One pending item as a terminal line.
fn format_item(item: &PendingItem) -> String {
    let marker = if item.is_resolved() {
        "✓"
    } else if item.is_stale {
        "!"
    } else {
        "-"
    };
    let thread = item
        .thread
        .as_ref()
        .map(|t| format!(" [{t}]"))
        .unwrap_or_default();
    let age = match item.age_in_days {
        0 => "today".to_string(),
        1 => "1 day".to_string(),
        n => format!("{n} days"),
    };
    format!("  {marker} {}{thread} ({age})", item.text)
}

/// Show the detected project, worktree, and branch.
pub fn context(config: &ChronicleConfig, cwd: Option<PathBuf>) -> Result<()> {
    let ctx = match cwd {
        Some(dir) => detect_context(&dir, &config.context),
        None => current_context(config)?,
    };

    println!("Project:   {}", ctx.project);
    println!("Worktree:  {}", ctx.worktree.as_deref().unwrap_or("(none)"));
    println!("Branch:    {}", ctx.branch.as_deref().unwrap_or("(none)"));
    Ok(())
}
