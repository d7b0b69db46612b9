//! CLI resolution commands: `candidates`, `confirm`, `resolve`, `undo`, `resolved`.

use anyhow::{bail, Result};

use chronicle::blocks::AccomplishedItem;
use chronicle::config::ChronicleConfig;
use chronicle::pending::{aggregate_pending, get_thread_for_pending, PendingKey, ThreadIndex};
use chronicle::resolution::{ResolutionCandidate, ResolutionMethod, ResolutionStore};

use crate::Scope;

/// Print candidate pairs for review by a judge or the user.
pub fn candidates(
    config: &ChronicleConfig,
    scope: &Scope,
    days: Option<i64>,
    json: bool,
) -> Result<()> {
    let project = super::project_or_detect(config, scope.project.as_deref())?;
    let days = days.unwrap_or(config.pending.window_days);
    let now = super::now();

    let history = super::load_blocks(config)?.filter_by_project(&project);
    let window = history
        .filter_by_worktree(scope.worktree.as_deref())
        .filter_by_date_range(days, now);

    let matcher = super::matcher(config);
    let overlay = matcher.store().load()?;
    let threads = ThreadIndex::build(&history);
    let pending = aggregate_pending(&window, &threads, &overlay, now);
    let accomplished: Vec<AccomplishedItem> = window.accomplished_items();

    let found = matcher.candidates(&pending, &accomplished)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }

    if found.is_empty() {
        println!("No resolution candidates for {project}.");
        return Ok(());
    }

    println!("Resolution candidates for {project}");
    println!("{}", "=".repeat(40));
    for (i, c) in found.iter().enumerate() {
        println!("  {}. [{:.2}] {}", i + 1, c.score, c.pending.text);
        println!("        <- {}", c.accomplished.text);
    }
    println!();
    println!("Confirm a pair with: chronicle confirm \"<pending>\" \"<accomplished>\"");
    Ok(())
}

/// Record a judge-confirmed pair as an `auto` resolution.
///
/// The pair must still be a live candidate: the pending item unresolved and the
/// accomplished item from the same project at or after it.
pub fn confirm(
    config: &ChronicleConfig,
    pending_text: &str,
    accomplished_text: &str,
    project: Option<&str>,
) -> Result<()> {
    let project = super::project_or_detect(config, project)?;
    let now = super::now();

    let history = super::load_blocks(config)?.filter_by_project(&project);
    let matcher = super::matcher(config);
    let overlay = matcher.store().load()?;
    let threads = ThreadIndex::build(&history);
    let pending = aggregate_pending(&history, &threads, &overlay, now);

    let key = PendingKey::new(&project, pending_text);
    let Some(item) = pending.into_iter().find(|p| p.key == key) else {
        bail!("no pending item \"{pending_text}\" in {project}");
    };
    if item.is_resolved() {
        bail!("\"{}\" is already resolved", item.text);
    }

    let wanted = accomplished_text.trim().to_lowercase();
    let Some(accomplished) = history
        .accomplished_items()
        .into_iter()
        .filter(|a| a.timestamp >= item.first_seen)
        .find(|a| a.text.to_lowercase() == wanted)
    else {
        bail!("no accomplished item \"{accomplished_text}\" in {project} since the item was first seen");
    };

    let score = chronicle::resolution::overlap_score(&item.text, &accomplished.text);
    let candidate = ResolutionCandidate {
        pending: item,
        accomplished,
        score,
    };
    let resolution = matcher.confirm(&candidate, now)?;

    println!("Resolved: {}", resolution.pending_text);
    println!("  by:     {}", resolution.resolved_by);
    Ok(())
}

/// Mark a pending item resolved with an optional note.
pub fn resolve(
    config: &ChronicleConfig,
    text: &str,
    project: Option<&str>,
    note: Option<&str>,
) -> Result<()> {
    let project = super::project_or_detect(config, project)?;
    let blocks = super::load_blocks(config)?;
    let thread = get_thread_for_pending(text, &project, blocks.as_slice());

    let resolution = super::matcher(config).resolve(
        text,
        &project,
        note,
        thread.as_deref(),
        super::now(),
    )?;

    println!("Resolved: {} ({})", resolution.pending_text, resolution.project);
    if let Some(ref t) = resolution.thread {
        println!("  thread: {t}");
    }
    Ok(())
}

/// Remove a resolution.
pub fn undo(config: &ChronicleConfig, text: &str, project: Option<&str>) -> Result<()> {
    let project = super::project_or_detect(config, project)?;

    if super::matcher(config).undo(text, &project)? {
        println!("Reopened: {text} ({project})");
    } else {
        println!("No resolution recorded for \"{text}\" in {project}.");
    }
    Ok(())
}

/// List every recorded resolution.
pub fn resolved(config: &ChronicleConfig, json: bool) -> Result<()> {
    let resolutions = super::matcher(config).list_resolved()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolutions)?);
        return Ok(());
    }

    if resolutions.is_empty() {
        println!("No resolutions recorded.");
        return Ok(());
    }

    println!("Resolutions ({})", resolutions.len());
    println!("{}", "=".repeat(40));
    for r in &resolutions {
        let how = match r.method {
            ResolutionMethod::Auto => "matched",
            ResolutionMethod::Explicit => "manual",
        };
        println!(
            "  {} [{}] {} ({})",
            r.resolved_at.format("%Y-%m-%d"),
            r.project,
            r.pending_text,
            how
        );
        println!("      {}", r.resolved_by);
    }
    Ok(())
}
