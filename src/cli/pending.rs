//! CLI `pending` and `stale` commands.

use anyhow::Result;

use chronicle::config::ChronicleConfig;
use chronicle::pending::{
    aggregate_scoped, group_by_thread, stale_report, unresolved, PendingItem,
    STALE_THRESHOLD_DAYS,
};
use chronicle::resolution::ResolutionStore;

use crate::Scope;

/// Aggregate pending items for the scoped project.
fn aggregate_for(
    config: &ChronicleConfig,
    scope: &Scope,
    days: Option<i64>,
) -> Result<(String, Vec<PendingItem>)> {
    let project = super::project_or_detect(config, scope.project.as_deref())?;
    let history = super::load_blocks(config)?.filter_by_project(&project);
    let overlay = super::matcher(config).store().load()?;
    let items = aggregate_scoped(
        &history,
        scope.worktree.as_deref(),
        days,
        &overlay,
        super::now(),
    );
    Ok((project, items))
}

/// List pending items, thread-grouped, oldest first.
pub fn pending(
    config: &ChronicleConfig,
    scope: &Scope,
    days: Option<i64>,
    all: bool,
    json: bool,
) -> Result<()> {
    let days = days.unwrap_or(config.pending.window_days);
    let (project, items) = aggregate_for(config, scope, Some(days))?;
    let items = if all { items } else { unresolved(&items) };
    let items = group_by_thread(items);

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No pending items for {project} in the last {days} days.");
        println!("Capture a session first, or widen the window with --days.");
        return Ok(());
    }

    println!("Pending for {project} (last {days} days)");
    println!("{}", "=".repeat(40));
    for item in &items {
        println!("{}", super::format_item(item));
    }

    let stale = items.iter().filter(|i| i.is_stale && !i.is_resolved()).count();
    if stale > 0 {
        println!();
        println!("{stale} item(s) older than {STALE_THRESHOLD_DAYS} days.");
    }
    Ok(())
}

/// List stale, unresolved items across the project's whole history.
pub fn stale(config: &ChronicleConfig, scope: &Scope, json: bool) -> Result<()> {
    let (project, items) = aggregate_for(config, scope, None)?;
    let report = stale_report(&items);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.is_empty() {
        println!("Nothing in {project} is older than {STALE_THRESHOLD_DAYS} days.");
        return Ok(());
    }

    println!("Stale pending items for {project}");
    println!("{}", "=".repeat(40));
    for item in report {
        println!("{}", super::format_item(item));
        println!("      first seen {}", item.first_seen.format("%Y-%m-%d"));
    }
    Ok(())
}
