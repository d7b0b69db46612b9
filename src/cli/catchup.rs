//! CLI `catchup` command — last session summary plus open work.

use anyhow::Result;

use chronicle::catchup::catch_up;
use chronicle::config::ChronicleConfig;
use chronicle::resolution::ResolutionStore;

use crate::Scope;

pub fn catchup(config: &ChronicleConfig, scope: &Scope, days: Option<i64>, json: bool) -> Result<()> {
    let project = super::project_or_detect(config, scope.project.as_deref())?;
    let days = days.unwrap_or(config.pending.window_days);

    let history = super::load_blocks(config)?;
    let overlay = super::matcher(config).store().load()?;
    let view = catch_up(
        &project,
        scope.worktree.as_deref(),
        &history,
        &overlay,
        days,
        super::now(),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("Catch-up: {project}");
    println!("{}", "=".repeat(40));

    match &view.last_session {
        Some(last) => {
            println!("Last session:  {}", last.timestamp.format("%Y-%m-%d %H:%M"));
            if let Some(ref wt) = last.worktree {
                println!("Worktree:      {wt}");
            }
            if let Some(ref branch) = last.branch {
                println!("Branch:        {branch}");
            }
            if !last.summary.is_empty() {
                println!("Summary:       {}", last.summary);
            }
        }
        None => {
            println!("No sessions in the last {days} days.");
            println!("Capture a session first, or widen the window with --days.");
            return Ok(());
        }
    }

    println!();
    if view.pending.is_empty() {
        println!("Nothing pending.");
    } else {
        println!("Pending ({}):", view.pending.len());
        for item in &view.pending {
            println!("{}", super::format_item(item));
        }
    }

    for warning in &view.warnings {
        println!();
        println!("WARNING: {warning}");
    }

    Ok(())
}
