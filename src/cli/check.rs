//! CLI `check` command — validate block files and print a load report.

use anyhow::Result;
use std::collections::BTreeMap;

use chronicle::blocks::BlockStore;
use chronicle::config::ChronicleConfig;
use chronicle::resolution::ResolutionStore;

pub fn check(config: &ChronicleConfig) -> Result<()> {
    let dir = config.resolved_blocks_dir();

    if !dir.exists() {
        println!("Blocks: not found at {}", dir.display());
        println!("Capture a session to create it.");
        return Ok(());
    }

    let report = BlockStore::new(&dir).load_with_report()?;

    let mut by_project: BTreeMap<String, usize> = BTreeMap::new();
    for block in report.blocks.newest_first() {
        *by_project.entry(block.project.to_lowercase()).or_insert(0) += 1;
    }

    println!("Chronicle Check");
    println!("===============");
    println!();
    println!("Blocks dir:        {}", dir.display());
    println!("Valid blocks:      {}", report.blocks.len());
    println!("Quarantined:       {}", report.skipped.len());
    if let Some(latest) = report.blocks.latest() {
        println!("Newest session:    {} ({})", latest.timestamp.to_rfc3339(), latest.project);
    }

    if !by_project.is_empty() {
        println!();
        println!("By project:");
        for (project, count) in &by_project {
            println!("  {:<24} {}", project, count);
        }
    }

    let overlay_path = config.resolved_overlay_path();
    let overlay = super::matcher(config).store().load()?;
    println!();
    println!("Overlay:           {}", overlay_path.display());
    println!("Resolutions:       {}", overlay.len());

    if !report.skipped.is_empty() {
        println!();
        println!("Quarantined files:");
        for skipped in &report.skipped {
            println!("  {}: {}", skipped.path.display(), skipped.error);
        }
    }

    Ok(())
}
