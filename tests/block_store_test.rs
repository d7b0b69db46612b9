mod helpers;

use chronicle::blocks::{BlockError, BlockStore};
use helpers::{block, days_ago, now};
use tempfile::TempDir;

#[test]
fn loads_blocks_newest_first() {
    let tmp = TempDir::new().unwrap();
    block("demo", 10).write(tmp.path(), "2026-09-05-old");
    block("demo", 1).write(tmp.path(), "2026-09-14-new");
    block("demo", 5).write(tmp.path(), "2026-09-10-mid");

    let blocks = BlockStore::new(tmp.path()).load_all_blocks().unwrap();
    let stamps: Vec<_> = blocks.newest_first().map(|b| b.timestamp).collect();
    assert_eq!(stamps, vec![days_ago(1), days_ago(5), days_ago(10)]);
    assert_eq!(blocks.latest().unwrap().timestamp, days_ago(1));
}

#[test]
fn malformed_files_are_quarantined_not_fatal() {
    let tmp = TempDir::new().unwrap();
    block("demo", 2).pending(&["Add unit tests"]).write(tmp.path(), "good");
    std::fs::write(tmp.path().join("broken.json"), "{ \"timestamp\": ").unwrap();
    std::fs::write(tmp.path().join("no-project.json"), r#"{"timestamp": "2026-09-01T00:00:00Z"}"#)
        .unwrap();
    std::fs::write(tmp.path().join("notes.txt"), "not a block").unwrap();

    let report = BlockStore::new(tmp.path()).load_with_report().unwrap();
    assert_eq!(report.blocks.len(), 1);
    assert_eq!(report.skipped.len(), 2);
    assert!(report
        .skipped
        .iter()
        .any(|s| matches!(s.error, BlockError::Json(_))));
    assert!(report
        .skipped
        .iter()
        .any(|s| matches!(s.error, BlockError::MissingField("project"))));
}

#[test]
fn filters_compose() {
    let tmp = TempDir::new().unwrap();
    block("Demo", 3).worktree("feature-a").write(tmp.path(), "a");
    block("demo", 40).worktree("feature-a").write(tmp.path(), "b");
    block("demo", 2).write(tmp.path(), "c");
    block("other", 1).write(tmp.path(), "d");

    let all = BlockStore::new(tmp.path()).load_all_blocks().unwrap();
    let demo = all.filter_by_project("demo");
    assert_eq!(demo.len(), 3);
    assert_eq!(demo.filter_by_worktree(None).len(), 3);
    assert_eq!(demo.filter_by_worktree(Some("feature-a")).len(), 2);
    assert_eq!(
        demo.filter_by_worktree(Some("feature-a"))
            .filter_by_date_range(30, now())
            .len(),
        1
    );
}

#[test]
fn block_files_record_their_source() {
    let tmp = TempDir::new().unwrap();
    let path = block("demo", 1).write(tmp.path(), "one");

    let blocks = BlockStore::new(tmp.path()).load_all_blocks().unwrap();
    assert_eq!(blocks.latest().unwrap().source.as_deref(), Some(path.as_path()));
}
