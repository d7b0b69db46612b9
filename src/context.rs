//! Context Detector — maps a working directory to (project, worktree, branch).
//!
//! Everything here is best effort. A directory that is not a git repository, a
//! repository without a remote, or a missing `git` binary all degrade to the
//! directory name and no branch.

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::config::{expand_tilde, ContextConfig};

/// Scope of the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    pub project: String,
    pub worktree: Option<String>,
    pub branch: Option<String>,
}

/// Detect the session context for `cwd`.
pub fn detect_context(cwd: &Path, config: &ContextConfig) -> SessionContext {
    let spaces: Vec<PathBuf> = config
        .worktree_spaces
        .iter()
        .map(|s| expand_tilde(s))
        .collect();

    let branch = git(cwd, &["rev-parse", "--abbrev-ref", "HEAD"]).filter(|b| b != "HEAD");

    if let Some((project, worktree)) = worktree_from_path(cwd, &spaces, &config.project_aliases) {
        return SessionContext {
            project,
            worktree: Some(worktree),
            branch,
        };
    }

    let project = git(cwd, &["remote", "get-url", "origin"])
        .and_then(|url| project_from_remote(&url))
        .unwrap_or_else(|| dir_name(cwd));

    SessionContext {
        project,
        worktree: None,
        branch,
    }
}

/// Repository name from a remote URL.
///
/// Handles `https://host/owner/repo.git`, `ssh://git@host/owner/repo`, and
/// scp-like `git@host:owner/repo.git`.
pub fn project_from_remote(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    let without_suffix = url.strip_suffix(".git").unwrap_or(url);
    let name = without_suffix
        .rsplit(|c: char| c == '/' || c == ':')
        .next()
        .unwrap_or_default();
    (!name.is_empty()).then(|| name.to_string())
}

/// `(project, worktree)` when `cwd` sits under a worktree space.
///
/// Spaces are laid out `<space>/<project>/<worktree>/...`. The project segment is
/// mapped through `aliases` (keys compared case-insensitively).
pub fn worktree_from_path(
    cwd: &Path,
    spaces: &[PathBuf],
    aliases: &HashMap<String, String>,
) -> Option<(String, String)> {
    let cwd = canonical(cwd);
    for space in spaces {
        let Ok(rest) = cwd.strip_prefix(canonical(space)) else {
            continue;
        };
        let mut segments = rest.components().filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        });
        let (Some(project_dir), Some(worktree)) = (segments.next(), segments.next()) else {
            continue;
        };

        let project = aliases
            .iter()
            .find(|(dir, _)| dir.eq_ignore_ascii_case(project_dir))
            .map(|(_, name)| name.clone())
            .unwrap_or_else(|| project_dir.to_string());
        return Some((project, worktree.to_string()));
    }
    None
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn dir_name(cwd: &Path) -> String {
    canonical(cwd)
        .file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Run `git -C <cwd> <args>`, returning trimmed stdout on success.
fn git(cwd: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(cwd)
        .args(args)
        .output();

    match output {
        Ok(out) if out.status.success() => {
            let stdout = String::from_utf8_lossy(&out.stdout).trim().to_string();
            (!stdout.is_empty()).then_some(stdout)
        }
        Ok(out) => {
            debug!(
                args = ?args,
                stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                "git command failed"
            );
            None
        }
        Err(e) => {
            debug!(error = %e, "git unavailable");
            None
        }
    }
}
