//! The pending key: the single identity shared by aggregation and the overlay.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowercase and trim. The only normalization used for pending identity.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Normalized `(project, text)` identity of a pending item.
///
/// Rendered as `project::text`. Backslashes and colons in the project are
/// backslash-escaped, so the first unescaped `::` always ends the project and
/// distinct pairs never share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingKey(String);

impl PendingKey {
    pub fn new(project: &str, text: &str) -> Self {
        Self(format!("{}::{}", escape_project(&normalize(project)), normalize(text)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn escape_project(project: &str) -> String {
    let mut out = String::with_capacity(project.len());
    for c in project.chars() {
        if c == '\\' || c == ':' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl fmt::Display for PendingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
