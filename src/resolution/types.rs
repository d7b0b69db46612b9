//! Overlay record definitions.
//!
//! A [`Resolution`] says "pending item X was resolved by Y" without touching the
//! blocks X came from. The [`Overlay`] is the whole document, held in memory
//! between a load and a save.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pending::PendingKey;

/// How a resolution came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMethod {
    /// A lexical candidate confirmed against an accomplished item.
    Auto,
    /// The user marked the item done directly.
    Explicit,
}

impl ResolutionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Explicit => "explicit",
        }
    }
}

impl std::fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResolutionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "explicit" => Ok(Self::Explicit),
            _ => Err(format!("unknown resolution method: {s}")),
        }
    }
}

/// One resolved pending key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub pending_key: PendingKey,
    /// Pending wording at resolution time, for display.
    pub pending_text: String,
    pub project: String,
    /// Matched accomplished text, or the user's note.
    pub resolved_by: String,
    pub resolved_at: DateTime<Utc>,
    /// Thread of the pending item when it was resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<String>,
    pub method: ResolutionMethod,
}

/// The overlay document: `{ "resolutions": [...] }`, one entry per key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    #[serde(default)]
    pub resolutions: Vec<Resolution>,
}

impl Overlay {
    pub fn get(&self, key: &PendingKey) -> Option<&Resolution> {
        self.resolutions.iter().find(|r| &r.pending_key == key)
    }

    pub fn contains(&self, key: &PendingKey) -> bool {
        self.get(key).is_some()
    }

    /// Insert, replacing any existing entry for the same key.
    pub fn upsert(&mut self, resolution: Resolution) {
        match self
            .resolutions
            .iter_mut()
            .find(|r| r.pending_key == resolution.pending_key)
        {
            Some(existing) => *existing = resolution,
            None => self.resolutions.push(resolution),
        }
    }

    /// Remove the entry for `key`. Returns whether anything was removed.
    pub fn remove(&mut self, key: &PendingKey) -> bool {
        let before = self.resolutions.len();
        self.resolutions.retain(|r| &r.pending_key != key);
        self.resolutions.len() != before
    }

    pub fn keys(&self) -> impl Iterator<Item = &PendingKey> + '_ {
        self.resolutions.iter().map(|r| &r.pending_key)
    }

    pub fn len(&self) -> usize {
        self.resolutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolutions.is_empty()
    }
}
