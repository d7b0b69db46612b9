use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChronicleConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub pending: PendingConfig,
    pub matching: MatchingConfig,
    pub context: ContextConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub blocks_dir: String,
    pub overlay_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PendingConfig {
    /// Default look-back window for `pending` and `catchup`.
    pub window_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MatchingConfig {
    /// Candidates must score strictly above this floor.
    pub min_score: f64,
    pub max_candidates: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ContextConfig {
    /// Roots laid out as `<root>/<project>/<worktree>`.
    pub worktree_spaces: Vec<String>,
    /// Directory name under a worktree space → canonical project name.
    pub project_aliases: HashMap<String, String>,
}

impl Default for ChronicleConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
            pending: PendingConfig::default(),
            matching: MatchingConfig::default(),
            context: ContextConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = default_chronicle_dir();
        Self {
            blocks_dir: base.join("blocks").to_string_lossy().into_owned(),
            overlay_path: base.join("resolutions.json").to_string_lossy().into_owned(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".into(),
        }
    }
}

impl Default for PendingConfig {
    fn default() -> Self {
        Self { window_days: 30 }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_score: 0.15,
            max_candidates: 20,
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            worktree_spaces: vec![
                "~/conductor/workspaces".into(),
                "~/worktrees".into(),
            ],
            project_aliases: HashMap::new(),
        }
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Returns `~/.claude/chronicle/`
pub fn default_chronicle_dir() -> PathBuf {
    home_dir().join(".claude").join("chronicle")
}

/// Returns the default config file path: `~/.claude/chronicle/config.toml`
pub fn default_config_path() -> PathBuf {
    default_chronicle_dir().join("config.toml")
}

impl ChronicleConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            ChronicleConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (CHRONICLE_BLOCKS_DIR, CHRONICLE_OVERLAY, CHRONICLE_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CHRONICLE_BLOCKS_DIR") {
            self.storage.blocks_dir = val;
        }
        if let Ok(val) = std::env::var("CHRONICLE_OVERLAY") {
            self.storage.overlay_path = val;
        }
        if let Ok(val) = std::env::var("CHRONICLE_LOG_LEVEL") {
            self.logging.log_level = val;
        }
    }

    pub fn resolved_blocks_dir(&self) -> PathBuf {
        expand_tilde(&self.storage.blocks_dir)
    }

    pub fn resolved_overlay_path(&self) -> PathBuf {
        expand_tilde(&self.storage.overlay_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        home_dir()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home_dir().join(rest)
    } else {
        PathBuf::from(path)
    }
}
