//! Overlay persistence.
//!
//! Provides the [`ResolutionStore`] trait, a JSON file implementation used by the
//! CLI, and an in-memory implementation for tests and embedding. The overlay is
//! the only mutable state in Chronicle; every change goes through
//! [`ResolutionStore::modify`], a load-modify-save cycle.

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::Deserialize;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use super::types::{Overlay, Resolution};

/// Storage for the resolution overlay.
///
/// Loading never fails on absent or damaged data: unreadable entries are
/// skipped and the rest load. Saving reports every failure.
pub trait ResolutionStore: Send + Sync {
    /// Read the full overlay. Missing data loads as empty; damaged entries are skipped.
    fn load(&self) -> Result<Overlay>;

    /// Replace the stored overlay atomically.
    fn save(&self, overlay: &Overlay) -> Result<()>;

    /// Load, apply `f`, and save if the overlay changed.
    ///
    /// File-backed implementations hold an exclusive lock for the whole cycle,
    /// so concurrent writers (threads or processes) never lose an update.
    fn modify<T, F>(&self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut Overlay) -> T,
    {
        modify_unlocked(self, f)
    }
}

fn modify_unlocked<S, T, F>(store: &S, f: F) -> Result<T>
where
    S: ResolutionStore + ?Sized,
    F: FnOnce(&mut Overlay) -> T,
{
    let original = store.load()?;
    let mut overlay = original.clone();
    let out = f(&mut overlay);
    if overlay != original {
        store.save(&overlay)?;
    }
    Ok(out)
}

/// Overlay stored as a single pretty-printed JSON document.
///
/// Writers serialize on an exclusive lock of the sidecar `<file>.lock`. A file
/// that held damaged entries is copied to `<file>.corrupt` before it is first
/// rewritten.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

/// Wire shape read leniently, one entry at a time.
#[derive(Deserialize)]
struct RawOverlay {
    #[serde(default)]
    resolutions: Vec<serde_json::Value>,
}

/// Result of reading the overlay file.
struct ReadOverlay {
    overlay: Overlay,
    /// The file exists but some or all of it could not be read.
    damaged: bool,
}

/// Held for the duration of a `modify`; unlocks on drop.
struct OverlayLock {
    file: File,
}

impl Drop for OverlayLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// `<path>.<suffix>`, keeping the original extension.
fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> PathBuf {
        sidecar(&self.path, "lock")
    }

    /// Where a damaged overlay is preserved before being rewritten.
    pub fn backup_path(&self) -> PathBuf {
        sidecar(&self.path, "corrupt")
    }

    fn acquire_lock(&self) -> Result<OverlayLock> {
        let lock_path = self.lock_path();
        ensure_parent(&lock_path)?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("failed to open overlay lock {}", lock_path.display()))?;
        FileExt::lock_exclusive(&file)
            .with_context(|| format!("failed to lock overlay {}", lock_path.display()))?;
        Ok(OverlayLock { file })
    }

    fn read(&self) -> ReadOverlay {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no overlay file, starting empty");
                return ReadOverlay {
                    overlay: Overlay::default(),
                    damaged: false,
                };
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable overlay, treating as empty");
                return ReadOverlay {
                    overlay: Overlay::default(),
                    damaged: true,
                };
            }
        };

        let raw: RawOverlay = match serde_json::from_str(&contents) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt overlay, treating as empty");
                return ReadOverlay {
                    overlay: Overlay::default(),
                    damaged: true,
                };
            }
        };

        let mut overlay = Overlay::default();
        let mut damaged = false;
        for (index, value) in raw.resolutions.into_iter().enumerate() {
            match serde_json::from_value::<Resolution>(value) {
                Ok(resolution) => overlay.upsert(resolution),
                Err(e) => {
                    warn!(path = %self.path.display(), index, error = %e, "skipping unreadable resolution");
                    damaged = true;
                }
            }
        }
        ReadOverlay { overlay, damaged }
    }

    fn back_up_damaged(&self) -> Result<()> {
        let backup = self.backup_path();
        std::fs::copy(&self.path, &backup).with_context(|| {
            format!("failed to preserve damaged overlay as {}", backup.display())
        })?;
        warn!(
            path = %self.path.display(),
            backup = %backup.display(),
            "damaged overlay preserved before rewrite"
        );
        Ok(())
    }
}

impl ResolutionStore for JsonFileStore {
    fn load(&self) -> Result<Overlay> {
        Ok(self.read().overlay)
    }

    /// Write to `<file>.tmp` then rename over the target.
    fn save(&self, overlay: &Overlay) -> Result<()> {
        ensure_parent(&self.path)?;

        let json = serde_json::to_string_pretty(overlay).context("failed to serialize overlay")?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .with_context(|| format!("failed to write temp overlay {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to replace overlay {}", self.path.display()))?;

        debug!(path = %self.path.display(), resolutions = overlay.len(), "overlay saved");
        Ok(())
    }

    fn modify<T, F>(&self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut Overlay) -> T,
    {
        let _lock = self.acquire_lock()?;

        let ReadOverlay {
            overlay: original,
            damaged,
        } = self.read();
        let mut overlay = original.clone();
        let out = f(&mut overlay);
        if overlay != original {
            if damaged && self.path.exists() {
                self.back_up_damaged()?;
            }
            self.save(&overlay)?;
        }
        Ok(out)
    }
}

/// Overlay held in memory. Nothing touches the filesystem.
#[derive(Debug, Default)]
pub struct MemoryStore {
    overlay: Mutex<Overlay>,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overlay(overlay: Overlay) -> Self {
        Self {
            overlay: Mutex::new(overlay),
            saves: Mutex::new(0),
        }
    }

    /// Number of times the overlay has been written.
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|n| *n).unwrap_or(0)
    }
}

impl ResolutionStore for MemoryStore {
    fn load(&self) -> Result<Overlay> {
        let overlay = self
            .overlay
            .lock()
            .map_err(|_| anyhow::anyhow!("overlay lock poisoned"))?;
        Ok(overlay.clone())
    }

    fn save(&self, overlay: &Overlay) -> Result<()> {
        let mut current = self
            .overlay
            .lock()
            .map_err(|_| anyhow::anyhow!("overlay lock poisoned"))?;
        *current = overlay.clone();
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pending::PendingKey;
    use crate::resolution::types::{Resolution, ResolutionMethod};
    use chrono::Utc;
    use tempfile::TempDir;

    fn resolution(text: &str) -> Resolution {
        Resolution {
            pending_key: PendingKey::new("demo", text),
            pending_text: text.to_string(),
            project: "demo".to_string(),
            resolved_by: "manual".to_string(),
            resolved_at: Utc::now(),
            thread: None,
            method: ResolutionMethod::Explicit,
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path().join("resolutions.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("resolutions.json");
        std::fs::write(&path, "{ this is not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_creates_parent_and_leaves_no_temp() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("resolutions.json");
        let store = JsonFileStore::new(&path);

        let mut overlay = Overlay::default();
        overlay.upsert(resolution("Add unit tests"));
        store.save(&overlay).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(store.load().unwrap(), overlay);
    }

    #[test]
    fn test_modify_skips_save_when_unchanged() {
        let store = MemoryStore::new();
        let removed = store
            .modify(|overlay| overlay.remove(&PendingKey::new("demo", "nothing")))
            .unwrap();
        assert!(!removed);
        assert_eq!(store.save_count(), 0);

        store.modify(|overlay| overlay.upsert(resolution("x"))).unwrap();
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_file_replaced_on_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("resolutions.json");
        std::fs::write(&path, "garbage").unwrap();
        let store = JsonFileStore::new(&path);

        store.modify(|overlay| overlay.upsert(resolution("x"))).unwrap();

        let reloaded: Overlay =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(std::fs::read_to_string(store.backup_path()).unwrap(), "garbage");
    }

    #[test]
    fn test_bad_entry_does_not_drop_valid_ones() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("resolutions.json");
        let mut good = Overlay::default();
        good.upsert(resolution("a"));
        let mut doc = serde_json::to_value(&good).unwrap();
        let mut bad = doc["resolutions"][0].clone();
        bad["pendingKey"] = serde_json::json!("demo::b");
        bad["method"] = serde_json::json!("manual");
        doc["resolutions"].as_array_mut().unwrap().push(bad);
        let original = serde_json::to_string_pretty(&doc).unwrap();
        std::fs::write(&path, &original).unwrap();

        let store = JsonFileStore::new(&path);
        assert_eq!(store.load().unwrap().len(), 1);

        store.modify(|overlay| overlay.upsert(resolution("c"))).unwrap();

        let overlay = store.load().unwrap();
        assert!(overlay.contains(&PendingKey::new("demo", "a")));
        assert!(overlay.contains(&PendingKey::new("demo", "c")));
        assert_eq!(overlay.len(), 2);
        assert_eq!(std::fs::read_to_string(store.backup_path()).unwrap(), original);
    }

    #[test]
    fn test_clean_file_gets_no_backup() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path().join("resolutions.json"));
        store.modify(|overlay| overlay.upsert(resolution("a"))).unwrap();
        store.modify(|overlay| overlay.upsert(resolution("b"))).unwrap();
        assert!(!store.backup_path().exists());
        assert!(store.lock_path().exists());
    }

    #[test]
    fn test_concurrent_writers_lose_nothing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("resolutions.json");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let path = path.clone();
                std::thread::spawn(move || {
                    // a separate store per writer, like separate CLI invocations
                    let store = JsonFileStore::new(path);
                    store
                        .modify(|overlay| overlay.upsert(resolution(&format!("item {i}"))))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(JsonFileStore::new(&path).load().unwrap().len(), 8);
    }
}
