//! The snapshot store: one JSON document, last-write-wins.
//!
//! `load` returns `None` for a missing file so the caller can seed defaults;
//! anything else unreadable is an error. `save` serializes the whole
//! snapshot, takes an exclusive file lock, writes a temp file in the same
//! directory and renames it over the destination, so a concurrent reader
//! never sees a torn document. There is no merging: whichever writer saves
//! last owns the state.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use log::{debug, info};
use thiserror::Error;
use tokio::fs;

use crate::engine::types::GameState;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read state file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to write state file {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("state file {path} is not a valid snapshot: {source}")]
    Corrupt {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable holder of the full snapshot.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot. A missing file is `None`, not an error; the
    /// caller decides whether to seed defaults.
    pub async fn load(&self) -> Result<Option<GameState>, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no snapshot at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(StoreError::Read {
                    path: self.path.display().to_string(),
                    source: e,
                })
            }
        };
        let state = serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
            path: self.path.display().to_string(),
            source: e,
        })?;
        Ok(Some(state))
    }

    /// Persist the snapshot, stamping `last_updated` first.
    pub async fn save(&self, state: &mut GameState, now: DateTime<Utc>) -> Result<(), StoreError> {
        state.last_updated = now;
        let content = serde_json::to_string_pretty(state)?;

        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).await.map_err(|e| StoreError::Write {
                    path: self.path.display().to_string(),
                    source: e,
                })?;
            }
        }

        let path = self.path.clone();
        let result = tokio::task::spawn_blocking(move || write_locked(&path, &content)).await;
        match result {
            Ok(Ok(())) => {
                info!("saved snapshot to {}", self.path.display());
                Ok(())
            }
            Ok(Err(e)) => Err(StoreError::Write {
                path: self.path.display().to_string(),
                source: e,
            }),
            Err(join) => Err(StoreError::Write {
                path: self.path.display().to_string(),
                source: std::io::Error::other(join),
            }),
        }
    }
}

/// Exclusive-locked atomic replace. fs2 locks are synchronous, so this runs
/// on the blocking pool.
fn write_locked(path: &Path, content: &str) -> std::io::Result<()> {
    use std::fs::{File, OpenOptions};
    use std::io::Write;

    // The destination doubles as the lock file: open-or-create it and hold
    // an exclusive lock for the whole replace.
    let lock_file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(path)?;
    lock_file.lock_exclusive()?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let base = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("state.json");
    let mut counter = 0u32;
    let tmp_path = loop {
        let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut tmp) => {
                tmp.write_all(content.as_bytes())?;
                tmp.flush()?;
                let _ = tmp.sync_all();
                break candidate;
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
                continue;
            }
            Err(e) => return Err(e),
        }
    };

    std::fs::rename(&tmp_path, path)?;

    // Fsync the directory so the rename survives a crash (best-effort).
    if let Ok(dir_file) = File::open(dir) {
        let _ = dir_file.sync_all();
    }

    drop(lock_file);
    Ok(())
}
