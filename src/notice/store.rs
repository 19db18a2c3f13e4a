use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::{Notice, NoticeSink};
use crate::common::config::Config;

/// Notices held in process memory
#[derive(Debug, Default)]
pub struct MemoryNoticeStore {
    entries: Mutex<HashMap<String, Notice>>,
}

impl MemoryNoticeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoticeSink for MemoryNoticeStore {
    fn set(&self, session: &str, notice: Notice) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.to_string(), notice);
        Ok(())
    }

    fn take(&self, session: &str) -> Result<Option<Notice>> {
        let notice = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session);
        Ok(notice.filter(|n| !n.is_expired()))
    }
}

/// Notices stored as one JSON file per session, so the CLI process that
/// purges and the one that renders can differ.
#[derive(Debug, Clone)]
pub struct FileNoticeStore {
    dir: PathBuf,
}

impl FileNoticeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the data directory's `notices/`
    pub fn default_location() -> Self {
        Self::new(Config::notices_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Session ids are hashed so they never escape the notices directory
    fn entry_path(&self, session: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(session.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        self.dir.join(format!("{}.json", &digest[..16]))
    }

    /// Delete notices whose TTL has passed, returning how many went
    pub fn sweep_expired(&self) -> usize {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return 0,
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let expired = std::fs::read_to_string(&path)
                .ok()
                .and_then(|c| serde_json::from_str::<Notice>(&c).ok())
                .map(|n| n.is_expired())
                .unwrap_or(false);
            if !expired {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => tracing::debug!("Failed to sweep notice {}: {}", path.display(), e),
            }
        }
        removed
    }
}

impl NoticeSink for FileNoticeStore {
    fn set(&self, session: &str, notice: Notice) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create notices dir: {}", self.dir.display()))?;
        let swept = self.sweep_expired();
        if swept > 0 {
            tracing::debug!("Swept {} expired notices from {}", swept, self.dir.display());
        }

        let path = self.entry_path(session);
        let json = serde_json::to_string(&notice).context("Failed to serialize notice")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write notice: {}", path.display()))?;
        Ok(())
    }

    fn take(&self, session: &str) -> Result<Option<Notice>> {
        let path = self.entry_path(session);
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read notice: {}", path.display()))
            }
        };

        // Read-once: the entry goes away even if it turns out to be expired or corrupt
        std::fs::remove_file(&path)
            .with_context(|| format!("Failed to clear notice: {}", path.display()))?;

        match serde_json::from_str::<Notice>(&contents) {
            Ok(notice) if !notice.is_expired() => Ok(Some(notice)),
            Ok(_) => Ok(None),
            Err(e) => {
                tracing::warn!("Discarding unreadable notice {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }
}
