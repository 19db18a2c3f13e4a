use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::common::errors::PurgeError;

/// Contents of a lock file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockRecord {
    pub pid: u32,
    pub cache_path: PathBuf,
    pub acquired_at: DateTime<Utc>,
}

/// Held while a purge walks one cache directory. Released on drop.
#[derive(Debug)]
pub struct PurgeLock {
    lock_path: PathBuf,
}

/// Lock file location for a cache directory
pub fn lock_path_for(locks_dir: &Path, cache_path: &Path) -> PathBuf {
    let key = std::fs::canonicalize(cache_path).unwrap_or_else(|_| cache_path.to_path_buf());
    let mut hasher = Sha256::new();
    hasher.update(key.to_string_lossy().as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    locks_dir.join(format!("{}.lock", &digest[..16]))
}

impl PurgeLock {
    /// Take the lock for `cache_path`.
    ///
    /// A lock older than `stale_after_secs` belongs to a purge that died
    /// without cleaning up; it is reclaimed once.
    pub fn acquire(
        locks_dir: &Path,
        cache_path: &Path,
        stale_after_secs: u64,
    ) -> Result<Self, PurgeError> {
        std::fs::create_dir_all(locks_dir).map_err(|source| PurgeError::Io {
            path: locks_dir.to_path_buf(),
            source,
        })?;
        let lock_path = lock_path_for(locks_dir, cache_path);

        for attempt in 0..2 {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lock_path)
            {
                Ok(file) => {
                    let record = LockRecord {
                        pid: std::process::id(),
                        cache_path: cache_path.to_path_buf(),
                        acquired_at: Utc::now(),
                    };
                    if let Err(e) = serde_json::to_writer(file, &record) {
                        tracing::debug!("Failed to write lock record {}: {}", lock_path.display(), e);
                    }
                    return Ok(Self { lock_path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if attempt == 0 && is_stale(&lock_path, stale_after_secs) {
                        tracing::warn!("Reclaiming stale purge lock {}", lock_path.display());
                        let _ = std::fs::remove_file(&lock_path);
                        continue;
                    }
                    break;
                }
                Err(source) => {
                    return Err(PurgeError::Io {
                        path: lock_path,
                        source,
                    })
                }
            }
        }

        Err(PurgeError::AlreadyRunning {
            path: cache_path.to_path_buf(),
            lock: lock_path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for PurgeLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.lock_path) {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!("Failed to release purge lock {}: {}", self.lock_path.display(), e);
            }
        }
    }
}

/// Read the acquisition time from the record, falling back to the file mtime
fn acquired_at(lock_path: &Path) -> Option<DateTime<Utc>> {
    let from_record = std::fs::read_to_string(lock_path)
        .ok()
        .and_then(|s| serde_json::from_str::<LockRecord>(&s).ok())
        .map(|r| r.acquired_at);

    from_record.or_else(|| {
        std::fs::metadata(lock_path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from)
    })
}

/// A limit too large to represent never goes stale
fn is_stale(lock_path: &Path, stale_after_secs: u64) -> bool {
    let limit = i64::try_from(stale_after_secs)
        .ok()
        .and_then(TimeDelta::try_seconds);
    match (acquired_at(lock_path), limit) {
        (Some(at), Some(limit)) => Utc::now().signed_duration_since(at) > limit,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_path_is_stable_per_cache_dir() {
        let locks = Path::new("/locks");
        let a = lock_path_for(locks, Path::new("/nonexistent/cache-a"));
        let b = lock_path_for(locks, Path::new("/nonexistent/cache-b"));
        assert_eq!(a, lock_path_for(locks, Path::new("/nonexistent/cache-a")));
        assert_ne!(a, b);
        assert!(a.starts_with(locks));
    }

    #[test]
    fn test_second_acquire_fails_while_held() {
        let tmp = TempDir::new().unwrap();
        let locks = tmp.path().join("locks");
        let cache = tmp.path().join("cache");

        let held = PurgeLock::acquire(&locks, &cache, 300).unwrap();
        let second = PurgeLock::acquire(&locks, &cache, 300);
        assert!(matches!(second, Err(PurgeError::AlreadyRunning { .. })));

        drop(held);
        assert!(PurgeLock::acquire(&locks, &cache, 300).is_ok());
    }

    #[test]
    fn test_drop_removes_lock_file() {
        let tmp = TempDir::new().unwrap();
        let locks = tmp.path().join("locks");
        let lock = PurgeLock::acquire(&locks, tmp.path(), 300).unwrap();
        let path = lock.path().to_path_buf();
        assert!(path.exists());
        drop(lock);
        assert!(!path.exists());
    }

    #[test]
    fn test_stale_lock_is_reclaimed() {
        let tmp = TempDir::new().unwrap();
        let locks = tmp.path().join("locks");
        std::fs::create_dir_all(&locks).unwrap();
        let cache = tmp.path().join("cache");

        let stale = LockRecord {
            pid: 1,
            cache_path: cache.clone(),
            acquired_at: Utc::now() - TimeDelta::seconds(3600),
        };
        std::fs::write(
            lock_path_for(&locks, &cache),
            serde_json::to_string(&stale).unwrap(),
        )
        .unwrap();

        assert!(PurgeLock::acquire(&locks, &cache, 60).is_ok());
    }

    #[test]
    fn test_unrepresentable_stale_limit_never_reclaims() {
        let tmp = TempDir::new().unwrap();
        let locks = tmp.path().join("locks");
        let cache = tmp.path().join("cache");

        let _held = PurgeLock::acquire(&locks, &cache, 300).unwrap();
        let lock_path = lock_path_for(&locks, &cache);
        assert!(!is_stale(&lock_path, u64::MAX));
        assert!(!is_stale(&lock_path, 10_000_000_000_000_000));
        assert!(matches!(
            PurgeLock::acquire(&locks, &cache, u64::MAX),
            Err(PurgeError::AlreadyRunning { .. })
        ));
    }
}
