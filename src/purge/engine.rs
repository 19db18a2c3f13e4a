use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

use super::context::ExecutionContext;
use super::lock::PurgeLock;
use super::result::{PurgeResult, PurgeStats};
use crate::common::config::Config;
use crate::common::errors::PurgeError;
use crate::common::{permissions, safety};

/// Where lock files live and when they go stale
#[derive(Debug, Clone)]
pub struct LockSettings {
    pub locks_dir: PathBuf,
    pub stale_after_secs: u64,
}

/// Empties one NGINX cache directory.
#[derive(Debug, Clone)]
pub struct PurgeEngine {
    cache_path: PathBuf,
    context: ExecutionContext,
    lock: Option<LockSettings>,
}

impl PurgeEngine {
    /// Engine for `cache_path` in the request context, without locking
    pub fn new(cache_path: impl Into<PathBuf>) -> Self {
        Self {
            cache_path: cache_path.into(),
            context: ExecutionContext::Request,
            lock: None,
        }
    }

    /// Engine configured from `Config`
    pub fn from_config(config: &Config, context: ExecutionContext) -> Self {
        let engine = Self::new(config.cache_path.clone()).with_context(context);
        if config.lock_purges {
            engine.with_lock(Config::locks_dir(), config.lock_stale_secs)
        } else {
            engine
        }
    }

    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_lock(mut self, locks_dir: impl Into<PathBuf>, stale_after_secs: u64) -> Self {
        self.lock = Some(LockSettings {
            locks_dir: locks_dir.into(),
            stale_after_secs,
        });
        self
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    /// Remove everything under the cache directory, keeping the directory.
    ///
    /// Never fails: problems come back as `Skipped` or `PartialFailure`.
    pub fn purge(&self) -> PurgeResult {
        if !self.context.allows_purge() {
            tracing::debug!(
                "Ignoring purge of {} in {} context",
                self.cache_path.display(),
                self.context
            );
            return PurgeResult::Skipped(PurgeError::DisallowedContext {
                context: self.context,
            });
        }

        if let Err(reason) = check_cache_dir(&self.cache_path) {
            tracing::warn!("NGINX cache purge skipped: {}", reason);
            return PurgeResult::Skipped(reason);
        }

        let _guard = match &self.lock {
            Some(settings) => match PurgeLock::acquire(
                &settings.locks_dir,
                &self.cache_path,
                settings.stale_after_secs,
            ) {
                Ok(lock) => Some(lock),
                Err(reason @ PurgeError::AlreadyRunning { .. }) => {
                    tracing::info!("NGINX cache purge skipped: {}", reason);
                    return PurgeResult::Skipped(reason);
                }
                Err(e) => {
                    tracing::warn!("Purging without lock: {}", e);
                    None
                }
            },
            None => None,
        };

        let (stats, unremoved) = empty_dir(&self.cache_path);
        for failure in &unremoved {
            tracing::debug!("{}", failure);
        }

        let result = PurgeResult::from_walk(stats, unremoved);
        match &result {
            PurgeResult::Success(stats) => tracing::info!(
                files = stats.files_removed,
                dirs = stats.dirs_removed,
                bytes = stats.bytes_freed,
                "NGINX cache purged successfully: {}",
                self.cache_path.display()
            ),
            other => tracing::warn!("{}", other.summary()),
        }
        result
    }
}

/// Verify the cache directory can be purged at all
pub fn check_cache_dir(path: &Path) -> Result<(), PurgeError> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(_) => {
            return Err(PurgeError::Missing {
                path: path.to_path_buf(),
            })
        }
    };

    if !metadata.is_dir() {
        return Err(PurgeError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    if safety::is_protected(path) {
        return Err(PurgeError::Protected {
            path: path.to_path_buf(),
        });
    }

    if !permissions::can_write_dir(path) {
        return Err(PurgeError::NotWritable {
            path: path.to_path_buf(),
            hint: permissions::permission_hint(path),
        });
    }

    Ok(())
}

/// Depth-first removal of everything below `root`.
///
/// Contents are visited before their directory, symlinks are unlinked and
/// never followed, `root` itself is left in place. A failed entry is
/// recorded and the walk moves on; entries already gone are not failures.
pub fn empty_dir(root: &Path) -> (PurgeStats, Vec<PurgeError>) {
    let start = Instant::now();
    let mut stats = PurgeStats::default();
    let mut unremoved = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .contents_first(true);

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                if let Some(source) = err.into_io_error() {
                    if source.kind() != ErrorKind::NotFound {
                        unremoved.push(PurgeError::Io { path, source });
                    }
                }
                continue;
            }
        };

        let path = entry.path();
        if entry.file_type().is_dir() {
            match std::fs::remove_dir(path) {
                Ok(()) => stats.dirs_removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => unremoved.push(PurgeError::Io {
                    path: path.to_path_buf(),
                    source,
                }),
            }
        } else {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            match std::fs::remove_file(path) {
                Ok(()) => {
                    stats.files_removed += 1;
                    stats.bytes_freed += size;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => unremoved.push(PurgeError::Io {
                    path: path.to_path_buf(),
                    source,
                }),
            }
        }
    }

    stats.duration_secs = start.elapsed().as_secs_f64();
    (stats, unremoved)
}

/// Current contents of a cache directory
#[derive(Debug, Clone, Default)]
pub struct CacheUsage {
    pub files: usize,
    pub dirs: usize,
    pub bytes: u64,
}

/// Count what a purge would remove
pub fn cache_usage(root: &Path) -> CacheUsage {
    let mut usage = CacheUsage::default();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_dir() {
            usage.dirs += 1;
        } else {
            usage.files += 1;
            usage.bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }
    usage
}
