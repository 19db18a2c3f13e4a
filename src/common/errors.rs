use std::path::PathBuf;
use thiserror::Error;

use crate::purge::context::ExecutionContext;

/// Reasons a purge did not (fully) happen.
///
/// None of these are fatal. The engine folds them into a `PurgeResult`
/// instead of returning them, and `anyhow` stays at the CLI layer.
#[derive(Debug, Error)]
pub enum PurgeError {
    /// Cache directory does not exist
    #[error("Cache directory does not exist: '{}'", .path.display())]
    Missing { path: PathBuf },

    /// Cache path exists but is not a directory
    #[error("Cache path is not a directory: '{}'", .path.display())]
    NotADirectory { path: PathBuf },

    /// Cache directory is not writable by this process
    #[error("Cache directory is not writable: '{}'. {}", .path.display(), .hint)]
    NotWritable { path: PathBuf, hint: String },

    /// Cache path points at a system directory that must never be emptied
    #[error("Refusing to purge protected path: '{}'", .path.display())]
    Protected { path: PathBuf },

    /// Purge requested from a context that must not purge
    #[error("Purge disabled in {context} context")]
    DisallowedContext { context: ExecutionContext },

    /// Another purge of the same directory holds the lock
    #[error("Purge already running for '{}' (lock: '{}')", .path.display(), .lock.display())]
    AlreadyRunning { path: PathBuf, lock: PathBuf },

    /// A single entry could not be removed
    #[error("I/O error at '{}': {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PurgeError {
    /// Whether this is a configuration problem (path missing, unwritable, protected)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PurgeError::Missing { .. }
                | PurgeError::NotADirectory { .. }
                | PurgeError::NotWritable { .. }
                | PurgeError::Protected { .. }
        )
    }

    /// Short machine-readable label, used in JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            PurgeError::Missing { .. } => "missing",
            PurgeError::NotADirectory { .. } => "not_a_directory",
            PurgeError::NotWritable { .. } => "not_writable",
            PurgeError::Protected { .. } => "protected",
            PurgeError::DisallowedContext { .. } => "disallowed_context",
            PurgeError::AlreadyRunning { .. } => "already_running",
            PurgeError::Io { .. } => "io",
        }
    }
}
