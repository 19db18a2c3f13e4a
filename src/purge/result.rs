use crate::common::errors::PurgeError;
use crate::common::format;

/// Counters collected while emptying the cache directory
#[derive(Debug, Clone, Default)]
pub struct PurgeStats {
    pub files_removed: usize,
    pub dirs_removed: usize,
    pub bytes_freed: u64,
    pub duration_secs: f64,
}

/// Outcome of one purge attempt. Consumed once by the caller.
#[derive(Debug)]
pub enum PurgeResult {
    /// Nothing was deleted
    Skipped(PurgeError),
    /// Every entry under the cache directory was removed
    Success(PurgeStats),
    /// The walk finished but some entries survived
    PartialFailure {
        stats: PurgeStats,
        unremoved: Vec<PurgeError>,
    },
}

impl PurgeResult {
    /// Build the result of a finished walk
    pub fn from_walk(stats: PurgeStats, unremoved: Vec<PurgeError>) -> Self {
        if unremoved.is_empty() {
            PurgeResult::Success(stats)
        } else {
            PurgeResult::PartialFailure { stats, unremoved }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PurgeResult::Success(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, PurgeResult::Skipped(_))
    }

    /// Whether the walk ran to the end, with or without per-path failures
    pub fn completed(&self) -> bool {
        !self.is_skipped()
    }

    pub fn stats(&self) -> Option<&PurgeStats> {
        match self {
            PurgeResult::Skipped(_) => None,
            PurgeResult::Success(stats) | PurgeResult::PartialFailure { stats, .. } => Some(stats),
        }
    }

    pub fn unremoved(&self) -> &[PurgeError] {
        match self {
            PurgeResult::PartialFailure { unremoved, .. } => unremoved,
            _ => &[],
        }
    }

    pub fn skip_reason(&self) -> Option<&PurgeError> {
        match self {
            PurgeResult::Skipped(reason) => Some(reason),
            _ => None,
        }
    }

    /// Label used in JSON and quiet output
    pub fn status(&self) -> &'static str {
        match self {
            PurgeResult::Skipped(_) => "skipped",
            PurgeResult::Success(_) => "success",
            PurgeResult::PartialFailure { .. } => "partial_failure",
        }
    }

    /// One-line description for logs and notices
    pub fn summary(&self) -> String {
        match self {
            PurgeResult::Skipped(reason) => format!("NGINX cache purge skipped: {}", reason),
            PurgeResult::Success(stats) => format!(
                "NGINX cache purged: {}, {} freed",
                format::format_count(stats.files_removed, "file", "files"),
                format::format_size(stats.bytes_freed)
            ),
            PurgeResult::PartialFailure { stats, unremoved } => format!(
                "NGINX cache partially purged: {} removed, {} could not be removed",
                format::format_count(stats.files_removed, "file", "files"),
                format::format_count(unremoved.len(), "path", "paths")
            ),
        }
    }
}
