//! One-shot operator notices.
//!
//! A notice is stored per operator session, shown at most once on the next
//! page render, and dropped once its TTL has passed whether or not anyone
//! read it.

pub mod store;

use anyhow::Result;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::common::config::MAX_NOTICE_TTL_SECS;
use crate::purge::PurgeResult;

pub use store::{FileNoticeStore, MemoryNoticeStore};

/// Text shown after a clean manual purge
pub const PURGED_MESSAGE: &str = "NGINX Cache Purged Successfully.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Notice {
    /// TTLs above a day are cut to a day.
    pub fn new(level: NoticeLevel, message: impl Into<String>, ttl_secs: u64) -> Self {
        let now = Utc::now();
        let ttl = TimeDelta::try_seconds(ttl_secs.min(MAX_NOTICE_TTL_SECS) as i64)
            .unwrap_or_else(TimeDelta::zero);
        Self {
            level,
            message: message.into(),
            created_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(now),
        }
    }

    /// Notice describing the outcome of a purge
    pub fn for_result(result: &PurgeResult, ttl_secs: u64) -> Self {
        if result.is_success() {
            Self::new(NoticeLevel::Success, PURGED_MESSAGE, ttl_secs)
        } else {
            Self::new(NoticeLevel::Warning, result.summary(), ttl_secs)
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Set-once / read-once storage for notices, keyed by operator session.
pub trait NoticeSink {
    /// Store `notice` for `session`, replacing any unread one
    fn set(&self, session: &str, notice: Notice) -> Result<()>;

    /// Remove and return the pending notice, if one is still live
    fn take(&self, session: &str) -> Result<Option<Notice>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::PurgeError;
    use crate::purge::PurgeStats;
    use std::path::PathBuf;

    #[test]
    fn test_success_notice_text() {
        let notice = Notice::for_result(&PurgeResult::Success(PurgeStats::default()), 60);
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(notice.message, PURGED_MESSAGE);
        assert!(!notice.is_expired());
    }

    #[test]
    fn test_skip_notice_is_warning() {
        let result = PurgeResult::Skipped(PurgeError::Missing {
            path: PathBuf::from("/var/run/nginx-cache"),
        });
        let notice = Notice::for_result(&result, 60);
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.contains("does not exist"));
    }

    #[test]
    fn test_zero_ttl_expires() {
        let mut notice = Notice::new(NoticeLevel::Success, "done", 0);
        notice.expires_at = Utc::now() - TimeDelta::seconds(1);
        assert!(notice.is_expired());
    }

    #[test]
    fn test_huge_ttl_is_capped_not_expired() {
        let notice = Notice::new(NoticeLevel::Success, "done", u64::MAX);
        assert!(!notice.is_expired());
        assert_eq!(
            notice.expires_at - notice.created_at,
            TimeDelta::seconds(MAX_NOTICE_TTL_SECS as i64)
        );

        let notice = Notice::new(NoticeLevel::Success, "done", 10_000_000_000_000_000);
        assert!(!notice.is_expired());
    }
}
