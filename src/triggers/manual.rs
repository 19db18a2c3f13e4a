use super::registry::PurgeAction;
use crate::notice::{Notice, NoticeSink};
use crate::purge::PurgeResult;

/// Action name of the operator purge route
pub const PURGE_ACTION: &str = "purge_nginx_cache";

/// Admin-relative URL the purge button links to
pub fn manual_trigger_path() -> String {
    format!("admin-post.php?action={}", PURGE_ACTION)
}

/// An authenticated operator hitting the purge route
#[derive(Debug, Clone, Default)]
pub struct ActionRequest {
    /// Key the follow-up notice is stored under
    pub session: String,
    /// Page the operator came from
    pub referer: Option<String>,
}

/// The only response the purge route produces
#[must_use = "the purge route must end the request with this redirect"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    pub status: u16,
}

impl Redirect {
    pub fn found(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            status: 302,
        }
    }
}

/// Operator-initiated purge: purge, leave a notice, redirect back.
pub struct ManualTrigger<'a> {
    action: PurgeAction,
    notices: &'a dyn NoticeSink,
    default_landing: String,
    notice_ttl_secs: u64,
}

impl<'a> ManualTrigger<'a> {
    pub fn new(
        action: PurgeAction,
        notices: &'a dyn NoticeSink,
        default_landing: impl Into<String>,
        notice_ttl_secs: u64,
    ) -> Self {
        Self {
            action,
            notices,
            default_landing: default_landing.into(),
            notice_ttl_secs,
        }
    }

    /// Purge and return where to send the operator
    pub fn handle(&self, request: &ActionRequest) -> Redirect {
        self.handle_with_result(request).1
    }

    /// Like `handle`, also handing back the purge outcome.
    ///
    /// The purge and the notice both happen before the redirect is built.
    /// Failing to store the notice is logged; the redirect still goes out.
    pub fn handle_with_result(&self, request: &ActionRequest) -> (PurgeResult, Redirect) {
        let result = (self.action)();

        let notice = Notice::for_result(&result, self.notice_ttl_secs);
        if let Err(e) = self.notices.set(&request.session, notice) {
            tracing::warn!("Failed to record purge notice: {:#}", e);
        }

        let redirect = Redirect::found(self.redirect_target(request.referer.as_deref()));
        tracing::debug!("Manual purge done, redirecting to {}", redirect.location);
        (result, redirect)
    }

    fn redirect_target(&self, referer: Option<&str>) -> String {
        match referer.map(str::trim) {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => self.default_landing.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::{MemoryNoticeStore, NoticeLevel, PURGED_MESSAGE};
    use crate::purge::PurgeStats;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn succeeding(counter: Arc<AtomicUsize>) -> PurgeAction {
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            PurgeResult::Success(PurgeStats::default())
        })
    }

    #[test]
    fn test_redirects_to_referer() {
        let store = MemoryNoticeStore::new();
        let trigger = ManualTrigger::new(
            succeeding(Arc::new(AtomicUsize::new(0))),
            &store,
            "/wp-admin/",
            60,
        );
        let redirect = trigger.handle(&ActionRequest {
            session: "op".to_string(),
            referer: Some("/blog/hello-world/".to_string()),
        });
        assert_eq!(redirect, Redirect::found("/blog/hello-world/"));
    }

    #[test]
    fn test_missing_or_blank_referer_uses_default_landing() {
        let store = MemoryNoticeStore::new();
        let trigger = ManualTrigger::new(
            succeeding(Arc::new(AtomicUsize::new(0))),
            &store,
            "/wp-admin/",
            60,
        );
        for referer in [None, Some("   ".to_string())] {
            let redirect = trigger.handle(&ActionRequest {
                session: "op".to_string(),
                referer,
            });
            assert_eq!(redirect.location, "/wp-admin/");
            assert_eq!(redirect.status, 302);
        }
    }

    #[test]
    fn test_purges_once_and_leaves_notice() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = MemoryNoticeStore::new();
        let trigger = ManualTrigger::new(succeeding(Arc::clone(&calls)), &store, "/", 60);

        let (result, _) = trigger.handle_with_result(&ActionRequest {
            session: "op".to_string(),
            referer: None,
        });

        assert!(result.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let notice = store.take("op").unwrap().unwrap();
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(notice.message, PURGED_MESSAGE);
    }

    #[test]
    fn test_route_path() {
        assert_eq!(
            manual_trigger_path(),
            "admin-post.php?action=purge_nginx_cache"
        );
    }
}
