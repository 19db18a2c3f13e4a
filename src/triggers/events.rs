use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Content-lifecycle events that invalidate the whole cache.
///
/// The set is fixed at compile time; hosts raise them by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    TransitionPostStatus,
    WpInsertComment,
    WpSetCommentStatus,
    DeleteComment,
    ActivatedPlugin,
    DeactivatedPlugin,
    AfterSwitchTheme,
    UpgraderProcessComplete,
    SavePostProduct,
    WoocommerceOrderStatusChanged,
    DeletePost,
    SavePost,
    PublishPost,
    PublishPage,
}

/// Event name the host does not know about
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown trigger event '{0}'. Run 'events' to list them")]
pub struct UnknownEvent(pub String);

impl TriggerEvent {
    /// Every event, in the order they are bound by default
    pub const ALL: [TriggerEvent; 14] = [
        TriggerEvent::TransitionPostStatus,
        TriggerEvent::WpInsertComment,
        TriggerEvent::WpSetCommentStatus,
        TriggerEvent::DeleteComment,
        TriggerEvent::ActivatedPlugin,
        TriggerEvent::DeactivatedPlugin,
        TriggerEvent::AfterSwitchTheme,
        TriggerEvent::UpgraderProcessComplete,
        TriggerEvent::SavePostProduct,
        TriggerEvent::WoocommerceOrderStatusChanged,
        TriggerEvent::DeletePost,
        TriggerEvent::SavePost,
        TriggerEvent::PublishPost,
        TriggerEvent::PublishPage,
    ];

    /// Hook name as the host raises it
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerEvent::TransitionPostStatus => "transition_post_status",
            TriggerEvent::WpInsertComment => "wp_insert_comment",
            TriggerEvent::WpSetCommentStatus => "wp_set_comment_status",
            TriggerEvent::DeleteComment => "delete_comment",
            TriggerEvent::ActivatedPlugin => "activated_plugin",
            TriggerEvent::DeactivatedPlugin => "deactivated_plugin",
            TriggerEvent::AfterSwitchTheme => "after_switch_theme",
            TriggerEvent::UpgraderProcessComplete => "upgrader_process_complete",
            TriggerEvent::SavePostProduct => "save_post_product",
            TriggerEvent::WoocommerceOrderStatusChanged => "woocommerce_order_status_changed",
            TriggerEvent::DeletePost => "delete_post",
            TriggerEvent::SavePost => "save_post",
            TriggerEvent::PublishPost => "publish_post",
            TriggerEvent::PublishPage => "publish_page",
        }
    }

    /// Short human description for listings
    pub fn description(self) -> &'static str {
        match self {
            TriggerEvent::TransitionPostStatus => "Post status changed",
            TriggerEvent::WpInsertComment => "Comment added",
            TriggerEvent::WpSetCommentStatus => "Comment moderated",
            TriggerEvent::DeleteComment => "Comment removed",
            TriggerEvent::ActivatedPlugin => "Plugin activated",
            TriggerEvent::DeactivatedPlugin => "Plugin deactivated",
            TriggerEvent::AfterSwitchTheme => "Theme switched",
            TriggerEvent::UpgraderProcessComplete => "Upgrade completed",
            TriggerEvent::SavePostProduct => "Product saved",
            TriggerEvent::WoocommerceOrderStatusChanged => "Order status changed",
            TriggerEvent::DeletePost => "Content deleted",
            TriggerEvent::SavePost => "Content saved",
            TriggerEvent::PublishPost => "Post published",
            TriggerEvent::PublishPage => "Page published",
        }
    }
}

impl FromStr for TriggerEvent {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        TriggerEvent::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == name)
            .ok_or_else(|| UnknownEvent(name.to_string()))
    }
}

impl std::fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_parse_back() {
        for event in TriggerEvent::ALL {
            assert_eq!(event.as_str().parse::<TriggerEvent>(), Ok(event));
        }
    }

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = TriggerEvent::ALL.iter().map(|e| e.as_str()).collect();
        assert_eq!(names.len(), TriggerEvent::ALL.len());
    }

    #[test]
    fn test_unknown_event() {
        let err = "save_widget".parse::<TriggerEvent>().unwrap_err();
        assert_eq!(err, UnknownEvent("save_widget".to_string()));
        assert!(err.to_string().contains("save_widget"));
    }

    #[test]
    fn test_serde_uses_hook_names() {
        let json = serde_json::to_string(&TriggerEvent::WoocommerceOrderStatusChanged).unwrap();
        assert_eq!(json, "\"woocommerce_order_status_changed\"");
    }
}
