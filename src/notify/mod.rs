//! Notification boundary and push payload handling.
//!
//! Push events carry an optional opaque payload; this module decodes it
//! into notification copy and hands the assembled description to a
//! `Notifier`. Notifications are fire-and-forget: nothing here touches the
//! cache, and a notifier that fails to display has no one to report to.

use tracing::info;

use crate::models::{NotificationAction, NotificationPayload};

/// Notification title shown for task alerts
pub const NOTIFICATION_TITLE: &str = "💰 KaamKaro";

/// Fallback body when a push event carries no payload
const DEFAULT_PUSH_MESSAGE: &str = "New task available!";

/// Icon shown in the notification body and status badge
const ICON_URL: &str = "https://cdn.jsdelivr.net/npm/bootstrap-icons@1.10.0/icons/cash-stack.svg";

/// Vibration pattern in milliseconds: buzz, pause, buzz
const VIBRATE_PATTERN: [u32; 3] = [100, 50, 100];

const ACTION_EXPLORE_ICON: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap-icons@1.10.0/icons/play-circle.svg";
const ACTION_CLOSE_ICON: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap-icons@1.10.0/icons/x-circle.svg";

/// Decode a push payload into notification body text.
/// The payload is plain text when present; anything undecodable falls back
/// to the default message.
pub fn decode_push_payload(data: Option<&[u8]>) -> String {
    data.and_then(|bytes| String::from_utf8(bytes.to_vec()).ok())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| DEFAULT_PUSH_MESSAGE.to_string())
}

/// Build the task-alert notification shown for every push event.
pub fn task_alert(body: String) -> NotificationPayload {
    NotificationPayload {
        title: NOTIFICATION_TITLE.to_string(),
        body,
        icon: ICON_URL.to_string(),
        badge: ICON_URL.to_string(),
        vibrate: VIBRATE_PATTERN.to_vec(),
        actions: vec![
            NotificationAction {
                action: "explore".to_string(),
                title: "Start Earning".to_string(),
                icon: ACTION_EXPLORE_ICON.to_string(),
            },
            NotificationAction {
                action: "close".to_string(),
                title: "Close".to_string(),
                icon: ACTION_CLOSE_ICON.to_string(),
            },
        ],
    }
}

/// The platform's notification surface.
pub trait Notifier: Send + Sync {
    fn show(&self, payload: &NotificationPayload);
    fn close(&self, title: &str);
}

/// Notifier that writes notifications to the log - the display surface for
/// a headless deployment.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, payload: &NotificationPayload) {
        info!(
            title = %payload.title,
            body = %payload.body,
            actions = payload.actions.len(),
            "Showing notification"
        );
    }

    fn close(&self, title: &str) {
        info!(title = %title, "Closing notification");
    }
}

// ============================================================================
// Test doubles
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_push_payload_text() {
        let body = decode_push_payload(Some(b"5 new tasks near you"));
        assert_eq!(body, "5 new tasks near you");
    }

    #[test]
    fn test_decode_push_payload_missing_uses_default() {
        assert_eq!(decode_push_payload(None), DEFAULT_PUSH_MESSAGE);
    }

    #[test]
    fn test_decode_push_payload_invalid_utf8_uses_default() {
        assert_eq!(decode_push_payload(Some(&[0xff, 0xfe])), DEFAULT_PUSH_MESSAGE);
        assert_eq!(decode_push_payload(Some(b"")), DEFAULT_PUSH_MESSAGE);
    }

    #[test]
    fn test_task_alert_shape() {
        let payload = task_alert("hello".to_string());
        assert_eq!(payload.title, NOTIFICATION_TITLE);
        assert_eq!(payload.body, "hello");
        assert_eq!(payload.vibrate, vec![100, 50, 100]);
        assert_eq!(payload.actions.len(), 2);
        assert_eq!(payload.actions[0].action, "explore");
        assert_eq!(payload.actions[1].action, "close");
    }
}
