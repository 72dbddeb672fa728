use serde::{Deserialize, Serialize};

/// An action button attached to a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

/// A notification description, built per push event and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    /// Vibration pattern in milliseconds (vibrate, pause, vibrate).
    pub vibrate: Vec<u32>,
    pub actions: Vec<NotificationAction>,
}
