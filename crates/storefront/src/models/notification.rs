//! Notification domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use aneka_citra_core::{NotificationId, OrderId, Severity, UserId};

/// One inbox entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub order_id: Option<OrderId>,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A user's inbox, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationList {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

impl NotificationList {
    /// Wrap a list, counting the unread entries.
    #[must_use]
    pub fn new(notifications: Vec<Notification>) -> Self {
        let unread_count = notifications.iter().filter(|n| !n.is_read).count();
        Self {
            notifications,
            unread_count,
        }
    }
}
