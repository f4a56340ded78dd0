//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campushub_core::events::PushEvent;

use super::kind::NotificationKind;

/// A notification visible in the user's feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier. Server-assigned for stored rows,
    /// locally generated for immediate entries pending reconciliation.
    pub id: String,
    /// Whether this entry originated from a push event or a stored row.
    pub kind: NotificationKind,
    /// Correlation key linking an immediate entry to its stored
    /// counterpart.
    pub shared_id: Option<String>,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Optional deep-link URL.
    pub url: Option<String>,
    /// When the notification was read. `None` means unread.
    pub read_at: Option<DateTime<Utc>>,
    /// When the notification was created. The feed sorts by this field,
    /// newest first.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build an immediate notification from a push event.
    pub fn from_push(event: &PushEvent) -> Self {
        Self {
            id: event.id.clone(),
            kind: NotificationKind::Immediate,
            shared_id: event.shared_id.clone(),
            title: event.title.clone(),
            message: event.message.clone(),
            url: event.url.clone(),
            read_at: None,
            created_at: event.created_at,
        }
    }

    /// Check if the notification has been read.
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    /// Set the read timestamp. An earlier read timestamp is never
    /// overwritten; read state only moves forward.
    pub fn mark_read(&mut self, at: DateTime<Utc>) {
        if self.read_at.is_none() {
            self.read_at = Some(at);
        }
    }
}
