//! Notification endpoint payloads.

use campushub_entity::notification::{Notification, NotificationKind};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One stored notification row as the API returns it.
///
/// Display fields (title, message, url, shared id) arrive nested under a
/// `data` object; the row itself carries identity, type, and timestamps.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRow {
    pub id: String,
    #[serde(rename = "type", default)]
    pub type_tag: String,
    #[serde(default)]
    pub data: NotificationData,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// The display payload nested inside a notification row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub shared_id: Option<String>,
}

/// One page of the notification feed.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationPage {
    #[serde(default)]
    pub notifications: Vec<NotificationRow>,
    #[serde(default)]
    pub unread_count: u64,
    #[serde(default = "default_page")]
    pub current_page: u64,
    #[serde(default = "default_page")]
    pub last_page: u64,
}

/// Response to marking one or all notifications as read.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkReadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub unread_count: u64,
}

/// Response to the unread-count endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UnreadCountResponse {
    #[serde(default)]
    pub unread_count: u64,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            kind: NotificationKind::from_type_tag(&row.type_tag),
            id: row.id,
            shared_id: row.data.shared_id,
            title: row.data.title,
            message: row.data.message,
            url: row.data.url,
            read_at: row.read_at,
            created_at: row.created_at,
        }
    }
}

fn default_page() -> u64 {
    1
}
