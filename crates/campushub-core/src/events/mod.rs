//! Events shared between the real-time transport and its consumers.
//!
//! The transport produces [`PushEvent`] records and the notification
//! center consumes them; keeping the record here means neither crate
//! depends on the other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized notification event delivered over the push channel.
///
/// The raw payloads arrive in several shapes; by the time a `PushEvent`
/// exists, the id and timestamp are always present (locally generated
/// when the source omitted them).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEvent {
    /// Notification identifier. Server-assigned when the payload carried
    /// one, locally generated otherwise.
    pub id: String,
    /// Correlation key linking this event to its eventual stored row.
    pub shared_id: Option<String>,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Optional deep-link URL.
    pub url: Option<String>,
    /// When the event was created; falls back to arrival time.
    pub created_at: DateTime<Utc>,
}
