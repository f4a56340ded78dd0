//! Notification feed endpoints.

use campushub_core::AppResult;
use tracing::debug;

use crate::client::PortalClient;
use crate::dto::notification::{MarkReadResponse, NotificationPage, UnreadCountResponse};

impl PortalClient {
    /// `GET /notifications?page=N` — one page of the authoritative feed.
    ///
    /// Pages are 1-based; a page below 1 is clamped.
    pub async fn list_notifications(&self, page: u64) -> AppResult<NotificationPage> {
        let page = page.max(1);
        let fetched: NotificationPage = self.get_json(&format!("notifications?page={page}")).await?;
        debug!(
            page,
            rows = fetched.notifications.len(),
            unread = fetched.unread_count,
            "Fetched notification page"
        );
        Ok(fetched)
    }

    /// `POST /notifications/{id}/read` — mark a single notification as read.
    pub async fn mark_notification_read(&self, id: &str) -> AppResult<MarkReadResponse> {
        self.post_json(&format!("notifications/{id}/read"), &serde_json::json!({}))
            .await
    }

    /// `POST /notifications/mark-all-read` — mark every notification as read.
    pub async fn mark_all_notifications_read(&self) -> AppResult<MarkReadResponse> {
        self.post_json("notifications/mark-all-read", &serde_json::json!({}))
            .await
    }

    /// `GET /notifications/unread-count` — the authoritative unread count.
    pub async fn unread_count(&self) -> AppResult<UnreadCountResponse> {
        self.get_json("notifications/unread-count").await
    }
}
