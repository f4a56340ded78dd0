//! Server gateway abstraction for the notification center.

use async_trait::async_trait;
use campushub_api::PortalClient;
use campushub_api::dto::notification::NotificationPage;
use campushub_core::AppResult;
use campushub_core::types::PageMeta;
use campushub_entity::notification::Notification;

/// One fetched page of the feed, in entity form.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
    pub current_page: u64,
    pub last_page: u64,
}

impl FetchedPage {
    /// Pagination position of this page.
    pub fn meta(&self) -> PageMeta {
        PageMeta::new(self.current_page, self.last_page)
    }
}

impl From<NotificationPage> for FetchedPage {
    fn from(page: NotificationPage) -> Self {
        Self {
            notifications: page
                .notifications
                .into_iter()
                .map(Notification::from)
                .collect(),
            unread_count: page.unread_count,
            current_page: page.current_page,
            last_page: page.last_page,
        }
    }
}

/// What the notification center needs from the server.
#[async_trait]
pub trait NotificationGateway: Send + Sync + 'static {
    /// Fetches one page of the feed. Pages are 1-based.
    async fn fetch_page(&self, page: u64) -> AppResult<FetchedPage>;

    /// Marks one notification read; returns the new unread count.
    async fn mark_read(&self, id: &str) -> AppResult<u64>;

    /// Marks every notification read; returns the new unread count.
    async fn mark_all_read(&self) -> AppResult<u64>;

    /// The authoritative unread count.
    async fn unread_count(&self) -> AppResult<u64>;
}

#[async_trait]
impl NotificationGateway for PortalClient {
    async fn fetch_page(&self, page: u64) -> AppResult<FetchedPage> {
        let fetched = self.list_notifications(page).await?;
        Ok(fetched.into())
    }

    async fn mark_read(&self, id: &str) -> AppResult<u64> {
        let response = self.mark_notification_read(id).await?;
        Ok(response.unread_count)
    }

    async fn mark_all_read(&self) -> AppResult<u64> {
        let response = self.mark_all_notifications_read().await?;
        Ok(response.unread_count)
    }

    async fn unread_count(&self) -> AppResult<u64> {
        let response = PortalClient::unread_count(self).await?;
        Ok(response.unread_count)
    }
}
