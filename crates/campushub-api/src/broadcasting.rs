//! Private channel authorization for the push service.

use campushub_core::AppResult;
use tracing::debug;

use crate::client::PortalClient;
use crate::dto::auth::BroadcastAuthResponse;

impl PortalClient {
    /// `GET /broadcasting/auth?socket_id=...&channel_name=...` — obtain the
    /// signature required to join a private channel.
    pub async fn broadcast_auth(&self, socket_id: &str, channel_name: &str) -> AppResult<String> {
        let response: BroadcastAuthResponse = self
            .get_json(&format!(
                "broadcasting/auth?socket_id={socket_id}&channel_name={channel_name}"
            ))
            .await?;
        debug!(channel = channel_name, "Authorized private channel");
        Ok(response.auth)
    }
}
