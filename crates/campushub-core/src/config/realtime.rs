//! Push service (WebSocket) configuration.

use serde::{Deserialize, Serialize};

/// Push service connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// WebSocket URL of the push service.
    #[serde(default = "default_url")]
    pub url: String,
    /// Public broadcast channel every signed-in user subscribes to.
    #[serde(default = "default_public_channel")]
    pub public_channel: String,
    /// Event name carrying notification payloads.
    #[serde(default = "default_notification_event")]
    pub notification_event: String,
    /// Connection handshake timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            public_channel: default_public_channel(),
            notification_event: default_notification_event(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

fn default_url() -> String {
    "ws://localhost:6001/ws".to_string()
}

fn default_public_channel() -> String {
    "students".to_string()
}

fn default_notification_event() -> String {
    "campushub.notification.created".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}
