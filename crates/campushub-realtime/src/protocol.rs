//! Wire frames exchanged with the push service.
//!
//! Every frame is a JSON object with an `event` name, an optional
//! `channel`, and an optional `data` payload. Some servers encode `data`
//! as a JSON string rather than an object; [`Frame::payload`] undoes one
//! level of that wrapping.

use campushub_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sent by the server once the connection is accepted; carries the socket id.
pub const EVENT_CONNECTION_ESTABLISHED: &str = "connection.established";
/// Sent by the server after a successful channel subscription.
pub const EVENT_SUBSCRIPTION_SUCCEEDED: &str = "subscription.succeeded";
/// Generic notification event name some deployments use instead of the
/// configured one.
pub const EVENT_NOTIFICATION_FALLBACK: &str = "notification";
/// Sent by the server when a request failed.
pub const EVENT_ERROR: &str = "error";

/// One frame on the push connection, in either direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Frame {
    /// Parses a frame from raw message text.
    pub fn parse(raw: &str) -> AppResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| AppError::transport(format!("Unparseable frame: {e}")))
    }

    /// The frame payload with one level of string encoding removed.
    pub fn payload(&self) -> Option<Value> {
        match self.data.as_ref()? {
            Value::String(s) => serde_json::from_str(s).ok(),
            other => Some(other.clone()),
        }
    }

    /// Builds a subscribe frame for a channel, with the authorization
    /// signature when the channel requires one.
    pub fn subscribe(channel: &str, auth: Option<String>) -> Self {
        let mut data = serde_json::Map::new();
        data.insert("channel".to_string(), Value::String(channel.to_string()));
        if let Some(auth) = auth {
            data.insert("auth".to_string(), Value::String(auth));
        }
        Self {
            event: "subscribe".to_string(),
            channel: None,
            data: Some(Value::Object(data)),
        }
    }

    /// Builds an unsubscribe frame for a channel.
    pub fn unsubscribe(channel: &str) -> Self {
        let mut data = serde_json::Map::new();
        data.insert("channel".to_string(), Value::String(channel.to_string()));
        Self {
            event: "unsubscribe".to_string(),
            channel: None,
            data: Some(Value::Object(data)),
        }
    }

    /// Serializes the frame for sending.
    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// The socket id carried by a `connection.established` frame.
    pub fn socket_id(&self) -> Option<String> {
        self.payload()?
            .get("socket_id")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}
