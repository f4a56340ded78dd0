//! Normalization of raw notification payloads.
//!
//! Deployments differ in how they shape notification events: the content
//! may sit at the top level or nested under a `notification` or `data`
//! key, ids may be strings or numbers, and timestamps may be missing
//! entirely. [`parse_push_event`] accepts all of these and produces a
//! [`PushEvent`] with an id and timestamp guaranteed present.

use campushub_core::events::PushEvent;
use campushub_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Keys under which the notification content may be nested.
const NESTING_KEYS: [&str; 2] = ["notification", "data"];

/// Parses a raw payload into a normalized [`PushEvent`].
///
/// Fails only when the payload carries no usable content (neither a title
/// nor a message); every other field is defaulted.
pub fn parse_push_event(payload: &Value) -> AppResult<PushEvent> {
    let content = NESTING_KEYS
        .iter()
        .find_map(|key| payload.get(key).filter(|v| v.is_object()))
        .unwrap_or(payload);

    let title = string_field(content, "title");
    let message = string_field(content, "message");
    if title.is_none() && message.is_none() {
        return Err(AppError::transport("Push payload has no notification content"));
    }

    let id = match content.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => fallback_id(),
    };

    let created_at = string_field(content, "created_at")
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    Ok(PushEvent {
        id,
        shared_id: string_field(content, "shared_id"),
        title: title.unwrap_or_default(),
        message: message.unwrap_or_default(),
        url: string_field(content, "url"),
        created_at,
    })
}

fn string_field(content: &Value, key: &str) -> Option<String> {
    content
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Locally generated id for payloads that arrive without one.
fn fallback_id() -> String {
    format!(
        "immediate-{}-{}",
        Utc::now().timestamp_millis(),
        &uuid::Uuid::new_v4().to_string()[..8]
    )
}
