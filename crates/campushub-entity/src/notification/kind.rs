//! Notification kind classification.

use serde::{Deserialize, Serialize};

/// Fully-qualified wire type tag of an ephemeral push-only notification.
///
/// The list endpoint tags every row with the notification class that
/// produced it; this tag is the only one that maps to [`NotificationKind::Immediate`].
pub const IMMEDIATE_TYPE_TAG: &str = "campushub.notifications.instant";

/// Origin class of a notification.
///
/// `Immediate` notifications arrive over the push channel and may not yet
/// have a stored row behind them; `Queued` notifications are persisted
/// rows served by the paginated list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Ephemeral push event delivered in real time.
    Immediate,
    /// Persisted notification served by the list endpoint.
    Queued,
}

impl NotificationKind {
    /// Classify a fully-qualified wire type tag.
    pub fn from_type_tag(tag: &str) -> Self {
        if tag == IMMEDIATE_TYPE_TAG {
            Self::Immediate
        } else {
            Self::Queued
        }
    }

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Queued => "queued",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_type_tag() {
        assert_eq!(
            NotificationKind::from_type_tag(IMMEDIATE_TYPE_TAG),
            NotificationKind::Immediate
        );
        assert_eq!(
            NotificationKind::from_type_tag("campushub.notifications.stored"),
            NotificationKind::Queued
        );
        assert_eq!(
            NotificationKind::from_type_tag(""),
            NotificationKind::Queued
        );
    }
}
