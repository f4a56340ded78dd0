//! Notification feed configuration.

use serde::{Deserialize, Serialize};

/// Notification reconciliation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Maximum attempts to locate the stored counterpart of a read
    /// immediate notification.
    #[serde(default = "default_reconcile_attempts")]
    pub reconcile_attempts: u32,
    /// Seconds between reconciliation attempts.
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_seconds: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            reconcile_attempts: default_reconcile_attempts(),
            reconcile_interval_seconds: default_reconcile_interval(),
        }
    }
}

fn default_reconcile_attempts() -> u32 {
    12
}

fn default_reconcile_interval() -> u64 {
    3
}
