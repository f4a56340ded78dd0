//! Background reconciliation of immediate notifications.
//!
//! The server writes the stored row behind a push event with some delay.
//! When an immediate notification is marked read before that row exists,
//! this poll re-fetches the first page until a queued row with the
//! matching shared id appears, then completes the read against it. The
//! attempt budget keeps a row that never materializes from polling
//! forever.

use std::sync::Arc;
use std::time::Duration;

use campushub_entity::notification::NotificationKind;
use tracing::{debug, warn};

use crate::center::NotificationCenter;

pub(crate) async fn reconcile(
    center: Arc<NotificationCenter>,
    immediate_id: String,
    shared_id: String,
) {
    let attempts = center.config().reconcile_attempts;
    let interval = Duration::from_secs(center.config().reconcile_interval_seconds);

    for attempt in 1..=attempts {
        tokio::time::sleep(interval).await;

        let page = match center.gateway().fetch_page(1).await {
            Ok(page) => page,
            Err(e) => {
                debug!(attempt, error = %e, "Reconciliation fetch failed");
                continue;
            }
        };

        let found = page.notifications.into_iter().find(|n| {
            n.kind == NotificationKind::Queued
                && n.shared_id.as_deref() == Some(shared_id.as_str())
        });
        let Some(found) = found else {
            continue;
        };

        // Best effort: the local read sticks even when this call fails.
        let server_count = match center.gateway().mark_read(&found.id).await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!(id = %found.id, error = %e, "Completing the read server-side failed");
                None
            }
        };
        debug!(
            immediate_id = %immediate_id,
            stored_id = %found.id,
            attempt,
            "Reconciled immediate notification"
        );
        center.finish_reconcile(&immediate_id, found, server_count);
        return;
    }

    debug!(immediate_id = %immediate_id, "Reconciliation exhausted its attempts");
    center.abandon_reconcile(&immediate_id);
}
