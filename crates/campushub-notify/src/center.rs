//! The notification center: one feed, one unread count, one lock.

use std::sync::{Arc, Mutex};

use campushub_core::config::notifications::NotificationsConfig;
use campushub_core::events::PushEvent;
use campushub_entity::notification::{Notification, NotificationKind};
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::gateway::NotificationGateway;
use crate::poll;
use crate::state::{FeedSnapshot, FeedState};

/// Merges pushed and fetched notifications into a single feed.
///
/// All mutation goes through one internal lock; the lock is never held
/// across an await. Consumers observe the feed through cheap cloned
/// snapshots, either on demand or via a watch channel.
pub struct NotificationCenter {
    gateway: Arc<dyn NotificationGateway>,
    config: NotificationsConfig,
    state: Mutex<FeedState>,
    snapshot_tx: watch::Sender<FeedSnapshot>,
    /// Running reconciliation polls, keyed by immediate notification id.
    polls: DashMap<String, JoinHandle<()>>,
}

impl NotificationCenter {
    /// Creates a center around a gateway. Nothing is fetched until
    /// [`refresh`](Self::refresh) is called.
    pub fn new(gateway: Arc<dyn NotificationGateway>, config: NotificationsConfig) -> Arc<Self> {
        let state = FeedState::new();
        let (snapshot_tx, _) = watch::channel(state.snapshot());
        Arc::new(Self {
            gateway,
            config,
            state: Mutex::new(state),
            snapshot_tx,
            polls: DashMap::new(),
        })
    }

    /// The current feed snapshot.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// A watch receiver that observes every feed change.
    pub fn watch(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Runs `f` against the locked state and publishes the new snapshot.
    fn with_state<T>(&self, f: impl FnOnce(&mut FeedState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let result = f(&mut state);
        self.snapshot_tx.send_replace(state.snapshot());
        result
    }

    /// Replaces the feed with the first page from the server.
    ///
    /// Concurrent calls coalesce: while one refresh is in flight, further
    /// calls return without fetching.
    pub async fn refresh(&self) {
        let already_loading = self.with_state(|state| {
            if state.is_loading {
                true
            } else {
                state.is_loading = true;
                false
            }
        });
        if already_loading {
            debug!("Refresh already in flight");
            return;
        }

        let fetched = self.gateway.fetch_page(1).await;
        self.with_state(|state| {
            state.is_loading = false;
            match fetched {
                Ok(page) => state.apply_refresh(page),
                Err(e) => warn!(error = %e, "Refresh failed; keeping previous feed"),
            }
        });
    }

    /// Fetches the next page and appends it to the feed.
    ///
    /// Does nothing while a refresh or another load is in flight, or when
    /// the last page is already loaded.
    pub async fn load_more(&self) {
        let next = self.with_state(|state| {
            if state.is_loading || state.is_loading_more {
                return None;
            }
            let next = state.page.next_page()?;
            state.is_loading_more = true;
            Some(next)
        });
        let Some(next) = next else {
            debug!("No further page to load");
            return;
        };

        let fetched = self.gateway.fetch_page(next).await;
        self.with_state(|state| {
            state.is_loading_more = false;
            match fetched {
                Ok(page) => state.apply_load_more(page),
                Err(e) => warn!(error = %e, page = next, "Loading more failed"),
            }
        });
    }

    /// Marks one notification read, optimistically.
    ///
    /// Queued notifications are confirmed with the server; a rejected read
    /// is rolled back and followed by a corrective refresh. An immediate
    /// notification has no stored row yet: when it carries a shared id, a
    /// background poll locates the stored counterpart and completes the
    /// read server-side.
    pub async fn mark_as_read(self: &Arc<Self>, id: &str) {
        let Some(local) = self.with_state(|state| state.apply_local_read(id)) else {
            debug!(id, "Notification unknown or already read");
            return;
        };
        let mut mutation = local.mutation;

        match local.kind {
            NotificationKind::Queued => match self.gateway.mark_read(id).await {
                Ok(server_count) => {
                    mutation.commit();
                    self.with_state(|state| state.adopt_server_count(server_count));
                    debug!(id, "Read confirmed");
                }
                Err(e) => {
                    mutation.roll_back();
                    warn!(
                        id,
                        elapsed_ms = (Utc::now() - mutation.applied_at).num_milliseconds(),
                        error = %e,
                        "Read rejected; rolling back"
                    );
                    self.with_state(|state| state.revert_read(&mutation));
                    self.refresh().await;
                }
            },
            NotificationKind::Immediate => {
                if let Some(shared_id) = local.shared_id {
                    self.with_state(|state| state.mark_pending(id));
                    self.spawn_reconcile(id.to_string(), shared_id);
                } else {
                    // Without a shared id there is no stored row to find;
                    // the read stays local.
                    debug!(id, "Immediate read applied locally");
                }
            }
        }
    }

    /// Marks every notification read.
    ///
    /// No optimistic update here: the local feed changes only after the
    /// server confirms.
    pub async fn mark_all_as_read(&self) {
        match self.gateway.mark_all_read().await {
            Ok(server_count) => {
                self.with_state(|state| state.apply_mark_all(server_count));
                info!("All notifications marked read");
            }
            Err(e) => warn!(error = %e, "Marking all read failed"),
        }
    }

    /// Adopts the authoritative unread count from the server.
    pub async fn sync_unread_count(&self) {
        match self.gateway.unread_count().await {
            Ok(count) => self.with_state(|state| state.adopt_server_count(count)),
            Err(e) => debug!(error = %e, "Unread count sync failed"),
        }
    }

    /// Feeds one push event into the feed.
    pub fn ingest_push(&self, event: &PushEvent) {
        let notification = Notification::from_push(event);
        let added = self.with_state(|state| state.ingest(notification));
        if added {
            debug!(id = %event.id, "Push notification added");
        } else {
            debug!(id = %event.id, "Push notification already visible");
        }
    }

    /// Cancels every running reconciliation poll. Safe to call repeatedly.
    pub fn shutdown(&self) {
        let cancelled = self.polls.len();
        self.polls.retain(|_, handle| {
            handle.abort();
            false
        });
        if cancelled > 0 {
            debug!(cancelled, "Cancelled reconciliation polls");
        }
    }

    /// Number of reconciliation polls currently running.
    pub fn active_polls(&self) -> usize {
        self.polls.len()
    }

    /// Starts the background poll for an immediate notification's stored
    /// counterpart. A newer read of the same id replaces the running poll.
    fn spawn_reconcile(self: &Arc<Self>, immediate_id: String, shared_id: String) {
        if let Some((_, previous)) = self.polls.remove(&immediate_id) {
            previous.abort();
        }
        let handle = tokio::spawn(poll::reconcile(
            Arc::clone(self),
            immediate_id.clone(),
            shared_id,
        ));
        self.polls.insert(immediate_id, handle);
    }

    /// Called by the poll once the stored counterpart was found.
    pub(crate) fn finish_reconcile(
        &self,
        immediate_id: &str,
        found: Notification,
        server_count: Option<u64>,
    ) {
        // Dropping the handle detaches the finished task; aborting it here
        // would cancel ourselves.
        self.polls.remove(immediate_id);
        self.with_state(|state| {
            state.apply_reconciled(immediate_id, found);
            if let Some(count) = server_count {
                state.adopt_server_count(count);
            }
        });
    }

    /// Called by the poll when every attempt came up empty.
    pub(crate) fn abandon_reconcile(&self, immediate_id: &str) {
        self.polls.remove(immediate_id);
        self.with_state(|state| state.clear_pending(immediate_id));
    }

    pub(crate) fn gateway(&self) -> &Arc<dyn NotificationGateway> {
        &self.gateway
    }

    pub(crate) fn config(&self) -> &NotificationsConfig {
        &self.config
    }
}
