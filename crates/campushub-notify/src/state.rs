//! Feed state: the merged, deduplicated notification list.
//!
//! The feed shows two kinds of entries at once: queued rows fetched from
//! the server and immediate notifications received over the push channel.
//! Queued rows are authoritative; an immediate entry survives only until
//! the row it announced appears, matched by shared id.
//!
//! The unread count follows one rule at every sync point: the count is
//! the server's figure plus the visible unread immediates the server does
//! not know about yet.

use std::collections::HashSet;

use campushub_core::types::PageMeta;
use campushub_entity::notification::{Notification, NotificationKind};
use chrono::Utc;

use crate::gateway::FetchedPage;
use crate::mutation::ReadMutation;

/// Immutable view of the feed published to watchers.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    /// Visible notifications, newest first.
    pub notifications: Vec<Notification>,
    /// Unread notifications, server count plus local immediates.
    pub unread_count: u64,
    /// Ids of immediate notifications awaiting reconciliation, sorted.
    pub pending_ids: Vec<String>,
    /// Whether a refresh is in flight.
    pub is_loading: bool,
    /// Whether a follow-up page fetch is in flight.
    pub is_loading_more: bool,
    /// Whether further pages are available.
    pub has_more: bool,
}

/// Bookkeeping handed back by a local read, enough to confirm or undo it.
pub(crate) struct LocalRead {
    pub(crate) mutation: ReadMutation,
    pub(crate) kind: NotificationKind,
    pub(crate) shared_id: Option<String>,
}

/// The mutable feed state. All access goes through the center's lock.
pub(crate) struct FeedState {
    notifications: Vec<Notification>,
    unread_count: u64,
    /// Immediate notifications read locally. A fetched row with one of
    /// these ids is forced read, so a refresh cannot resurrect it unread.
    read_immediate_ids: HashSet<String>,
    /// Shared ids of locally read immediates. The stored counterpart of a
    /// read immediate arrives under its own id but carries this key.
    read_shared_ids: HashSet<String>,
    /// Immediates whose stored counterpart is being polled for.
    pending_ids: HashSet<String>,
    pub(crate) page: PageMeta,
    pub(crate) is_loading: bool,
    pub(crate) is_loading_more: bool,
}

impl FeedState {
    pub(crate) fn new() -> Self {
        Self {
            notifications: Vec::new(),
            unread_count: 0,
            read_immediate_ids: HashSet::new(),
            read_shared_ids: HashSet::new(),
            pending_ids: HashSet::new(),
            page: PageMeta::first(),
            is_loading: false,
            is_loading_more: false,
        }
    }

    pub(crate) fn snapshot(&self) -> FeedSnapshot {
        let mut pending: Vec<String> = self.pending_ids.iter().cloned().collect();
        pending.sort();
        FeedSnapshot {
            notifications: self.notifications.clone(),
            unread_count: self.unread_count,
            pending_ids: pending,
            is_loading: self.is_loading,
            is_loading_more: self.is_loading_more,
            has_more: self.page.has_next(),
        }
    }

    /// Inserts a pushed notification at the top of the feed.
    ///
    /// Returns `false` when the feed already shows the same notification,
    /// either by id or through a visible entry with the same shared id.
    pub(crate) fn ingest(&mut self, notification: Notification) -> bool {
        let duplicate = self.notifications.iter().any(|n| {
            n.id == notification.id
                || (notification.shared_id.is_some() && n.shared_id == notification.shared_id)
        });
        if duplicate {
            return false;
        }
        if !notification.is_read() {
            self.unread_count += 1;
        }
        self.notifications.insert(0, notification);
        true
    }

    /// Replaces the feed with page 1 from the server.
    ///
    /// Immediate entries survive the replace unless the page carries them
    /// or their stored counterpart. Rows the user already read locally are
    /// forced read before adoption.
    pub(crate) fn apply_refresh(&mut self, page: FetchedPage) {
        let meta = page.meta();
        let mut adopted = page.unread_count;
        let mut rows = page.notifications;

        let fetched_ids: HashSet<String> = rows.iter().map(|n| n.id.clone()).collect();
        let fetched_shared: HashSet<String> =
            rows.iter().filter_map(|n| n.shared_id.clone()).collect();

        let survivors: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|n| {
                n.kind == NotificationKind::Immediate
                    && !fetched_ids.contains(&n.id)
                    && !n
                        .shared_id
                        .as_ref()
                        .is_some_and(|s| fetched_shared.contains(s))
            })
            .cloned()
            .collect();

        for row in &mut rows {
            if !row.is_read() && self.locally_read(row) {
                row.mark_read(Utc::now());
                adopted = adopted.saturating_sub(1);
            }
        }

        let mut merged = survivors;
        merged.extend(rows);
        merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.notifications = merged;

        self.page = meta;
        self.unread_count = adopted + self.unread_immediates();
        self.retain_visible_pending();
    }

    /// Appends a follow-up page, skipping rows already visible.
    ///
    /// A row that turns out to be the stored counterpart of a visible
    /// immediate supersedes it, exactly as on refresh.
    pub(crate) fn apply_load_more(&mut self, page: FetchedPage) {
        let meta = page.meta();
        let mut adopted = page.unread_count;

        let visible_ids: HashSet<String> =
            self.notifications.iter().map(|n| n.id.clone()).collect();
        let visible_shared: HashSet<String> = self
            .notifications
            .iter()
            .filter_map(|n| n.shared_id.clone())
            .collect();

        for mut row in page.notifications {
            if visible_ids.contains(&row.id) {
                continue;
            }
            if let Some(shared) = row.shared_id.clone() {
                if visible_shared.contains(&shared) {
                    self.notifications.retain(|n| {
                        !(n.kind == NotificationKind::Immediate
                            && n.shared_id.as_deref() == Some(shared.as_str()))
                    });
                }
            }
            if !row.is_read() && self.locally_read(&row) {
                row.mark_read(Utc::now());
                adopted = adopted.saturating_sub(1);
            }
            self.notifications.push(row);
        }

        self.page = meta;
        self.unread_count = adopted + self.unread_immediates();
        self.retain_visible_pending();
    }

    /// Marks a visible notification read locally.
    ///
    /// Returns the bookkeeping needed to confirm or undo the read, or
    /// `None` when the notification is unknown or already read.
    pub(crate) fn apply_local_read(&mut self, id: &str) -> Option<LocalRead> {
        let position = self.notifications.iter().position(|n| n.id == id)?;
        if self.notifications[position].is_read() {
            return None;
        }

        let previous_read_at = self.notifications[position].read_at;
        self.notifications[position].mark_read(Utc::now());
        let kind = self.notifications[position].kind;
        let shared_id = self.notifications[position].shared_id.clone();

        let decremented = self.unread_count > 0;
        self.unread_count = self.unread_count.saturating_sub(1);

        if kind == NotificationKind::Immediate {
            self.read_immediate_ids.insert(id.to_string());
            if let Some(shared) = shared_id.clone() {
                self.read_shared_ids.insert(shared);
            }
        }

        Some(LocalRead {
            mutation: ReadMutation::pending(id.to_string(), previous_read_at, decremented),
            kind,
            shared_id,
        })
    }

    /// Undoes a local read after the server rejected it. The only path
    /// that moves read state backwards.
    pub(crate) fn revert_read(&mut self, mutation: &ReadMutation) {
        if let Some(notification) = self.notifications.iter_mut().find(|n| n.id == mutation.id) {
            notification.read_at = mutation.previous_read_at;
        }
        if mutation.decremented {
            self.unread_count += 1;
        }
    }

    /// Marks everything visible read after a successful server-wide mark.
    pub(crate) fn apply_mark_all(&mut self, server_count: u64) {
        let now = Utc::now();
        for notification in &mut self.notifications {
            if notification.kind == NotificationKind::Immediate && !notification.is_read() {
                self.read_immediate_ids.insert(notification.id.clone());
                if let Some(shared) = notification.shared_id.clone() {
                    self.read_shared_ids.insert(shared);
                }
            }
            notification.mark_read(now);
        }
        // Every immediate is read now, so the server figure stands alone.
        self.unread_count = server_count;
    }

    /// Adopts the authoritative unread count, keeping the local immediate
    /// contribution on top.
    pub(crate) fn adopt_server_count(&mut self, server_count: u64) {
        self.unread_count = server_count + self.unread_immediates();
    }

    /// Replaces a reconciled immediate with its stored counterpart.
    ///
    /// The local-read overlay keeps its entries: if the server-side read
    /// did not stick, the next refresh must still force this row read.
    pub(crate) fn apply_reconciled(&mut self, immediate_id: &str, mut found: Notification) {
        found.mark_read(Utc::now());

        let mut removed_unread = 0u64;
        self.notifications.retain(|n| {
            let superseded = n.id == immediate_id || n.id == found.id;
            if superseded && !n.is_read() {
                removed_unread += 1;
            }
            !superseded
        });
        self.unread_count = self.unread_count.saturating_sub(removed_unread);

        self.notifications.push(found);
        self.notifications
            .sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.pending_ids.remove(immediate_id);
    }

    /// Flags an immediate as awaiting reconciliation.
    pub(crate) fn mark_pending(&mut self, id: &str) {
        self.pending_ids.insert(id.to_string());
    }

    /// Clears the reconciliation flag for an immediate.
    pub(crate) fn clear_pending(&mut self, id: &str) {
        self.pending_ids.remove(id);
    }

    /// Whether a fetched row was already read locally, directly or through
    /// its pushed twin.
    fn locally_read(&self, row: &Notification) -> bool {
        self.read_immediate_ids.contains(&row.id)
            || row
                .shared_id
                .as_deref()
                .is_some_and(|s| self.read_shared_ids.contains(s))
    }

    fn unread_immediates(&self) -> u64 {
        self.notifications
            .iter()
            .filter(|n| n.kind == NotificationKind::Immediate && !n.is_read())
            .count() as u64
    }

    fn retain_visible_pending(&mut self) {
        let visible: HashSet<String> = self
            .notifications
            .iter()
            .filter(|n| n.kind == NotificationKind::Immediate)
            .map(|n| n.id.clone())
            .collect();
        self.pending_ids.retain(|id| visible.contains(id));
    }
}
