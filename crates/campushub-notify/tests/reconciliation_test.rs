//! Integration tests for the notification center against a scripted
//! gateway, driving background reconciliation with virtual time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use campushub_core::config::notifications::NotificationsConfig;
use campushub_core::events::PushEvent;
use campushub_core::{AppError, AppResult};
use campushub_entity::notification::{Notification, NotificationKind};
use campushub_notify::{FetchedPage, NotificationCenter, NotificationGateway};
use chrono::Utc;
use tokio::sync::Notify;

/// Gateway with scripted responses and call recording.
struct ScriptedGateway {
    /// Responses per page number; entries are consumed in order and the
    /// last one repeats.
    pages: Mutex<HashMap<u64, Vec<FetchedPage>>>,
    fetch_calls: AtomicUsize,
    fail_fetch: AtomicBool,
    mark_read_calls: Mutex<Vec<String>>,
    fail_mark_read: AtomicBool,
    /// When set, mark_read parks until the gate is released.
    mark_read_gate: Mutex<Option<Arc<Notify>>>,
    unread_after_mark: AtomicU64,
    fail_mark_all: AtomicBool,
    unread_count_value: AtomicU64,
}

impl ScriptedGateway {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            pages: Mutex::new(HashMap::new()),
            fetch_calls: AtomicUsize::new(0),
            fail_fetch: AtomicBool::new(false),
            mark_read_calls: Mutex::new(Vec::new()),
            fail_mark_read: AtomicBool::new(false),
            mark_read_gate: Mutex::new(None),
            unread_after_mark: AtomicU64::new(0),
            fail_mark_all: AtomicBool::new(false),
            unread_count_value: AtomicU64::new(0),
        })
    }

    fn script_page(&self, number: u64, responses: Vec<FetchedPage>) {
        self.pages.lock().unwrap().insert(number, responses);
    }

    fn next_response(&self, number: u64) -> FetchedPage {
        let mut pages = self.pages.lock().unwrap();
        match pages.get_mut(&number) {
            Some(responses) if responses.len() > 1 => responses.remove(0),
            Some(responses) => responses
                .first()
                .cloned()
                .unwrap_or_else(|| page(vec![], 0, 1, 1)),
            None => page(vec![], 0, 1, 1),
        }
    }

    fn marked_ids(&self) -> Vec<String> {
        self.mark_read_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationGateway for ScriptedGateway {
    async fn fetch_page(&self, number: u64) -> AppResult<FetchedPage> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(AppError::network("scripted fetch failure"));
        }
        Ok(self.next_response(number))
    }

    async fn mark_read(&self, id: &str) -> AppResult<u64> {
        let gate = self.mark_read_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.mark_read_calls.lock().unwrap().push(id.to_string());
        if self.fail_mark_read.load(Ordering::SeqCst) {
            return Err(AppError::http("scripted mark-read failure"));
        }
        Ok(self.unread_after_mark.load(Ordering::SeqCst))
    }

    async fn mark_all_read(&self) -> AppResult<u64> {
        if self.fail_mark_all.load(Ordering::SeqCst) {
            return Err(AppError::http("scripted mark-all failure"));
        }
        Ok(0)
    }

    async fn unread_count(&self) -> AppResult<u64> {
        Ok(self.unread_count_value.load(Ordering::SeqCst))
    }
}

fn queued(id: &str, shared_id: Option<&str>, minutes_ago: i64) -> Notification {
    Notification {
        id: id.to_string(),
        kind: NotificationKind::Queued,
        shared_id: shared_id.map(str::to_string),
        title: format!("Notification {id}"),
        message: "Body".to_string(),
        url: None,
        read_at: None,
        created_at: Utc::now() - chrono::Duration::minutes(minutes_ago),
    }
}

fn push_event(id: &str, shared_id: Option<&str>) -> PushEvent {
    PushEvent {
        id: id.to_string(),
        shared_id: shared_id.map(str::to_string),
        title: format!("Push {id}"),
        message: "Body".to_string(),
        url: None,
        created_at: Utc::now(),
    }
}

fn page(
    notifications: Vec<Notification>,
    unread_count: u64,
    current_page: u64,
    last_page: u64,
) -> FetchedPage {
    FetchedPage {
        notifications,
        unread_count,
        current_page,
        last_page,
    }
}

fn center_with(gateway: &Arc<ScriptedGateway>) -> Arc<NotificationCenter> {
    let gw = Arc::clone(gateway) as Arc<dyn NotificationGateway>;
    NotificationCenter::new(gw, NotificationsConfig::default())
}

#[tokio::test(start_paused = true)]
async fn test_refresh_replaces_feed() {
    let gateway = ScriptedGateway::new();
    gateway.script_page(
        1,
        vec![
            page(vec![queued("q-1", None, 10)], 1, 1, 1),
            page(vec![queued("q-2", None, 1)], 2, 1, 1),
        ],
    );

    let center = center_with(&gateway);
    center.refresh().await;
    assert_eq!(center.snapshot().notifications[0].id, "q-1");

    center.refresh().await;
    let snapshot = center.snapshot();
    assert_eq!(snapshot.notifications.len(), 1);
    assert_eq!(snapshot.notifications[0].id, "q-2");
    assert_eq!(snapshot.unread_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_push_is_deduplicated_and_superseded_on_refresh() {
    let gateway = ScriptedGateway::new();
    gateway.script_page(1, vec![page(vec![queued("q-9", Some("evt-9"), 1)], 1, 1, 1)]);

    let center = center_with(&gateway);
    center.ingest_push(&push_event("i-1", Some("evt-9")));
    center.ingest_push(&push_event("i-1", Some("evt-9")));
    assert_eq!(center.snapshot().notifications.len(), 1);
    assert_eq!(center.snapshot().unread_count, 1);

    center.refresh().await;

    let snapshot = center.snapshot();
    assert_eq!(snapshot.notifications.len(), 1);
    assert_eq!(snapshot.notifications[0].id, "q-9");
    assert_eq!(snapshot.unread_count, 1);
}

#[tokio::test(start_paused = true)]
async fn test_optimistic_read_visible_before_server_reply() {
    let gateway = ScriptedGateway::new();
    gateway.script_page(1, vec![page(vec![queued("q-1", None, 5)], 1, 1, 1)]);

    let center = center_with(&gateway);
    center.refresh().await;

    let gate = Arc::new(Notify::new());
    *gateway.mark_read_gate.lock().unwrap() = Some(Arc::clone(&gate));

    let worker = Arc::clone(&center);
    let task = tokio::spawn(async move { worker.mark_as_read("q-1").await });
    tokio::time::sleep(Duration::from_millis(10)).await;

    // The read is already visible while the server call is parked.
    let snapshot = center.snapshot();
    assert!(snapshot.notifications[0].is_read());
    assert_eq!(snapshot.unread_count, 0);
    assert!(gateway.marked_ids().is_empty());

    gate.notify_one();
    task.await.expect("mark_as_read task");
    assert_eq!(gateway.marked_ids(), vec!["q-1".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_read_rolls_back_and_refreshes() {
    let gateway = ScriptedGateway::new();
    let initial = page(vec![queued("q-1", None, 5)], 1, 1, 1);
    gateway.script_page(1, vec![initial.clone(), initial]);
    gateway.fail_mark_read.store(true, Ordering::SeqCst);

    let center = center_with(&gateway);
    center.refresh().await;
    assert_eq!(center.snapshot().unread_count, 1);

    center.mark_as_read("q-1").await;

    let snapshot = center.snapshot();
    assert!(!snapshot.notifications[0].is_read());
    assert_eq!(snapshot.unread_count, 1);
    // The initial refresh plus the corrective one after the rollback.
    assert_eq!(gateway.fetch_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_reconcile_poll_finds_stored_counterpart() {
    let gateway = ScriptedGateway::new();
    gateway.script_page(
        1,
        vec![
            page(vec![], 0, 1, 1),
            page(vec![queued("q-9", Some("evt-9"), 1)], 1, 1, 1),
        ],
    );

    let center = center_with(&gateway);
    center.ingest_push(&push_event("i-1", Some("evt-9")));
    center.mark_as_read("i-1").await;
    assert_eq!(center.snapshot().pending_ids, vec!["i-1".to_string()]);
    assert_eq!(center.active_polls(), 1);

    // The first attempt misses, the second finds the stored row.
    tokio::time::sleep(Duration::from_secs(7)).await;

    let snapshot = center.snapshot();
    assert_eq!(snapshot.notifications.len(), 1);
    assert_eq!(snapshot.notifications[0].id, "q-9");
    assert!(snapshot.notifications[0].is_read());
    assert_eq!(snapshot.unread_count, 0);
    assert!(snapshot.pending_ids.is_empty());
    assert_eq!(gateway.marked_ids(), vec!["q-9".to_string()]);
    assert_eq!(center.active_polls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reconcile_poll_gives_up_after_budget() {
    let gateway = ScriptedGateway::new();
    // Page 1 never contains the counterpart.
    gateway.script_page(1, vec![page(vec![], 0, 1, 1)]);

    let center = center_with(&gateway);
    center.ingest_push(&push_event("i-1", Some("evt-9")));
    center.mark_as_read("i-1").await;

    // Default budget: 12 attempts, 3 seconds apart.
    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(gateway.fetch_calls.load(Ordering::SeqCst), 12);
    assert_eq!(center.active_polls(), 0);

    let snapshot = center.snapshot();
    assert!(snapshot.pending_ids.is_empty());
    assert!(snapshot.notifications[0].is_read());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_running_polls() {
    let gateway = ScriptedGateway::new();
    gateway.script_page(1, vec![page(vec![], 0, 1, 1)]);

    let center = center_with(&gateway);
    center.ingest_push(&push_event("i-1", Some("evt-9")));
    center.mark_as_read("i-1").await;
    assert_eq!(center.active_polls(), 1);

    tokio::time::sleep(Duration::from_secs(4)).await;
    let fetched_before = gateway.fetch_calls.load(Ordering::SeqCst);

    center.shutdown();
    assert_eq!(center.active_polls(), 0);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(gateway.fetch_calls.load(Ordering::SeqCst), fetched_before);

    center.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_mark_all_as_read_waits_for_server_verdict() {
    let gateway = ScriptedGateway::new();
    gateway.script_page(1, vec![page(vec![queued("q-1", None, 5)], 1, 1, 1)]);

    let center = center_with(&gateway);
    center.refresh().await;
    center.ingest_push(&push_event("i-1", None));
    assert_eq!(center.snapshot().unread_count, 2);

    // A failing call leaves the feed untouched.
    gateway.fail_mark_all.store(true, Ordering::SeqCst);
    center.mark_all_as_read().await;
    let snapshot = center.snapshot();
    assert_eq!(snapshot.unread_count, 2);
    assert!(snapshot.notifications.iter().all(|n| !n.is_read()));

    gateway.fail_mark_all.store(false, Ordering::SeqCst);
    center.mark_all_as_read().await;
    let snapshot = center.snapshot();
    assert_eq!(snapshot.unread_count, 0);
    assert!(snapshot.notifications.iter().all(|n| n.is_read()));
}

#[tokio::test(start_paused = true)]
async fn test_load_more_walks_the_pages() {
    let gateway = ScriptedGateway::new();
    gateway.script_page(1, vec![page(vec![queued("q-1", None, 1)], 2, 1, 2)]);
    gateway.script_page(2, vec![page(vec![queued("q-2", None, 2)], 2, 2, 2)]);

    let center = center_with(&gateway);
    center.refresh().await;
    assert!(center.snapshot().has_more);

    center.load_more().await;
    let snapshot = center.snapshot();
    assert_eq!(snapshot.notifications.len(), 2);
    assert!(!snapshot.has_more);
    assert_eq!(snapshot.unread_count, 2);

    // Nothing further to load.
    center.load_more().await;
    assert_eq!(gateway.fetch_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_cannot_resurrect_a_locally_read_immediate() {
    let gateway = ScriptedGateway::new();
    gateway.script_page(1, vec![page(vec![queued("q-9", Some("evt-9"), 1)], 1, 1, 1)]);

    let center = center_with(&gateway);
    center.ingest_push(&push_event("i-1", Some("evt-9")));
    center.mark_as_read("i-1").await;

    // The stored counterpart arrives unread; the server still counts it.
    center.refresh().await;

    let snapshot = center.snapshot();
    assert_eq!(snapshot.notifications.len(), 1);
    assert_eq!(snapshot.notifications[0].id, "q-9");
    assert!(snapshot.notifications[0].is_read());
    assert_eq!(snapshot.unread_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_refresh_keeps_previous_feed() {
    let gateway = ScriptedGateway::new();
    gateway.script_page(1, vec![page(vec![queued("q-1", None, 1)], 1, 1, 1)]);

    let center = center_with(&gateway);
    center.refresh().await;
    assert_eq!(center.snapshot().notifications.len(), 1);

    gateway.fail_fetch.store(true, Ordering::SeqCst);
    center.refresh().await;

    let snapshot = center.snapshot();
    assert_eq!(snapshot.notifications.len(), 1);
    assert!(!snapshot.is_loading);
}

#[tokio::test(start_paused = true)]
async fn test_unread_count_tracks_visible_unread() {
    let gateway = ScriptedGateway::new();
    gateway.script_page(
        1,
        vec![page(
            vec![queued("q-1", None, 1), queued("q-2", None, 2)],
            2,
            1,
            1,
        )],
    );
    gateway.unread_after_mark.store(1, Ordering::SeqCst);

    let center = center_with(&gateway);
    center.refresh().await;
    center.ingest_push(&push_event("i-1", None));

    center.mark_as_read("q-1").await;

    let snapshot = center.snapshot();
    let visible_unread = snapshot
        .notifications
        .iter()
        .filter(|n| !n.is_read())
        .count() as u64;
    assert_eq!(snapshot.unread_count, visible_unread);
    assert_eq!(snapshot.unread_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_sync_unread_count_adopts_server_figure() {
    let gateway = ScriptedGateway::new();
    gateway.unread_count_value.store(9, Ordering::SeqCst);

    let center = center_with(&gateway);
    center.ingest_push(&push_event("i-1", None));

    center.sync_unread_count().await;
    assert_eq!(center.snapshot().unread_count, 10);
}

#[tokio::test(start_paused = true)]
async fn test_watchers_observe_feed_changes() {
    let gateway = ScriptedGateway::new();
    gateway.script_page(1, vec![page(vec![queued("q-1", None, 1)], 1, 1, 1)]);

    let center = center_with(&gateway);
    let mut watcher = center.watch();
    assert_eq!(watcher.borrow().notifications.len(), 0);

    center.refresh().await;
    watcher.changed().await.expect("change notification");
    assert_eq!(watcher.borrow_and_update().notifications.len(), 1);
}
