//! Push transport: connection lifecycle, channel subscriptions, and
//! handler fan-out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use campushub_api::PortalClient;
use campushub_core::AppResult;
use campushub_core::config::realtime::RealtimeConfig;
use campushub_core::events::PushEvent;
use dashmap::DashMap;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::channel::Channel;
use crate::connection::{self, Socket};
use crate::event::parse_push_event;
use crate::protocol::{
    EVENT_CONNECTION_ESTABLISHED, EVENT_ERROR, EVENT_NOTIFICATION_FALLBACK,
    EVENT_SUBSCRIPTION_SUCCEEDED, Frame,
};

/// Lifecycle state of the push connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection, and none being attempted.
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Connection accepted by the push service.
    Connected,
}

/// Identifies a registered push handler so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Callback invoked for every normalized push event.
pub type PushHandler = Arc<dyn Fn(&PushEvent) -> AppResult<()> + Send + Sync>;

/// WebSocket transport for push notifications.
///
/// The transport joins the configured public channel on connect and the
/// signed-in user's private channel once a user is set. A dropped
/// connection flips the state to [`ConnectionState::Disconnected`] and
/// stays there; reconnecting is the caller's decision.
pub struct PushTransport {
    inner: Arc<TransportInner>,
}

struct TransportInner {
    api: Arc<PortalClient>,
    config: RealtimeConfig,
    handlers: DashMap<HandlerId, PushHandler>,
    next_handler_id: AtomicU64,
    /// Bumped on every connect and disconnect. A dispatch task whose
    /// generation no longer matches must not touch shared state.
    generation: AtomicU64,
    live: Mutex<Option<Live>>,
    state_tx: watch::Sender<ConnectionState>,
    user_id: Mutex<Option<String>>,
}

struct Live {
    socket: Socket,
    socket_id: Option<String>,
    generation: u64,
}

impl PushTransport {
    /// Creates a transport. No connection is attempted until
    /// [`connect`](Self::connect) is called.
    pub fn new(api: Arc<PortalClient>, config: RealtimeConfig) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(TransportInner {
                api,
                config,
                handlers: DashMap::new(),
                next_handler_id: AtomicU64::new(1),
                generation: AtomicU64::new(0),
                live: Mutex::new(None),
                state_tx,
                user_id: Mutex::new(None),
            }),
        }
    }

    /// The current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.inner.state_tx.borrow()
    }

    /// A watch receiver that observes connection state changes.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Whether the connection is currently established.
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Registers a handler invoked for every push event.
    pub fn add_handler<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&PushEvent) -> AppResult<()> + Send + Sync + 'static,
    {
        let id = HandlerId(self.inner.next_handler_id.fetch_add(1, Ordering::Relaxed));
        self.inner.handlers.insert(id, Arc::new(handler));
        id
    }

    /// Removes a previously registered handler.
    pub fn remove_handler(&self, id: HandlerId) -> bool {
        self.inner.handlers.remove(&id).is_some()
    }

    /// Dials the push service and joins the public channel.
    ///
    /// Without stored credentials, or when a connection is already active,
    /// this is a no-op. A failed attempt returns the state to
    /// `Disconnected` without retrying.
    pub async fn connect(&self) {
        let Some(token) = self.inner.api.bearer() else {
            warn!("No stored credentials; push connection not attempted");
            return;
        };
        if self.state() != ConnectionState::Disconnected {
            debug!("Push connection already active");
            return;
        }
        self.inner.set_state(ConnectionState::Connecting);

        // The push service authenticates the handshake by token query
        // parameter. A URL without a path needs an explicit "/" before the
        // query; the handshake request target must be an absolute path.
        let base = &self.inner.config.url;
        let separator = match base.split_once("://") {
            Some((_, rest)) if !rest.contains('/') => "/?",
            _ => "?",
        };
        let url = format!("{base}{separator}token={token}");
        let timeout = Duration::from_secs(self.inner.config.connect_timeout_seconds);
        let (socket, frame_rx) = match tokio::time::timeout(timeout, connection::open(&url)).await
        {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => {
                warn!(error = %e, "Push connection failed");
                self.inner.set_state(ConnectionState::Disconnected);
                return;
            }
            Err(_) => {
                warn!("Push connection timed out");
                self.inner.set_state(ConnectionState::Disconnected);
                return;
            }
        };

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut live = self.inner.live.lock().unwrap_or_else(|e| e.into_inner());
            *live = Some(Live {
                socket,
                socket_id: None,
                generation,
            });
        }

        tokio::spawn(dispatch_loop(Arc::clone(&self.inner), frame_rx, generation));
    }

    /// Leaves all channels, closes the connection, and clears every
    /// registered handler. Safe to call repeatedly.
    pub fn disconnect(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        let live = {
            let mut guard = self.inner.live.lock().unwrap_or_else(|e| e.into_inner());
            guard.take()
        };
        if let Some(live) = live {
            let _ = live
                .socket
                .send(Frame::unsubscribe(&self.inner.config.public_channel));
            let user_id = self
                .inner
                .user_id
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone();
            if let Some(user_id) = user_id {
                let channel = Channel::Private { user_id };
                let _ = live.socket.send(Frame::unsubscribe(&channel.name()));
            }
            live.socket.close();
            info!("Push connection closed");
        }
        self.inner.handlers.clear();
        self.inner.set_state(ConnectionState::Disconnected);
    }

    /// Drops the current connection and dials again.
    ///
    /// Disconnecting clears the handler registry, so handlers must be
    /// registered again after this returns.
    pub async fn reconnect(&self) {
        self.disconnect();
        self.connect().await;
    }

    /// Sets or clears the signed-in user, switching private channel
    /// subscriptions accordingly.
    pub async fn set_user(&self, user_id: Option<String>) {
        let previous = {
            let mut guard = self
                .inner
                .user_id
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            if *guard == user_id {
                return;
            }
            std::mem::replace(&mut *guard, user_id.clone())
        };

        if let Some(previous) = previous {
            let channel = Channel::Private { user_id: previous };
            self.inner.send_frame(Frame::unsubscribe(&channel.name()));
        }
        if let Some(user_id) = user_id {
            self.inner.subscribe_private(&user_id).await;
        }
    }
}

impl TransportInner {
    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
    }

    fn send_frame(&self, frame: Frame) {
        let guard = self.live.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(live) = guard.as_ref() {
            if let Err(e) = live.socket.send(frame) {
                warn!(error = %e, "Failed to queue frame");
            }
        }
    }

    /// Authorizes and joins the user's private channel.
    ///
    /// Requires the server-assigned socket id; before the connection is
    /// established there is nothing to authorize against, and the
    /// established handler performs the subscription instead.
    async fn subscribe_private(&self, user_id: &str) {
        let socket_id = {
            let guard = self.live.lock().unwrap_or_else(|e| e.into_inner());
            guard.as_ref().and_then(|l| l.socket_id.clone())
        };
        let Some(socket_id) = socket_id else {
            return;
        };
        let channel = Channel::Private {
            user_id: user_id.to_string(),
        };
        match self.api.broadcast_auth(&socket_id, &channel.name()).await {
            Ok(auth) => self.send_frame(Frame::subscribe(&channel.name(), Some(auth))),
            Err(e) => {
                warn!(channel = %channel, error = %e, "Private channel authorization failed");
            }
        }
    }

    async fn handle_frame(&self, frame: &Frame) {
        match frame.event.as_str() {
            EVENT_CONNECTION_ESTABLISHED => {
                let socket_id = frame.socket_id();
                {
                    let mut guard = self.live.lock().unwrap_or_else(|e| e.into_inner());
                    if let Some(live) = guard.as_mut() {
                        live.socket_id = socket_id.clone();
                    }
                }
                self.set_state(ConnectionState::Connected);
                info!(
                    socket_id = socket_id.as_deref().unwrap_or("-"),
                    "Push connection established"
                );

                self.send_frame(Frame::subscribe(&self.config.public_channel, None));
                let user_id = self
                    .user_id
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .clone();
                if let Some(user_id) = user_id {
                    self.subscribe_private(&user_id).await;
                }
            }
            EVENT_SUBSCRIPTION_SUCCEEDED => {
                debug!(
                    channel = frame.channel.as_deref().unwrap_or("-"),
                    "Subscription confirmed"
                );
            }
            EVENT_ERROR => {
                warn!(data = ?frame.data, "Push service reported an error");
            }
            event if event == self.config.notification_event
                || event == EVENT_NOTIFICATION_FALLBACK =>
            {
                let Some(payload) = frame.payload() else {
                    warn!("Notification frame without payload");
                    return;
                };
                match parse_push_event(&payload) {
                    Ok(event) => self.dispatch(&event),
                    Err(e) => warn!(error = %e, "Ignoring malformed push payload"),
                }
            }
            other => debug!(event = other, "Ignoring unhandled event"),
        }
    }

    /// Invokes every registered handler. A failing handler is logged and
    /// skipped; it never stops the others.
    fn dispatch(&self, event: &PushEvent) {
        for entry in self.handlers.iter() {
            if let Err(e) = (entry.value())(event) {
                warn!(handler_id = entry.key().0, error = %e, "Push handler failed");
            }
        }
    }
}

async fn dispatch_loop(
    inner: Arc<TransportInner>,
    mut frames: mpsc::UnboundedReceiver<Frame>,
    generation: u64,
) {
    while let Some(frame) = frames.recv().await {
        if inner.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        inner.handle_frame(&frame).await;
    }

    // The read task ended: the server closed the connection or the read
    // failed. Report the loss unless a newer connection took over.
    if inner.generation.load(Ordering::SeqCst) != generation {
        return;
    }
    let dropped = {
        let mut guard = inner.live.lock().unwrap_or_else(|e| e.into_inner());
        if guard.as_ref().is_some_and(|l| l.generation == generation) {
            *guard = None;
            true
        } else {
            false
        }
    };
    if dropped {
        inner.set_state(ConnectionState::Disconnected);
        info!("Push connection lost");
    }
}
