//! CampusHub Realtime — WebSocket transport for push notifications.
//!
//! [`PushTransport`] maintains a single connection to the push service,
//! subscribes to the public channel and the signed-in user's private
//! channel, normalizes incoming payloads into
//! [`campushub_core::events::PushEvent`] records, and fans them out to
//! registered handlers.
//!
//! The transport never reconnects on its own; a lost connection flips the
//! state to `Disconnected` and stays there until [`PushTransport::connect`]
//! is called again.

pub mod channel;
mod connection;
pub mod event;
pub mod protocol;
pub mod transport;

pub use transport::{ConnectionState, HandlerId, PushTransport};
