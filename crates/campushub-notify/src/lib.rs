//! CampusHub Notify — the notification center.
//!
//! [`NotificationCenter`] merges two sources into one feed: immediate
//! notifications pushed over the real-time channel, and queued rows
//! served by the paginated REST API. It owns the unread count, applies
//! reads optimistically, and reconciles immediate notifications with
//! their stored counterparts in the background.
//!
//! The server side is reached through the [`NotificationGateway`] trait;
//! the portal client implements it in production and tests substitute
//! scripted gateways.

pub mod center;
pub mod gateway;
pub mod mutation;
mod poll;
pub mod state;

pub use center::NotificationCenter;
pub use gateway::{FetchedPage, NotificationGateway};
pub use state::FeedSnapshot;
