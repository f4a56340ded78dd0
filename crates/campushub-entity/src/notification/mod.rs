//! Notification domain types.

pub mod kind;
pub mod model;

pub use kind::{IMMEDIATE_TYPE_TAG, NotificationKind};
pub use model::Notification;
