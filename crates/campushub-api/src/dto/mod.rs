//! Wire-format types for the portal REST API.

pub mod auth;
pub mod notification;
