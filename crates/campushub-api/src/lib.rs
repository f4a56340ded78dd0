//! CampusHub API — HTTP client for the portal REST API.
//!
//! [`PortalClient`] wraps a `reqwest` client with the base URL, bearer
//! token handling, and response decoding shared by every endpoint. The
//! endpoint groups live in their own modules:
//!
//! - [`auth`] — login, logout, current user
//! - [`notifications`] — the notification feed and read-state endpoints
//! - [`broadcasting`] — private channel authorization for the push service

pub mod auth;
pub mod broadcasting;
pub mod client;
pub mod dto;
pub mod notifications;

pub use client::PortalClient;
