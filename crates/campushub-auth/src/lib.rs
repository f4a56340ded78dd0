//! CampusHub Auth — persisted credentials for the portal client.
//!
//! Stores the bearer token and account flags on disk so that a restarted
//! client can resume its session without signing in again.

pub mod credentials;
pub mod store;

pub use credentials::Credentials;
pub use store::CredentialStore;
