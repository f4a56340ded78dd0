//! # campushub-entity
//!
//! Domain entity models for the CampusHub client. Every struct in this
//! crate represents a value received from the portal API or constructed
//! from a real-time push event. All entities derive `Debug`, `Clone`,
//! `Serialize`, and `Deserialize`. This crate performs no I/O.

pub mod notification;
pub mod user;
