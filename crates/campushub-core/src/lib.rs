//! # campushub-core
//!
//! Core crate for the CampusHub client. Contains configuration schemas,
//! shared types, push event records, and the unified error system.
//!
//! This crate has **no** internal dependencies on other CampusHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
