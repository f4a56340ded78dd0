//! Shared value types.

pub mod pagination;

pub use pagination::PageMeta;
