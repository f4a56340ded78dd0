//! User domain types.

pub mod kind;
pub mod model;

pub use kind::UserKind;
pub use model::UserSummary;
