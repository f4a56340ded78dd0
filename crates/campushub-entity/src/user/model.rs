//! User summary model.

use serde::{Deserialize, Serialize};

use crate::user::UserKind;

/// The signed-in user as reported by the portal API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    /// Server-side user id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Email address, when the portal exposes one.
    pub email: Option<String>,
    /// Which portal the account belongs to.
    pub kind: UserKind,
}
