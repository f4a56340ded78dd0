//! Persisted session credentials.

use campushub_entity::user::UserKind;
use serde::{Deserialize, Serialize};

/// Everything the client needs to resume an authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Bearer token issued at login.
    pub token: String,
    /// Server-side id of the signed-in user, when known.
    pub user_id: Option<i64>,
    /// Which portal the account belongs to.
    pub user_kind: UserKind,
}

impl Credentials {
    /// Creates credentials for a freshly issued token.
    pub fn new(token: impl Into<String>, user_id: Option<i64>, user_kind: UserKind) -> Self {
        Self {
            token: token.into(),
            user_id,
            user_kind,
        }
    }
}
