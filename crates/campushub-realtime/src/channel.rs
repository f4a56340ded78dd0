//! Broadcast channel naming.

use std::fmt;

/// A broadcast channel the transport can subscribe to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    /// A public channel anyone may join, e.g. `students`.
    Public(String),
    /// The per-user private channel; joining requires a server-issued
    /// authorization signature.
    Private { user_id: String },
}

impl Channel {
    /// The channel name as it appears on the wire.
    pub fn name(&self) -> String {
        match self {
            Self::Public(name) => name.clone(),
            Self::Private { user_id } => format!("user.{user_id}"),
        }
    }

    /// Whether joining this channel requires an authorization signature.
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Private { .. })
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
