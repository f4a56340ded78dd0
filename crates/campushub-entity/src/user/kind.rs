//! User kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which portal the user signed in through.
///
/// The flag decides which API surface and which broadcast channel apply;
/// it is persisted alongside the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    /// Student portal account.
    Student,
    /// Staff (teacher/administration) portal account.
    Staff,
}

impl UserKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Staff => "staff",
        }
    }
}

impl fmt::Display for UserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserKind {
    type Err = campushub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "staff" => Ok(Self::Staff),
            _ => Err(campushub_core::AppError::validation(format!(
                "Invalid user kind: '{s}'. Expected one of: student, staff"
            ))),
        }
    }
}
