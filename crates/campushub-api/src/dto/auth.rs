//! Authentication endpoint payloads.

use campushub_entity::user::{UserKind, UserSummary};
use serde::{Deserialize, Serialize};

/// Request body for `POST /login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub device_name: String,
}

/// Response body for `POST /login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
}

/// The user object as the API returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDto {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_type: Option<String>,
}

/// Response body for `GET /broadcasting/auth`.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastAuthResponse {
    pub auth: String,
}

impl From<UserDto> for UserSummary {
    fn from(user: UserDto) -> Self {
        // Unrecognized or absent user types fall back to the student portal.
        let kind = user
            .user_type
            .as_deref()
            .and_then(|t| t.parse::<UserKind>().ok())
            .unwrap_or(UserKind::Student);
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            kind,
        }
    }
}
