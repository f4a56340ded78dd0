//! Session endpoints: login, logout, current user.

use campushub_auth::Credentials;
use campushub_core::AppResult;
use campushub_entity::user::UserSummary;
use tracing::{info, warn};

use crate::client::PortalClient;
use crate::dto::auth::{LoginRequest, LoginResponse, UserDto};

impl PortalClient {
    /// `POST /login` — sign in and persist the issued token.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        device_name: &str,
    ) -> AppResult<UserSummary> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            device_name: device_name.to_string(),
        };
        let response: LoginResponse = self.post_json("login", &request).await?;
        let user = UserSummary::from(response.user);
        self.credentials()
            .save(&Credentials::new(response.token, Some(user.id), user.kind))?;
        info!(user_id = user.id, kind = %user.kind, "Signed in");
        Ok(user)
    }

    /// `POST /logout` — end the session on the server and locally.
    ///
    /// Local credentials are cleared even when the server call fails, so a
    /// dead token cannot wedge the client.
    pub async fn logout(&self) -> AppResult<()> {
        let result: AppResult<serde_json::Value> =
            self.post_json("logout", &serde_json::json!({})).await;
        if let Err(e) = result {
            warn!(error = %e, "Server-side logout failed; clearing local credentials anyway");
        }
        self.credentials().clear()
    }

    /// `GET /user` — the account behind the stored token.
    pub async fn current_user(&self) -> AppResult<UserSummary> {
        let user: UserDto = self.get_json("user").await?;
        Ok(user.into())
    }
}
