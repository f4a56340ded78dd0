//! Core HTTP client shared by all endpoint groups.

use std::time::Duration;

use campushub_auth::CredentialStore;
use campushub_core::config::api::ApiConfig;
use campushub_core::{AppError, AppResult};
use reqwest::StatusCode;
use reqwest::header;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Authenticated client for the portal REST API.
///
/// Cheap to share behind an `Arc`; the inner `reqwest::Client` pools
/// connections internally. The bearer token is read from the credential
/// store on every request, so a login or logout takes effect immediately.
#[derive(Debug, Clone)]
pub struct PortalClient {
    client: reqwest::Client,
    base_url: String,
    credentials: CredentialStore,
}

impl PortalClient {
    /// Creates a client for the configured API base URL.
    pub fn new(config: &ApiConfig, credentials: CredentialStore) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// The credential store backing this client.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// The currently stored bearer token, if any.
    pub fn bearer(&self) -> Option<String> {
        self.credentials.load().map(|c| c.token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let mut request = self
            .client
            .get(self.url(path))
            .header(header::ACCEPT, "application/json");
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| AppError::network(format!("GET {path} failed: {e}")))?;
        Self::decode(path, response).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let mut request = self
            .client
            .post(self.url(path))
            .header(header::ACCEPT, "application/json")
            .json(body);
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| AppError::network(format!("POST {path} failed: {e}")))?;
        Self::decode(path, response).await
    }

    /// Decodes a response body, mapping failure statuses onto error kinds.
    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> AppResult<T> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::network(format!("Reading response from {path} failed: {e}")))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::authentication(format!(
                "{path} rejected the stored token"
            )));
        }
        if !status.is_success() {
            return Err(AppError::http(format!("{path} returned {status}: {text}")));
        }

        // Some endpoints answer with an empty body on success.
        let text = if text.is_empty() {
            "null".to_string()
        } else {
            text
        };
        serde_json::from_str(&text).map_err(|e| {
            AppError::serialization(format!("Decoding response from {path} failed: {e}"))
        })
    }
}
