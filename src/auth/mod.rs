//! HTTP client for the Quarry auth service.
//!
//! Handles provider-connection initiation, token exchange and refresh,
//! and listing a user's active provider connections. All calls are plain
//! request/response over HTTPS with bearer authentication: the API key
//! for client-authenticated calls, the user's own id token for
//! [`AuthClient::list_connections`].

mod claims;
mod error;

pub use claims::{unverified_claims, unverified_email, ClaimsError};
pub use error::{AuthError, Result};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::{ConfigError, ConnectionMode};

/// User agent reported on every request.
const USER_AGENT: &str = "quarry-sdk-rust";

// ============================================================================
// Types
// ============================================================================

/// Credential presented to the token-exchange endpoint.
///
/// Exactly one grant kind is sent per exchange: an authorization code the
/// first time a user completes the connection flow, a refresh token for
/// every renewal after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenGrant {
    /// Sign-in code returned by the provider authorization flow.
    AuthorizationCode(String),
    /// Long-lived credential from an earlier exchange.
    RefreshToken(String),
}

/// Response from beginning a provider connection.
#[derive(Debug, Clone, Deserialize)]
pub struct BeginConnection {
    /// The URL the end user must visit to authorize the connection.
    pub url: String,
}

/// Tokens issued by a successful exchange.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeTokens {
    /// Short-lived bearer credential for search calls.
    pub id_token: String,
    /// Long-lived credential for renewing the session.
    pub refresh_token: String,
    /// Server-reported id-token lifetime in seconds.
    pub expires_in: i64,
}

/// A user's active provider connections.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConnections {
    /// Platform identifier of the user the id token belongs to.
    pub user_id: String,
    /// Names of the providers the user has connected.
    pub connections: Vec<String>,
}

// ============================================================================
// Gateway trait
// ============================================================================

/// Operations the auth service exposes to the rest of the SDK.
///
/// [`AuthClient`] is the HTTP implementation; the seam exists so the
/// session orchestrator can be exercised against in-process fakes.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Begin a provider connection, returning the authorization URL.
    async fn begin_connection(
        &self,
        provider: &str,
        redirect_uri: &str,
        state: Option<&str>,
        endpoint: Option<&str>,
    ) -> Result<BeginConnection>;

    /// Exchange a grant for session tokens.
    async fn exchange_tokens(&self, grant: &TokenGrant) -> Result<ExchangeTokens>;

    /// List the provider connections belonging to the id token's user.
    async fn list_connections(&self, id_token: &str) -> Result<UserConnections>;
}

// ============================================================================
// AuthClient
// ============================================================================

/// HTTP implementation of [`AuthGateway`].
#[derive(Debug, Clone)]
pub struct AuthClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl AuthClient {
    /// Create a client against an explicit base URL.
    #[must_use]
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http: Client::new(),
        }
    }

    /// Create a client using the default endpoint for `mode`.
    pub fn for_mode(
        api_key: impl Into<String>,
        mode: ConnectionMode,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(api_key, mode.endpoints()?.http_base_url))
    }

    /// Begin a provider connection, returning the authorization URL the
    /// end user must visit.
    pub async fn begin_connection(
        &self,
        provider: &str,
        redirect_uri: &str,
        state: Option<&str>,
        endpoint: Option<&str>,
    ) -> Result<BeginConnection> {
        let mut url = url::Url::parse(&format!(
            "{}/api/auth/connect/{provider}/url",
            self.base_url
        ))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("redirect_uri", redirect_uri);
            if let Some(state) = state {
                pairs.append_pair("state", state);
            }
            if let Some(endpoint) = endpoint {
                pairs.append_pair("endpoint", endpoint);
            }
        }

        let response = self
            .http
            .post(url)
            .header("User-Agent", USER_AGENT)
            .header("Authorization", bearer(&self.api_key))
            .send()
            .await?;
        json_or_error(response).await
    }

    /// Exchange an authorization code or refresh token for session tokens.
    pub async fn exchange_tokens(&self, grant: &TokenGrant) -> Result<ExchangeTokens> {
        let body = match grant {
            TokenGrant::AuthorizationCode(code) => serde_json::json!({ "code": code }),
            TokenGrant::RefreshToken(token) => serde_json::json!({ "refresh_token": token }),
        };

        let response = self
            .http
            .post(format!("{}/api/auth/token", self.base_url))
            .header("User-Agent", USER_AGENT)
            .header("Authorization", bearer(&self.api_key))
            .json(&body)
            .send()
            .await?;
        json_or_error(response).await
    }

    /// List the provider connections of the user the id token belongs to.
    ///
    /// Unlike the other calls, this one authenticates as the user: the id
    /// token itself is the bearer credential.
    pub async fn list_connections(&self, id_token: &str) -> Result<UserConnections> {
        let response = self
            .http
            .get(format!("{}/api/auth/connections", self.base_url))
            .header("User-Agent", USER_AGENT)
            .header("Authorization", bearer(id_token))
            .send()
            .await?;
        json_or_error(response).await
    }
}

#[async_trait]
impl AuthGateway for AuthClient {
    async fn begin_connection(
        &self,
        provider: &str,
        redirect_uri: &str,
        state: Option<&str>,
        endpoint: Option<&str>,
    ) -> Result<BeginConnection> {
        AuthClient::begin_connection(self, provider, redirect_uri, state, endpoint).await
    }

    async fn exchange_tokens(&self, grant: &TokenGrant) -> Result<ExchangeTokens> {
        AuthClient::exchange_tokens(self, grant).await
    }

    async fn list_connections(&self, id_token: &str) -> Result<UserConnections> {
        AuthClient::list_connections(self, id_token).await
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Parse a successful JSON response, or surface the raw body of a
/// non-success response unchanged.
async fn json_or_error<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T> {
    if response.status().is_success() {
        Ok(response.json().await?)
    } else {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(AuthError::Api { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_new_trims_trailing_slash() {
        let client = AuthClient::new("key", "https://api.example.com/");
        assert_eq!(client.base_url, "https://api.example.com");
    }

    #[test]
    fn client_new_preserves_url_without_slash() {
        let client = AuthClient::new("key", "https://api.example.com");
        assert_eq!(client.base_url, "https://api.example.com");
    }

    #[test]
    fn for_mode_rejects_unserved_modes() {
        assert!(AuthClient::for_mode("key", ConnectionMode::AzurePrivateLink).is_err());
    }

    #[test]
    fn for_mode_uses_mode_endpoint() {
        let client = AuthClient::for_mode("key", ConnectionMode::Internet).unwrap();
        assert_eq!(client.base_url, "https://api.quarry.ai");
    }
}
