//! Multi-user session orchestration.
//!
//! [`MultiUserClient`] manages the session lifecycle for each end user of
//! an embedding application: initiating provider connections, completing
//! the authorization callback, refreshing session tokens, and gating all
//! search operations behind a valid token.
//!
//! The orchestrator holds no per-user state in memory and takes no
//! locks. Every operation reads the user's record fresh from the
//! [`UserDataStore`] and writes it back whole, so concurrency control
//! for a single user's record belongs to the store implementation.
//!
//! A record moves through four states: no record; state pending (a
//! connection attempt is in flight); session active (tokens present and
//! unexpired); session stale (tokens present, expired). A stale session
//! is refreshed in place; a session that cannot be refreshed surfaces as
//! [`MultiUserError::InvalidSession`].

mod error;
mod state;
mod store;

pub use error::{MultiUserError, Result};
pub use state::StatePolicy;
pub use store::{MemoryUserStore, StoreError, UserDataStore};

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{self, AuthClient, AuthGateway, TokenGrant};
use crate::config::{ConfigError, ConnectionMode};
use crate::search::{Chunk, Query, RelevantChunk, SearchClient, SearchFilters, SearchGateway};

/// Safety margin subtracted from the server-reported token lifetime, so
/// a token is refreshed shortly before the server would reject it.
const EXPIRY_MARGIN_SECS: i64 = 10;

// ============================================================================
// UserData
// ============================================================================

/// One user's session record.
///
/// Created implicitly (as the default empty record) the first time a
/// user is referenced, rewritten on every successful token exchange, and
/// deleted only by [`MultiUserClient::clear_user`]. `id_token` and
/// `id_token_expiry` are always set together; `refresh_token`, once
/// obtained, survives until the record is cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    /// Long-lived credential anchoring session renewal.
    pub refresh_token: Option<String>,
    /// Short-lived bearer credential authorizing search calls.
    pub id_token: Option<String>,
    /// Absolute expiry of `id_token`, safety margin included.
    pub id_token_expiry: Option<DateTime<Utc>>,
    /// Providers the user has successfully connected.
    #[serde(default)]
    pub connections: Vec<String>,
    /// One-time state binding an in-flight connection attempt to its
    /// callback.
    pub sign_in_state: Option<String>,
}

// ============================================================================
// Options
// ============================================================================

/// Construction options for [`MultiUserClient`].
#[derive(Debug, Clone, Default)]
pub struct MultiUserClientOptions {
    /// Connectivity mode used to resolve default endpoints.
    pub connection_mode: ConnectionMode,
    /// Override for the auth service base URL.
    pub auth_base_url: Option<String>,
    /// Override for the search service host; requires `grpc_port`.
    pub grpc_host: Option<String>,
    /// Override for the search service port; requires `grpc_host`.
    pub grpc_port: Option<u16>,
    /// Correlation-state entropy policy.
    pub state_policy: StatePolicy,
}

// ============================================================================
// MultiUserClient
// ============================================================================

/// Client handling many users' authentication and access to the Quarry
/// search service.
pub struct MultiUserClient {
    auth: Arc<dyn AuthGateway>,
    search: Arc<dyn SearchGateway>,
    store: Arc<dyn UserDataStore>,
    callback_uri: String,
    state_policy: StatePolicy,
}

impl MultiUserClient {
    /// Create a client with internally-built service gateways.
    ///
    /// `callback_uri` is where the provider's authorization flow returns
    /// control; `store` is the application's persistence for per-user
    /// session records. Configuration problems (an unsupported
    /// connectivity mode, a host override without a port) are raised
    /// here, not at first use.
    pub fn new(
        api_key: impl Into<String>,
        callback_uri: impl Into<String>,
        store: Arc<dyn UserDataStore>,
        options: MultiUserClientOptions,
    ) -> Result<Self, ConfigError> {
        let auth_base_url = match options.auth_base_url {
            Some(url) => url,
            None => options.connection_mode.endpoints()?.http_base_url,
        };
        let auth = AuthClient::new(api_key, auth_base_url);
        let search = SearchClient::for_mode(
            options.connection_mode,
            options.grpc_host,
            options.grpc_port,
        )?;

        Ok(Self {
            auth: Arc::new(auth),
            search: Arc::new(search),
            store,
            callback_uri: callback_uri.into(),
            state_policy: options.state_policy,
        })
    }

    /// Create a client with injected gateway implementations.
    pub fn with_gateways(
        auth: Arc<dyn AuthGateway>,
        search: Arc<dyn SearchGateway>,
        store: Arc<dyn UserDataStore>,
        callback_uri: impl Into<String>,
    ) -> Self {
        Self {
            auth,
            search,
            store,
            callback_uri: callback_uri.into(),
            state_policy: StatePolicy::default(),
        }
    }

    /// Replace the correlation-state policy.
    #[must_use]
    pub fn with_state_policy(mut self, policy: StatePolicy) -> Self {
        self.state_policy = policy;
        self
    }

    // ------------------------------------------------------------------------
    // Connection flow
    // ------------------------------------------------------------------------

    /// Return a URL for authorizing a connection with `provider` on the
    /// user's behalf.
    ///
    /// Stores a fresh one-time state in the user's record; the callback
    /// completing this attempt must present exactly that state.
    pub async fn begin_connection_url(&self, user_id: &str, provider: &str) -> Result<String> {
        let state = self.state_policy.generate();
        let response = self
            .auth
            .begin_connection(provider, &self.callback_uri, Some(&state), None)
            .await?;

        let mut user_data = self.read_user(user_id).await?.unwrap_or_default();
        user_data.sign_in_state = Some(state);
        self.write_user(user_id, Some(user_data)).await?;

        tracing::debug!(user_id, provider, "connection initiated");
        Ok(response.url)
    }

    /// Complete a connection flow when the user returns with callback
    /// query parameters.
    ///
    /// Returns `false` when the user has no record or the presented
    /// state does not exactly match the stored one; replayed, forged,
    /// and stale callbacks are rejected without a token exchange. On a
    /// match, the sign-in code is exchanged for session tokens and the
    /// record becomes an established session.
    pub async fn handle_connection_callback(
        &self,
        user_id: &str,
        code: &str,
        state: &str,
    ) -> Result<bool> {
        let Some(user_data) = self.read_user(user_id).await? else {
            return Ok(false);
        };
        if state.is_empty() || user_data.sign_in_state.as_deref() != Some(state) {
            tracing::warn!(user_id, "connection callback state mismatch");
            return Ok(false);
        }

        self.refresh_user_data(user_id, &TokenGrant::AuthorizationCode(code.to_string()))
            .await?;
        Ok(true)
    }

    /// The user's connected providers.
    ///
    /// Served from the stored record while the session token is still
    /// valid, with no network call. An expired token is refreshed when a
    /// refresh token is on hand. A user with no session gets an empty
    /// list, never an error.
    pub async fn user_connections(&self, user_id: &str) -> Result<Vec<String>> {
        let user_data = self.read_user(user_id).await?;

        if let Some(data) = &user_data {
            if matches!(data.id_token_expiry, Some(expiry) if expiry > Utc::now()) {
                return Ok(data.connections.clone());
            }
        }
        if let Some(refresh_token) = user_data.and_then(|data| data.refresh_token) {
            let refreshed = self
                .refresh_user_data(user_id, &TokenGrant::RefreshToken(refresh_token))
                .await?;
            return Ok(refreshed.connections);
        }
        Ok(Vec::new())
    }

    /// The email claim of the user's id token, decoded **without
    /// signature verification**.
    ///
    /// A display convenience only: never treat the result as a verified
    /// identity or an authorization check.
    pub async fn user_email_unverified(&self, user_id: &str) -> Result<Option<String>> {
        let Some(user_data) = self.read_user(user_id).await? else {
            return Ok(None);
        };
        let Some(id_token) = user_data.id_token else {
            return Ok(None);
        };
        Ok(auth::unverified_email(&id_token)?)
    }

    /// Delete the user's session record.
    pub async fn clear_user(&self, user_id: &str) -> Result<()> {
        self.write_user(user_id, None).await
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    /// Search for chunks relevant to a semantic query on the user's
    /// behalf.
    ///
    /// Fails with [`MultiUserError::InvalidSession`] when no usable
    /// token can be produced for the user.
    pub async fn search_chunks(
        &self,
        user_id: &str,
        query: &str,
        count: u32,
        filters: Option<SearchFilters>,
    ) -> Result<Vec<RelevantChunk>> {
        let id_token = self.valid_id_token(user_id).await?;
        let query = Query::semantic(query);
        Ok(self
            .search
            .search_chunks(&id_token, &query, count, filters)
            .await?)
    }

    /// Fetch a document's chunks by URL or document name on the user's
    /// behalf.
    ///
    /// Fails with [`MultiUserError::InvalidSession`] when no usable
    /// token can be produced for the user.
    pub async fn get_document(
        &self,
        user_id: &str,
        reference: &str,
        filters: Option<SearchFilters>,
    ) -> Result<Vec<Chunk>> {
        let id_token = self.valid_id_token(user_id).await?;
        Ok(self.search.get_document(&id_token, reference, filters).await?)
    }

    // ------------------------------------------------------------------------
    // Token lifecycle
    // ------------------------------------------------------------------------

    /// Produce a valid bearer token for the user, refreshing the session
    /// if the stored token has expired.
    async fn valid_id_token(&self, user_id: &str) -> Result<String> {
        let Some(mut user_data) = self.read_user(user_id).await? else {
            return Err(MultiUserError::invalid_session(user_id));
        };
        let Some(refresh_token) = user_data.refresh_token.clone() else {
            return Err(MultiUserError::invalid_session(user_id));
        };

        if matches!(user_data.id_token_expiry, Some(expiry) if expiry < Utc::now()) {
            user_data = self
                .refresh_user_data(user_id, &TokenGrant::RefreshToken(refresh_token))
                .await?;
        }

        user_data
            .id_token
            .ok_or_else(|| MultiUserError::invalid_session(user_id))
    }

    /// Exchange a grant for fresh tokens and rebuild the user's record.
    ///
    /// The record is written only after both the token exchange and the
    /// connection listing succeed; a failure in either leaves the stored
    /// record untouched.
    async fn refresh_user_data(&self, user_id: &str, grant: &TokenGrant) -> Result<UserData> {
        let tokens = self.auth.exchange_tokens(grant).await?;
        let connections = self.auth.list_connections(&tokens.id_token).await?;

        let user_data = UserData {
            refresh_token: Some(tokens.refresh_token),
            id_token: Some(tokens.id_token),
            id_token_expiry: Some(
                Utc::now() + Duration::seconds(tokens.expires_in - EXPIRY_MARGIN_SECS),
            ),
            connections: connections.connections,
            sign_in_state: None,
        };
        self.write_user(user_id, Some(user_data.clone())).await?;

        tracing::debug!(user_id, "session tokens refreshed");
        Ok(user_data)
    }

    // ------------------------------------------------------------------------
    // Store access
    // ------------------------------------------------------------------------

    async fn read_user(&self, user_id: &str) -> Result<Option<UserData>> {
        self.store
            .read(user_id)
            .await
            .map_err(MultiUserError::Store)
    }

    async fn write_user(&self, user_id: &str, data: Option<UserData>) -> Result<()> {
        self.store
            .write(user_id, data)
            .await
            .map_err(MultiUserError::Store)
    }
}
