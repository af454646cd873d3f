//! Common test doubles for orchestrator tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use tokio::sync::Mutex;

use quarry::auth::{
    AuthError, AuthGateway, BeginConnection, ExchangeTokens, TokenGrant, UserConnections,
};
use quarry::search::{
    Chunk, Query, RelevantChunk, SearchError, SearchFilters, SearchGateway,
};

/// Build a syntactically valid JWT with the given email claim and a
/// throwaway signature.
pub fn test_jwt(email: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"email":"{email}"}}"#));
    let signature = URL_SAFE_NO_PAD.encode(b"signature");
    format!("{header}.{payload}.{signature}")
}

// ============================================================================
// FakeAuthGateway
// ============================================================================

/// Auth gateway double that records calls and serves canned responses.
pub struct FakeAuthGateway {
    pub begin_calls: AtomicUsize,
    pub exchange_calls: Mutex<Vec<TokenGrant>>,
    pub list_calls: Mutex<Vec<String>>,
    pub tokens: ExchangeTokens,
    pub connections: Vec<String>,
}

impl FakeAuthGateway {
    pub fn new() -> Self {
        Self {
            begin_calls: AtomicUsize::new(0),
            exchange_calls: Mutex::new(Vec::new()),
            list_calls: Mutex::new(Vec::new()),
            tokens: ExchangeTokens {
                id_token: test_jwt("person@example.com"),
                refresh_token: "refresh-new".to_string(),
                expires_in: 3600,
            },
            connections: vec!["confluence".to_string(), "slack".to_string()],
        }
    }

    pub fn exchange_count(&self) -> usize {
        self.exchange_calls.try_lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

#[async_trait]
impl AuthGateway for FakeAuthGateway {
    async fn begin_connection(
        &self,
        provider: &str,
        _redirect_uri: &str,
        state: Option<&str>,
        _endpoint: Option<&str>,
    ) -> Result<BeginConnection, AuthError> {
        self.begin_calls.fetch_add(1, Ordering::SeqCst);
        Ok(BeginConnection {
            url: format!(
                "https://auth.example.com/connect/{provider}?state={}",
                state.unwrap_or("")
            ),
        })
    }

    async fn exchange_tokens(&self, grant: &TokenGrant) -> Result<ExchangeTokens, AuthError> {
        self.exchange_calls.lock().await.push(grant.clone());
        Ok(self.tokens.clone())
    }

    async fn list_connections(&self, id_token: &str) -> Result<UserConnections, AuthError> {
        self.list_calls.lock().await.push(id_token.to_string());
        Ok(UserConnections {
            user_id: "quarry-user-1".to_string(),
            connections: self.connections.clone(),
        })
    }
}

// ============================================================================
// FakeSearchGateway
// ============================================================================

/// Search gateway double that records the bearer tokens presented.
pub struct FakeSearchGateway {
    pub search_calls: Mutex<Vec<String>>,
    pub document_calls: Mutex<Vec<String>>,
}

impl FakeSearchGateway {
    pub fn new() -> Self {
        Self {
            search_calls: Mutex::new(Vec::new()),
            document_calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SearchGateway for FakeSearchGateway {
    async fn search_chunks(
        &self,
        id_token: &str,
        _query: &Query,
        count: u32,
        _filters: Option<SearchFilters>,
    ) -> Result<Vec<RelevantChunk>, SearchError> {
        self.search_calls.lock().await.push(id_token.to_string());
        Ok((0..count)
            .map(|index| RelevantChunk {
                chunk_body: format!("chunk {index}"),
                similarity_score: 1.0 - index as f32 * 0.1,
                ..RelevantChunk::default()
            })
            .collect())
    }

    async fn get_document(
        &self,
        id_token: &str,
        reference: &str,
        _filters: Option<SearchFilters>,
    ) -> Result<Vec<Chunk>, SearchError> {
        self.document_calls.lock().await.push(id_token.to_string());
        Ok(vec![Chunk {
            chunk_body: format!("document {reference}"),
            ..Chunk::default()
        }])
    }
}
