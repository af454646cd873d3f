//! Quarry - Rust client SDK for the Quarry semantic-search platform.
//!
//! Three collaborating clients:
//!
//! - [`auth::AuthClient`] talks to the auth service: it begins provider
//!   connections, exchanges authorization codes and refresh tokens for
//!   session tokens, and lists a user's active provider connections.
//! - [`search::SearchClient`] queries indexed content chunks over the
//!   platform's encrypted RPC channel.
//! - [`multi_user::MultiUserClient`] composes both to manage per-user
//!   sessions for applications serving many end users, persisting session
//!   records through an application-supplied [`multi_user::UserDataStore`].

// ============================================================================
// Configuration
// ============================================================================

pub mod config;

// ============================================================================
// Service clients
// ============================================================================

pub mod auth;
pub mod search;

// ============================================================================
// Multi-user orchestration
// ============================================================================

pub mod multi_user;

pub use config::{ConfigError, ConnectionMode, Endpoints};
pub use multi_user::{MultiUserClient, MultiUserClientOptions, UserData};
