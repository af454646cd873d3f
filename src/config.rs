//! Connectivity configuration for the Quarry platform.
//!
//! Every client reaches the platform through one of a small set of named
//! connectivity modes, each mapping to a fixed HTTP base URL for the auth
//! service and a fixed host/port pair for the search RPC channel. The
//! mapping is a pure function resolved once at client construction.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while resolving client configuration.
///
/// All of these are raised eagerly at client construction, never at first
/// use.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The connectivity mode string is not recognized.
    #[error("unknown connection mode '{0}'")]
    UnknownMode(String),

    /// The connectivity mode is named but not yet served.
    #[error("connection mode '{0}' is coming soon and not yet supported")]
    UnsupportedMode(ConnectionMode),

    /// A host was supplied without a port, or a port without a host.
    #[error("host and port must be specified together")]
    PartialEndpoint,
}

// ============================================================================
// ConnectionMode
// ============================================================================

/// How the client reaches the Quarry platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    /// Public internet endpoints.
    #[default]
    Internet,
    /// AWS PrivateLink endpoints.
    AwsPrivateLink,
    /// Azure Private Link endpoints.
    AzurePrivateLink,
    /// GCP Private Service Connect endpoints.
    GcpPrivateServiceConnect,
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionMode::Internet => "internet",
            ConnectionMode::AwsPrivateLink => "awsprivatelink",
            ConnectionMode::AzurePrivateLink => "azureprivatelink",
            ConnectionMode::GcpPrivateServiceConnect => "gcpprivateserviceconnect",
        };
        f.write_str(name)
    }
}

impl FromStr for ConnectionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "internet" => Ok(ConnectionMode::Internet),
            "awsprivatelink" => Ok(ConnectionMode::AwsPrivateLink),
            "azureprivatelink" => Ok(ConnectionMode::AzurePrivateLink),
            "gcpprivateserviceconnect" => Ok(ConnectionMode::GcpPrivateServiceConnect),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

// ============================================================================
// Endpoints
// ============================================================================

/// Fixed endpoints for one connectivity mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Base URL of the auth service.
    pub http_base_url: String,
    /// Hostname of the search RPC service.
    pub grpc_host: String,
    /// Port of the search RPC service.
    pub grpc_port: u16,
}

impl ConnectionMode {
    /// Resolve the fixed endpoints for this mode.
    ///
    /// Private-link variants without a serving region yet are a
    /// configuration error rather than a silent fallback.
    pub fn endpoints(self) -> Result<Endpoints, ConfigError> {
        match self {
            ConnectionMode::Internet => Ok(Endpoints {
                http_base_url: "https://api.quarry.ai".to_string(),
                grpc_host: "grpc.quarry.ai".to_string(),
                grpc_port: 443,
            }),
            ConnectionMode::AwsPrivateLink => Ok(Endpoints {
                http_base_url: "https://awsprivatelink.quarry.app".to_string(),
                grpc_host: "awsprivatelink.quarry.app".to_string(),
                grpc_port: 50443,
            }),
            mode => Err(ConfigError::UnsupportedMode(mode)),
        }
    }
}

/// Resolve an optional RPC host/port override pair against a mode's
/// defaults. Overrides must come as a pair.
pub(crate) fn resolve_grpc_endpoint(
    mode: ConnectionMode,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(String, u16), ConfigError> {
    match (host, port) {
        (Some(host), Some(port)) => Ok((host, port)),
        (None, None) => {
            let endpoints = mode.endpoints()?;
            Ok((endpoints.grpc_host, endpoints.grpc_port))
        }
        _ => Err(ConfigError::PartialEndpoint),
    }
}

// ============================================================================
// Tests
// ============================================================================
