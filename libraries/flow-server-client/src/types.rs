//! Types for Mix service requests and responses.

use flow_core::{FlowKey, MediaKind};
use serde::{Deserialize, Serialize};

/// Base URL used when no server is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Configuration for connecting to a Mix service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URL of the server (e.g., "http://localhost:8000")
    pub url: String,
    /// Current access token (if authenticated)
    pub access_token: Option<String>,
}

impl ServerConfig {
    /// Create a new server config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: None,
        }
    }

    /// Create a config with a previously issued token.
    pub fn with_token(url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: Some(access_token.into()),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}

// =============================================================================
// Authentication Types
// =============================================================================

/// Form body for the token endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct LoginForm<'a> {
    /// The service logs users in by email, sent as `username`
    pub username: &'a str,
    pub password: &'a str,
}

/// Request body for account registration.
#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    #[serde(rename = "nome")]
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Account returned by registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
}

// =============================================================================
// Mix Types
// =============================================================================

/// A named, Flow-tagged collection stored on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mix {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "flow_cor_base")]
    pub flow: FlowKey,
    #[serde(default)]
    pub items: Vec<MixItem>,
}

/// A title referenced by a Mix.
///
/// Items carry no URI; they only name media the user has locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixItem {
    pub id: i64,
    #[serde(rename = "media_titulo")]
    pub title: String,
    #[serde(rename = "media_tipo")]
    pub kind: MediaKind,
}

/// Request body for creating or updating a Mix.
#[derive(Debug, Serialize)]
pub(crate) struct MixRequest<'a> {
    #[serde(rename = "nome")]
    pub name: &'a str,
    #[serde(rename = "flow_cor_base")]
    pub flow: FlowKey,
}

/// Request body for adding an item to a Mix.
#[derive(Debug, Serialize)]
pub(crate) struct NewItemRequest<'a> {
    #[serde(rename = "media_titulo")]
    pub title: &'a str,
    #[serde(rename = "media_tipo")]
    pub kind: MediaKind,
}
