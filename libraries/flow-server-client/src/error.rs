//! Error types for the Mix service client.

use thiserror::Error;

/// Errors that can occur when talking to the Mix service.
#[derive(Error, Debug)]
pub enum ServerClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// No access token stored
    #[error("Authentication required")]
    AuthRequired,

    /// The stored access token was rejected
    #[error("Session expired: {0}")]
    AuthExpired(String),

    /// Login or registration was rejected
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),
}

impl ServerClientError {
    /// Whether the caller has to log in (again) before retrying
    pub fn needs_login(&self) -> bool {
        matches!(self, Self::AuthRequired | Self::AuthExpired(_))
    }

    /// Whether the failure was the network rather than the server
    pub fn is_network(&self) -> bool {
        match self {
            Self::ServerUnreachable(_) => true,
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRequired => "You are not logged in. Log in to manage your mixes.".to_string(),
            Self::AuthExpired(_) => "Your session has expired. Log in again.".to_string(),
            Self::AuthFailed(message) => message.clone(),
            Self::ServerError { status, message } if message.is_empty() => {
                format!("The server returned an error ({status}).")
            }
            Self::ServerError { message, .. } => message.clone(),
            e if e.is_network() => {
                "Could not reach the server. Check your connection and the server URL, then try again."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Result type for Mix service operations.
pub type Result<T> = std::result::Result<T, ServerClientError>;
