//! Main Mix service client.

use crate::auth::AuthClient;
use crate::error::{Result, ServerClientError};
use crate::mixes::MixClient;
use crate::types::{ServerConfig, TokenResponse, UserInfo};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

/// Main client for interacting with the Mix service.
///
/// The client owns the access token; Mix operations go through a
/// [`MixClientHandle`] obtained from [`FlowServerClient::mixes`].
pub struct FlowServerClient {
    http: Client,
    config: Arc<RwLock<ServerConfig>>,
}

impl FlowServerClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(ServerClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ServerClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let normalized_config = ServerConfig {
            url,
            access_token: config.access_token,
        };

        // Slow free-tier hosts can take a while to wake up
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("FlowPlayer/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ServerClientError::Request)?;

        Ok(Self {
            http,
            config: Arc::new(RwLock::new(normalized_config)),
        })
    }

    /// Get the server URL.
    pub async fn url(&self) -> String {
        self.config.read().await.url.clone()
    }

    /// Check if the client has an access token.
    pub async fn is_authenticated(&self) -> bool {
        self.config.read().await.access_token.is_some()
    }

    /// Get the current access token.
    pub async fn token(&self) -> Option<String> {
        self.config.read().await.access_token.clone()
    }

    /// Login with email and password.
    ///
    /// On success, the access token is stored for subsequent requests.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let url = self.url().await;

        let auth_client = AuthClient::new(&self.http, &url);
        let response = auth_client.login(email, password).await?;

        self.config.write().await.access_token = Some(response.access_token.clone());

        Ok(response)
    }

    /// Register a new account.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<UserInfo> {
        let url = self.url().await;
        AuthClient::new(&self.http, &url)
            .register(name, email, password)
            .await
    }

    /// Set the token directly (e.g., from stored credentials).
    pub async fn set_token(&self, access_token: impl Into<String>) {
        self.config.write().await.access_token = Some(access_token.into());
    }

    /// Clear the stored token (logout).
    pub async fn logout(&self) {
        self.config.write().await.access_token = None;
        info!("Logged out");
    }

    /// Get a handle for Mix operations.
    ///
    /// Returns an error if not authenticated.
    pub async fn mixes(&self) -> Result<MixClientHandle> {
        let config = self.config.read().await;
        let access_token = config
            .access_token
            .clone()
            .ok_or(ServerClientError::AuthRequired)?;
        let url = config.url.clone();
        drop(config);

        Ok(MixClientHandle {
            http: self.http.clone(),
            url,
            access_token,
        })
    }
}

/// Handle for Mix operations.
///
/// Returned by `FlowServerClient::mixes()`; holds a snapshot of the token
/// taken when it was created.
pub struct MixClientHandle {
    http: Client,
    url: String,
    access_token: String,
}

impl MixClientHandle {
    /// Get the Mix client.
    pub fn client(&self) -> MixClient<'_> {
        MixClient::new(&self.http, &self.url, &self.access_token)
    }
}
