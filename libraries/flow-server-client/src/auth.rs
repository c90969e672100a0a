//! Authentication methods for the Mix service.

use crate::error::{Result, ServerClientError};
use crate::response::{error_message, parse_json, send_error, server_error};
use crate::types::{LoginForm, RegisterRequest, TokenResponse, UserInfo};
use reqwest::Client;
use tracing::{debug, info, warn};

/// Authentication client for the Mix service.
pub struct AuthClient<'a> {
    http: &'a Client,
    base_url: &'a str,
}

impl<'a> AuthClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str) -> Self {
        Self { http, base_url }
    }

    /// Exchange email and password for an access token.
    ///
    /// The token endpoint expects an OAuth2 password form, not JSON.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let url = format!("{}/auth/token", self.base_url);
        debug!(url = %url, email = %email, "Attempting login");

        let form = LoginForm {
            username: email,
            password,
        };

        let response = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();

        if status.is_success() {
            let token: TokenResponse = parse_json(response, "login").await?;
            info!(email = %email, "Login successful");
            Ok(token)
        } else if status.as_u16() == 401 {
            let message = error_message(response).await;
            warn!(status = %status, error = %message, "Login failed: invalid credentials");
            Err(ServerClientError::AuthFailed(if message.is_empty() {
                "Invalid email or password".to_string()
            } else {
                message
            }))
        } else {
            Err(server_error(response).await)
        }
    }

    /// Create an account.
    ///
    /// Registration does not log the user in.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<UserInfo> {
        let url = format!("{}/auth/registar", self.base_url);
        debug!(url = %url, email = %email, "Registering account");

        let request = RegisterRequest {
            name,
            email,
            password,
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();

        if status.is_success() {
            let user: UserInfo = parse_json(response, "registration").await?;
            info!(user_id = user.id, email = %user.email, "Account registered");
            Ok(user)
        } else if status.as_u16() == 400 {
            // Duplicate email and similar rejections come back as 400 with a detail
            let message = error_message(response).await;
            warn!(error = %message, "Registration rejected");
            Err(ServerClientError::AuthFailed(message))
        } else {
            Err(server_error(response).await)
        }
    }
}
