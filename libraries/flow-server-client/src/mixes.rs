//! Mix CRUD operations for the Mix service.

use crate::error::{Result, ServerClientError};
use crate::response::{error_message, parse_json, send_error, server_error};
use crate::types::{Mix, MixItem, MixRequest, NewItemRequest};
use flow_core::{FlowKey, MediaKind};
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, info, warn};

/// Mix client for the Mix service.
///
/// Every call carries the bearer token the handle was created with.
pub struct MixClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    access_token: &'a str,
}

impl<'a> MixClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, access_token: &'a str) -> Self {
        Self {
            http,
            base_url,
            access_token,
        }
    }

    /// List the current user's Mixes with their items.
    pub async fn list_mixes(&self) -> Result<Vec<Mix>> {
        let url = format!("{}/mixes", self.base_url);
        debug!(url = %url, "Fetching mixes");

        let response = self.send(self.http.get(&url)).await?;
        let mixes: Vec<Mix> = parse_json(response, "mix list").await?;

        debug!(count = mixes.len(), "Fetched mixes");
        Ok(mixes)
    }

    /// Create an empty Mix.
    pub async fn create_mix(&self, name: &str, flow: FlowKey) -> Result<Mix> {
        let url = format!("{}/mixes", self.base_url);
        debug!(url = %url, name = %name, flow = %flow, "Creating mix");

        let body = MixRequest { name, flow };
        let response = self.send(self.http.post(&url).json(&body)).await?;
        let mix: Mix = parse_json(response, "mix").await?;

        info!(mix_id = mix.id, name = %mix.name, "Mix created");
        Ok(mix)
    }

    /// Rename a Mix and/or change its Flow.
    pub async fn update_mix(&self, id: i64, name: &str, flow: FlowKey) -> Result<Mix> {
        let url = format!("{}/mixes/{}", self.base_url, id);
        debug!(url = %url, mix_id = id, "Updating mix");

        let body = MixRequest { name, flow };
        let response = self.send(self.http.put(&url).json(&body)).await?;
        parse_json(response, "mix").await
    }

    /// Delete a Mix and its items.
    pub async fn delete_mix(&self, id: i64) -> Result<()> {
        let url = format!("{}/mixes/{}", self.base_url, id);
        debug!(url = %url, mix_id = id, "Deleting mix");

        self.send(self.http.delete(&url)).await?;
        info!(mix_id = id, "Mix deleted");
        Ok(())
    }

    /// Reference a title from a Mix.
    pub async fn add_item(&self, mix_id: i64, title: &str, kind: MediaKind) -> Result<MixItem> {
        let url = format!("{}/mixes/{}/items", self.base_url, mix_id);
        debug!(url = %url, mix_id, title = %title, kind = %kind, "Adding mix item");

        let body = NewItemRequest { title, kind };
        let response = self.send(self.http.post(&url).json(&body)).await?;
        parse_json(response, "mix item").await
    }

    /// Drop an item from a Mix.
    pub async fn remove_item(&self, mix_id: i64, item_id: i64) -> Result<()> {
        let url = format!("{}/mixes/{}/items/{}", self.base_url, mix_id, item_id);
        debug!(url = %url, mix_id, item_id, "Removing mix item");

        self.send(self.http.delete(&url)).await?;
        Ok(())
    }

    /// Attach the token, send, and turn non-success statuses into errors.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .bearer_auth(self.access_token)
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else if status.as_u16() == 401 {
            let message = error_message(response).await;
            warn!(error = %message, "Access token rejected");
            Err(ServerClientError::AuthExpired(message))
        } else {
            Err(server_error(response).await)
        }
    }
}
