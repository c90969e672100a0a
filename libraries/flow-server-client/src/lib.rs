//! FlowPlayer Mix Service Client
//!
//! HTTP client library for the remote Mix service: account registration,
//! login, and CRUD over a user's Mixes and their items.
//!
//! # Features
//!
//! - **Authentication**: Register, login with email/password, bearer token storage
//! - **Mixes**: List, create, rename/retag and delete Mixes
//! - **Mix items**: Add and remove the titles a Mix references
//!
//! # Example
//!
//! ```ignore
//! use flow_core::{FlowKey, MediaKind};
//! use flow_server_client::{FlowServerClient, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FlowServerClient::new(ServerConfig::new("http://localhost:8000"))?;
//!     client.login("ana@example.com", "secret1").await?;
//!
//!     let handle = client.mixes().await?;
//!     let mix = handle.client().create_mix("Night drive", FlowKey::Purple).await?;
//!     handle.client().add_item(mix.id, "Intro.mp3", MediaKind::Audio).await?;
//!
//!     for mix in handle.client().list_mixes().await? {
//!         println!("{} ({}): {} items", mix.name, mix.flow, mix.items.len());
//!     }
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod error;
mod mixes;
mod response;
mod types;

pub use client::{FlowServerClient, MixClientHandle};
pub use error::{Result, ServerClientError};
pub use types::{Mix, MixItem, ServerConfig, TokenResponse, UserInfo, DEFAULT_SERVER_URL};

pub use auth::AuthClient;
pub use mixes::MixClient;
