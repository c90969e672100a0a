/// Application error types
use flow_playback::PlaybackError;
use flow_server_client::ServerClientError;
use flow_storage::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Catalog error: {0}")]
    Storage(#[from] StorageError),

    #[error("Mix service error: {0}")]
    Server(#[from] ServerClientError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Message shown on the terminal when a command fails
    pub fn user_message(&self) -> String {
        match self {
            AppError::Server(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
