//! Error types for playback sequencing

use thiserror::Error;

/// Sequencer errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Playlist has no entries
    #[error("Playlist is empty")]
    EmptyPlaylist,

    /// Index out of bounds
    #[error("Index out of bounds: {index} (playlist has {len} entries)")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Playlist length
        len: usize,
    },

    /// Media engine error
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// The session was closed and accepts no further commands
    #[error("Playback session closed")]
    SessionClosed,
}

/// Errors reported by a media engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The media location does not exist
    #[error("Media not found: {0}")]
    NotFound(String),

    /// The platform refused access to the media location
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The engine cannot open this kind of location or format
    #[error("Unsupported media: {0}")]
    Unsupported(String),

    /// Command issued before the engine finished loading
    #[error("Engine not ready")]
    NotReady,

    /// Command issued after the engine was released
    #[error("Engine released")]
    Released,

    /// Any other engine failure
    #[error("{0}")]
    Other(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
