//! Core types for playback sequencing

use crate::error::EngineError;
use flow_core::{FlowKey, MediaEntry, MediaKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One playable item in a session playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    /// Location handed to the media engine
    pub uri: String,

    /// Display title
    pub title: String,

    /// Selects which engine renders the entry
    pub kind: MediaKind,

    /// Flow the entry belongs to
    pub flow: FlowKey,

    /// Known duration in milliseconds, if any
    pub duration_ms: Option<u64>,
}

impl From<MediaEntry> for PlaylistEntry {
    fn from(entry: MediaEntry) -> Self {
        Self {
            uri: entry.uri,
            title: entry.title,
            kind: entry.kind,
            flow: entry.flow,
            duration_ms: entry.duration_ms,
        }
    }
}

impl From<&MediaEntry> for PlaylistEntry {
    fn from(entry: &MediaEntry) -> Self {
        entry.clone().into()
    }
}

/// Shuffle and repeat flags, independent of each other
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackMode {
    /// Pick the next entry randomly among unplayed ones
    pub shuffle: bool,

    /// Replay the current entry when it finishes
    pub repeat: bool,
}

/// Sequencer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// No engine active
    Idle,

    /// Engine created, waiting for readiness
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-entry
    Paused,

    /// Last load failed, waiting for the user to dismiss or skip
    Error,
}

/// Playback configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Delay between a finish notification and advancing (default: 100ms)
    pub finish_delay_ms: u64,

    /// Inactivity delay before controls hide while playing (default: 2500ms)
    pub controls_hide_delay_ms: u64,

    /// Position past which "previous" restarts the entry (default: 3000ms)
    pub restart_threshold_ms: u64,

    /// Initial shuffle flag (default: false)
    pub shuffle: bool,

    /// Initial repeat flag (default: false)
    pub repeat: bool,

    /// Fixed shuffle seed for reproducible sessions
    pub shuffle_seed: Option<u64>,
}

impl PlaybackConfig {
    /// Finish delay as a `Duration`
    pub fn finish_delay(&self) -> Duration {
        Duration::from_millis(self.finish_delay_ms)
    }

    /// Controls auto-hide delay as a `Duration`
    pub fn controls_hide_delay(&self) -> Duration {
        Duration::from_millis(self.controls_hide_delay_ms)
    }

    /// Restart threshold for "previous" as a `Duration`
    pub fn restart_threshold(&self) -> Duration {
        Duration::from_millis(self.restart_threshold_ms)
    }

    /// Initial mode flags
    pub fn initial_mode(&self) -> PlaybackMode {
        PlaybackMode {
            shuffle: self.shuffle,
            repeat: self.repeat,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            finish_delay_ms: 100,
            controls_hide_delay_ms: 2500,
            restart_threshold_ms: 3000,
            shuffle: false,
            repeat: false,
            shuffle_seed: None,
        }
    }
}

/// Category of a load failure, used to pick the user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadErrorKind {
    /// File missing or source could not be read
    NotFound,

    /// Platform refused access
    PermissionDenied,

    /// Document-provider location that cannot be opened directly
    Inaccessible,

    /// Format or location the engine cannot play
    Unsupported,

    /// Anything else
    Other,
}

impl LoadErrorKind {
    /// Classify a free-form engine failure reason
    pub fn classify(reason: &str) -> Self {
        let lower = reason.to_ascii_lowercase();
        if lower.contains("documentsprovider") || lower.contains("document provider") {
            Self::Inaccessible
        } else if lower.contains("permission") || lower.contains("securityexception") {
            Self::PermissionDenied
        } else if lower.contains("source error")
            || lower.contains("not found")
            || lower.contains("no such file")
        {
            Self::NotFound
        } else if lower.contains("unsupported") {
            Self::Unsupported
        } else {
            Self::Other
        }
    }
}

/// Choices offered to the user when a load fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryAction {
    /// Acknowledge and stay on the failed entry
    Dismiss,

    /// Skip to the next entry
    SkipToNext,
}

/// Failure to load the entry at `index`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFailure {
    /// Playlist index of the entry that failed
    pub index: usize,

    /// Failure category
    pub kind: LoadErrorKind,

    /// Raw engine reason, for logs
    pub reason: String,
}

impl LoadFailure {
    /// Build a failure from an engine error
    pub fn from_engine_error(index: usize, error: &EngineError) -> Self {
        let kind = match error {
            EngineError::NotFound(_) => LoadErrorKind::NotFound,
            EngineError::PermissionDenied(_) => LoadErrorKind::PermissionDenied,
            EngineError::Unsupported(_) => LoadErrorKind::Unsupported,
            EngineError::NotReady | EngineError::Released => LoadErrorKind::Other,
            EngineError::Other(reason) => LoadErrorKind::classify(reason),
        };

        Self {
            index,
            kind,
            reason: error.to_string(),
        }
    }

    /// Short title for an error dialog
    pub fn title(&self) -> &'static str {
        match self.kind {
            LoadErrorKind::NotFound => "File Not Found",
            LoadErrorKind::PermissionDenied => "Permission Error",
            LoadErrorKind::Inaccessible => "Media Inaccessible",
            LoadErrorKind::Unsupported => "Unsupported Media",
            LoadErrorKind::Other => "Playback Error",
        }
    }

    /// Human-readable explanation for an error dialog
    pub fn message(&self) -> &'static str {
        match self.kind {
            LoadErrorKind::NotFound => {
                "The media file was not found. It may have been moved or deleted."
            }
            LoadErrorKind::PermissionDenied => {
                "There is no permission to access this file. Try selecting it again."
            }
            LoadErrorKind::Inaccessible => {
                "This file cannot be opened directly. Select it again or pick another file."
            }
            LoadErrorKind::Unsupported => "This file format or location cannot be played.",
            LoadErrorKind::Other => "This media could not be played. Check that the file exists.",
        }
    }

    /// Actions the user can take
    pub fn recovery_actions(&self) -> &'static [RecoveryAction] {
        &[RecoveryAction::Dismiss, RecoveryAction::SkipToNext]
    }
}

/// Point-in-time view of a session, for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Index of the current entry
    pub current_index: usize,

    /// The current entry
    pub entry: PlaylistEntry,

    /// Number of entries in the playlist
    pub playlist_len: usize,

    /// Sequencer state
    pub state: PlayerState,

    /// Shuffle and repeat flags
    pub mode: PlaybackMode,

    /// Playback position in milliseconds
    pub position_ms: u64,

    /// Duration in milliseconds, once known
    pub duration_ms: Option<u64>,

    /// Current playback rate multiplier
    pub playback_rate: f32,

    /// Whether on-screen controls are shown
    pub controls_visible: bool,

    /// Indices played under shuffle, in order
    pub play_history: Vec<usize>,

    /// Pending load failure, when in the error state
    pub failure: Option<LoadFailure>,
}
