/// Media entries stored in the local catalog
use crate::error::FlowError;
use crate::types::FlowKey;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "wav", "aac", "ogg", "flac"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// Whether an entry is rendered by the audio or the video engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Audio-only file
    Audio,
    /// Video file
    Video,
}

impl MediaKind {
    /// Storage/wire representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }

    /// Classify a file by its extension
    ///
    /// Returns `None` for extensions neither engine can play.
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        if AUDIO_EXTENSIONS.contains(&extension.as_str()) {
            Some(Self::Audio)
        } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
            Some(Self::Video)
        } else {
            None
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            _ => Err(FlowError::UnknownMediaKind(s.to_string())),
        }
    }
}

/// A media file registered in the local catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEntry {
    /// Catalog row ID
    pub id: i64,
    /// Location handed to the media engine
    pub uri: String,
    /// Display title
    pub title: String,
    /// Audio or video
    pub kind: MediaKind,
    /// Flow the entry is tagged with
    pub flow: FlowKey,
    /// Duration in milliseconds, when known
    pub duration_ms: Option<u64>,
}

impl MediaEntry {
    /// Platform content-provider URIs the video engine cannot open directly
    #[must_use]
    pub fn is_content_uri(&self) -> bool {
        self.uri.starts_with("content://")
    }
}

/// A media file about to be inserted into the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMediaEntry {
    /// Location handed to the media engine
    pub uri: String,
    /// Display title
    pub title: String,
    /// Audio or video
    pub kind: MediaKind,
    /// Flow the entry is tagged with
    pub flow: FlowKey,
    /// Duration in milliseconds, when known
    pub duration_ms: Option<u64>,
}

impl NewMediaEntry {
    /// Build an entry from a local file path, titled after its file name
    ///
    /// # Errors
    ///
    /// Returns `FlowError::InvalidInput` when the extension is not a
    /// supported audio or video format.
    pub fn from_path(path: &Path, flow: FlowKey) -> Result<Self, FlowError> {
        let title = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| "Untitled".to_string());

        let kind = MediaKind::from_file_name(&title).ok_or_else(|| {
            FlowError::invalid_input(format!("unsupported media type: {}", title))
        })?;

        Ok(Self {
            uri: path.to_string_lossy().into_owned(),
            title,
            kind,
            flow,
            duration_ms: None,
        })
    }
}
