/// Application configuration
use crate::error::{AppError, Result};
use flow_playback::PlaybackConfig;
use flow_server_client::DEFAULT_SERVER_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "flowplayer.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlowConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_server_url")]
    pub url: String,

    /// Access token; takes precedence over `token_file`
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_finish_delay_ms")]
    pub finish_delay_ms: u64,

    #[serde(default = "default_controls_hide_delay_ms")]
    pub controls_hide_delay_ms: u64,

    #[serde(default = "default_restart_threshold_ms")]
    pub restart_threshold_ms: u64,

    #[serde(default)]
    pub shuffle: bool,

    #[serde(default)]
    pub repeat: bool,

    #[serde(default)]
    pub shuffle_seed: Option<u64>,

    /// How many times faster than real time the simulated engine runs
    #[serde(default = "default_clock_speed")]
    pub clock_speed: f32,
}

impl PlaybackSettings {
    /// Session configuration handed to the sequencer
    pub fn session_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            finish_delay_ms: self.finish_delay_ms,
            controls_hide_delay_ms: self.controls_hide_delay_ms,
            restart_threshold_ms: self.restart_threshold_ms,
            shuffle: self.shuffle,
            repeat: self.repeat,
            shuffle_seed: self.shuffle_seed,
        }
    }
}

impl FlowConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `flowplayer.toml` is read
    /// when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_sources(path, None)
    }

    /// Load configuration, reading environment variables from `env` instead
    /// of the process environment when given
    pub fn from_sources(path: Option<&Path>, env: Option<config::Map<String, String>>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (FLOW_SERVER__URL, FLOW_PLAYBACK__CLOCK_SPEED, ...)
        settings = settings.add_source(
            config::Environment::with_prefix("FLOW")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = settings
            .build()
            .and_then(config::Config::try_deserialize::<Self>)
            .map_err(|e| AppError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.server.url.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "server.url must start with http:// or https:// (got {:?})",
                self.server.url
            )));
        }

        if !self.storage.database_url.starts_with("sqlite:") {
            return Err(AppError::Config(format!(
                "storage.database_url must be a sqlite: URL (got {:?})",
                self.storage.database_url
            )));
        }

        let speed = self.playback.clock_speed;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(AppError::Config(format!(
                "playback.clock_speed must be positive (got {})",
                speed
            )));
        }

        if self.playback.controls_hide_delay_ms == 0 {
            return Err(AppError::Config(
                "playback.controls_hide_delay_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        url: default_server_url(),
        token: None,
        token_file: default_token_file(),
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_token_file() -> PathBuf {
    PathBuf::from("flowplayer.token")
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
    }
}

fn default_database_url() -> String {
    "sqlite://flowplayer.db".to_string()
}

fn default_playback() -> PlaybackSettings {
    let session = PlaybackConfig::default();
    PlaybackSettings {
        finish_delay_ms: session.finish_delay_ms,
        controls_hide_delay_ms: session.controls_hide_delay_ms,
        restart_threshold_ms: session.restart_threshold_ms,
        shuffle: session.shuffle,
        repeat: session.repeat,
        shuffle_seed: session.shuffle_seed,
        clock_speed: default_clock_speed(),
    }
}

fn default_finish_delay_ms() -> u64 {
    PlaybackConfig::default().finish_delay_ms
}

fn default_controls_hide_delay_ms() -> u64 {
    PlaybackConfig::default().controls_hide_delay_ms
}

fn default_restart_threshold_ms() -> u64 {
    PlaybackConfig::default().restart_threshold_ms
}

fn default_clock_speed() -> f32 {
    1.0
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            playback: default_playback(),
        }
    }
}
