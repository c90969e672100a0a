//! Configuration loading tests
//!
//! Environment overrides are passed as explicit maps so tests never depend
//! on (or mutate) the process environment.

use flowplayer::{AppError, FlowConfig};
use std::path::PathBuf;
use tempfile::TempDir;

fn env(pairs: &[(&str, &str)]) -> config::Map<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flowplayer.toml");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn test_defaults_without_file_or_env() {
    let config = FlowConfig::from_sources(None, Some(env(&[]))).unwrap();

    assert_eq!(config.server.url, "http://localhost:8000");
    assert!(config.server.token.is_none());
    assert_eq!(config.server.token_file, PathBuf::from("flowplayer.token"));
    assert_eq!(config.storage.database_url, "sqlite://flowplayer.db");
    assert_eq!(config.playback.finish_delay_ms, 100);
    assert_eq!(config.playback.controls_hide_delay_ms, 2500);
    assert_eq!(config.playback.restart_threshold_ms, 3000);
    assert_eq!(config.playback.clock_speed, 1.0);
}

#[test]
fn test_file_values_are_read() {
    let (_dir, path) = write_config(
        r#"
[server]
url = "https://mixes.example.com"

[storage]
database_url = "sqlite:///tmp/flows.db"

[playback]
shuffle = true
shuffle_seed = 99
clock_speed = 20.0
"#,
    );

    let config = FlowConfig::from_sources(Some(&path), Some(env(&[]))).unwrap();

    assert_eq!(config.server.url, "https://mixes.example.com");
    assert_eq!(config.storage.database_url, "sqlite:///tmp/flows.db");
    assert!(config.playback.shuffle);
    assert_eq!(config.playback.shuffle_seed, Some(99));
    assert_eq!(config.playback.clock_speed, 20.0);
    // Unset fields keep their defaults
    assert_eq!(config.playback.finish_delay_ms, 100);
}

#[test]
fn test_environment_overrides_file() {
    let (_dir, path) = write_config(
        r#"
[server]
url = "https://mixes.example.com"

[playback]
repeat = false
"#,
    );

    let config = FlowConfig::from_sources(
        Some(&path),
        Some(env(&[
            ("FLOW_SERVER__URL", "http://127.0.0.1:9000"),
            ("FLOW_SERVER__TOKEN", "from-env"),
            ("FLOW_PLAYBACK__REPEAT", "true"),
            ("FLOW_PLAYBACK__CONTROLS_HIDE_DELAY_MS", "4000"),
        ])),
    )
    .unwrap();

    assert_eq!(config.server.url, "http://127.0.0.1:9000");
    assert_eq!(config.server.token.as_deref(), Some("from-env"));
    assert!(config.playback.repeat);
    assert_eq!(config.playback.controls_hide_delay_ms, 4000);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.toml");

    match FlowConfig::from_sources(Some(&path), Some(env(&[]))) {
        Err(AppError::Config(msg)) => assert!(msg.contains("not found")),
        other => panic!("Expected Config error, got: {:?}", other),
    }
}

#[test]
fn test_invalid_values_are_rejected() {
    let bad_speed = FlowConfig::from_sources(None, Some(env(&[("FLOW_PLAYBACK__CLOCK_SPEED", "0")])));
    assert!(matches!(bad_speed, Err(AppError::Config(_))));

    let bad_url = FlowConfig::from_sources(None, Some(env(&[("FLOW_SERVER__URL", "mixes.example.com")])));
    assert!(matches!(bad_url, Err(AppError::Config(_))));

    let bad_db = FlowConfig::from_sources(
        None,
        Some(env(&[("FLOW_STORAGE__DATABASE_URL", "postgres://db/flows")])),
    );
    assert!(matches!(bad_db, Err(AppError::Config(_))));
}

#[test]
fn test_session_config_mirrors_playback_section() {
    let mut config = FlowConfig::default();
    config.playback.finish_delay_ms = 250;
    config.playback.shuffle = true;
    config.playback.shuffle_seed = Some(5);

    let session = config.playback.session_config();
    assert_eq!(session.finish_delay_ms, 250);
    assert!(session.shuffle);
    assert!(!session.repeat);
    assert_eq!(session.shuffle_seed, Some(5));
    assert_eq!(session.restart_threshold_ms, 3000);
}
