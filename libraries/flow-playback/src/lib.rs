//! FlowPlayer - Playback Sequencing
//!
//! Platform-agnostic playback sequencing for FlowPlayer.
//!
//! This crate provides:
//! - Playlist sequencing over mixed audio and video entries
//! - Shuffle without repeats until every entry has played
//! - Repeat (replays the current entry on natural finish)
//! - Previous/next navigation with restart-on-previous
//! - Per-kind playback rate cycling
//! - Controls auto-hide timing
//! - Load failure classification with recovery choices
//!
//! # Architecture
//!
//! The `Sequencer` is the only component that touches a media engine. At
//! most one engine exists at a time, created through an `EngineFactory` for
//! the current entry's kind and torn down (stopped, then released) before
//! the next one is created.
//!
//! Engines report back asynchronously through an `EngineNotifier`. Every
//! notification and timer firing is tagged with the load generation it
//! belongs to, so a newer `load_and_play` silently supersedes anything
//! still in flight from an older one.
//!
//! Platform players are provided via the `MediaEngine` trait. `ClockEngine`
//! is a built-in engine that plays silence on a virtual clock.
//!
//! # Example: Running a Session
//!
//! ```rust,no_run
//! use flow_core::{FlowKey, MediaKind};
//! use flow_playback::{
//!     spawn_session, ClockEngineFactory, PlaybackConfig, PlaylistEntry, Sequencer,
//! };
//!
//! # async fn run() -> flow_playback::Result<()> {
//! let playlist = vec![PlaylistEntry {
//!     uri: "https://cdn.example.com/morning.mp3".to_string(),
//!     title: "Morning".to_string(),
//!     kind: MediaKind::Audio,
//!     flow: FlowKey::Blue,
//!     duration_ms: Some(180_000),
//! }];
//!
//! let factory = ClockEngineFactory::for_playlist(1.0, &playlist);
//! let (sequencer, signals) =
//!     Sequencer::new(playlist, 0, Box::new(factory), PlaybackConfig::default())?;
//!
//! let (player, mut events, _task) = spawn_session(sequencer, signals);
//! player.toggle_shuffle().await?;
//! player.next().await?;
//!
//! while let Ok(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod engine;
mod error;
pub mod events;
mod history;
pub mod rate;
pub mod selection;
mod sequencer;
mod session;
mod timer;
pub mod types;

// Public exports
pub use engine::{
    ClockEngine, ClockEngineFactory, EngineEvent, EngineFactory, EngineNotifier, MediaEngine,
};
pub use error::{EngineError, PlaybackError, Result};
pub use events::{SessionEvent, SessionSignal, SignalReceiver, SignalSender};
pub use history::ShuffleHistory;
pub use sequencer::Sequencer;
pub use session::{spawn_session, PlayerCommand, PlayerHandle};
pub use timer::SingleShotTimer;
pub use types::{
    LoadErrorKind, LoadFailure, PlaybackConfig, PlaybackMode, PlayerState, PlaylistEntry,
    RecoveryAction, SessionSnapshot,
};
