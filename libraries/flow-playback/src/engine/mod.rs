//! Media engine adapter
//!
//! Abstracts the platform audio and video players. The sequencer drives an
//! engine through `MediaEngine` commands; the engine answers through an
//! `EngineNotifier`, whose notifications re-enter the sequencer serially
//! through the session signal channel.

mod clock;

pub use clock::{ClockEngine, ClockEngineFactory};

use crate::error::EngineError;
use crate::events::{SessionSignal, SignalSender};
use async_trait::async_trait;
use flow_core::MediaKind;
use std::time::Duration;
use tracing::trace;

/// Platform media player
///
/// An engine is created per entry and renders exactly one media kind.
/// `load` only begins loading: readiness, completion and asynchronous
/// failures are reported later through the notifier it receives.
#[async_trait]
pub trait MediaEngine: Send {
    /// Media kind this engine renders
    fn kind(&self) -> MediaKind;

    /// Begin loading `uri`
    ///
    /// # Returns
    /// * `Ok(())` - Loading started, `ready` will be notified
    /// * `Err(_)` - Location rejected synchronously
    async fn load(&mut self, uri: &str, notifier: EngineNotifier) -> Result<(), EngineError>;

    /// Start or resume playback
    async fn play(&mut self) -> Result<(), EngineError>;

    /// Pause playback, keeping the position
    async fn pause(&mut self) -> Result<(), EngineError>;

    /// Stop playback
    async fn stop(&mut self) -> Result<(), EngineError>;

    /// Seek to `position` from the start
    async fn seek(&mut self, position: Duration) -> Result<(), EngineError>;

    /// Change the playback rate multiplier
    async fn set_rate(&mut self, rate: f32) -> Result<(), EngineError>;

    /// Playing flag as the engine sees it, when it exposes one
    fn is_playing(&self) -> Option<bool> {
        None
    }

    /// Free the engine's resources; no command is valid afterwards
    async fn release(&mut self);
}

/// Creates engines for a media kind
pub trait EngineFactory: Send {
    /// Construct an engine for `kind`
    ///
    /// # Errors
    ///
    /// Returns an `EngineError` when the platform cannot provide one.
    fn create(&mut self, kind: MediaKind) -> Result<Box<dyn MediaEngine>, EngineError>;
}

/// Asynchronous engine notification
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Media is loaded and can play
    Ready {
        /// Duration, when the engine knows it
        duration: Option<Duration>,
    },

    /// Media played to the end
    Finished,

    /// Media failed after loading began
    Error(String),

    /// Periodic position report
    Position {
        /// Current position
        position: Duration,
        /// Duration, when known
        duration: Option<Duration>,
    },

    /// Engine-side playing flag changed
    PlayingChanged(bool),
}

/// Handle an engine uses to report back to its session
///
/// Bound to the load generation it was issued for; notifications sent after
/// a newer load began are discarded by the sequencer.
#[derive(Debug, Clone)]
pub struct EngineNotifier {
    generation: u64,
    tx: SignalSender,
}

impl EngineNotifier {
    /// Create a notifier bound to `generation`
    pub fn new(generation: u64, tx: SignalSender) -> Self {
        Self { generation, tx }
    }

    /// Generation this notifier is bound to
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Report readiness
    pub fn ready(&self, duration: Option<Duration>) {
        self.send(EngineEvent::Ready { duration });
    }

    /// Report playback reached the end
    pub fn finished(&self) {
        self.send(EngineEvent::Finished);
    }

    /// Report an asynchronous failure
    pub fn error(&self, reason: impl Into<String>) {
        self.send(EngineEvent::Error(reason.into()));
    }

    /// Report the current position
    pub fn position(&self, position: Duration, duration: Option<Duration>) {
        self.send(EngineEvent::Position { position, duration });
    }

    /// Report an engine-side play/pause change
    pub fn playing_changed(&self, playing: bool) {
        self.send(EngineEvent::PlayingChanged(playing));
    }

    fn send(&self, event: EngineEvent) {
        let signal = SessionSignal::Engine {
            generation: self.generation,
            event,
        };
        if self.tx.send(signal).is_err() {
            trace!(generation = self.generation, "Session gone, dropping engine notification");
        }
    }
}
