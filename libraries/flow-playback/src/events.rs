//! Session events and internal signals
//!
//! `SessionEvent`s flow out of the sequencer to whoever renders the
//! session. `SessionSignal`s flow in: engine notifications and timer
//! firings, each tagged so stale ones can be discarded.

use crate::engine::EngineEvent;
use crate::types::{LoadFailure, PlayerState};
use flow_core::MediaKind;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted by the sequencer for UI synchronization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Sequencer state changed
    StateChanged {
        /// The new state
        state: PlayerState,
    },

    /// A new entry started loading
    TrackChanged {
        /// Index of the new entry
        index: usize,
        /// Title of the new entry
        title: String,
        /// Kind of the new entry
        kind: MediaKind,
        /// Index of the entry it replaced
        previous_index: usize,
    },

    /// Position update reported by the engine
    PositionUpdate {
        /// Current position
        position_ms: u64,
        /// Duration, once known
        duration_ms: Option<u64>,
    },

    /// Shuffle or repeat flag changed
    ModeChanged {
        /// Shuffle flag
        shuffle: bool,
        /// Repeat flag
        repeat: bool,
    },

    /// Playback rate changed
    RateChanged {
        /// New rate multiplier
        rate: f32,
    },

    /// Loading an entry failed
    LoadFailed {
        /// What failed and how to present it
        failure: LoadFailure,
    },

    /// Non-fatal problem worth telling the user about
    Notice {
        /// Human-readable message
        message: String,
    },

    /// Controls were shown or hidden
    ControlsVisibility {
        /// Whether controls are shown
        visible: bool,
    },

    /// Sequential playback reached the end of the playlist
    PlaylistFinished,

    /// Session closed; no further events follow
    Closed,
}

/// Inputs that re-enter the sequencer asynchronously
#[derive(Debug, Clone, PartialEq)]
pub enum SessionSignal {
    /// Engine notification issued for a load generation
    Engine {
        /// Generation the notifier was bound to
        generation: u64,
        /// The notification
        event: EngineEvent,
    },

    /// Finish-delay timer fired
    FinishDelayElapsed {
        /// Generation the timer was armed for
        generation: u64,
    },

    /// Controls auto-hide timer fired
    ControlsTimeout {
        /// Token the timer was armed with
        token: u64,
    },
}

/// Sending half of the signal channel
pub type SignalSender = mpsc::UnboundedSender<SessionSignal>;

/// Receiving half of the signal channel
pub type SignalReceiver = mpsc::UnboundedReceiver<SessionSignal>;
