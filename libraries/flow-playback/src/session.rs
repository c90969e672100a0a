//! Session actor
//!
//! Runs a `Sequencer` on its own task. User commands and engine/timer
//! signals are serialized through one `tokio::select!` loop; events the
//! sequencer emits are published on a broadcast channel.

use crate::error::{PlaybackError, Result};
use crate::events::{SessionEvent, SignalReceiver};
use crate::sequencer::Sequencer;
use crate::types::SessionSnapshot;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

const COMMAND_CAPACITY: usize = 32;
const EVENT_CAPACITY: usize = 256;

/// Commands accepted by a running session
#[derive(Debug)]
pub enum PlayerCommand {
    /// Move to the next entry
    Next,
    /// Restart or move to the previous entry
    Previous,
    /// Pause, resume or reload
    TogglePlayPause,
    /// Flip shuffle
    ToggleShuffle,
    /// Flip repeat
    ToggleRepeat,
    /// Seek to a millisecond offset
    Seek {
        /// Target offset; negative values clamp to zero
        position_ms: i64,
    },
    /// Cycle the playback rate
    CyclePlaybackRate,
    /// Skip past a failed entry
    SkipAfterError,
    /// Acknowledge a failed entry
    DismissError,
    /// Register a user interaction
    TouchControls,
    /// Request a snapshot of the session
    Snapshot(oneshot::Sender<SessionSnapshot>),
    /// Close the session
    Close,
}

/// Cloneable handle to a running session
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    commands: mpsc::Sender<PlayerCommand>,
    events: broadcast::Sender<SessionEvent>,
}

impl PlayerHandle {
    /// Send a command to the session
    ///
    /// # Errors
    ///
    /// Returns `SessionClosed` once the session task has exited.
    pub async fn send(&self, command: PlayerCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PlaybackError::SessionClosed)
    }

    /// Move to the next entry
    pub async fn next(&self) -> Result<()> {
        self.send(PlayerCommand::Next).await
    }

    /// Restart or move to the previous entry
    pub async fn previous(&self) -> Result<()> {
        self.send(PlayerCommand::Previous).await
    }

    /// Pause, resume or reload
    pub async fn toggle_play_pause(&self) -> Result<()> {
        self.send(PlayerCommand::TogglePlayPause).await
    }

    /// Flip shuffle
    pub async fn toggle_shuffle(&self) -> Result<()> {
        self.send(PlayerCommand::ToggleShuffle).await
    }

    /// Flip repeat
    pub async fn toggle_repeat(&self) -> Result<()> {
        self.send(PlayerCommand::ToggleRepeat).await
    }

    /// Seek to a millisecond offset
    pub async fn seek(&self, position_ms: i64) -> Result<()> {
        self.send(PlayerCommand::Seek { position_ms }).await
    }

    /// Cycle the playback rate
    pub async fn cycle_playback_rate(&self) -> Result<()> {
        self.send(PlayerCommand::CyclePlaybackRate).await
    }

    /// Skip past a failed entry
    pub async fn skip_after_error(&self) -> Result<()> {
        self.send(PlayerCommand::SkipAfterError).await
    }

    /// Acknowledge a failed entry
    pub async fn dismiss_error(&self) -> Result<()> {
        self.send(PlayerCommand::DismissError).await
    }

    /// Register a user interaction
    pub async fn touch_controls(&self) -> Result<()> {
        self.send(PlayerCommand::TouchControls).await
    }

    /// Current session snapshot
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(PlayerCommand::Snapshot(tx)).await?;
        rx.await.map_err(|_| PlaybackError::SessionClosed)
    }

    /// Close the session and release its engine
    pub async fn close(&self) -> Result<()> {
        self.send(PlayerCommand::Close).await
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

/// Spawn the session task and start playing the start entry
///
/// Returns the command handle, an event receiver subscribed before the
/// first event is published, and the task handle. The task ends after
/// `Close` or once every handle is dropped.
pub fn spawn_session(
    sequencer: Sequencer,
    signals: SignalReceiver,
) -> (PlayerHandle, broadcast::Receiver<SessionEvent>, JoinHandle<()>) {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
    let (event_tx, event_rx) = broadcast::channel(EVENT_CAPACITY);

    let handle = PlayerHandle {
        commands: command_tx,
        events: event_tx.clone(),
    };
    let task = tokio::spawn(run_session(sequencer, signals, command_rx, event_tx));

    (handle, event_rx, task)
}

async fn run_session(
    mut sequencer: Sequencer,
    mut signals: SignalReceiver,
    mut commands: mpsc::Receiver<PlayerCommand>,
    events: broadcast::Sender<SessionEvent>,
) {
    if let Err(e) = sequencer.start().await {
        error!("Failed to start playback session: {}", e);
    }
    publish(&mut sequencer, &events);

    loop {
        tokio::select! {
            command = commands.recv() => {
                match command {
                    None | Some(PlayerCommand::Close) => {
                        sequencer.close().await;
                        publish(&mut sequencer, &events);
                        break;
                    }
                    Some(command) => {
                        if let Err(e) = apply(&mut sequencer, command).await {
                            warn!("Playback command failed: {}", e);
                        }
                    }
                }
            }
            Some(signal) = signals.recv() => {
                if let Err(e) = sequencer.handle_signal(signal).await {
                    warn!("Failed to handle session signal: {}", e);
                }
            }
        }
        publish(&mut sequencer, &events);
    }

    debug!("Playback session task finished");
}

async fn apply(sequencer: &mut Sequencer, command: PlayerCommand) -> Result<()> {
    match command {
        PlayerCommand::Next => sequencer.next().await,
        PlayerCommand::Previous => sequencer.prev().await,
        PlayerCommand::TogglePlayPause => sequencer.toggle_play_pause().await,
        PlayerCommand::ToggleShuffle => {
            sequencer.toggle_shuffle();
            Ok(())
        }
        PlayerCommand::ToggleRepeat => {
            sequencer.toggle_repeat();
            Ok(())
        }
        PlayerCommand::Seek { position_ms } => {
            sequencer.touch_controls();
            sequencer.seek_to_millis(position_ms).await
        }
        PlayerCommand::CyclePlaybackRate => sequencer.cycle_playback_rate().await,
        PlayerCommand::SkipAfterError => sequencer.skip_after_error().await,
        PlayerCommand::DismissError => {
            sequencer.touch_controls();
            sequencer.dismiss_error();
            Ok(())
        }
        PlayerCommand::TouchControls => {
            sequencer.touch_controls();
            Ok(())
        }
        PlayerCommand::Snapshot(reply) => {
            // Requester may have given up waiting
            let _ = reply.send(sequencer.snapshot());
            Ok(())
        }
        // Handled by the loop
        PlayerCommand::Close => Ok(()),
    }
}

fn publish(sequencer: &mut Sequencer, events: &broadcast::Sender<SessionEvent>) {
    for event in sequencer.drain_events() {
        // No subscribers is fine
        let _ = events.send(event);
    }
}
