//! Playback sequencer - core orchestration
//!
//! Owns the playlist, the current index, the shuffle/repeat flags and the
//! single active media engine. Every state change happens here; engines and
//! timers only report back through the signal channel.

use crate::{
    engine::{EngineEvent, EngineFactory, EngineNotifier, MediaEngine},
    error::{EngineError, PlaybackError, Result},
    events::{SessionEvent, SessionSignal, SignalReceiver, SignalSender},
    history::ShuffleHistory,
    rate::{self, DEFAULT_RATE},
    selection::{self, Selection},
    timer::SingleShotTimer,
    types::{LoadFailure, PlaybackConfig, PlaybackMode, PlayerState, PlaylistEntry, SessionSnapshot},
};
use flow_core::MediaKind;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

/// Playback sequencer for one session
///
/// Created with a non-empty playlist and a start index; call
/// [`Sequencer::start`] to load the first entry. Engine notifications and
/// timer firings arrive on the receiver returned by [`Sequencer::new`] and
/// must be fed back through [`Sequencer::handle_signal`].
pub struct Sequencer {
    playlist: Vec<PlaylistEntry>,
    current_index: usize,
    mode: PlaybackMode,
    history: ShuffleHistory,
    state: PlayerState,
    failure: Option<LoadFailure>,

    position: Duration,
    duration: Option<Duration>,
    playback_rate: f32,
    controls_visible: bool,

    engine: Option<Box<dyn MediaEngine>>,
    factory: Box<dyn EngineFactory>,

    /// Bumped on every load and stop; signals from older generations are stale
    generation: u64,
    /// Bumped on every controls interaction
    controls_token: u64,
    /// Entry finished and the finish delay is running
    finish_pending: bool,

    config: PlaybackConfig,
    rng: StdRng,
    signal_tx: SignalSender,
    finish_timer: SingleShotTimer,
    controls_timer: SingleShotTimer,

    pending_events: Vec<SessionEvent>,
    closed: bool,
}

impl Sequencer {
    /// Create a sequencer positioned at `start_index`
    ///
    /// No engine is created until [`Sequencer::start`] runs.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPlaylist` for an empty playlist and `IndexOutOfBounds`
    /// when `start_index` is past its end.
    pub fn new(
        playlist: Vec<PlaylistEntry>,
        start_index: usize,
        factory: Box<dyn EngineFactory>,
        config: PlaybackConfig,
    ) -> Result<(Self, SignalReceiver)> {
        if playlist.is_empty() {
            return Err(PlaybackError::EmptyPlaylist);
        }
        if start_index >= playlist.len() {
            return Err(PlaybackError::IndexOutOfBounds {
                index: start_index,
                len: playlist.len(),
            });
        }

        let mode = config.initial_mode();
        let mut history = ShuffleHistory::new(playlist.len());
        if mode.shuffle {
            history.reseed(start_index);
        }

        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let (signal_tx, signal_rx) = mpsc::unbounded_channel();

        debug!(
            entries = playlist.len(),
            start_index,
            shuffle = mode.shuffle,
            repeat = mode.repeat,
            "Created playback sequencer"
        );

        let sequencer = Self {
            playlist,
            current_index: start_index,
            mode,
            history,
            state: PlayerState::Idle,
            failure: None,
            position: Duration::ZERO,
            duration: None,
            playback_rate: DEFAULT_RATE,
            controls_visible: true,
            engine: None,
            factory,
            generation: 0,
            controls_token: 0,
            finish_pending: false,
            config,
            rng,
            signal_tx,
            finish_timer: SingleShotTimer::new("finish-delay"),
            controls_timer: SingleShotTimer::new("controls-hide"),
            pending_events: Vec::new(),
            closed: false,
        };

        Ok((sequencer, signal_rx))
    }

    // ===== Queries =====

    /// The fixed playlist
    pub fn playlist(&self) -> &[PlaylistEntry] {
        &self.playlist
    }

    /// Index of the current entry
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The current entry
    pub fn current_entry(&self) -> &PlaylistEntry {
        &self.playlist[self.current_index]
    }

    /// Shuffle and repeat flags
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Sequencer state
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Whether media is playing
    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    /// Whether an engine is loading
    pub fn is_loading(&self) -> bool {
        self.state == PlayerState::Loading
    }

    /// Indices visited under shuffle, oldest first
    pub fn play_history(&self) -> &[usize] {
        self.history.as_slice()
    }

    /// Last position reported for the current entry
    pub fn position(&self) -> Duration {
        self.position
    }

    /// Duration of the current entry, once known
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Current playback rate multiplier
    pub fn playback_rate(&self) -> f32 {
        self.playback_rate
    }

    /// Whether on-screen controls are shown
    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    /// Pending load failure, in the error state
    pub fn failure(&self) -> Option<&LoadFailure> {
        self.failure.as_ref()
    }

    /// Kind of the active engine, if one exists
    pub fn active_engine_kind(&self) -> Option<MediaKind> {
        self.engine.as_ref().map(|e| e.kind())
    }

    /// Current load generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether [`Sequencer::close`] has run
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Point-in-time view of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_index: self.current_index,
            entry: self.current_entry().clone(),
            playlist_len: self.playlist.len(),
            state: self.state,
            mode: self.mode,
            position_ms: duration_ms(self.position),
            duration_ms: self.duration.map(duration_ms),
            playback_rate: self.playback_rate,
            controls_visible: self.controls_visible,
            play_history: self.history.as_slice().to_vec(),
            failure: self.failure.clone(),
        }
    }

    /// Take the events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Loading =====

    /// Load and play the start entry
    pub async fn start(&mut self) -> Result<()> {
        self.load_and_play(self.current_index).await
    }

    /// Tear down the active engine and load `index`
    ///
    /// Playback starts once the engine reports readiness. A load failure
    /// does not return an error: the session moves to the error state and
    /// emits `LoadFailed`.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfBounds` for an invalid index and `SessionClosed`
    /// after [`Sequencer::close`].
    pub async fn load_and_play(&mut self, index: usize) -> Result<()> {
        self.ensure_open()?;
        if index >= self.playlist.len() {
            return Err(PlaybackError::IndexOutOfBounds {
                index,
                len: self.playlist.len(),
            });
        }

        self.generation += 1;
        let generation = self.generation;
        self.cancel_pending_finish();
        self.teardown_engine().await;

        let previous_index = self.current_index;
        let entry = self.playlist[index].clone();
        self.current_index = index;
        self.position = Duration::ZERO;
        self.duration = entry.duration_ms.map(Duration::from_millis);
        self.failure = None;
        self.fit_rate_to(entry.kind);

        info!(
            index,
            generation,
            kind = %entry.kind,
            title = %entry.title,
            "Loading entry"
        );

        self.emit(SessionEvent::TrackChanged {
            index,
            title: entry.title.clone(),
            kind: entry.kind,
            previous_index,
        });
        self.set_state(PlayerState::Loading);

        let mut engine = match self.factory.create(entry.kind) {
            Ok(engine) => engine,
            Err(e) => {
                self.fail_load(&e);
                return Ok(());
            }
        };

        let notifier = EngineNotifier::new(generation, self.signal_tx.clone());
        match engine.load(&entry.uri, notifier).await {
            Ok(()) => {
                self.engine = Some(engine);
            }
            Err(e) => {
                engine.release().await;
                self.fail_load(&e);
            }
        }

        Ok(())
    }

    // ===== Navigation =====

    /// Move to the next entry
    ///
    /// Ignores repeat. With a single entry, restarts it under repeat and
    /// stops otherwise.
    pub async fn next(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.touch_controls();

        let len = self.playlist.len();
        if len <= 1 {
            if self.mode.repeat {
                return self.load_and_play(self.current_index).await;
            }
            debug!("Next on a single-entry playlist, stopping");
            self.stop_playback().await;
            return Ok(());
        }

        let target = selection::select_manual_next(
            self.current_index,
            len,
            self.mode,
            &mut self.history,
            &mut self.rng,
        );
        self.load_and_play(target).await
    }

    /// Restart the current entry or move to the previous one
    ///
    /// Past the restart threshold the entry restarts from zero.
    pub async fn prev(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.touch_controls();

        if self.position > self.config.restart_threshold() {
            debug!(position_ms = duration_ms(self.position), "Previous restarts current entry");
            return self.seek(Duration::ZERO).await;
        }

        let len = self.playlist.len();
        if len <= 1 {
            if self.mode.repeat {
                return self.load_and_play(self.current_index).await;
            }
            return Ok(());
        }

        let target =
            selection::select_manual_previous(self.current_index, len, self.mode, &mut self.history);
        self.load_and_play(target).await
    }

    /// Advance after the current entry finished naturally
    pub async fn on_track_finished(&mut self) -> Result<()> {
        self.ensure_open()?;

        let selection = selection::select_after_finish(
            self.current_index,
            self.playlist.len(),
            self.mode,
            &mut self.history,
            &mut self.rng,
        );

        match selection {
            Selection::Play(index) => self.load_and_play(index).await,
            Selection::Stop => {
                info!(index = self.current_index, "Playlist finished");
                self.stop_playback().await;
                self.emit(SessionEvent::PlaylistFinished);
                Ok(())
            }
        }
    }

    // ===== Mode =====

    /// Flip shuffle; turning it on restarts the history at the current entry
    pub fn toggle_shuffle(&mut self) {
        self.mode.shuffle = !self.mode.shuffle;
        if self.mode.shuffle {
            self.history.reseed(self.current_index);
        } else {
            self.history.clear();
        }
        debug!(shuffle = self.mode.shuffle, "Shuffle toggled");
        self.emit_mode();
        self.touch_controls();
    }

    /// Flip repeat
    pub fn toggle_repeat(&mut self) {
        self.mode.repeat = !self.mode.repeat;
        debug!(repeat = self.mode.repeat, "Repeat toggled");
        self.emit_mode();
        self.touch_controls();
    }

    // ===== Transport =====

    /// Pause when playing, resume when paused, reload when idle
    pub async fn toggle_play_pause(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.touch_controls();

        let resume = match self.state {
            PlayerState::Idle => return self.load_and_play(self.current_index).await,
            PlayerState::Loading | PlayerState::Error => {
                debug!(state = ?self.state, "Play/pause ignored");
                return Ok(());
            }
            PlayerState::Playing => false,
            PlayerState::Paused => true,
        };

        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };

        let outcome = if resume {
            engine.play().await
        } else {
            engine.pause().await
        };
        let result = outcome.map(|()| engine.is_playing().unwrap_or(resume));

        match result {
            Ok(playing) => {
                if resume {
                    self.cancel_pending_finish();
                }
                let state = if playing {
                    PlayerState::Playing
                } else {
                    PlayerState::Paused
                };
                self.set_state(state);
            }
            Err(e) => {
                warn!(error = %e, "Play/pause failed");
                self.emit(SessionEvent::Notice {
                    message: format!("Could not change playback: {e}"),
                });
            }
        }

        Ok(())
    }

    /// Seek within the current entry
    ///
    /// Only takes effect while an engine is ready; the position is clamped
    /// to the known duration. Engine seek failures are logged and ignored.
    pub async fn seek(&mut self, position: Duration) -> Result<()> {
        self.ensure_open()?;

        if !matches!(self.state, PlayerState::Playing | PlayerState::Paused) {
            debug!(state = ?self.state, "Seek ignored, no ready engine");
            return Ok(());
        }
        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };

        let target = match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        };

        match engine.seek(target).await {
            Ok(()) => {
                if self.duration.map_or(true, |d| target < d) {
                    self.cancel_pending_finish();
                }
                self.position = target;
                self.emit(SessionEvent::PositionUpdate {
                    position_ms: duration_ms(target),
                    duration_ms: self.duration.map(duration_ms),
                });
            }
            Err(e) => debug!(error = %e, "Transient seek error"),
        }

        Ok(())
    }

    /// Seek to a millisecond offset; negative offsets clamp to zero
    pub async fn seek_to_millis(&mut self, position_ms: i64) -> Result<()> {
        let millis = u64::try_from(position_ms).unwrap_or(0);
        self.seek(Duration::from_millis(millis)).await
    }

    /// Move to the next rate in the set for the current entry's kind
    pub async fn cycle_playback_rate(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.touch_controls();

        let rate = rate::next_rate(self.current_entry().kind, self.playback_rate);
        self.playback_rate = rate;

        if matches!(self.state, PlayerState::Playing | PlayerState::Paused) {
            if let Some(engine) = self.engine.as_mut() {
                if let Err(e) = engine.set_rate(rate).await {
                    debug!(error = %e, rate, "Engine rejected playback rate");
                }
            }
        }

        debug!(rate, "Playback rate changed");
        self.emit(SessionEvent::RateChanged { rate });
        Ok(())
    }

    // ===== Error recovery =====

    /// Skip to the next entry after a load failure
    pub async fn skip_after_error(&mut self) -> Result<()> {
        if self.state != PlayerState::Error {
            return Ok(());
        }
        self.next().await
    }

    /// Acknowledge a load failure and go idle on the failed entry
    pub fn dismiss_error(&mut self) {
        if self.state != PlayerState::Error {
            return;
        }
        self.failure = None;
        self.set_state(PlayerState::Idle);
    }

    // ===== Controls =====

    /// Register a user interaction: show controls and restart the hide timer
    pub fn touch_controls(&mut self) {
        if !self.controls_visible {
            self.controls_visible = true;
            self.emit(SessionEvent::ControlsVisibility { visible: true });
        }
        self.rearm_controls_timer();
    }

    // ===== Signals =====

    /// Apply an engine notification or timer firing
    ///
    /// Signals tagged with an outdated generation or token are discarded.
    pub async fn handle_signal(&mut self, signal: SessionSignal) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        match signal {
            SessionSignal::Engine { generation, event } => {
                if generation != self.generation {
                    trace!(generation, current = self.generation, "Discarding stale engine event");
                    return Ok(());
                }
                self.handle_engine_event(event).await
            }
            SessionSignal::FinishDelayElapsed { generation } => {
                if generation != self.generation || !self.finish_pending {
                    trace!(generation, "Discarding stale finish timer");
                    return Ok(());
                }
                self.finish_pending = false;
                self.on_track_finished().await
            }
            SessionSignal::ControlsTimeout { token } => {
                if token == self.controls_token && self.state == PlayerState::Playing {
                    self.controls_visible = false;
                    self.emit(SessionEvent::ControlsVisibility { visible: false });
                }
                Ok(())
            }
        }
    }

    async fn handle_engine_event(&mut self, event: EngineEvent) -> Result<()> {
        match event {
            EngineEvent::Ready { duration } => {
                if self.state != PlayerState::Loading {
                    return Ok(());
                }
                if duration.is_some() {
                    self.duration = duration;
                }
                self.start_ready_engine().await;
            }
            EngineEvent::Finished => {
                if !matches!(self.state, PlayerState::Playing | PlayerState::Paused) {
                    return Ok(());
                }
                if let Some(duration) = self.duration {
                    self.position = duration;
                }
                debug!(index = self.current_index, "Entry finished");
                self.set_state(PlayerState::Paused);
                self.finish_pending = true;
                self.finish_timer.arm(
                    self.config.finish_delay(),
                    self.signal_tx.clone(),
                    SessionSignal::FinishDelayElapsed {
                        generation: self.generation,
                    },
                );
            }
            EngineEvent::Error(reason) => {
                if matches!(self.state, PlayerState::Idle | PlayerState::Error) {
                    return Ok(());
                }
                self.teardown_engine().await;
                self.fail_load(&EngineError::Other(reason));
            }
            EngineEvent::Position { position, duration } => {
                self.position = position;
                if duration.is_some() {
                    self.duration = duration;
                }
                self.emit(SessionEvent::PositionUpdate {
                    position_ms: duration_ms(position),
                    duration_ms: self.duration.map(duration_ms),
                });
            }
            EngineEvent::PlayingChanged(playing) => match (self.state, playing) {
                (PlayerState::Playing, false) => self.set_state(PlayerState::Paused),
                (PlayerState::Paused, true) => self.set_state(PlayerState::Playing),
                _ => {}
            },
        }
        Ok(())
    }

    async fn start_ready_engine(&mut self) {
        let rate = self.playback_rate;
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        if (rate - DEFAULT_RATE).abs() > f32::EPSILON {
            if let Err(e) = engine.set_rate(rate).await {
                debug!(error = %e, rate, "Could not re-apply playback rate");
            }
        }

        match engine.play().await {
            Ok(()) => self.set_state(PlayerState::Playing),
            Err(e) => {
                self.teardown_engine().await;
                self.fail_load(&e);
            }
        }
    }

    // ===== Lifecycle =====

    /// Stop and release the engine, cancel timers and refuse further commands
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.generation += 1;
        self.cancel_pending_finish();
        self.controls_timer.cancel();
        self.teardown_engine().await;
        self.state = PlayerState::Idle;
        self.closed = true;
        info!("Playback session closed");
        self.emit(SessionEvent::Closed);
    }

    async fn stop_playback(&mut self) {
        self.generation += 1;
        self.cancel_pending_finish();
        self.teardown_engine().await;
        self.position = Duration::ZERO;
        self.set_state(PlayerState::Idle);
    }

    async fn teardown_engine(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            if let Err(e) = engine.stop().await {
                debug!(error = %e, "Engine stop failed during teardown");
            }
            engine.release().await;
            trace!(kind = %engine.kind(), "Engine released");
        }
    }

    /// Drop a pending advance; the finished entry is being replayed or replaced
    fn cancel_pending_finish(&mut self) {
        if self.finish_pending {
            trace!(index = self.current_index, "Cancelling pending advance");
        }
        self.finish_pending = false;
        self.finish_timer.cancel();
    }

    /// Reset a rate the next entry's kind does not offer
    fn fit_rate_to(&mut self, kind: MediaKind) {
        if rate::is_offered(kind, self.playback_rate) {
            return;
        }
        debug!(rate = self.playback_rate, %kind, "Rate not offered for entry, resetting");
        self.playback_rate = DEFAULT_RATE;
        self.emit(SessionEvent::RateChanged { rate: DEFAULT_RATE });
    }

    fn fail_load(&mut self, error: &EngineError) {
        let failure = LoadFailure::from_engine_error(self.current_index, error);
        warn!(
            index = self.current_index,
            kind = ?failure.kind,
            reason = %failure.reason,
            "Failed to load entry"
        );
        self.failure = Some(failure.clone());
        self.set_state(PlayerState::Error);
        self.emit(SessionEvent::LoadFailed { failure });
    }

    fn set_state(&mut self, state: PlayerState) {
        if self.state == state {
            return;
        }
        self.state = state;
        self.emit(SessionEvent::StateChanged { state });

        if state == PlayerState::Playing {
            self.rearm_controls_timer();
        } else {
            self.controls_timer.cancel();
            if !self.controls_visible {
                self.controls_visible = true;
                self.emit(SessionEvent::ControlsVisibility { visible: true });
            }
        }
    }

    fn rearm_controls_timer(&mut self) {
        self.controls_token += 1;
        self.controls_timer.cancel();
        if self.state == PlayerState::Playing && !self.closed {
            self.controls_timer.arm(
                self.config.controls_hide_delay(),
                self.signal_tx.clone(),
                SessionSignal::ControlsTimeout {
                    token: self.controls_token,
                },
            );
        }
    }

    fn emit_mode(&mut self) {
        self.emit(SessionEvent::ModeChanged {
            shuffle: self.mode.shuffle,
            repeat: self.mode.repeat,
        });
    }

    fn emit(&mut self, event: SessionEvent) {
        self.pending_events.push(event);
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(PlaybackError::SessionClosed)
        } else {
            Ok(())
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
