//! Simulated media engine
//!
//! `ClockEngine` does not decode anything. It becomes ready as soon as it
//! loads, advances a virtual position with wall-clock time (scaled by a
//! speed factor and the playback rate), reports position updates on every
//! tick and notifies `finished` when the position reaches the duration.

use super::{EngineFactory, EngineNotifier, MediaEngine};
use crate::error::EngineError;
use crate::types::PlaylistEntry;
use async_trait::async_trait;
use flow_core::MediaKind;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

const DEFAULT_TICK: Duration = Duration::from_millis(250);
const DEFAULT_DURATION: Duration = Duration::from_secs(30);

/// Creates `ClockEngine`s sharing one set of known durations
#[derive(Debug, Clone)]
pub struct ClockEngineFactory {
    speed: f32,
    tick: Duration,
    default_duration: Duration,
    durations: Arc<HashMap<String, Duration>>,
}

impl ClockEngineFactory {
    /// Create a factory whose engines run `speed` times faster than real time
    ///
    /// Non-positive or non-finite speeds fall back to real time.
    pub fn new(speed: f32) -> Self {
        let speed = if speed.is_finite() && speed > 0.0 {
            speed
        } else {
            1.0
        };

        Self {
            speed,
            tick: DEFAULT_TICK,
            default_duration: DEFAULT_DURATION,
            durations: Arc::new(HashMap::new()),
        }
    }

    /// Factory that knows the durations of a playlist's entries
    pub fn for_playlist(speed: f32, playlist: &[PlaylistEntry]) -> Self {
        let durations = playlist.iter().filter_map(|entry| {
            entry
                .duration_ms
                .map(|ms| (entry.uri.clone(), Duration::from_millis(ms)))
        });
        Self::new(speed).with_durations(durations)
    }

    /// Set the real-time interval between position reports
    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick.max(Duration::from_millis(1));
        self
    }

    /// Set the duration used for locations without a known one
    #[must_use]
    pub fn with_default_duration(mut self, duration: Duration) -> Self {
        self.default_duration = duration;
        self
    }

    /// Register known durations by location
    #[must_use]
    pub fn with_durations(mut self, durations: impl IntoIterator<Item = (String, Duration)>) -> Self {
        let mut map = (*self.durations).clone();
        map.extend(durations);
        self.durations = Arc::new(map);
        self
    }
}

impl Default for ClockEngineFactory {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl EngineFactory for ClockEngineFactory {
    fn create(&mut self, kind: MediaKind) -> Result<Box<dyn MediaEngine>, EngineError> {
        Ok(Box::new(ClockEngine {
            kind,
            speed: self.speed,
            tick: self.tick,
            default_duration: self.default_duration,
            durations: Arc::clone(&self.durations),
            clock: Arc::new(Mutex::new(ClockState::default())),
            notifier: None,
            ticker: None,
            released: false,
        }))
    }
}

#[derive(Debug)]
struct ClockState {
    position: Duration,
    duration: Duration,
    rate: f32,
}

impl Default for ClockState {
    fn default() -> Self {
        Self {
            position: Duration::ZERO,
            duration: Duration::ZERO,
            rate: 1.0,
        }
    }
}

/// Engine that plays silence on a virtual clock
#[derive(Debug)]
pub struct ClockEngine {
    kind: MediaKind,
    speed: f32,
    tick: Duration,
    default_duration: Duration,
    durations: Arc<HashMap<String, Duration>>,
    clock: Arc<Mutex<ClockState>>,
    notifier: Option<EngineNotifier>,
    ticker: Option<JoinHandle<()>>,
    released: bool,
}

impl ClockEngine {
    /// Current virtual position
    pub fn position(&self) -> Duration {
        lock(&self.clock).position
    }

    fn ensure_loaded(&self) -> Result<&EngineNotifier, EngineError> {
        if self.released {
            return Err(EngineError::Released);
        }
        self.notifier.as_ref().ok_or(EngineError::NotReady)
    }

    fn halt(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

#[async_trait]
impl MediaEngine for ClockEngine {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    async fn load(&mut self, uri: &str, notifier: EngineNotifier) -> Result<(), EngineError> {
        if self.released {
            return Err(EngineError::Released);
        }
        if self.kind == MediaKind::Video && uri.starts_with("content://") {
            return Err(EngineError::Unsupported(uri.to_string()));
        }
        if let Some(path) = local_path(uri) {
            if !path.exists() {
                return Err(EngineError::NotFound(uri.to_string()));
            }
        }

        let duration = self
            .durations
            .get(uri)
            .copied()
            .unwrap_or(self.default_duration);
        {
            let mut clock = lock(&self.clock);
            clock.position = Duration::ZERO;
            clock.duration = duration;
        }

        debug!(kind = %self.kind, uri, duration_ms = duration.as_millis() as u64, "Clock engine loaded");
        notifier.ready(Some(duration));
        self.notifier = Some(notifier);
        Ok(())
    }

    async fn play(&mut self) -> Result<(), EngineError> {
        let notifier = self.ensure_loaded()?.clone();
        if self.is_playing() == Some(true) {
            return Ok(());
        }

        {
            let mut clock = lock(&self.clock);
            if clock.position >= clock.duration {
                clock.position = Duration::ZERO;
            }
        }

        self.ticker = Some(tokio::spawn(run_clock(
            Arc::clone(&self.clock),
            notifier,
            self.tick,
            self.speed,
        )));
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), EngineError> {
        self.ensure_loaded()?;
        self.halt();
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EngineError> {
        self.ensure_loaded()?;
        self.halt();
        lock(&self.clock).position = Duration::ZERO;
        Ok(())
    }

    async fn seek(&mut self, position: Duration) -> Result<(), EngineError> {
        self.ensure_loaded()?;
        let mut clock = lock(&self.clock);
        clock.position = position.min(clock.duration);
        Ok(())
    }

    async fn set_rate(&mut self, rate: f32) -> Result<(), EngineError> {
        if self.released {
            return Err(EngineError::Released);
        }
        if !(rate.is_finite() && rate > 0.0) {
            return Err(EngineError::Other(format!("invalid playback rate {rate}")));
        }
        lock(&self.clock).rate = rate;
        Ok(())
    }

    fn is_playing(&self) -> Option<bool> {
        Some(self.ticker.as_ref().is_some_and(|t| !t.is_finished()))
    }

    async fn release(&mut self) {
        self.halt();
        self.notifier = None;
        self.released = true;
        trace!(kind = %self.kind, "Clock engine released");
    }
}

impl Drop for ClockEngine {
    fn drop(&mut self) {
        self.halt();
    }
}

async fn run_clock(
    clock: Arc<Mutex<ClockState>>,
    notifier: EngineNotifier,
    tick: Duration,
    speed: f32,
) {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;

        let (position, duration) = {
            let mut state = lock(&clock);
            let advance = tick.mul_f32(speed * state.rate);
            state.position = (state.position + advance).min(state.duration);
            (state.position, state.duration)
        };

        notifier.position(position, Some(duration));
        if position >= duration {
            notifier.finished();
            break;
        }
    }
}

/// Filesystem path behind a location, if it is a local one
fn local_path(uri: &str) -> Option<PathBuf> {
    if let Some(path) = uri.strip_prefix("file://") {
        return Some(PathBuf::from(path));
    }
    if uri.contains("://") {
        return None;
    }
    Some(PathBuf::from(uri))
}

fn lock(clock: &Mutex<ClockState>) -> MutexGuard<'_, ClockState> {
    clock.lock().unwrap_or_else(PoisonError::into_inner)
}
