//! Shared test fixtures: a recording engine factory and playlist builders

#![allow(dead_code)]

use async_trait::async_trait;
use flow_core::{FlowKey, MediaKind};
use flow_playback::{
    EngineError, EngineFactory, EngineNotifier, MediaEngine, PlaybackConfig, PlaylistEntry,
    Sequencer, SignalReceiver,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Every engine call observed by the recorder
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create { id: usize, kind: MediaKind },
    Load { id: usize, uri: String },
    Play(usize),
    Pause(usize),
    Stop(usize),
    Seek(usize, Duration),
    SetRate(usize, f32),
    Release(usize),
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
    next_id: usize,
    live: usize,
    max_live: usize,
    notifiers: Vec<EngineNotifier>,
    failing: HashSet<String>,
    durations: HashMap<String, Duration>,
}

/// Test-side view of everything the factory and its engines did
#[derive(Clone, Default)]
pub struct Probe {
    inner: Arc<Mutex<Recorder>>,
}

impl Probe {
    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// URIs passed to `load`, in order
    pub fn loads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Load { uri, .. } => Some(uri),
                _ => None,
            })
            .collect()
    }

    pub fn live(&self) -> usize {
        self.inner.lock().unwrap().live
    }

    pub fn max_live(&self) -> usize {
        self.inner.lock().unwrap().max_live
    }

    /// Make every load of `uri` fail with `NotFound`
    pub fn fail_uri(&self, uri: &str) {
        self.inner.lock().unwrap().failing.insert(uri.to_string());
    }

    pub fn set_duration(&self, uri: &str, duration: Duration) {
        self.inner
            .lock()
            .unwrap()
            .durations
            .insert(uri.to_string(), duration);
    }

    /// Notifier handed to the most recent successful load
    pub fn last_notifier(&self) -> EngineNotifier {
        self.inner
            .lock()
            .unwrap()
            .notifiers
            .last()
            .cloned()
            .expect("no engine has loaded yet")
    }

    /// Notifier handed to the n-th successful load
    pub fn notifier(&self, n: usize) -> EngineNotifier {
        self.inner.lock().unwrap().notifiers[n].clone()
    }

    fn record(&self, call: Call) {
        self.inner.lock().unwrap().calls.push(call);
    }
}

/// Factory whose engines record calls and report ready on load
pub struct RecordingFactory {
    probe: Probe,
}

impl RecordingFactory {
    pub fn new(probe: Probe) -> Self {
        Self { probe }
    }
}

impl EngineFactory for RecordingFactory {
    fn create(&mut self, kind: MediaKind) -> Result<Box<dyn MediaEngine>, EngineError> {
        let id = {
            let mut recorder = self.probe.inner.lock().unwrap();
            let id = recorder.next_id;
            recorder.next_id += 1;
            recorder.live += 1;
            recorder.max_live = recorder.max_live.max(recorder.live);
            id
        };
        self.probe.record(Call::Create { id, kind });

        Ok(Box::new(RecordingEngine {
            id,
            kind,
            probe: self.probe.clone(),
            playing: false,
        }))
    }
}

struct RecordingEngine {
    id: usize,
    kind: MediaKind,
    probe: Probe,
    playing: bool,
}

#[async_trait]
impl MediaEngine for RecordingEngine {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    async fn load(&mut self, uri: &str, notifier: EngineNotifier) -> Result<(), EngineError> {
        self.probe.record(Call::Load {
            id: self.id,
            uri: uri.to_string(),
        });

        let duration = {
            let recorder = self.probe.inner.lock().unwrap();
            if recorder.failing.contains(uri) {
                return Err(EngineError::NotFound(uri.to_string()));
            }
            recorder.durations.get(uri).copied()
        };

        notifier.ready(duration.or(Some(Duration::from_secs(60))));
        self.probe.inner.lock().unwrap().notifiers.push(notifier);
        Ok(())
    }

    async fn play(&mut self) -> Result<(), EngineError> {
        self.probe.record(Call::Play(self.id));
        self.playing = true;
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), EngineError> {
        self.probe.record(Call::Pause(self.id));
        self.playing = false;
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EngineError> {
        self.probe.record(Call::Stop(self.id));
        self.playing = false;
        Ok(())
    }

    async fn seek(&mut self, position: Duration) -> Result<(), EngineError> {
        self.probe.record(Call::Seek(self.id, position));
        Ok(())
    }

    async fn set_rate(&mut self, rate: f32) -> Result<(), EngineError> {
        self.probe.record(Call::SetRate(self.id, rate));
        Ok(())
    }

    fn is_playing(&self) -> Option<bool> {
        Some(self.playing)
    }

    async fn release(&mut self) {
        self.probe.record(Call::Release(self.id));
        self.probe.inner.lock().unwrap().live -= 1;
    }
}

pub fn entry(index: usize, kind: MediaKind) -> PlaylistEntry {
    let extension = match kind {
        MediaKind::Audio => "mp3",
        MediaKind::Video => "mp4",
    };
    PlaylistEntry {
        uri: format!("mem://{index}.{extension}"),
        title: format!("Entry {index}"),
        kind,
        flow: FlowKey::Blue,
        duration_ms: None,
    }
}

pub fn audio_playlist(len: usize) -> Vec<PlaylistEntry> {
    (0..len).map(|i| entry(i, MediaKind::Audio)).collect()
}

pub fn mixed_playlist(kinds: &[MediaKind]) -> Vec<PlaylistEntry> {
    kinds.iter().enumerate().map(|(i, &k)| entry(i, k)).collect()
}

pub fn config(shuffle: bool, repeat: bool) -> PlaybackConfig {
    PlaybackConfig {
        shuffle,
        repeat,
        shuffle_seed: Some(42),
        ..PlaybackConfig::default()
    }
}

pub fn sequencer(
    playlist: Vec<PlaylistEntry>,
    start: usize,
    config: PlaybackConfig,
) -> (Sequencer, SignalReceiver, Probe) {
    let probe = Probe::default();
    let factory = RecordingFactory::new(probe.clone());
    let (sequencer, signals) = Sequencer::new(playlist, start, Box::new(factory), config).unwrap();
    (sequencer, signals, probe)
}

/// Feed every queued signal back into the sequencer
pub async fn pump(sequencer: &mut Sequencer, signals: &mut SignalReceiver) {
    while let Ok(signal) = signals.try_recv() {
        sequencer.handle_signal(signal).await.unwrap();
    }
}

/// Report the current entry finished and let the finish delay elapse
pub async fn finish_current(probe: &Probe, sequencer: &mut Sequencer, signals: &mut SignalReceiver) {
    probe.last_notifier().finished();
    pump(sequencer, signals).await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    pump(sequencer, signals).await;
}
