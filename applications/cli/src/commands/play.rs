//! Dry-run playback on the simulated clock engine
//!
//! A session is driven from two sides: the events it publishes are printed,
//! and lines typed on the console are turned into player commands.

use crate::config::FlowConfig;
use crate::error::Result;
use flow_core::{FlowKey, MediaEntry};
use flow_playback::{
    spawn_session, ClockEngineFactory, EngineFactory, PlaybackConfig, PlayerHandle, PlayerState,
    PlaylistEntry, Sequencer, SessionEvent, SessionSnapshot,
};
use flow_storage::CatalogStore;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::io::Write;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

/// Console usage shown when a session opens and after an unknown command
pub const CONSOLE_HELP: &str =
    "Commands: n next, p previous, t play/pause, s shuffle, r repeat, x rate, k <secs> seek, d dismiss, i status, q quit";

/// Options for a dry-run session
#[derive(Debug, Clone, Default)]
pub struct PlayOptions {
    /// Keep catalog order instead of permuting the list up front
    pub in_order: bool,
    /// Index of the first entry to play
    pub start: usize,
    /// Turn shuffle on regardless of configuration
    pub shuffle: bool,
    /// Turn repeat on regardless of configuration
    pub repeat: bool,
    /// Clock speed override
    pub speed: Option<f32>,
    /// Close the session on the first load failure instead of skipping it
    pub stop_on_error: bool,
}

/// What happened during a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Entries that started loading
    pub tracks_started: usize,
    /// Entries that failed to load
    pub failures: usize,
    /// Whether sequential playback ran off the end of the playlist
    pub finished: bool,
}

/// A line typed during playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Next,
    Previous,
    TogglePlayPause,
    ToggleShuffle,
    ToggleRepeat,
    CycleRate,
    /// Seek target in milliseconds
    Seek(i64),
    Dismiss,
    Status,
    Quit,
}

/// Parse a console line; `None` for blank or unrecognized input
pub fn parse_console_command(line: &str) -> Option<ConsoleCommand> {
    let mut parts = line.split_whitespace();
    let command = match parts.next()? {
        "n" | "next" => ConsoleCommand::Next,
        "p" | "prev" | "previous" => ConsoleCommand::Previous,
        "t" | "pause" | "play" => ConsoleCommand::TogglePlayPause,
        "s" | "shuffle" => ConsoleCommand::ToggleShuffle,
        "r" | "repeat" => ConsoleCommand::ToggleRepeat,
        "x" | "rate" => ConsoleCommand::CycleRate,
        "k" | "seek" => {
            let seconds: f64 = parts.next()?.parse().ok()?;
            if !seconds.is_finite() {
                return None;
            }
            ConsoleCommand::Seek((seconds * 1000.0).round() as i64)
        }
        "d" | "dismiss" => ConsoleCommand::Dismiss,
        "i" | "status" => ConsoleCommand::Status,
        "q" | "quit" => ConsoleCommand::Quit,
        _ => return None,
    };
    Some(command)
}

/// Turn catalog entries into a playlist, randomly permuted unless `in_order`
pub fn build_flow_playlist<R: Rng + ?Sized>(
    entries: Vec<MediaEntry>,
    in_order: bool,
    rng: &mut R,
) -> Vec<PlaylistEntry> {
    let mut playlist: Vec<PlaylistEntry> = entries.into_iter().map(Into::into).collect();
    if !in_order {
        playlist.shuffle(rng);
    }
    playlist
}

/// Random source for playlist permutation; seeded when a seed is configured
pub fn playlist_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// One line describing an event, or `None` for events not worth printing
pub fn describe_event(event: &SessionEvent, playlist_len: usize) -> Option<String> {
    match event {
        SessionEvent::TrackChanged {
            index, title, kind, ..
        } => Some(format!(
            "Now playing [{}/{}] {} ({})",
            index + 1,
            playlist_len,
            title,
            kind
        )),
        SessionEvent::StateChanged {
            state: PlayerState::Paused,
        } => Some("Paused".to_string()),
        SessionEvent::StateChanged {
            state: PlayerState::Idle,
        } => Some("Stopped".to_string()),
        SessionEvent::ModeChanged { shuffle, repeat } => Some(format!(
            "Shuffle {}, repeat {}",
            on_off(*shuffle),
            on_off(*repeat)
        )),
        SessionEvent::RateChanged { rate } => Some(format!("Playback rate {}x", rate)),
        SessionEvent::LoadFailed { failure } => {
            Some(format!("{}: {}", failure.title(), failure.message()))
        }
        SessionEvent::Notice { message } => Some(message.clone()),
        SessionEvent::PlaylistFinished => Some("End of playlist".to_string()),
        SessionEvent::Closed => Some("Session closed".to_string()),
        SessionEvent::StateChanged { .. }
        | SessionEvent::PositionUpdate { .. }
        | SessionEvent::ControlsVisibility { .. } => None,
    }
}

/// Status line for the `i` console command
pub fn describe_snapshot(snapshot: &SessionSnapshot) -> String {
    let duration = snapshot
        .duration_ms
        .map_or_else(|| "--:--".to_string(), format_millis);

    format!(
        "[{}/{}] {}  {} / {}  {:?}  shuffle {}, repeat {}, {}x",
        snapshot.current_index + 1,
        snapshot.playlist_len,
        snapshot.entry.title,
        format_millis(snapshot.position_ms),
        duration,
        snapshot.state,
        on_off(snapshot.mode.shuffle),
        on_off(snapshot.mode.repeat),
        snapshot.playback_rate
    )
}

/// `m:ss`
pub fn format_millis(ms: u64) -> String {
    let seconds = ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

/// Play the entries tagged with `flow`
///
/// Returns `None` when the Flow has nothing to play. A catalog that cannot
/// be read counts as empty.
pub async fn play_flow(
    config: &FlowConfig,
    flow: FlowKey,
    options: &PlayOptions,
    out: &mut impl Write,
) -> Result<Option<SessionSummary>> {
    let entries = load_flow_entries(&config.storage.database_url, flow).await;
    let mut rng = playlist_rng(config.playback.shuffle_seed);
    let playlist = build_flow_playlist(entries, options.in_order, &mut rng);

    if playlist.is_empty() {
        writeln!(
            out,
            "No media tagged {}. Import some files with `flowplayer import --flow {} <paths>`.",
            flow.label(),
            flow
        )?;
        return Ok(None);
    }

    writeln!(out, "Playing {} ({} entries)", flow.label(), playlist.len())?;
    play_playlist(config, playlist, options, out).await.map(Some)
}

async fn load_flow_entries(database_url: &str, flow: FlowKey) -> Vec<MediaEntry> {
    let result = match CatalogStore::open(database_url).await {
        Ok(store) => store.query_by_flow(flow).await,
        Err(e) => Err(e),
    };

    result.unwrap_or_else(|e| {
        warn!(flow = %flow, error = %e, "Could not read the catalog, opening an empty playlist");
        Vec::new()
    })
}

/// Play `playlist` on the clock engine, reading commands from stdin
pub async fn play_playlist(
    config: &FlowConfig,
    playlist: Vec<PlaylistEntry>,
    options: &PlayOptions,
    out: &mut impl Write,
) -> Result<SessionSummary> {
    let speed = options.speed.unwrap_or(config.playback.clock_speed);
    let factory = ClockEngineFactory::for_playlist(speed, &playlist);

    let mut session_config = config.playback.session_config();
    session_config.shuffle |= options.shuffle;
    session_config.repeat |= options.repeat;

    writeln!(out, "{}", CONSOLE_HELP)?;
    drive_session(
        playlist,
        Box::new(factory),
        session_config,
        options,
        spawn_console_reader(),
        out,
    )
    .await
}

/// Forward stdin lines from a detached thread
///
/// A blocking read on a runtime thread would keep the runtime from shutting
/// down after the session ends.
fn spawn_console_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Run a session until it closes
///
/// Load failures are skipped (or, with `stop_on_error`, dismissed and the
/// session closed). When every entry in a row has failed the session is
/// closed instead of cycling forever. A finished playlist closes the
/// session. Console input ending does not.
pub async fn drive_session(
    playlist: Vec<PlaylistEntry>,
    factory: Box<dyn EngineFactory>,
    session_config: PlaybackConfig,
    options: &PlayOptions,
    mut console: mpsc::UnboundedReceiver<String>,
    out: &mut impl Write,
) -> Result<SessionSummary> {
    let playlist_len = playlist.len();
    let (sequencer, signals) = Sequencer::new(playlist, options.start, factory, session_config)?;
    let (player, mut events, task) = spawn_session(sequencer, signals);

    let mut summary = SessionSummary::default();
    let mut consecutive_failures = 0;
    let mut console_open = true;
    let mut interrupted = false;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = events.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Session event receiver lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };

                if let Some(line) = describe_event(&event, playlist_len) {
                    writeln!(out, "{}", line)?;
                }

                match event {
                    SessionEvent::TrackChanged { .. } => summary.tracks_started += 1,
                    SessionEvent::StateChanged { state: PlayerState::Playing } => {
                        consecutive_failures = 0;
                    }
                    SessionEvent::LoadFailed { .. } => {
                        summary.failures += 1;
                        consecutive_failures += 1;

                        if options.stop_on_error {
                            report(player.dismiss_error().await);
                            close(&player).await;
                        } else if consecutive_failures >= playlist_len {
                            writeln!(out, "Nothing in this playlist could be played")?;
                            close(&player).await;
                        } else {
                            report(player.skip_after_error().await);
                        }
                    }
                    SessionEvent::PlaylistFinished => {
                        summary.finished = true;
                        close(&player).await;
                    }
                    SessionEvent::Closed => break,
                    _ => {}
                }
            }
            line = console.recv(), if console_open => {
                let Some(line) = line else {
                    console_open = false;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }

                match parse_console_command(&line) {
                    Some(ConsoleCommand::Status) => {
                        if let Ok(snapshot) = player.snapshot().await {
                            writeln!(out, "{}", describe_snapshot(&snapshot))?;
                        }
                    }
                    Some(command) => report(apply_console_command(&player, command).await),
                    None => writeln!(out, "Unknown command {:?}. {}", line.trim(), CONSOLE_HELP)?,
                }
            }
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                close(&player).await;
            }
        }
    }

    drop(player);
    if let Err(e) = task.await {
        warn!("Playback session task failed: {}", e);
    }

    Ok(summary)
}

async fn apply_console_command(
    player: &PlayerHandle,
    command: ConsoleCommand,
) -> flow_playback::Result<()> {
    match command {
        ConsoleCommand::Next => player.next().await,
        ConsoleCommand::Previous => player.previous().await,
        ConsoleCommand::TogglePlayPause => player.toggle_play_pause().await,
        ConsoleCommand::ToggleShuffle => player.toggle_shuffle().await,
        ConsoleCommand::ToggleRepeat => player.toggle_repeat().await,
        ConsoleCommand::CycleRate => player.cycle_playback_rate().await,
        ConsoleCommand::Seek(position_ms) => player.seek(position_ms).await,
        ConsoleCommand::Dismiss => player.dismiss_error().await,
        ConsoleCommand::Quit => player.close().await,
        ConsoleCommand::Status => Ok(()),
    }
}

async fn close(player: &PlayerHandle) {
    report(player.close().await);
}

fn report(result: flow_playback::Result<()>) {
    if let Err(e) = result {
        warn!("Player command failed: {}", e);
    }
}
