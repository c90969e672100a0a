//! Sequencer behaviour against a recording engine factory

mod common;

use common::{audio_playlist, config, finish_current, mixed_playlist, pump, sequencer, Call};
use flow_core::MediaKind;
use flow_playback::{
    LoadErrorKind, PlaybackConfig, PlaybackError, PlayerState, SessionEvent, Sequencer,
};
use std::collections::HashSet;
use std::time::Duration;

fn position_of(calls: &[Call], call: &Call) -> usize {
    calls
        .iter()
        .position(|c| c == call)
        .unwrap_or_else(|| panic!("{call:?} not recorded in {calls:?}"))
}

// ===== Construction =====

#[tokio::test]
async fn rejects_empty_playlist_and_bad_start_index() {
    let probe = common::Probe::default();
    let result = Sequencer::new(
        Vec::new(),
        0,
        Box::new(common::RecordingFactory::new(probe.clone())),
        PlaybackConfig::default(),
    );
    assert!(matches!(result, Err(PlaybackError::EmptyPlaylist)));

    let result = Sequencer::new(
        audio_playlist(2),
        2,
        Box::new(common::RecordingFactory::new(probe)),
        PlaybackConfig::default(),
    );
    assert!(matches!(
        result,
        Err(PlaybackError::IndexOutOfBounds { index: 2, len: 2 })
    ));
}

#[tokio::test(start_paused = true)]
async fn start_loads_then_plays_once_ready() {
    let (mut seq, mut rx, probe) = sequencer(audio_playlist(3), 1, config(false, false));
    assert_eq!(seq.state(), PlayerState::Idle);
    assert_eq!(seq.active_engine_kind(), None);

    seq.start().await.unwrap();
    assert_eq!(seq.state(), PlayerState::Loading);
    assert!(seq.is_loading());

    pump(&mut seq, &mut rx).await;
    assert_eq!(seq.state(), PlayerState::Playing);
    assert_eq!(seq.current_index(), 1);
    assert_eq!(seq.active_engine_kind(), Some(MediaKind::Audio));
    assert_eq!(probe.loads(), vec!["mem://1.mp3"]);
    assert!(probe.calls().contains(&Call::Play(0)));

    let events = seq.drain_events();
    assert!(events.contains(&SessionEvent::TrackChanged {
        index: 1,
        title: "Entry 1".to_string(),
        kind: MediaKind::Audio,
        previous_index: 1,
    }));
    assert!(events.contains(&SessionEvent::StateChanged {
        state: PlayerState::Playing
    }));
}

// ===== Natural finish =====

#[tokio::test(start_paused = true)]
async fn sequential_mixed_playlist_plays_through_and_stops() {
    let kinds = [MediaKind::Audio, MediaKind::Video, MediaKind::Audio];
    let (mut seq, mut rx, probe) = sequencer(mixed_playlist(&kinds), 0, config(false, false));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    finish_current(&probe, &mut seq, &mut rx).await;
    assert_eq!(seq.current_index(), 1);
    assert_eq!(seq.active_engine_kind(), Some(MediaKind::Video));

    finish_current(&probe, &mut seq, &mut rx).await;
    assert_eq!(seq.current_index(), 2);
    assert_eq!(seq.active_engine_kind(), Some(MediaKind::Audio));

    finish_current(&probe, &mut seq, &mut rx).await;
    assert_eq!(seq.state(), PlayerState::Idle);
    assert_eq!(seq.active_engine_kind(), None);
    assert_eq!(seq.current_index(), 2);

    assert_eq!(
        probe.loads(),
        vec!["mem://0.mp3", "mem://1.mp4", "mem://2.mp3"],
        "no fourth load after the last entry"
    );

    let calls = probe.calls();
    // Video engine constructed only after the audio engine was released
    assert!(
        position_of(&calls, &Call::Release(0))
            < position_of(
                &calls,
                &Call::Create {
                    id: 1,
                    kind: MediaKind::Video
                }
            )
    );
    // And the other way round
    assert!(
        position_of(&calls, &Call::Release(1))
            < position_of(
                &calls,
                &Call::Create {
                    id: 2,
                    kind: MediaKind::Audio
                }
            )
    );
    assert!(calls.contains(&Call::Release(2)));
    assert_eq!(probe.max_live(), 1);
    assert_eq!(probe.live(), 0);

    assert!(seq.drain_events().contains(&SessionEvent::PlaylistFinished));
}

#[tokio::test(start_paused = true)]
async fn shuffle_visits_every_entry_once_before_repeating() {
    for len in [2usize, 3, 5, 8] {
        let (mut seq, mut rx, probe) = sequencer(audio_playlist(len), 0, config(true, false));
        seq.start().await.unwrap();
        pump(&mut seq, &mut rx).await;
        assert_eq!(seq.play_history(), &[0]);

        let mut visited = vec![seq.current_index()];
        for _ in 1..len {
            finish_current(&probe, &mut seq, &mut rx).await;
            visited.push(seq.current_index());
        }

        let unique: HashSet<usize> = visited.iter().copied().collect();
        assert_eq!(unique.len(), len, "repeat before exhausting {visited:?}");
        let mut history = seq.play_history().to_vec();
        history.sort_unstable();
        assert_eq!(history, (0..len).collect::<Vec<_>>());

        // Exhausted history reseeds with the entry that just finished
        let last = seq.current_index();
        finish_current(&probe, &mut seq, &mut rx).await;
        assert_eq!(seq.play_history().len(), 2);
        assert_eq!(seq.play_history()[0], last);
        assert_ne!(seq.current_index(), last);
    }
}

#[tokio::test(start_paused = true)]
async fn repeat_wins_over_shuffle_on_finish() {
    let (mut seq, mut rx, probe) = sequencer(audio_playlist(4), 2, config(true, true));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    for _ in 0..3 {
        finish_current(&probe, &mut seq, &mut rx).await;
        assert_eq!(seq.current_index(), 2);
        assert_eq!(seq.state(), PlayerState::Playing);
    }
    assert_eq!(probe.loads(), vec!["mem://2.mp3"; 4]);
}

#[tokio::test(start_paused = true)]
async fn single_entry_stops_on_finish_without_repeat() {
    let (mut seq, mut rx, probe) = sequencer(audio_playlist(1), 0, config(true, false));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    finish_current(&probe, &mut seq, &mut rx).await;
    assert_eq!(seq.state(), PlayerState::Idle);
    assert_eq!(probe.loads().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn finish_timer_is_superseded_by_manual_navigation() {
    let (mut seq, mut rx, probe) = sequencer(audio_playlist(4), 0, config(false, false));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    probe.last_notifier().finished();
    pump(&mut seq, &mut rx).await;
    seq.next().await.unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;
    pump(&mut seq, &mut rx).await;

    assert_eq!(seq.current_index(), 1, "finish must not advance a second time");
    assert_eq!(probe.loads(), vec!["mem://0.mp3", "mem://1.mp3"]);
}

#[tokio::test(start_paused = true)]
async fn restart_during_finish_delay_stays_on_entry() {
    let (mut seq, mut rx, probe) = sequencer(audio_playlist(3), 0, config(false, false));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    probe
        .last_notifier()
        .position(Duration::from_millis(5000), None);
    probe.last_notifier().finished();
    pump(&mut seq, &mut rx).await;
    assert_eq!(seq.state(), PlayerState::Paused);

    seq.prev().await.unwrap();
    assert_eq!(seq.position(), Duration::ZERO);

    tokio::time::sleep(Duration::from_millis(150)).await;
    pump(&mut seq, &mut rx).await;

    assert_eq!(seq.current_index(), 0);
    assert_eq!(probe.loads(), vec!["mem://0.mp3"]);
}

#[tokio::test(start_paused = true)]
async fn resume_during_finish_delay_stays_on_entry() {
    let (mut seq, mut rx, probe) = sequencer(audio_playlist(3), 0, config(false, false));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    probe.last_notifier().finished();
    pump(&mut seq, &mut rx).await;

    seq.toggle_play_pause().await.unwrap();
    assert_eq!(seq.state(), PlayerState::Playing);

    tokio::time::sleep(Duration::from_millis(150)).await;
    pump(&mut seq, &mut rx).await;

    assert_eq!(seq.current_index(), 0);
    assert_eq!(seq.state(), PlayerState::Playing);
    assert_eq!(probe.loads().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn seek_back_during_finish_delay_stays_on_entry() {
    let (mut seq, mut rx, probe) = sequencer(audio_playlist(3), 0, config(false, false));
    probe.set_duration("mem://0.mp3", Duration::from_secs(60));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    probe.last_notifier().finished();
    pump(&mut seq, &mut rx).await;
    seq.seek(Duration::from_secs(20)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;
    pump(&mut seq, &mut rx).await;

    assert_eq!(seq.current_index(), 0);
    assert_eq!(seq.position(), Duration::from_secs(20));
    assert_eq!(probe.loads().len(), 1);
}

// ===== Stale notifications =====

#[tokio::test(start_paused = true)]
async fn notifications_from_replaced_engine_are_ignored() {
    let (mut seq, mut rx, probe) = sequencer(audio_playlist(3), 0, config(false, false));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;
    let stale = probe.notifier(0);

    seq.next().await.unwrap();
    pump(&mut seq, &mut rx).await;

    stale.finished();
    stale.error("Source error");
    stale.position(Duration::from_secs(42), None);
    tokio::time::sleep(Duration::from_millis(150)).await;
    pump(&mut seq, &mut rx).await;

    assert_eq!(seq.current_index(), 1);
    assert_eq!(seq.state(), PlayerState::Playing);
    assert!(seq.failure().is_none());
    assert_eq!(seq.position(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn later_load_supersedes_in_flight_load() {
    let (mut seq, mut rx, probe) = sequencer(audio_playlist(3), 0, config(false, false));
    seq.load_and_play(1).await.unwrap();
    seq.load_and_play(2).await.unwrap();
    pump(&mut seq, &mut rx).await;

    assert_eq!(seq.current_index(), 2);
    assert_eq!(seq.state(), PlayerState::Playing);
    let plays: Vec<Call> = probe
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Play(_)))
        .collect();
    assert_eq!(plays, vec![Call::Play(1)]);
}

// ===== Manual navigation =====

#[tokio::test(start_paused = true)]
async fn manual_next_wraps_and_ignores_repeat() {
    let (mut seq, mut rx, _probe) = sequencer(audio_playlist(3), 2, config(false, true));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    seq.next().await.unwrap();
    assert_eq!(seq.current_index(), 0);
}

#[tokio::test(start_paused = true)]
async fn manual_next_on_single_entry() {
    let (mut seq, mut rx, probe) = sequencer(audio_playlist(1), 0, config(false, false));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    seq.next().await.unwrap();
    assert_eq!(seq.state(), PlayerState::Idle);
    assert_eq!(probe.live(), 0);

    seq.toggle_repeat();
    seq.next().await.unwrap();
    pump(&mut seq, &mut rx).await;
    assert_eq!(seq.state(), PlayerState::Playing);
    assert_eq!(probe.loads().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn prev_past_threshold_restarts_in_every_mode() {
    for (shuffle, repeat) in [(false, false), (true, false), (false, true), (true, true)] {
        let (mut seq, mut rx, probe) = sequencer(audio_playlist(3), 1, config(shuffle, repeat));
        seq.start().await.unwrap();
        pump(&mut seq, &mut rx).await;

        probe
            .last_notifier()
            .position(Duration::from_millis(5000), None);
        pump(&mut seq, &mut rx).await;
        assert_eq!(seq.position(), Duration::from_millis(5000));

        seq.prev().await.unwrap();
        assert_eq!(seq.current_index(), 1);
        assert_eq!(seq.position(), Duration::ZERO);
        assert!(probe.calls().contains(&Call::Seek(0, Duration::ZERO)));
        assert_eq!(probe.loads().len(), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn prev_moves_back_and_wraps() {
    let (mut seq, mut rx, _probe) = sequencer(audio_playlist(3), 0, config(false, false));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    seq.prev().await.unwrap();
    assert_eq!(seq.current_index(), 2);
    seq.prev().await.unwrap();
    assert_eq!(seq.current_index(), 1);
}

#[tokio::test(start_paused = true)]
async fn prev_under_shuffle_walks_history() {
    let (mut seq, mut rx, _probe) = sequencer(audio_playlist(6), 0, config(true, false));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    seq.next().await.unwrap();
    seq.next().await.unwrap();
    pump(&mut seq, &mut rx).await;
    let visited = seq.play_history().to_vec();
    assert_eq!(visited.len(), 3);

    seq.prev().await.unwrap();
    assert_eq!(seq.current_index(), visited[1]);
    seq.prev().await.unwrap();
    assert_eq!(seq.current_index(), 0);
    assert_eq!(seq.play_history(), &[0]);

    // History exhausted, falls back to positional previous
    seq.prev().await.unwrap();
    assert_eq!(seq.current_index(), 5);
}

#[tokio::test(start_paused = true)]
async fn manual_next_releases_video_engine_before_creating_audio() {
    let kinds = [MediaKind::Video, MediaKind::Audio];
    let (mut seq, mut rx, probe) = sequencer(mixed_playlist(&kinds), 0, config(false, false));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;
    assert_eq!(seq.active_engine_kind(), Some(MediaKind::Video));

    seq.next().await.unwrap();
    pump(&mut seq, &mut rx).await;

    let calls = probe.calls();
    let create_audio = position_of(
        &calls,
        &Call::Create {
            id: 1,
            kind: MediaKind::Audio,
        },
    );
    assert!(position_of(&calls, &Call::Stop(0)) < position_of(&calls, &Call::Release(0)));
    assert!(position_of(&calls, &Call::Release(0)) < create_audio);
    assert_eq!(seq.active_engine_kind(), Some(MediaKind::Audio));
    assert_eq!(seq.state(), PlayerState::Playing);
    assert_eq!(probe.max_live(), 1);
}

// ===== Modes =====

#[tokio::test(start_paused = true)]
async fn toggling_shuffle_resets_history_to_current() {
    let (mut seq, mut rx, _probe) = sequencer(audio_playlist(5), 2, config(false, false));
    seq.start().await.unwrap();
    seq.next().await.unwrap();
    seq.next().await.unwrap();
    pump(&mut seq, &mut rx).await;
    assert_eq!(seq.current_index(), 4);
    assert!(seq.play_history().is_empty());

    seq.toggle_shuffle();
    assert_eq!(seq.play_history(), &[4]);
    assert_eq!(seq.current_index(), 4);
    assert_eq!(seq.state(), PlayerState::Playing);

    seq.next().await.unwrap();
    seq.toggle_shuffle();
    assert!(seq.play_history().is_empty());

    seq.toggle_shuffle();
    assert_eq!(seq.play_history(), &[seq.current_index()]);
    assert!(seq.drain_events().contains(&SessionEvent::ModeChanged {
        shuffle: true,
        repeat: false
    }));
}

// ===== Transport =====

#[tokio::test(start_paused = true)]
async fn toggle_play_pause_round_trip() {
    let (mut seq, mut rx, probe) = sequencer(audio_playlist(2), 0, config(false, false));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    seq.toggle_play_pause().await.unwrap();
    assert_eq!(seq.state(), PlayerState::Paused);
    assert!(probe.calls().contains(&Call::Pause(0)));

    seq.toggle_play_pause().await.unwrap();
    assert_eq!(seq.state(), PlayerState::Playing);
}

#[tokio::test(start_paused = true)]
async fn toggle_play_pause_ignored_while_loading_and_reloads_when_idle() {
    let (mut seq, mut rx, probe) = sequencer(audio_playlist(1), 0, config(false, false));
    seq.start().await.unwrap();

    seq.toggle_play_pause().await.unwrap();
    assert_eq!(seq.state(), PlayerState::Loading);
    assert!(!probe.calls().iter().any(|c| matches!(c, Call::Pause(_))));

    pump(&mut seq, &mut rx).await;
    seq.next().await.unwrap();
    assert_eq!(seq.state(), PlayerState::Idle);

    seq.toggle_play_pause().await.unwrap();
    pump(&mut seq, &mut rx).await;
    assert_eq!(seq.state(), PlayerState::Playing);
    assert_eq!(probe.loads().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn seek_is_clamped_and_requires_ready_engine() {
    let (mut seq, mut rx, probe) = sequencer(audio_playlist(2), 0, config(false, false));
    probe.set_duration("mem://0.mp3", Duration::from_secs(10));
    seq.start().await.unwrap();

    seq.seek(Duration::from_secs(5)).await.unwrap();
    assert!(!probe.calls().iter().any(|c| matches!(c, Call::Seek(..))));

    pump(&mut seq, &mut rx).await;
    seq.seek(Duration::from_secs(20)).await.unwrap();
    assert!(probe.calls().contains(&Call::Seek(0, Duration::from_secs(10))));

    seq.seek_to_millis(-500).await.unwrap();
    assert!(probe.calls().contains(&Call::Seek(0, Duration::ZERO)));
}

#[tokio::test(start_paused = true)]
async fn playback_rate_cycles_per_kind_and_survives_reload() {
    let kinds = [MediaKind::Audio, MediaKind::Video];
    let (mut seq, mut rx, probe) = sequencer(mixed_playlist(&kinds), 0, config(false, false));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    seq.cycle_playback_rate().await.unwrap();
    assert_eq!(seq.playback_rate(), 1.25);
    assert!(probe.calls().contains(&Call::SetRate(0, 1.25)));

    seq.next().await.unwrap();
    pump(&mut seq, &mut rx).await;
    assert!(probe.calls().contains(&Call::SetRate(1, 1.25)));

    seq.cycle_playback_rate().await.unwrap();
    assert_eq!(seq.playback_rate(), 1.5);
    for _ in 0..2 {
        seq.cycle_playback_rate().await.unwrap();
    }
    assert_eq!(seq.playback_rate(), 0.5);
}

#[tokio::test(start_paused = true)]
async fn video_only_rate_resets_on_audio_entry() {
    let kinds = [MediaKind::Video, MediaKind::Audio];
    let (mut seq, mut rx, probe) = sequencer(mixed_playlist(&kinds), 0, config(false, false));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    // 1.25, 1.5, 2.0, 0.5, 0.75
    for _ in 0..5 {
        seq.cycle_playback_rate().await.unwrap();
    }
    assert_eq!(seq.playback_rate(), 0.75);
    assert!(probe.calls().contains(&Call::SetRate(0, 0.75)));
    seq.drain_events();

    seq.next().await.unwrap();
    pump(&mut seq, &mut rx).await;

    assert_eq!(seq.playback_rate(), 1.0);
    assert!(!probe
        .calls()
        .iter()
        .any(|c| matches!(c, Call::SetRate(1, _))));
    assert!(seq
        .drain_events()
        .contains(&SessionEvent::RateChanged { rate: 1.0 }));

    seq.cycle_playback_rate().await.unwrap();
    assert_eq!(seq.playback_rate(), 1.25);
}

// ===== Errors =====

#[tokio::test(start_paused = true)]
async fn load_failure_enters_error_state_and_skip_recovers() {
    let (mut seq, mut rx, probe) = sequencer(audio_playlist(3), 0, config(false, false));
    probe.fail_uri("mem://1.mp3");
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    seq.next().await.unwrap();
    assert_eq!(seq.state(), PlayerState::Error);
    let failure = seq.failure().cloned().unwrap();
    assert_eq!(failure.index, 1);
    assert_eq!(failure.kind, LoadErrorKind::NotFound);
    assert_eq!(probe.live(), 0);
    assert!(seq
        .drain_events()
        .iter()
        .any(|e| matches!(e, SessionEvent::LoadFailed { failure } if failure.index == 1)));

    // Play/pause does nothing until the failure is handled
    seq.toggle_play_pause().await.unwrap();
    assert_eq!(seq.state(), PlayerState::Error);

    seq.skip_after_error().await.unwrap();
    pump(&mut seq, &mut rx).await;
    assert_eq!(seq.current_index(), 2);
    assert_eq!(seq.state(), PlayerState::Playing);
    assert!(seq.failure().is_none());
}

#[tokio::test(start_paused = true)]
async fn dismissing_failure_goes_idle_on_failed_entry() {
    let (mut seq, mut rx, probe) = sequencer(audio_playlist(2), 0, config(false, false));
    probe.fail_uri("mem://0.mp3");
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;
    assert_eq!(seq.state(), PlayerState::Error);

    seq.dismiss_error();
    assert_eq!(seq.state(), PlayerState::Idle);
    assert_eq!(seq.current_index(), 0);
    assert!(seq.failure().is_none());
}

#[tokio::test(start_paused = true)]
async fn asynchronous_engine_error_is_classified() {
    let (mut seq, mut rx, probe) = sequencer(audio_playlist(2), 0, config(false, false));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    probe
        .last_notifier()
        .error("java.lang.SecurityException: Permission Denial: reading content");
    pump(&mut seq, &mut rx).await;

    assert_eq!(seq.state(), PlayerState::Error);
    assert_eq!(
        seq.failure().map(|f| f.kind),
        Some(LoadErrorKind::PermissionDenied)
    );
    assert_eq!(probe.live(), 0);
}

// ===== Controls =====

#[tokio::test(start_paused = true)]
async fn controls_hide_only_while_playing() {
    let (mut seq, mut rx, _probe) = sequencer(audio_playlist(2), 0, config(false, false));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;
    assert!(seq.controls_visible());

    tokio::time::sleep(Duration::from_millis(2600)).await;
    pump(&mut seq, &mut rx).await;
    assert!(!seq.controls_visible());

    seq.touch_controls();
    assert!(seq.controls_visible());

    seq.toggle_play_pause().await.unwrap();
    tokio::time::sleep(Duration::from_millis(5000)).await;
    pump(&mut seq, &mut rx).await;
    assert!(seq.controls_visible(), "paused sessions keep controls shown");
}

#[tokio::test(start_paused = true)]
async fn interaction_postpones_hiding() {
    let (mut seq, mut rx, _probe) = sequencer(audio_playlist(2), 0, config(false, false));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    tokio::time::sleep(Duration::from_millis(2000)).await;
    seq.touch_controls();
    tokio::time::sleep(Duration::from_millis(1000)).await;
    pump(&mut seq, &mut rx).await;
    assert!(seq.controls_visible());

    tokio::time::sleep(Duration::from_millis(2000)).await;
    pump(&mut seq, &mut rx).await;
    assert!(!seq.controls_visible());
}

// ===== Lifecycle =====

#[tokio::test(start_paused = true)]
async fn close_releases_engine_and_rejects_commands() {
    let (mut seq, mut rx, probe) = sequencer(audio_playlist(2), 0, config(false, false));
    seq.start().await.unwrap();
    pump(&mut seq, &mut rx).await;

    seq.close().await;
    assert_eq!(probe.live(), 0);
    assert!(seq.is_closed());
    assert!(matches!(seq.next().await, Err(PlaybackError::SessionClosed)));
    assert!(seq.drain_events().contains(&SessionEvent::Closed));
}
