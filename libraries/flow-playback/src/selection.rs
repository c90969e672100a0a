//! Track selection
//!
//! Decides which playlist index plays next, for both natural finish and
//! manual navigation. Pure functions over the playlist length, the mode
//! flags and the shuffle history, so they can be exercised without an
//! engine.

use crate::history::ShuffleHistory;
use crate::types::PlaybackMode;
use rand::seq::SliceRandom;
use rand::Rng;

/// Outcome of a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Load and play this index
    Play(usize),

    /// Stop playback without loading anything
    Stop,
}

/// Select the entry that follows a natural finish of `current`
///
/// Repeat wins over shuffle. Sequential order stops after the last entry.
pub fn select_after_finish<R: Rng + ?Sized>(
    current: usize,
    len: usize,
    mode: PlaybackMode,
    history: &mut ShuffleHistory,
    rng: &mut R,
) -> Selection {
    if mode.repeat {
        return Selection::Play(current);
    }
    if len <= 1 {
        return Selection::Stop;
    }
    if mode.shuffle {
        return Selection::Play(pick_shuffled(current, len, history, rng));
    }
    if current + 1 >= len {
        Selection::Stop
    } else {
        Selection::Play(current + 1)
    }
}

/// Select the entry for a manual "next" with more than one entry
///
/// Repeat is ignored. Sequential order wraps to the first entry.
pub fn select_manual_next<R: Rng + ?Sized>(
    current: usize,
    len: usize,
    mode: PlaybackMode,
    history: &mut ShuffleHistory,
    rng: &mut R,
) -> usize {
    if mode.shuffle {
        pick_shuffled(current, len, history, rng)
    } else {
        (current + 1) % len
    }
}

/// Select the entry for a manual "previous" with more than one entry
///
/// Under shuffle, walks back through the history while it holds more than
/// one visit. Otherwise moves one entry back, wrapping to the last.
pub fn select_manual_previous(
    current: usize,
    len: usize,
    mode: PlaybackMode,
    history: &mut ShuffleHistory,
) -> usize {
    if mode.shuffle {
        if let Some(previous) = history.step_back() {
            return previous;
        }
    }
    (current + len - 1) % len
}

/// Random pick among entries not yet played in this pass
///
/// Reseeds the history with `current` once every entry has been visited,
/// and records the pick.
pub fn pick_shuffled<R: Rng + ?Sized>(
    current: usize,
    len: usize,
    history: &mut ShuffleHistory,
    rng: &mut R,
) -> usize {
    if history.len() >= len {
        history.reseed(current);
    }

    let unplayed = history.unplayed();
    let pick = match unplayed.choose(rng) {
        Some(&index) => index,
        None => {
            let others: Vec<usize> = (0..len).filter(|&i| i != current).collect();
            others.choose(rng).copied().unwrap_or(current)
        }
    };

    history.push(pick);
    pick
}
