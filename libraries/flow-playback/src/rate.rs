//! Playback rate cycling
//!
//! Each media kind has a fixed ordered set of rates. Cycling moves to the
//! next rate in the set and wraps around.

use flow_core::MediaKind;

/// Rates offered for audio entries
pub const AUDIO_RATES: [f32; 4] = [1.0, 1.25, 1.5, 2.0];

/// Rates offered for video entries
pub const VIDEO_RATES: [f32; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

/// Rate every session starts at
pub const DEFAULT_RATE: f32 = 1.0;

/// Rate set for a media kind
pub fn rates_for(kind: MediaKind) -> &'static [f32] {
    match kind {
        MediaKind::Audio => &AUDIO_RATES,
        MediaKind::Video => &VIDEO_RATES,
    }
}

/// Whether `rate` is in the set for `kind`
pub fn is_offered(kind: MediaKind, rate: f32) -> bool {
    rates_for(kind).iter().any(|r| (r - rate).abs() < f32::EPSILON)
}

/// Rate that follows `current` in the set for `kind`
///
/// A rate outside the set (e.g. a video-only rate carried over to an
/// audio entry) moves to the first rate of the set.
pub fn next_rate(kind: MediaKind, current: f32) -> f32 {
    let rates = rates_for(kind);
    match rates.iter().position(|r| (r - current).abs() < f32::EPSILON) {
        Some(i) => rates[(i + 1) % rates.len()],
        None => rates[0],
    }
}
