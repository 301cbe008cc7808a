//! Effects configuration and receiver profiles

use std::time::Duration;

use faro_core::{BANNER_PERIOD, STROBE_PHASE, VIBRATION_PHASE};

/// How long the torch strobes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StrobePolicy {
    /// Bounded number of on/off repetitions, then the torch rests.
    Count(u32),
    /// Strobe until the alarm session stops.
    Infinite,
}

/// Tuning for one alarm session. Two profiles exist: `persistent` for the
/// full-screen alert that runs until dismissed, `burst` for the short
/// attention burst a backgrounded receiver plays.
#[derive(Clone, Debug)]
pub struct EffectsConfig {
    pub strobe_policy: StrobePolicy,
    /// Torch on/off phase length. Also bounds stop latency.
    pub strobe_phase: Duration,
    pub banner_period: Duration,
    /// Waveform phase (repeating) or pulse length (one-shot).
    pub vibration_phase: Duration,
    /// Loop the alert sound, or play it once.
    pub audio_looping: bool,
    /// Repeat the vibration waveform, or pulse once.
    pub vibration_repeating: bool,
}

impl EffectsConfig {
    /// Full alarm: everything loops until stopped.
    pub fn persistent() -> Self {
        EffectsConfig {
            strobe_policy: StrobePolicy::Infinite,
            strobe_phase: STROBE_PHASE,
            banner_period: BANNER_PERIOD,
            vibration_phase: VIBRATION_PHASE,
            audio_looping: true,
            vibration_repeating: true,
        }
    }

    /// Short alarm: three flashes, one sound, one 2s pulse.
    pub fn burst() -> Self {
        EffectsConfig {
            strobe_policy: StrobePolicy::Count(3),
            strobe_phase: Duration::from_millis(200),
            banner_period: BANNER_PERIOD,
            vibration_phase: Duration::from_secs(2),
            audio_looping: false,
            vibration_repeating: false,
        }
    }
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self::persistent()
    }
}
