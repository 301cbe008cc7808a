//! Alarm, session, and modality state enums

use std::fmt;

/// Receiver-side alarm state, owned by the distress arbiter.
///
/// `Alerting` implies the effects engine holds a live emitter set;
/// `Idle` and `Silenced` imply it holds none. `Silenced` is distinct
/// from `Idle`: it means "was alerting, locally dismissed" and exists
/// for UI only.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum AlarmState {
    #[default]
    Idle,
    Alerting,
    Silenced,
}

impl AlarmState {
    pub fn is_alerting(self) -> bool {
        self == AlarmState::Alerting
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlarmState::Idle => "idle",
            AlarmState::Alerting => "alerting",
            AlarmState::Silenced => "silenced",
        };
        f.write_str(s)
    }
}

/// Lifecycle of one physical connection attempt.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum SessionState {
    Connecting,
    Open,
    Closing,
    #[default]
    Closed,
}

impl SessionState {
    pub fn is_open(self) -> bool {
        self == SessionState::Open
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Connecting => "connecting",
            SessionState::Open => "open",
            SessionState::Closing => "closing",
            SessionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// One physical alarm modality.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Modality {
    Audio,
    Vibration,
    Torch,
    Banner,
}

impl Modality {
    pub const ALL: [Modality; 4] = [
        Modality::Audio,
        Modality::Vibration,
        Modality::Torch,
        Modality::Banner,
    ];
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Modality::Audio => "audio",
            Modality::Vibration => "vibration",
            Modality::Torch => "torch",
            Modality::Banner => "banner",
        };
        f.write_str(s)
    }
}
