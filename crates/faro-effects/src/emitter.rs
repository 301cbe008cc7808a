//! Emitter trait seams
//!
//! Each physical modality sits behind its own trait so hosts plug in real
//! hardware bindings and tests plug in simulators. Acquisition returns a
//! `Result`; release methods are infallible and idempotent, since teardown
//! must always run to completion.

use std::time::Duration;

use thiserror::Error;

/// Per-emitter acquisition failure. Never fatal to the alarm session;
/// the engine degrades the failing modality and continues.
#[derive(Error, Debug)]
pub enum EmitterError {
    #[error("device unavailable: {0}")]
    Unavailable(String),

    #[error("hardware fault: {0}")]
    Hardware(String),
}

/// The alert sound device. At most one playing instance.
pub trait AudioSink: Send + Sync {
    /// Start the alert sound, looping until `stop`.
    fn play_looping(&self) -> Result<(), EmitterError>;

    /// Play the alert sound once; it ends on its own.
    fn play_once(&self) -> Result<(), EmitterError>;

    /// Stop and release any playing instance. Idempotent.
    fn stop(&self);
}

/// The vibration motor. A device without one reports `Unavailable`.
pub trait VibrationMotor: Send + Sync {
    /// Repeating on/off waveform until `cancel`.
    fn start_waveform(&self, on: Duration, off: Duration) -> Result<(), EmitterError>;

    /// One bounded pulse.
    fn pulse_once(&self, duration: Duration) -> Result<(), EmitterError>;

    /// Cancel any running pattern. Idempotent.
    fn cancel(&self);
}

/// The camera torch. Probed once for capability; strobed by the engine.
pub trait Torch: Send + Sync {
    /// Whether flash hardware exists at all.
    fn available(&self) -> bool;

    /// Set torch on or off.
    fn set_on(&self, on: bool) -> Result<(), EmitterError>;
}

/// The visual alert indicator. Purely cosmetic, so infallible.
pub trait Banner: Send + Sync {
    /// Toggle the highlight color phase.
    fn set_highlight(&self, on: bool);

    /// Return to the resting color. Idempotent.
    fn clear(&self);
}
