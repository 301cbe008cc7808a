//! Error types for FARO
//!
//! Nothing in this taxonomy is fatal: network and parse errors drive the
//! reconnect/drop-frame paths, emitter failures degrade one modality, and
//! sender failures surface as a single reported outcome.

use thiserror::Error;

use crate::Modality;

/// Core FARO errors
#[derive(Error, Debug)]
pub enum FaroError {
    // Channel errors
    #[error("Not connected: no open session")]
    NotConnected,

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    // Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    // Sender errors
    #[error("Location fix timed out")]
    LocationTimeout,

    #[error("Missing identity or emergency contact")]
    MissingIdentity,

    // Effects errors (per-modality, never fatal)
    #[error("Emitter acquisition failed: {modality}")]
    EmitterFailed { modality: Modality },
}

/// Result type for FARO operations
pub type FaroResult<T> = Result<T, FaroError>;
