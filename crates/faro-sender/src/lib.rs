//! FARO Sender - the outbound distress path
//!
//! This crate provides:
//! - Collaborator seams for identity and location acquisition
//! - The one-shot send sequence over a transient relay session

pub mod providers;
pub mod sender;

pub use providers::*;
pub use sender::*;
