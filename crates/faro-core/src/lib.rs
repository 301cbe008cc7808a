//! FARO Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout FARO:
//! - Identity and location types
//! - Distress events
//! - Alarm and session state enums
//! - Error taxonomy
//! - Protocol timing constants

pub mod identity;
pub mod event;
pub mod state;
pub mod error;
pub mod timing;

pub use identity::*;
pub use event::*;
pub use state::*;
pub use error::*;
pub use timing::*;
