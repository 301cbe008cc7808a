//! FARO State - the distress arbiter
//!
//! This crate provides:
//! - The Idle/Alerting/Silenced state machine driving the effects engine
//! - The notification bridge boundary for OS-level banners
//! - Watch-based state publication for UI subscribers

pub mod arbiter;
pub mod bridge;

pub use arbiter::*;
pub use bridge::*;
